//! Opaque solver configuration.
//!
//! Positional arguments and keyword options are stored as JSON values and
//! passed to the solver untouched. The only key read here is
//! [`SENSEALG_KEY`], which overrides the class-default sensitivity.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    errors::{NdeError, NdeResult},
    sensitivity::algorithm::SensitivityAlgorithm,
};

/// Reserved keyword selecting the sensitivity algorithm.
pub const SENSEALG_KEY: &str = "sensealg";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    #[serde(default)]
    pub args: Vec<Value>,
    #[serde(default)]
    pub kwargs: BTreeMap<String, Value>,
}

impl SolverOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    pub fn with_kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    pub fn with_sensealg(self, alg: SensitivityAlgorithm) -> Self {
        self.with_kwarg(SENSEALG_KEY, alg.name())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.kwargs.get(key)
    }

    /// Parsed `"sensealg"` keyword, if set.
    ///
    /// # Errors
    /// [`NdeError::InvalidSensitivity`] if the value is not a string naming a
    /// known algorithm.
    pub fn sensealg_override(&self) -> NdeResult<Option<SensitivityAlgorithm>> {
        match self.kwargs.get(SENSEALG_KEY) {
            None => Ok(None),
            Some(Value::String(name)) => name.parse().map(Some),
            Some(other) => Err(NdeError::InvalidSensitivity {
                name: other.to_string(),
                reason: "The 'sensealg' option must be a string.",
            }),
        }
    }

    /// Load options from a JSON object such as
    /// `{"args": ["Tsit5"], "kwargs": {"saveat": 0.1}}`.
    ///
    /// # Errors
    /// [`NdeError::InvalidOptions`] on malformed JSON.
    pub fn from_json(text: &str) -> NdeResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> NdeResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}
