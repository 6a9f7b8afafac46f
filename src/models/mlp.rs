//! mlp — reference dense network implementing both model capabilities.
//!
//! Purpose
//! -------
//! Provide a small multilayer perceptron that can be handed to any
//! differential layer either as a self-contained model (via [`Destructure`])
//! or as an explicit-state model (via [`ExplicitModel`]).
//!
//! Conventions
//! -----------
//! - Layer `k` maps `in_k → out_k` as `y = act(W x + b)` with `W` of shape
//!   `(out_k, in_k)`.
//! - Flat layout, layer by layer: `W` in row-major order, then `b`.
//! - Inputs are 1-D `(in)` or batched `(in, batch)`; batched inputs are
//!   processed column-wise and the batch axis is preserved.
//! - Explicit-state use is stateless: the incoming state is returned as is.
use ndarray::{Array1, Array2, Axis, Ix1, Ix2, s};

use crate::{
    errors::{NdeError, NdeResult},
    models::{
        activations::Activation,
        capability::{Destructure, ExplicitModel, Model, Restructure},
        state::ModelState,
    },
    types::{Params, ParamsView, State, StateView},
};

/// Shape of one dense layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DenseShape {
    inputs: usize,
    outputs: usize,
    activation: Activation,
}

impl DenseShape {
    fn param_count(&self) -> usize {
        self.outputs * self.inputs + self.outputs
    }
}

/// Fully connected layer `y = act(W x + b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Dense {
    weight: Array2<f64>,
    bias: Array1<f64>,
    activation: Activation,
}

impl Dense {
    /// # Errors
    /// [`NdeError::ShapeMismatch`] if `bias.len() != weight.nrows()`.
    pub fn new(weight: Array2<f64>, bias: Array1<f64>, activation: Activation) -> NdeResult<Self> {
        if bias.len() != weight.nrows() {
            return Err(NdeError::ShapeMismatch {
                what: "dense bias",
                expected: weight.nrows(),
                found: bias.len(),
            });
        }
        Ok(Self { weight, bias, activation })
    }

    pub fn inputs(&self) -> usize {
        self.weight.ncols()
    }

    pub fn outputs(&self) -> usize {
        self.weight.nrows()
    }

    fn shape(&self) -> DenseShape {
        DenseShape { inputs: self.inputs(), outputs: self.outputs(), activation: self.activation }
    }
}

/// Multilayer perceptron.
#[derive(Debug, Clone, PartialEq)]
pub struct Mlp {
    layers: Vec<Dense>,
}

impl Mlp {
    /// Chain layers, checking that consecutive widths agree.
    pub fn new(layers: Vec<Dense>) -> NdeResult<Self> {
        if layers.is_empty() {
            return Err(NdeError::Configuration {
                field: "layers",
                reason: "An MLP needs at least one dense layer.",
            });
        }
        for pair in layers.windows(2) {
            if pair[1].inputs() != pair[0].outputs() {
                return Err(NdeError::ShapeMismatch {
                    what: "dense layer input width",
                    expected: pair[0].outputs(),
                    found: pair[1].inputs(),
                });
            }
        }
        Ok(Self { layers })
    }

    /// Build an MLP with widths `sizes` and weights from `init(layer, row, col)`.
    ///
    /// Biases start at zero. `activations.len()` must be `sizes.len() - 1`.
    pub fn with_init<F>(sizes: &[usize], activations: &[Activation], mut init: F) -> NdeResult<Self>
    where
        F: FnMut(usize, usize, usize) -> f64,
    {
        if sizes.len() < 2 {
            return Err(NdeError::Configuration {
                field: "sizes",
                reason: "An MLP needs an input and an output width.",
            });
        }
        if activations.len() != sizes.len() - 1 {
            return Err(NdeError::ShapeMismatch {
                what: "activation list",
                expected: sizes.len() - 1,
                found: activations.len(),
            });
        }
        let layers = sizes
            .windows(2)
            .zip(activations)
            .enumerate()
            .map(|(k, (w, &act))| {
                let weight = Array2::from_shape_fn((w[1], w[0]), |(i, j)| init(k, i, j));
                Dense::new(weight, Array1::zeros(w[1]), act)
            })
            .collect::<NdeResult<Vec<_>>>()?;
        Mlp::new(layers)
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].inputs()
    }

    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs()
    }

    pub fn param_count(&self) -> usize {
        self.layers.iter().map(|l| l.shape().param_count()).sum()
    }

    /// Flat parameter vector in the documented layout.
    pub fn flat(&self) -> Params {
        let mut out = Vec::with_capacity(self.param_count());
        for layer in &self.layers {
            out.extend(layer.weight.iter().copied());
            out.extend(layer.bias.iter().copied());
        }
        Array1::from(out)
    }

    fn shapes(&self) -> Vec<DenseShape> {
        self.layers.iter().map(Dense::shape).collect()
    }

    fn from_flat(shapes: &[DenseShape], params: ParamsView<'_>) -> NdeResult<Self> {
        let mut offset = 0;
        let mut layers = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let (weight, bias) = split_layer(shape, params, offset)?;
            layers.push(Dense::new(weight, bias, shape.activation)?);
            offset += shape.param_count();
        }
        Mlp::new(layers)
    }
}

impl Model for Mlp {
    fn forward(&self, input: StateView<'_>) -> NdeResult<State> {
        let mut x = input.to_owned();
        for layer in &self.layers {
            x = dense_forward(&layer.weight, &layer.bias, layer.activation, x.view())?;
        }
        Ok(x)
    }
}

impl Destructure for Mlp {
    fn destructure(&self) -> (Params, Restructure) {
        let shapes = self.shapes();
        let len = self.param_count();
        let restructure = Restructure::new(len, move |p| {
            Ok(Box::new(Mlp::from_flat(&shapes, p)?) as Box<dyn Model>)
        });
        (self.flat(), restructure)
    }
}

impl ExplicitModel for Mlp {
    fn param_count(&self) -> usize {
        Mlp::param_count(self)
    }

    fn initial_params(&self) -> Params {
        self.flat()
    }

    fn apply(
        &self, input: StateView<'_>, params: ParamsView<'_>, state: &ModelState,
    ) -> NdeResult<(State, ModelState)> {
        let expected = Mlp::param_count(self);
        if params.len() != expected {
            return Err(NdeError::ShapeMismatch {
                what: "explicit model parameters",
                expected,
                found: params.len(),
            });
        }
        let mut x = input.to_owned();
        let mut offset = 0;
        for shape in self.shapes() {
            let (weight, bias) = split_layer(&shape, params, offset)?;
            x = dense_forward(&weight, &bias, shape.activation, x.view())?;
            offset += shape.param_count();
        }
        Ok((x, state.clone()))
    }
}

/// Slice out `(W, b)` for one layer starting at `offset`.
fn split_layer(
    shape: &DenseShape, params: ParamsView<'_>, offset: usize,
) -> NdeResult<(Array2<f64>, Array1<f64>)> {
    let n_w = shape.outputs * shape.inputs;
    let end = offset + shape.param_count();
    if end > params.len() {
        return Err(NdeError::ShapeMismatch {
            what: "dense layer parameters",
            expected: end,
            found: params.len(),
        });
    }
    let weight =
        params.slice(s![offset..offset + n_w]).to_owned().into_shape((shape.outputs, shape.inputs))?;
    let bias = params.slice(s![offset + n_w..end]).to_owned();
    Ok((weight, bias))
}

fn dense_forward(
    weight: &Array2<f64>, bias: &Array1<f64>, activation: Activation, input: StateView<'_>,
) -> NdeResult<State> {
    match input.ndim() {
        1 => {
            let x = input.into_dimensionality::<Ix1>()?;
            check_width(weight, x.len())?;
            let mut y = weight.dot(&x) + bias;
            y.mapv_inplace(|v| activation.eval(v));
            Ok(y.into_dyn())
        }
        2 => {
            let x = input.into_dimensionality::<Ix2>()?;
            check_width(weight, x.nrows())?;
            let mut y = weight.dot(&x) + &bias.view().insert_axis(Axis(1));
            y.mapv_inplace(|v| activation.eval(v));
            Ok(y.into_dyn())
        }
        ndim => Err(NdeError::Model {
            reason: format!("dense layers accept 1-D or 2-D inputs, got {ndim}-D"),
        }),
    }
}

fn check_width(weight: &Array2<f64>, found: usize) -> NdeResult<()> {
    if found != weight.ncols() {
        return Err(NdeError::ShapeMismatch {
            what: "dense layer input",
            expected: weight.ncols(),
            found,
        });
    }
    Ok(())
}
