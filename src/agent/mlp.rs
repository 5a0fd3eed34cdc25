//! Dense ReLU network trained with Adam, in plain Rust.
//!
//! Architecture: `input → hidden… → output` with ReLU on every hidden layer
//! and a linear output, mean-squared-error loss. Weights are drawn with
//! Glorot-uniform initialisation from a caller-supplied RNG so that two
//! networks built from the same seed are identical.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::approximator::{ApproximatorError, QApproximator};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const ADAM_EPSILON: f64 = 1e-7;

/// Fully connected layer. `weights` is row-major `outputs × inputs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DenseLayer {
    inputs: usize,
    outputs: usize,
    weights: Vec<f64>,
    biases: Vec<f64>,
}

impl DenseLayer {
    fn glorot<R: Rng + ?Sized>(inputs: usize, outputs: usize, rng: &mut R) -> Self {
        let limit = (6.0 / (inputs + outputs) as f64).sqrt();
        let weights = (0..inputs * outputs)
            .map(|_| rng.gen_range(-limit..=limit))
            .collect();
        Self {
            inputs,
            outputs,
            weights,
            biases: vec![0.0; outputs],
        }
    }

    fn forward(&self, input: &[f64], relu: bool) -> Vec<f64> {
        self.weights
            .chunks_exact(self.inputs)
            .zip(&self.biases)
            .map(|(row, b)| {
                let z = row.iter().zip(input).map(|(w, x)| w * x).sum::<f64>() + b;
                if relu {
                    z.max(0.0)
                } else {
                    z
                }
            })
            .collect()
    }
}

/// First and second moment estimates for one layer.
#[derive(Debug, Clone)]
struct Moments {
    m_w: Vec<f64>,
    v_w: Vec<f64>,
    m_b: Vec<f64>,
    v_b: Vec<f64>,
}

impl Moments {
    fn zeros(layer: &DenseLayer) -> Self {
        Self {
            m_w: vec![0.0; layer.weights.len()],
            v_w: vec![0.0; layer.weights.len()],
            m_b: vec![0.0; layer.biases.len()],
            v_b: vec![0.0; layer.biases.len()],
        }
    }
}

#[derive(Debug, Clone)]
struct Adam {
    learning_rate: f64,
    step: i32,
    moments: Vec<Moments>,
}

impl Adam {
    fn new(learning_rate: f64, layers: &[DenseLayer]) -> Self {
        Self {
            learning_rate,
            step: 0,
            moments: layers.iter().map(Moments::zeros).collect(),
        }
    }
}

fn adam_update(params: &mut [f64], grads: &[f64], m: &mut [f64], v: &mut [f64], lr_t: f64) {
    for i in 0..params.len() {
        m[i] = BETA1 * m[i] + (1.0 - BETA1) * grads[i];
        v[i] = BETA2 * v[i] + (1.0 - BETA2) * grads[i] * grads[i];
        params[i] -= lr_t * m[i] / (v[i].sqrt() + ADAM_EPSILON);
    }
}

#[derive(Serialize, Deserialize)]
struct MlpArtifact {
    layer_sizes: Vec<usize>,
    layers: Vec<DenseLayer>,
}

/// Multi-layer perceptron implementing [`QApproximator`].
#[derive(Debug, Clone)]
pub struct MlpApproximator {
    layers: Vec<DenseLayer>,
    optimizer: Adam,
}

impl MlpApproximator {
    /// Creates a network with the given layer sizes.
    ///
    /// # Arguments
    ///
    /// * `layer_sizes` - `[input, hidden…, output]`, at least two entries
    /// * `learning_rate` - Adam step size
    /// * `rng` - Source for weight initialisation
    pub fn new<R: Rng + ?Sized>(layer_sizes: &[usize], learning_rate: f64, rng: &mut R) -> Self {
        assert!(
            layer_sizes.len() >= 2 && layer_sizes.iter().all(|&n| n > 0),
            "an MLP needs at least an input and an output layer of non-zero width"
        );
        let layers: Vec<DenseLayer> = layer_sizes
            .windows(2)
            .map(|w| DenseLayer::glorot(w[0], w[1], rng))
            .collect();
        let optimizer = Adam::new(learning_rate, &layers);
        Self { layers, optimizer }
    }

    /// `[input, hidden…, output]`.
    pub fn layer_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::with_capacity(self.layers.len() + 1);
        sizes.push(self.layers[0].inputs);
        sizes.extend(self.layers.iter().map(|l| l.outputs));
        sizes
    }

    pub fn input_dim(&self) -> usize {
        self.layers[0].inputs
    }

    pub fn output_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].outputs
    }

    /// Activations of every layer, input included.
    fn activations(&self, input: &[f64]) -> Vec<Vec<f64>> {
        assert_eq!(input.len(), self.input_dim(), "state dimension mismatch");
        let last = self.layers.len() - 1;
        let mut acts = Vec::with_capacity(self.layers.len() + 1);
        acts.push(input.to_vec());
        for (i, layer) in self.layers.iter().enumerate() {
            let next = layer.forward(&acts[i], i < last);
            acts.push(next);
        }
        acts
    }

    fn check_shapes(&self, other_sizes: &[usize]) -> Result<(), ApproximatorError> {
        let sizes = self.layer_sizes();
        if sizes != other_sizes {
            return Err(ApproximatorError::ShapeMismatch {
                expected: format!("{:?}", sizes),
                found: format!("{:?}", other_sizes),
            });
        }
        Ok(())
    }
}

impl QApproximator for MlpApproximator {
    fn predict(&self, state: &[f64]) -> Vec<f64> {
        let mut acts = self.activations(state);
        acts.pop().unwrap_or_default()
    }

    fn fit(&mut self, state: &[f64], target: &[f64]) -> f64 {
        assert_eq!(target.len(), self.output_dim(), "target dimension mismatch");
        let acts = self.activations(state);
        let output = &acts[acts.len() - 1];
        let n = output.len() as f64;

        let loss = output
            .iter()
            .zip(target)
            .map(|(y, t)| (y - t).powi(2))
            .sum::<f64>()
            / n;

        // dL/dz for the linear output layer.
        let mut delta: Vec<f64> = output
            .iter()
            .zip(target)
            .map(|(y, t)| 2.0 * (y - t) / n)
            .collect();

        let mut grads: Vec<(Vec<f64>, Vec<f64>)> = Vec::with_capacity(self.layers.len());
        for (l, layer) in self.layers.iter().enumerate().rev() {
            let prev = &acts[l];
            let mut grad_w = vec![0.0; layer.weights.len()];
            for (o, d) in delta.iter().enumerate() {
                let row = &mut grad_w[o * layer.inputs..(o + 1) * layer.inputs];
                for (g, a) in row.iter_mut().zip(prev) {
                    *g = d * a;
                }
            }
            let grad_b = delta.clone();

            if l > 0 {
                let mut prev_delta = vec![0.0; layer.inputs];
                for (o, d) in delta.iter().enumerate() {
                    let row = &layer.weights[o * layer.inputs..(o + 1) * layer.inputs];
                    for (pd, w) in prev_delta.iter_mut().zip(row) {
                        *pd += w * d;
                    }
                }
                // ReLU derivative, read off the activation.
                for (pd, a) in prev_delta.iter_mut().zip(prev) {
                    if *a <= 0.0 {
                        *pd = 0.0;
                    }
                }
                delta = prev_delta;
            }
            grads.push((grad_w, grad_b));
        }
        grads.reverse();

        let opt = &mut self.optimizer;
        opt.step += 1;
        let lr_t = opt.learning_rate * (1.0 - BETA2.powi(opt.step)).sqrt()
            / (1.0 - BETA1.powi(opt.step));
        for ((layer, moments), (grad_w, grad_b)) in
            self.layers.iter_mut().zip(&mut opt.moments).zip(&grads)
        {
            adam_update(&mut layer.weights, grad_w, &mut moments.m_w, &mut moments.v_w, lr_t);
            adam_update(&mut layer.biases, grad_b, &mut moments.m_b, &mut moments.v_b, lr_t);
        }

        loss
    }

    fn soft_update_from(&mut self, source: &Self, tau: f64) {
        assert_eq!(
            self.layer_sizes(),
            source.layer_sizes(),
            "soft update between different architectures"
        );
        for (dst, src) in self.layers.iter_mut().zip(&source.layers) {
            for (d, s) in dst.weights.iter_mut().zip(&src.weights) {
                *d = tau * s + (1.0 - tau) * *d;
            }
            for (d, s) in dst.biases.iter_mut().zip(&src.biases) {
                *d = tau * s + (1.0 - tau) * *d;
            }
        }
    }

    fn parameters(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|l| l.weights.iter().chain(&l.biases).copied())
            .collect()
    }

    fn save(&self, path: &Path) -> Result<(), ApproximatorError> {
        let artifact = MlpArtifact {
            layer_sizes: self.layer_sizes(),
            layers: self.layers.clone(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &artifact)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), ApproximatorError> {
        let reader = BufReader::new(File::open(path)?);
        let artifact: MlpArtifact = serde_json::from_reader(reader)?;
        self.check_shapes(&artifact.layer_sizes)?;
        self.check_shapes(&chained_sizes(&artifact.layers))?;
        for layer in &artifact.layers {
            if layer.weights.len() != layer.inputs * layer.outputs
                || layer.biases.len() != layer.outputs
            {
                return Err(ApproximatorError::ShapeMismatch {
                    expected: format!("{}x{} layer", layer.outputs, layer.inputs),
                    found: format!("{} weights, {} biases", layer.weights.len(), layer.biases.len()),
                });
            }
        }
        self.optimizer = Adam::new(self.optimizer.learning_rate, &artifact.layers);
        self.layers = artifact.layers;
        Ok(())
    }
}

/// `[input, outputs…]` of a layer stack, or an empty list when the stack is
/// empty or a layer's input width differs from the previous layer's output.
fn chained_sizes(layers: &[DenseLayer]) -> Vec<usize> {
    let Some(first) = layers.first() else {
        return Vec::new();
    };
    if layers.windows(2).any(|w| w[1].inputs != w[0].outputs) {
        return Vec::new();
    }
    std::iter::once(first.inputs)
        .chain(layers.iter().map(|l| l.outputs))
        .collect()
}
