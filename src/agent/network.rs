//! Q-network backed by tch-rs (PyTorch bindings).
//!
//! This module is only available with the `rl-nn` feature.

use std::path::Path;

use tch::{nn, nn::Module, nn::OptimizerConfig, Device, Kind, Reduction, Tensor};

use super::approximator::{ApproximatorError, QApproximator};

/// MLP Q-network: `layer_sizes[0] → … → layer_sizes[n-1]` with ReLU between
/// hidden layers and a linear output.
pub struct TchQNetwork {
    vs: nn::VarStore,
    net: nn::Sequential,
    opt: nn::Optimizer,
    output_dim: usize,
}

impl TchQNetwork {
    /// Creates a freshly initialised network on `device`.
    pub fn new(
        layer_sizes: &[usize],
        learning_rate: f64,
        device: Device,
    ) -> Result<Self, ApproximatorError> {
        if layer_sizes.len() < 2 {
            return Err(ApproximatorError::ShapeMismatch {
                expected: "at least an input and an output layer".into(),
                found: format!("{:?}", layer_sizes),
            });
        }
        let vs = nn::VarStore::new(device);
        let root = vs.root();
        let last = layer_sizes.len() - 2;
        let mut net = nn::seq();
        for (i, w) in layer_sizes.windows(2).enumerate() {
            net = net.add(nn::linear(
                &root / format!("l{}", i),
                w[0] as i64,
                w[1] as i64,
                Default::default(),
            ));
            if i < last {
                net = net.add_fn(|x| x.relu());
            }
        }
        let opt = nn::Adam::default().build(&vs, learning_rate)?;
        Ok(Self {
            vs,
            net,
            opt,
            output_dim: layer_sizes[layer_sizes.len() - 1],
        })
    }

    fn input(&self, state: &[f64]) -> Tensor {
        Tensor::from_slice(state)
            .to_kind(Kind::Float)
            .to_device(self.vs.device())
            .unsqueeze(0)
    }

    /// Returns a reference to the variable store.
    pub fn var_store(&self) -> &nn::VarStore {
        &self.vs
    }
}

fn to_vec(t: &Tensor) -> Vec<f64> {
    let flat = t.to_kind(Kind::Double).flatten(0, -1);
    (0..flat.numel() as i64)
        .map(|i| flat.double_value(&[i]))
        .collect()
}

impl QApproximator for TchQNetwork {
    fn predict(&self, state: &[f64]) -> Vec<f64> {
        let x = self.input(state);
        let out = tch::no_grad(|| self.net.forward(&x));
        let q = to_vec(&out);
        debug_assert_eq!(q.len(), self.output_dim);
        q
    }

    fn fit(&mut self, state: &[f64], target: &[f64]) -> f64 {
        let x = self.input(state);
        let y = self.input(target);
        let loss = self.net.forward(&x).mse_loss(&y, Reduction::Mean);
        self.opt.backward_step(&loss);
        loss.double_value(&[])
    }

    fn soft_update_from(&mut self, source: &Self, tau: f64) {
        let sources = source.vs.variables();
        tch::no_grad(|| {
            for (name, mut dst) in self.vs.variables() {
                if let Some(src) = sources.get(&name) {
                    let mixed = src * tau + &dst * (1.0 - tau);
                    dst.copy_(&mixed);
                }
            }
        });
    }

    fn parameters(&self) -> Vec<f64> {
        let mut vars: Vec<(String, Tensor)> = self.vs.variables().into_iter().collect();
        vars.sort_by(|a, b| a.0.cmp(&b.0));
        vars.iter().flat_map(|(_, t)| to_vec(t)).collect()
    }

    fn save(&self, path: &Path) -> Result<(), ApproximatorError> {
        self.vs.save(path)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), ApproximatorError> {
        self.vs.load(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predict_has_output_dimension() {
        let net = TchQNetwork::new(&[14, 32, 81], 0.01, Device::Cpu).unwrap();
        assert_eq!(net.predict(&[0.5; 14]).len(), 81);
    }

    #[test]
    fn soft_update_moves_towards_source() {
        let source = TchQNetwork::new(&[4, 8, 3], 0.01, Device::Cpu).unwrap();
        let mut dst = TchQNetwork::new(&[4, 8, 3], 0.01, Device::Cpu).unwrap();
        let before = dst.parameters();
        dst.soft_update_from(&source, 1.0);
        assert_ne!(dst.parameters(), before);
        for (a, b) in dst.parameters().iter().zip(source.parameters()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn fit_reduces_loss() {
        let mut net = TchQNetwork::new(&[4, 16, 2], 0.01, Device::Cpu).unwrap();
        let state = [0.1, 0.2, 0.3, 0.4];
        let target = [1.0, -1.0];
        let first = net.fit(&state, &target);
        let mut last = first;
        for _ in 0..200 {
            last = net.fit(&state, &target);
        }
        assert!(last < first);
    }

    #[test]
    fn save_load_round_trip() {
        let path = std::env::temp_dir().join(format!("railtune-tch-{}.ot", std::process::id()));
        let source = TchQNetwork::new(&[4, 8, 3], 0.01, Device::Cpu).unwrap();
        source.save(&path).unwrap();
        let mut restored = TchQNetwork::new(&[4, 8, 3], 0.01, Device::Cpu).unwrap();
        assert_ne!(restored.parameters(), source.parameters());
        restored.load(&path).unwrap();
        assert_eq!(restored.parameters(), source.parameters());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn drives_a_dqn_agent() {
        use crate::agent::{AgentConfig, DqnAgent, Transition};
        use crate::control::action::ActionId;

        let config = AgentConfig {
            hidden_layers: vec![16],
            batch_size: 2,
            memory_capacity: 2,
            seed: Some(3),
            ..AgentConfig::default()
        };
        let sizes = config.layer_sizes();
        let policy = TchQNetwork::new(&sizes, config.learning_rate, Device::Cpu).unwrap();
        let target = TchQNetwork::new(&sizes, config.learning_rate, Device::Cpu).unwrap();
        let mut agent = DqnAgent::new(config, policy, target);

        let state = [0.2; 14];
        for _ in 0..2 {
            let action: ActionId = agent.select_action(&state);
            agent.remember(Transition {
                state,
                action,
                reward: 1.0,
                next_state: [0.4; 14],
                terminal: false,
            });
        }
        let before = agent.target().parameters();
        assert!(agent.replay());
        agent.sync_target();
        assert_eq!(agent.memory_len(), 0);
        assert_ne!(agent.target().parameters(), before);
    }
}
