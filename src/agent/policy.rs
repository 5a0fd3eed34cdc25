//! Action-selection policies.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::control::action::ActionId;
use crate::control::state::StateVector;

/// Selects an action for an encoded state.
pub trait Policy {
    fn select_action(&mut self, state: &StateVector) -> ActionId;

    /// Returns a human-readable name for this policy.
    fn name(&self) -> &str;
}

/// Uniformly random action selection.
///
/// Used for sanity checks and as a lower-bound baseline.
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn select_action(&mut self, _state: &StateVector) -> ActionId {
        ActionId::random(&mut self.rng)
    }

    fn name(&self) -> &str {
        "random"
    }
}

/// Always returns the same action.
///
/// [`FixedPolicy::hold`] keeps every parameter unchanged, the do-nothing
/// baseline an operator would compare against.
pub struct FixedPolicy {
    action: ActionId,
}

impl FixedPolicy {
    pub fn new(action: ActionId) -> Self {
        Self { action }
    }

    pub fn hold() -> Self {
        Self::new(ActionId::default())
    }
}

impl Policy for FixedPolicy {
    fn select_action(&mut self, _state: &StateVector) -> ActionId {
        self.action
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_policy_is_seeded() {
        let mut a = RandomPolicy::new(5);
        let mut b = RandomPolicy::new(5);
        let state = [0.0; 14];
        let xs: Vec<ActionId> = (0..50).map(|_| a.select_action(&state)).collect();
        let ys: Vec<ActionId> = (0..50).map(|_| b.select_action(&state)).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.name(), "random");
    }

    #[test]
    fn hold_policy_returns_the_neutral_action() {
        let mut policy = FixedPolicy::hold();
        assert_eq!(policy.select_action(&[1.0; 14]).index(), 40);
    }
}
