//! Discrete action space and its codec.
//!
//! An action combines one [`ActionDirective`] per control parameter. With four
//! parameters and three directives each there are `3^4 = 81` actions, addressed
//! by a flat [`ActionId`]:
//!
//! ```text
//! id = ((j * 3 + k) * 3 + l) * 3 + m
//! ```
//!
//! where `(j, k, l, m)` are the directive codes for
//! `(nbr_trains, density_max_opt, v_max, max_dwell)`.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::parameters::Parameter;

/// Number of directives available per parameter.
pub const DIRECTIVE_COUNT: usize = 3;

/// Number of distinct actions (`DIRECTIVE_COUNT ^ Parameter::COUNT`).
pub const ACTION_COUNT: usize = 81;

/// What to do with a single control parameter during a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionDirective {
    Decrease,
    Stay,
    Increase,
}

impl ActionDirective {
    /// All directives in code order.
    pub const ALL: [ActionDirective; DIRECTIVE_COUNT] = [
        ActionDirective::Decrease,
        ActionDirective::Stay,
        ActionDirective::Increase,
    ];

    /// Numeric code: 0 = decrease, 1 = stay, 2 = increase.
    pub fn code(self) -> usize {
        match self {
            ActionDirective::Decrease => 0,
            ActionDirective::Stay => 1,
            ActionDirective::Increase => 2,
        }
    }

    /// Inverse of [`ActionDirective::code`].
    pub fn from_code(code: usize) -> Option<Self> {
        Self::ALL.get(code).copied()
    }
}

impl fmt::Display for ActionDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionDirective::Decrease => write!(f, "decrease"),
            ActionDirective::Stay => write!(f, "stay"),
            ActionDirective::Increase => write!(f, "increase"),
        }
    }
}

/// One directive per parameter, ordered as [`Parameter::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionVector([ActionDirective; Parameter::COUNT]);

impl ActionVector {
    /// Builds a vector from directives in `(nbr_trains, density_max_opt, v_max, max_dwell)` order.
    pub fn new(directives: [ActionDirective; Parameter::COUNT]) -> Self {
        Self(directives)
    }

    /// The directive that applies to `parameter`.
    pub fn directive(&self, parameter: Parameter) -> ActionDirective {
        self.0[parameter.index()]
    }

    /// Directives in fixed parameter order.
    pub fn directives(&self) -> &[ActionDirective; Parameter::COUNT] {
        &self.0
    }

    /// Iterates `(parameter, directive)` pairs in fixed order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, ActionDirective)> + '_ {
        Parameter::ALL.iter().copied().zip(self.0.iter().copied())
    }
}

impl fmt::Display for ActionVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes: Vec<String> = self.0.iter().map(|d| d.code().to_string()).collect();
        write!(f, "[{}]", codes.join(", "))
    }
}

/// Flat action identifier in `[0, ACTION_COUNT)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct ActionId(u8);

impl ActionId {
    /// Returns `None` when `id >= ACTION_COUNT`.
    pub fn new(id: usize) -> Option<Self> {
        if id < ACTION_COUNT {
            Some(Self(id as u8))
        } else {
            None
        }
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Uniformly drawn action.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(rng.gen_range(0..ACTION_COUNT as u8))
    }

    /// All action ids in ascending order.
    pub fn all() -> impl Iterator<Item = ActionId> {
        (0..ACTION_COUNT as u8).map(ActionId)
    }
}

/// The action that keeps every parameter where it is.
impl Default for ActionId {
    fn default() -> Self {
        ActionCodec::encode(&ActionVector::new([ActionDirective::Stay; Parameter::COUNT]))
    }
}

impl TryFrom<usize> for ActionId {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        ActionId::new(value)
            .ok_or_else(|| format!("action id {} outside [0, {})", value, ACTION_COUNT))
    }
}

impl From<ActionId> for usize {
    fn from(id: ActionId) -> usize {
        id.index()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bijection between [`ActionId`] and [`ActionVector`].
pub struct ActionCodec;

impl ActionCodec {
    /// Splits an id into base-3 digits, most significant digit first.
    pub fn decode(id: ActionId) -> ActionVector {
        let mut rest = id.index();
        let mut directives = [ActionDirective::Stay; Parameter::COUNT];
        for slot in directives.iter_mut().rev() {
            *slot = ActionDirective::ALL[rest % DIRECTIVE_COUNT];
            rest /= DIRECTIVE_COUNT;
        }
        ActionVector(directives)
    }

    /// Folds directive codes back into a flat id.
    pub fn encode(vector: &ActionVector) -> ActionId {
        let id = vector
            .0
            .iter()
            .fold(0usize, |acc, d| acc * DIRECTIVE_COUNT + d.code());
        // Four base-3 digits are always below 81.
        ActionId(id as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ActionDirective::*;

    #[test]
    fn action_count_matches_parameter_count() {
        assert_eq!(ACTION_COUNT, DIRECTIVE_COUNT.pow(Parameter::COUNT as u32));
        assert_eq!(ActionId::all().count(), ACTION_COUNT);
    }

    #[test]
    fn codec_is_a_bijection() {
        let mut seen = std::collections::HashSet::new();
        for id in ActionId::all() {
            let vector = ActionCodec::decode(id);
            assert!(seen.insert(vector), "duplicate vector for {}", id);
            assert_eq!(ActionCodec::encode(&vector), id);
        }
        assert_eq!(seen.len(), ACTION_COUNT);
    }

    #[test]
    fn decode_uses_fixed_digit_order() {
        let first = ActionCodec::decode(ActionId::new(0).unwrap());
        assert_eq!(first.directives(), &[Decrease; 4]);

        let last = ActionCodec::decode(ActionId::new(80).unwrap());
        assert_eq!(last.directives(), &[Increase; 4]);

        let all_stay = ActionCodec::decode(ActionId::new(27 + 9 + 3 + 1).unwrap());
        assert_eq!(all_stay.directives(), &[Stay; 4]);

        let v = ActionCodec::decode(ActionId::new(2 * 27 + 9 + 3).unwrap());
        assert_eq!(v.directive(Parameter::NbrTrains), Increase);
        assert_eq!(v.directive(Parameter::DensityMaxOpt), Stay);
        assert_eq!(v.directive(Parameter::VMax), Stay);
        assert_eq!(v.directive(Parameter::MaxDwell), Decrease);
    }

    #[test]
    fn action_id_rejects_out_of_range() {
        assert!(ActionId::new(80).is_some());
        assert!(ActionId::new(81).is_none());
        assert!(ActionId::try_from(200usize).is_err());
    }

    #[test]
    fn directive_codes_round_trip() {
        for d in ActionDirective::ALL {
            assert_eq!(ActionDirective::from_code(d.code()), Some(d));
        }
        assert_eq!(ActionDirective::from_code(3), None);
    }

    #[test]
    fn vector_display_lists_codes() {
        let v = ActionVector::new([Decrease, Stay, Increase, Stay]);
        assert_eq!(v.to_string(), "[0, 1, 2, 1]");
    }

    #[test]
    fn default_action_keeps_every_parameter() {
        assert_eq!(ActionId::default().index(), 40);
    }

    #[test]
    fn random_action_is_in_range() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..500 {
            assert!(ActionId::random(&mut rng).index() < ACTION_COUNT);
        }
    }
}
