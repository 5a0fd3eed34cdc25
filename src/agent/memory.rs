//! Bounded experience replay memory.

use std::collections::VecDeque;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::control::action::ActionId;
use crate::control::state::StateVector;

/// A single transition stored in the memory.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Encoded state the action was taken in.
    pub state: StateVector,
    /// Action taken.
    pub action: ActionId,
    /// Reward received.
    pub reward: f64,
    /// Encoded state after the step.
    pub next_state: StateVector,
    /// Whether `next_state` ends the episode.
    pub terminal: bool,
}

/// FIFO ring buffer of transitions.
///
/// Once `capacity` transitions are stored, each new one evicts the oldest.
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    transitions: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Creates an empty memory. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            transitions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a transition, evicting the oldest one when full.
    pub fn push(&mut self, transition: Transition) {
        if self.transitions.len() == self.capacity {
            self.transitions.pop_front();
        }
        self.transitions.push_back(transition);
    }

    /// Draws `batch_size` distinct transitions uniformly at random.
    ///
    /// Returns fewer when the memory holds fewer.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, batch_size: usize) -> Vec<Transition> {
        let indices: Vec<usize> = (0..self.transitions.len()).collect();
        indices
            .choose_multiple(rng, batch_size)
            .map(|&idx| self.transitions[idx].clone())
            .collect()
    }

    pub fn clear(&mut self) {
        self.transitions.clear();
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored transitions, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter()
    }
}
