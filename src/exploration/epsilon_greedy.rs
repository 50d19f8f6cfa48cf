use rand::{seq::SliceRandom, Rng};

use crate::{decay::Decay, util::argmin_first};

use super::Choice;

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
///
/// Values are costs, so exploiting means taking the action with the *lowest* value.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    pub fn new(decay: D) -> Self {
        Self { epsilon: decay }
    }

    /// Exploration probability at time `t`
    pub fn epsilon(&self, t: f64) -> f64 {
        self.epsilon.evaluate(t)
    }

    /// Invoke epsilon greedy policy at time `t`
    pub fn choose<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> Choice {
        if rng.gen::<f64>() < self.epsilon(t) {
            Choice::Explore
        } else {
            Choice::Exploit
        }
    }

    /// Pick a uniformly random legal action when exploring, the greedy one otherwise
    pub fn select<R: Rng + ?Sized>(
        &self,
        t: f64,
        values: &[f64],
        legal: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        match self.choose(t, rng) {
            Choice::Explore => legal.choose(rng).copied(),
            Choice::Exploit => greedy(values, legal),
        }
    }
}

/// The legal position with minimal value, ties going to the earliest in `legal`
pub fn greedy(values: &[f64], legal: &[usize]) -> Option<usize> {
    argmin_first(legal.iter().map(|&i| values[i])).map(|j| legal[j])
}
