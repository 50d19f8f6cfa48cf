use rand::Rng;

use crate::decay::{Constant, InverseTime};

/// Exploration policy result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Explore,
    Exploit,
}

mod epsilon_greedy;
mod softmax;

pub use epsilon_greedy::{greedy, EpsilonGreedy};
pub use softmax::Softmax;

/// The action-selection policy of a scaling agent
///
/// Both variants choose among enumeration positions, given the Q-values of every action
/// at the current state and the positions that are legal there.
#[derive(Debug, Clone)]
pub enum Policy {
    /// Epsilon greedy with `epsilon = 1/t`
    EpsilonGreedy(EpsilonGreedy<InverseTime>),
    /// Boltzmann exploration with a fixed temperature
    Softmax(Softmax<Constant>),
}

impl Policy {
    pub fn epsilon_greedy() -> Self {
        Self::EpsilonGreedy(EpsilonGreedy::new(InverseTime::harmonic()))
    }

    pub fn softmax(temperature: f64) -> Self {
        Self::Softmax(Softmax::new(Constant::new(temperature)))
    }

    /// Select an action at time `t` (ticks elapsed since the first decision)
    ///
    /// **Returns** `None` only if `legal` is empty
    pub fn select<R: Rng + ?Sized>(
        &self,
        t: f64,
        values: &[f64],
        legal: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        match self {
            Self::EpsilonGreedy(policy) => policy.select(t, values, legal, rng),
            Self::Softmax(policy) => policy.select(t, values, legal, rng),
        }
    }
}
