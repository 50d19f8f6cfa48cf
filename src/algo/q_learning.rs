use rand::Rng;

use crate::{ds::QTable, ensure_interval, memory::Transition, space::ActionSpace, Result};

use super::{td_update, UpdateRule};

/// Plain one-step Q-learning: every real transition updates its own entry, nothing is replayed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearning {
    alpha: f64,
}

impl QLearning {
    /// `alpha` is the learning rate, range-checked when an agent is built with this rule
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl UpdateRule for QLearning {
    fn check<S: ActionSpace>(&self, _space: &S) -> Result<()> {
        let alpha = self.alpha;
        ensure_interval!(alpha, 0.0, 1.0);
        Ok(())
    }

    fn learn<S, R>(
        &mut self,
        q_table: &mut QTable,
        space: &S,
        gamma: f64,
        transition: &Transition,
        _rng: &mut R,
    ) -> Result<f64>
    where
        S: ActionSpace,
        R: Rng + ?Sized,
    {
        td_update(q_table, space, self.alpha, gamma, transition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        space::{CapacitySpace, ScalingMode},
        Error,
    };

    #[test]
    fn learning_rate_is_range_checked() {
        let space = CapacitySpace::new(ScalingMode::Horizontal, 4, 1, 3).unwrap();
        assert!(QLearning::new(0.5).check(&space).is_ok());
        assert!(matches!(
            QLearning::new(5.0).check(&space),
            Err(Error::InvalidParameter { name: "alpha", .. })
        ));
        assert!(QLearning::new(f64::NAN).check(&space).is_err());
    }
}
