use log::trace;
use rand::Rng;

use crate::{
    ds::QTable,
    ensure_interval,
    memory::{DynaQModel, Transition},
    space::ActionSpace,
    Error, Result,
};

use super::{td_update, UpdateRule};

/// Dyna-Q: Q-learning on real experience plus a fixed number of replays of remembered
/// transitions after every observation
///
/// The model keeps only the latest transition of each `(state, action)` pair, so replayed
/// data is at most as stale as the last visit to that pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DynaQ {
    alpha: f64,
    planning_steps: usize,
    model: DynaQModel,
}

impl DynaQ {
    /// Initialize Dyna-Q with a model sized for `space`
    pub fn new<S: ActionSpace>(alpha: f64, planning_steps: usize, space: &S) -> Self {
        Self {
            alpha,
            planning_steps,
            model: DynaQModel::new(space.n_states(), space.n_actions()),
        }
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn planning_steps(&self) -> usize {
        self.planning_steps
    }

    pub fn model(&self) -> &DynaQModel {
        &self.model
    }
}

impl UpdateRule for DynaQ {
    fn check<S: ActionSpace>(&self, space: &S) -> Result<()> {
        let alpha = self.alpha;
        ensure_interval!(alpha, 0.0, 1.0);
        let expected = space.n_states() * space.n_actions();
        if self.model.capacity() != expected {
            return Err(Error::ConfigurationMismatch {
                mode: space.mode(),
                detail: format!(
                    "Dyna-Q model holds {} keys but the space has {expected}",
                    self.model.capacity()
                ),
            });
        }
        Ok(())
    }

    fn learn<S, R>(
        &mut self,
        q_table: &mut QTable,
        space: &S,
        gamma: f64,
        transition: &Transition,
        rng: &mut R,
    ) -> Result<f64>
    where
        S: ActionSpace,
        R: Rng + ?Sized,
    {
        let delta = td_update(q_table, space, self.alpha, gamma, transition)?;

        // Model(s, a) <- (s', c)
        let s = space.index_state(&transition.state)?;
        let a = space.index_action(&transition.action)?;
        self.model.set(s, a, *transition);

        self.plan(q_table, space, gamma, rng)?;
        Ok(delta)
    }

    /// Replay `planning_steps` uniformly sampled transitions from the model
    ///
    /// Fails with [`Error::EmptyModel`] if nothing was recorded yet, even with zero steps.
    fn plan<S, R>(
        &mut self,
        q_table: &mut QTable,
        space: &S,
        gamma: f64,
        rng: &mut R,
    ) -> Result<()>
    where
        S: ActionSpace,
        R: Rng + ?Sized,
    {
        if self.model.is_empty() {
            return Err(Error::EmptyModel);
        }
        for step in 0..self.planning_steps {
            let transition = *self.model.sample(rng)?;
            let delta = td_update(q_table, space, self.alpha, gamma, &transition)?;
            trace!(
                "planning step {step}: {} {} -> {} cost {} delta {delta}",
                transition.state,
                transition.action,
                transition.next_state,
                transition.cost
            );
        }
        Ok(())
    }
}
