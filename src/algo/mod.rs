mod dyna_q;
mod q_learning;

pub use dyna_q::DynaQ;
pub use q_learning::QLearning;

use rand::Rng;

use crate::{
    ds::QTable,
    exploration::greedy,
    memory::Transition,
    space::{Action, ActionSpace, State},
    Error, Result,
};

/// A rule for turning observed transitions into Q-table updates
///
/// The agent owns the Q-table and hands it to its rule on every real observation, so
/// learners can be swapped without touching action selection.
pub trait UpdateRule {
    /// Fails if the rule's hyperparameters are out of range or its state was built for a
    /// different space than `space`
    fn check<S: ActionSpace>(&self, space: &S) -> Result<()>;

    /// Learn from one real transition
    ///
    /// **Returns** the absolute change of the Q-value of `transition`'s own
    /// `(state, action)` pair caused by the real update
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
        R: Rng + ?Sized;

    /// Refine the Q-table without new experience
    ///
    /// Rules without a model have nothing to replay and do nothing.
    fn plan<S, R>(
        &mut self,
        _q_table: &mut QTable,
        _space: &S,
        _gamma: f64,
        _rng: &mut R,
    ) -> Result<()>
    where
        S: ActionSpace,
        R: Rng + ?Sized,
    {
        Ok(())
    }
}

/// One TD(0) step on the entry of `transition`
///
/// Q(s,a) ← (1 - α)Q(s,a) + α(c + γ min<sub>a'</sub> Q(s',a'))
///
/// **Returns** `|Q_old(s,a) - Q_new(s,a)|`
pub fn td_update<S: ActionSpace>(
    q_table: &mut QTable,
    space: &S,
    alpha: f64,
    gamma: f64,
    transition: &Transition,
) -> Result<f64> {
    let s = space.index_state(&transition.state)?;
    let a = space.index_action(&transition.action)?;
    let ns = space.index_state(&transition.next_state)?;
    let na = greedy_index(q_table, space, &transition.next_state, ns)?;

    let value = q_table.get(s, a);
    let estimate = transition.cost + gamma * q_table.get(ns, na);
    let new_value = (1.0 - alpha) * value + alpha * estimate;
    q_table.set(s, a, new_value);

    Ok((value - new_value).abs())
}

/// The legal action with minimal Q-value at `state`, ties broken by enumeration order
pub fn greedy_action<S: ActionSpace>(
    q_table: &QTable,
    space: &S,
    state: &State,
) -> Result<Action> {
    let s = space.index_state(state)?;
    let ix = greedy_index(q_table, space, state, s)?;
    Ok(space.actions()[ix])
}

fn greedy_index<S: ActionSpace>(
    q_table: &QTable,
    space: &S,
    state: &State,
    s: usize,
) -> Result<usize> {
    let legal = space.legal_actions(state);
    greedy(q_table.row(s), &legal).ok_or(Error::NoLegalAction(*state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{CapacitySpace, ScalingMode};

    #[test]
    fn td_update_moves_toward_target_by_alpha() {
        let space = CapacitySpace::new(ScalingMode::Horizontal, 5, 1, 4).unwrap();
        let mut q = QTable::new(space.n_states(), space.n_actions(), 0.0);

        let next = State::horizontal(3, 2);
        let ns = space.index_state(&next).unwrap();
        // successor values: the greedy successor action is the cheapest legal one
        q.set(ns, 0, 4.0);
        q.set(ns, 1, 2.0);
        q.set(ns, 2, 6.0);

        let transition = Transition {
            state: State::horizontal(2, 1),
            action: Action::horizontal(1),
            next_state: next,
            cost: 5.0,
        };
        let delta = td_update(&mut q, &space, 0.1, 0.9, &transition).unwrap();

        let expected = 0.1 * (5.0 + 0.9 * 2.0);
        let s = space.index_state(&transition.state).unwrap();
        assert!((q.get(s, 2) - expected).abs() < 1e-12);
        assert!((delta - expected).abs() < 1e-12);
    }

    #[test]
    fn td_update_rejects_foreign_transition() {
        let space = CapacitySpace::new(ScalingMode::Horizontal, 5, 1, 4).unwrap();
        let mut q = QTable::new(space.n_states(), space.n_actions(), 0.0);
        let transition = Transition {
            state: State::horizontal(2, 1),
            action: Action::vertical(1, 0),
            next_state: State::horizontal(3, 1),
            cost: 1.0,
        };
        assert!(matches!(
            td_update(&mut q, &space, 0.1, 0.9, &transition),
            Err(Error::ConfigurationMismatch { .. })
        ));
    }
}
