use rand::{seq::SliceRandom, Rng};

use crate::{Error, Result};

use super::Transition;

/// A learned model of the environment holding the last transition seen for each
/// `(state, action)` pair
///
/// Keys are enumeration positions, so the model never grows beyond `n_states × n_actions`
/// entries. Recording a key that already holds a transition overwrites it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DynaQModel {
    /// Position of each key's transition in `elements`
    slots: Vec<Option<usize>>,
    elements: Vec<Transition>,
    n_actions: usize,
}

impl DynaQModel {
    pub fn new(n_states: usize, n_actions: usize) -> Self {
        Self {
            slots: vec![None; n_states * n_actions],
            elements: Vec::new(),
            n_actions,
        }
    }

    /// Number of recorded transitions
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Maximum number of transitions the model can hold
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Record `transition` under the key `(state, action)`, replacing any earlier one
    ///
    /// **Returns** `true` if the key had no transition before
    ///
    /// **Panics** if either index is out of range
    pub fn set(&mut self, state: usize, action: usize, transition: Transition) -> bool {
        let key = self.key(state, action);
        match self.slots[key] {
            Some(pos) => {
                self.elements[pos] = transition;
                false
            }
            None => {
                self.slots[key] = Some(self.elements.len());
                self.elements.push(transition);
                true
            }
        }
    }

    /// The transition recorded under `(state, action)`, if any
    pub fn get(&self, state: usize, action: usize) -> Option<&Transition> {
        self.slots[self.key(state, action)].map(|pos| &self.elements[pos])
    }

    /// Draw one recorded transition uniformly at random
    ///
    /// Fails with [`Error::EmptyModel`] if nothing has been recorded yet.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<&Transition> {
        self.elements.choose(rng).ok_or(Error::EmptyModel)
    }

    /// Recorded transitions in order of first recording
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.elements.iter()
    }

    fn key(&self, state: usize, action: usize) -> usize {
        assert!(
            action < self.n_actions && state * self.n_actions + action < self.slots.len(),
            "Dyna-Q model key ({state}, {action}) out of range"
        );
        state * self.n_actions + action
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::space::{Action, State};

    fn transition(k: u32, cost: f64) -> Transition {
        Transition {
            state: State::horizontal(k, 0),
            action: Action::horizontal(1),
            next_state: State::horizontal(k + 1, 1),
            cost,
        }
    }

    #[test]
    fn empty_model_cannot_be_sampled() {
        let model = DynaQModel::new(4, 3);
        assert!(model.is_empty());
        assert_eq!(
            model.sample(&mut StdRng::seed_from_u64(0)),
            Err(Error::EmptyModel)
        );
    }

    #[test]
    fn single_entry_is_always_sampled() {
        let mut model = DynaQModel::new(4, 3);
        let t = transition(1, 3.0);
        model.set(0, 2, t);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(model.sample(&mut rng), Ok(&t));
        }
    }

    #[test]
    fn later_observation_overwrites_key() {
        let mut model = DynaQModel::new(4, 3);
        assert!(model.set(1, 1, transition(1, 3.0)), "first record is new");
        assert!(!model.set(1, 1, transition(1, 3.0)), "identical record is idempotent");
        assert!(!model.set(1, 1, transition(2, 8.0)), "overwrite is not new");

        assert_eq!(model.len(), 1, "one entry per key");
        assert_eq!(model.get(1, 1), Some(&transition(2, 8.0)), "last write wins");
        assert_eq!(model.get(1, 0), None);
    }

    #[test]
    fn sampling_covers_every_key() {
        let mut model = DynaQModel::new(4, 3);
        for s in 0..4 {
            model.set(s, 0, transition(s as u32 + 1, s as f64));
        }
        assert_eq!(model.len(), 4);
        assert!(model.len() <= model.capacity());

        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let t = model.sample(&mut rng).unwrap();
            seen[t.cost as usize] = true;
        }
        assert!(seen.iter().all(|&x| x), "all recorded keys are reachable");
    }
}
