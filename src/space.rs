use std::fmt;

use strum::{Display, EnumIter, EnumString};

use crate::{Error, Result};

/// Which dimensions of capacity the agent is allowed to change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalingMode {
    /// Only the instance count changes
    #[strum(to_string = "HORIZONTAL_SCALING", serialize = "HORIZONTAL")]
    Horizontal,
    /// Each action changes either the instance count or the instance size, never both
    HorizontalOrVertical,
    /// Each action may change the instance count and the instance size together
    HorizontalAndVertical,
}

impl ScalingMode {
    /// Whether states and actions carry the cpu dimension
    pub fn is_vertical(self) -> bool {
        !matches!(self, Self::Horizontal)
    }

    /// The fixed, ordered action enumeration of this mode
    pub fn actions(self) -> Vec<Action> {
        match self {
            Self::Horizontal => [-1, 0, 1].into_iter().map(Action::horizontal).collect(),
            Self::HorizontalOrVertical => [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)]
                .into_iter()
                .map(|(dk, dc)| Action::vertical(dk, dc))
                .collect(),
            Self::HorizontalAndVertical => (-1..=1)
                .flat_map(|dk| (-1..=1).map(move |dc| Action::vertical(dk, dc)))
                .collect(),
        }
    }

    /// Fails with [`Error::ConfigurationMismatch`] if `state` has the wrong shape for this mode
    pub fn check_state(self, state: &State) -> Result<()> {
        if state.cpu.is_some() == self.is_vertical() {
            Ok(())
        } else {
            Err(self.mismatch(format!("state {state} has the wrong dimensions")))
        }
    }

    /// Fails with [`Error::ConfigurationMismatch`] if `action` has the wrong shape for this mode
    pub fn check_action(self, action: &Action) -> Result<()> {
        if action.cpu_delta.is_some() == self.is_vertical() {
            Ok(())
        } else {
            Err(self.mismatch(format!("action {action} has the wrong dimensions")))
        }
    }

    fn mismatch(self, detail: String) -> Error {
        Error::ConfigurationMismatch { mode: self, detail }
    }
}

/// The operating point of the service
///
/// `cpu` is only present under vertical scaling modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    pub instances: u32,
    pub utilization: u32,
    pub cpu: Option<u32>,
}

impl State {
    pub fn horizontal(instances: u32, utilization: u32) -> Self {
        Self {
            instances,
            utilization,
            cpu: None,
        }
    }

    pub fn vertical(instances: u32, utilization: u32, cpu: u32) -> Self {
        Self {
            instances,
            utilization,
            cpu: Some(cpu),
        }
    }

    /// Operating point reached by taking `action`, keeping the current utilization bucket
    ///
    /// **Returns** `None` if a dimension would drop below 1 or the shapes disagree
    pub fn apply(&self, action: &Action) -> Option<State> {
        let instances = self
            .instances
            .checked_add_signed(action.instance_delta)
            .filter(|&k| k >= 1)?;
        let cpu = match (self.cpu, action.cpu_delta) {
            (None, None) => None,
            (Some(c), Some(d)) => Some(c.checked_add_signed(d).filter(|&c| c >= 1)?),
            _ => return None,
        };
        Some(State {
            instances,
            utilization: self.utilization,
            cpu,
        })
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cpu {
            Some(cpu) => write!(
                f,
                "(k={}, util={}, cpu={})",
                self.instances, self.utilization, cpu
            ),
            None => write!(f, "(k={}, util={})", self.instances, self.utilization),
        }
    }
}

/// A scaling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub instance_delta: i32,
    pub cpu_delta: Option<i32>,
}

impl Action {
    pub fn horizontal(instance_delta: i32) -> Self {
        Self {
            instance_delta,
            cpu_delta: None,
        }
    }

    pub fn vertical(instance_delta: i32, cpu_delta: i32) -> Self {
        Self {
            instance_delta,
            cpu_delta: Some(cpu_delta),
        }
    }

    /// The action that leaves capacity unchanged under `mode`
    pub fn noop(mode: ScalingMode) -> Self {
        if mode.is_vertical() {
            Self::vertical(0, 0)
        } else {
            Self::horizontal(0)
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cpu_delta {
            Some(dc) => write!(f, "{{dk={:+}, dc={:+}}}", self.instance_delta, dc),
            None => write!(f, "{{dk={:+}}}", self.instance_delta),
        }
    }
}

/// Maps a utilization reading onto one of `buckets` equal-width buckets over `[0, 1]`
///
/// Readings above 1 land in the top bucket, NaN lands in bucket 0.
pub fn discretize(utilization: f64, buckets: u32) -> u32 {
    if utilization.is_nan() || buckets == 0 {
        return 0;
    }
    let top = (buckets - 1) as f64;
    (utilization * buckets as f64).floor().clamp(0.0, top) as u32
}

/// The finite state and action spaces an agent learns over
///
/// Implementors provide a dense enumeration of states, a fixed ordered enumeration of
/// actions and a legality predicate. Tables are indexed by enumeration position, so a
/// state or action that cannot be indexed is rejected before it reaches them.
pub trait ActionSpace {
    /// The scaling mode the space was built for
    fn mode(&self) -> ScalingMode;

    /// Ordered action enumeration
    fn actions(&self) -> &[Action];

    /// Whether `action` may be taken from `state`
    fn is_valid_action(&self, state: &State, action: &Action) -> bool;

    /// Number of states in the dense enumeration
    fn n_states(&self) -> usize;

    /// Position of `state` in the dense enumeration
    fn state_index(&self, state: &State) -> Option<usize>;

    /// Number of utilization buckets
    fn buckets(&self) -> u32;

    fn n_actions(&self) -> usize {
        self.actions().len()
    }

    fn discretize(&self, utilization: f64) -> u32 {
        discretize(utilization, self.buckets())
    }

    /// Enumeration positions of the actions legal at `state`, in enumeration order
    fn legal_actions(&self, state: &State) -> Vec<usize> {
        self.actions()
            .iter()
            .enumerate()
            .filter(|(_, a)| self.is_valid_action(state, a))
            .map(|(i, _)| i)
            .collect()
    }

    /// Validated table index of `state`
    fn index_state(&self, state: &State) -> Result<usize> {
        self.mode().check_state(state)?;
        self.state_index(state)
            .filter(|&ix| ix < self.n_states())
            .ok_or(Error::StateOutOfBounds(*state))
    }

    /// Validated table index of `action`
    fn index_action(&self, action: &Action) -> Result<usize> {
        let mode = self.mode();
        mode.check_action(action)?;
        self.actions()
            .iter()
            .position(|a| a == action)
            .ok_or_else(|| Error::ConfigurationMismatch {
                mode,
                detail: format!("action {action} is not part of the enumeration"),
            })
    }
}

/// A state space bounded by instance count and instance size
#[derive(Debug, Clone, PartialEq)]
pub struct CapacitySpace {
    mode: ScalingMode,
    max_instances: u32,
    max_cpu: u32,
    buckets: u32,
    actions: Vec<Action>,
}

impl CapacitySpace {
    /// Build the space for `mode`
    ///
    /// `max_cpu` is ignored under [`ScalingMode::Horizontal`]. All bounds must be at least 1.
    pub fn new(mode: ScalingMode, max_instances: u32, max_cpu: u32, buckets: u32) -> Result<Self> {
        let max_cpu = if mode.is_vertical() { max_cpu } else { 1 };
        for (name, value) in [
            ("max_instances", max_instances),
            ("max_cpu", max_cpu),
            ("buckets", buckets),
        ] {
            if value == 0 {
                return Err(Error::InvalidParameter {
                    name,
                    value: value as f64,
                    detail: String::from("must be at least 1"),
                });
            }
        }
        Ok(Self {
            mode,
            max_instances,
            max_cpu,
            buckets,
            actions: mode.actions(),
        })
    }

    pub fn max_instances(&self) -> u32 {
        self.max_instances
    }

    pub fn max_cpu(&self) -> u32 {
        self.max_cpu
    }
}

impl ActionSpace for CapacitySpace {
    fn mode(&self) -> ScalingMode {
        self.mode
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn is_valid_action(&self, state: &State, action: &Action) -> bool {
        if self.mode.check_state(state).is_err() || self.mode.check_action(action).is_err() {
            return false;
        }
        state.apply(action).is_some_and(|next| {
            next.instances <= self.max_instances && next.cpu.map_or(true, |c| c <= self.max_cpu)
        })
    }

    fn n_states(&self) -> usize {
        self.max_instances as usize * self.buckets as usize * self.max_cpu as usize
    }

    fn state_index(&self, state: &State) -> Option<usize> {
        let k = state.instances.checked_sub(1).filter(|&k| k < self.max_instances)?;
        let b = Some(state.utilization).filter(|&b| b < self.buckets)?;
        let c = state
            .cpu
            .unwrap_or(1)
            .checked_sub(1)
            .filter(|&c| c < self.max_cpu)?;
        let (k, b, c) = (k as usize, b as usize, c as usize);
        Some((k * self.buckets as usize + b) * self.max_cpu as usize + c)
    }

    fn buckets(&self) -> u32 {
        self.buckets
    }
}

#[cfg(test)]
mod tests {
    use std::{collections::HashSet, str::FromStr};

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn enumerations_have_expected_cardinality() {
        assert_eq!(ScalingMode::Horizontal.actions().len(), 3);
        assert_eq!(ScalingMode::HorizontalOrVertical.actions().len(), 5);
        assert_eq!(ScalingMode::HorizontalAndVertical.actions().len(), 9);
        for mode in ScalingMode::iter() {
            let actions = mode.actions();
            assert!(actions.contains(&Action::noop(mode)), "{mode} has a no-op");
            assert!(
                actions.iter().all(|a| mode.check_action(a).is_ok()),
                "{mode} actions have the right shape"
            );
        }
    }

    #[test]
    fn horizontal_or_vertical_never_changes_both() {
        assert!(ScalingMode::HorizontalOrVertical
            .actions()
            .iter()
            .all(|a| a.instance_delta == 0 || a.cpu_delta == Some(0)));
    }

    #[test]
    fn mode_parses_from_text() {
        assert_eq!(
            ScalingMode::from_str("HORIZONTAL_SCALING"),
            Ok(ScalingMode::Horizontal)
        );
        assert_eq!(
            ScalingMode::from_str("HORIZONTAL_AND_VERTICAL"),
            Ok(ScalingMode::HorizontalAndVertical)
        );
    }

    #[test]
    fn discretize_functional() {
        assert_eq!(discretize(0.0, 10), 0);
        assert_eq!(discretize(0.25, 10), 2);
        assert_eq!(discretize(0.999, 10), 9);
        assert_eq!(discretize(1.0, 10), 9, "full utilization is the top bucket");
        assert_eq!(discretize(3.5, 10), 9, "overload is clamped");
        assert_eq!(discretize(-0.2, 10), 0);
        assert_eq!(discretize(f64::NAN, 10), 0);
        assert_eq!(discretize(f64::INFINITY, 10), 9);
    }

    #[test]
    fn apply_respects_lower_bound() {
        let s = State::horizontal(1, 3);
        assert_eq!(s.apply(&Action::horizontal(-1)), None);
        assert_eq!(s.apply(&Action::horizontal(1)), Some(State::horizontal(2, 3)));
        assert_eq!(s.apply(&Action::vertical(1, 0)), None, "shape mismatch");

        let v = State::vertical(2, 0, 1);
        assert_eq!(v.apply(&Action::vertical(0, -1)), None);
        assert_eq!(v.apply(&Action::vertical(-1, 1)), Some(State::vertical(1, 0, 2)));
    }

    #[test]
    fn legality_respects_capacity_bounds() {
        let space = CapacitySpace::new(ScalingMode::HorizontalAndVertical, 3, 2, 4).unwrap();
        let corner = State::vertical(3, 1, 2);
        let legal: Vec<Action> = space
            .legal_actions(&corner)
            .into_iter()
            .map(|i| space.actions()[i])
            .collect();
        assert!(legal
            .iter()
            .all(|a| a.instance_delta <= 0 && a.cpu_delta.unwrap() <= 0));
        assert_eq!(legal.len(), 4);
        assert!(!space.is_valid_action(&State::horizontal(2, 1), &Action::vertical(0, 0)));
    }

    #[test]
    fn state_index_is_dense_and_unique() {
        for mode in ScalingMode::iter() {
            let space = CapacitySpace::new(mode, 4, 3, 5).unwrap();
            let mut seen = HashSet::new();
            for k in 1..=4 {
                for b in 0..5 {
                    for c in 1..=space.max_cpu() {
                        let s = if mode.is_vertical() {
                            State::vertical(k, b, c)
                        } else {
                            State::horizontal(k, b)
                        };
                        let ix = space.index_state(&s).unwrap();
                        assert!(ix < space.n_states());
                        assert!(seen.insert(ix), "index {ix} reused");
                    }
                }
            }
            assert_eq!(seen.len(), space.n_states(), "{mode} enumeration is dense");
        }
    }

    #[test]
    fn indexing_rejects_foreign_shapes() {
        let space = CapacitySpace::new(ScalingMode::Horizontal, 4, 1, 5).unwrap();
        assert!(matches!(
            space.index_state(&State::vertical(1, 0, 1)),
            Err(Error::ConfigurationMismatch { .. })
        ));
        assert!(matches!(
            space.index_action(&Action::vertical(1, 0)),
            Err(Error::ConfigurationMismatch { .. })
        ));
        assert!(matches!(
            space.index_action(&Action::horizontal(2)),
            Err(Error::ConfigurationMismatch { .. })
        ));
        assert_eq!(
            space.index_state(&State::horizontal(5, 0)),
            Err(Error::StateOutOfBounds(State::horizontal(5, 0)))
        );
        assert!(space.index_state(&State::horizontal(0, 0)).is_err());
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn state_index_does_not_overflow_u32() {
        let space =
            CapacitySpace::new(ScalingMode::HorizontalAndVertical, 70_000, 70_000, 10).unwrap();
        assert!(space.n_states() > u32::MAX as usize);
        let last = State::vertical(70_000, 9, 70_000);
        assert_eq!(space.index_state(&last), Ok(space.n_states() - 1));
        assert_eq!(space.index_state(&State::vertical(1, 0, 1)), Ok(0));
    }

    #[test]
    fn zero_bounds_are_rejected() {
        assert!(CapacitySpace::new(ScalingMode::Horizontal, 0, 1, 5).is_err());
        assert!(CapacitySpace::new(ScalingMode::Horizontal, 3, 0, 5).is_ok());
        assert!(CapacitySpace::new(ScalingMode::HorizontalOrVertical, 3, 0, 5).is_err());
        assert!(CapacitySpace::new(ScalingMode::Horizontal, 3, 1, 0).is_err());
    }
}
