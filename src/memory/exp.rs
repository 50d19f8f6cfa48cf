use crate::space::{Action, State};

/// Represents a single observed transition of the service
///
/// This is the element the Dyna-Q model stores and replays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// The operating point before taking the action
    pub state: State,
    /// The action taken in the given state
    pub action: Action,
    /// The operating point observed at the end of the control period
    pub next_state: State,
    /// The cost incurred over the control period
    pub cost: f64,
}
