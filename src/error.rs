use thiserror::Error;

use crate::space::{Action, ScalingMode, State};

/// Errors raised by the agent and its collaborators
///
/// Every variant signals a wiring or configuration bug in the caller rather than a
/// transient fault, so nothing here is retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A state or action has a shape the scaling mode does not allow
    #[error("configuration mismatch under {mode}: {detail}")]
    ConfigurationMismatch { mode: ScalingMode, detail: String },

    /// The state lies outside the capacity bounds of the state space
    #[error("state {0} is outside the capacity bounds")]
    StateOutOfBounds(State),

    /// The action cannot be taken from the given state
    #[error("action {action} is illegal at state {state}")]
    IllegalAction { state: State, action: Action },

    /// Planning was requested before any transition was recorded
    #[error("the Dyna-Q model has no recorded transitions")]
    EmptyModel,

    /// No action in the enumeration is legal at the given state
    #[error("no legal action at state {0}")]
    NoLegalAction(State),

    /// A hyperparameter is outside its valid range
    #[error("invalid value {value} for `{name}`: {detail}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        detail: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
