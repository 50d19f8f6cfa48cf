/// Scaling agents
pub mod agent;

/// Update rules: Q-learning and Dyna-Q
pub mod algo;

/// Agent configuration
pub mod config;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Data structures
pub mod ds;

/// The service collaborator
pub mod env;

mod error;

/// Exploration policies
pub mod exploration;

/// Transitions and the Dyna-Q model
pub mod memory;

/// States, actions and the spaces they live in
pub mod space;

/// Simulated services for demos and experiments
#[cfg(feature = "gym")]
pub mod gym;

mod util;

pub use agent::ScalingAgent;
pub use config::{ActionPolicy, AgentConfig};
pub use error::{Error, Result};
pub use space::{Action, ActionSpace, CapacitySpace, ScalingMode, State};
