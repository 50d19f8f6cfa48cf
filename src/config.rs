use strum::{Display, EnumIter, EnumString};

use crate::{ensure_interval, exploration::Policy, space::ScalingMode, Error, Result};

/// Which action-selection policy the agent follows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "kebab-case")]
pub enum ActionPolicy {
    /// Epsilon greedy with `epsilon = 1/t`
    #[default]
    #[strum(serialize = "egreedy")]
    EpsilonGreedy,
    /// Boltzmann exploration at [`AgentConfig::temperature`]
    Softmax,
}

/// Configuration for the [`ScalingAgent`](crate::agent::ScalingAgent)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AgentConfig {
    /// The scaling mode, fixed for the agent's lifetime
    ///
    /// **Default**: [`ScalingMode::Horizontal`]
    pub mode: ScalingMode,
    /// **Default**: [`ActionPolicy::EpsilonGreedy`]
    pub policy: ActionPolicy,
    /// The discount factor - must be in `[0, 1]`
    ///
    /// **Default**: `0.99`
    pub gamma: f64,
    /// The learning rate - must be in `[0, 1]`
    ///
    /// **Default**: `0.1`
    pub alpha: f64,
    /// Softmax temperature - must be positive
    ///
    /// **Default**: `1.0`
    pub temperature: f64,
    /// Number of model replays after each real update
    ///
    /// **Default**: `10`
    pub planning_steps: usize,
    /// Value of every Q-table entry before learning
    ///
    /// **Default**: `0.0`
    pub initial_q: f64,
    /// Seed for the agent's random number generator, drawn from entropy if `None`
    pub seed: Option<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            mode: ScalingMode::Horizontal,
            policy: ActionPolicy::EpsilonGreedy,
            gamma: 0.99,
            alpha: 0.1,
            temperature: 1.0,
            planning_steps: 10,
            initial_q: 0.0,
            seed: None,
        }
    }
}

impl AgentConfig {
    /// Check every hyperparameter against its valid range
    pub fn validate(&self) -> Result<()> {
        let Self {
            gamma,
            alpha,
            temperature,
            initial_q,
            ..
        } = *self;
        ensure_interval!(gamma, 0.0, 1.0);
        ensure_interval!(alpha, 0.0, 1.0);
        if !(temperature > 0.0 && temperature.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "temperature",
                value: temperature,
                detail: String::from("must be positive and finite"),
            });
        }
        if !initial_q.is_finite() {
            return Err(Error::InvalidParameter {
                name: "initial_q",
                value: initial_q,
                detail: String::from("must be finite"),
            });
        }
        Ok(())
    }

    /// The selection policy described by this configuration
    pub fn build_policy(&self) -> Policy {
        match self.policy {
            ActionPolicy::EpsilonGreedy => Policy::epsilon_greedy(),
            ActionPolicy::Softmax => Policy::softmax(self.temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(AgentConfig::default().validate().is_ok());
    }

    #[test]
    fn out_of_range_hyperparameters_are_rejected() {
        let cases = [
            AgentConfig {
                gamma: 1.5,
                ..Default::default()
            },
            AgentConfig {
                alpha: -0.1,
                ..Default::default()
            },
            AgentConfig {
                temperature: 0.0,
                ..Default::default()
            },
            AgentConfig {
                initial_q: f64::NAN,
                ..Default::default()
            },
        ];
        for config in cases {
            assert!(
                matches!(config.validate(), Err(Error::InvalidParameter { .. })),
                "{config:?} should be rejected"
            );
        }
    }

    #[test]
    fn policy_parses_from_text() {
        assert_eq!(
            ActionPolicy::from_str("egreedy"),
            Ok(ActionPolicy::EpsilonGreedy)
        );
        assert_eq!(ActionPolicy::from_str("softmax"), Ok(ActionPolicy::Softmax));
        assert!(matches!(
            AgentConfig {
                policy: ActionPolicy::Softmax,
                ..Default::default()
            }
            .build_policy(),
            Policy::Softmax(_)
        ));
    }
}
