use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::{
    env::Service,
    space::{Action, State},
    Error, Result,
};

/// Configuration for the [`SyntheticService`]
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticServiceConfig {
    /// Mean request rate
    pub mean_load: f64,
    /// Standard deviation of the request rate
    pub load_std_dev: f64,
    /// Requests per period one instance of cpu size 1 can serve
    pub capacity_per_unit: f64,
    /// Cost of running one instance of cpu size 1 for one period
    pub resource_cost: f64,
    /// Utilization above which the service violates its target
    pub target_utilization: f64,
    /// Cost added for each period spent above `target_utilization`
    pub violation_cost: f64,
}

impl Default for SyntheticServiceConfig {
    fn default() -> Self {
        Self {
            mean_load: 300.0,
            load_std_dev: 30.0,
            capacity_per_unit: 100.0,
            resource_cost: 1.0,
            target_utilization: 0.8,
            violation_cost: 10.0,
        }
    }
}

/// A simulated service with stationary, normally distributed load
///
/// Capacity grows linearly with both instance count and cpu size. Each call to
/// [`step`](Self::step) applies a scaling action, draws the load of the next period and
/// reports its cost and load.
#[derive(Debug, Clone)]
pub struct SyntheticService {
    config: SyntheticServiceConfig,
    load: Normal<f64>,
    instances: u32,
    cpu: u32,
    utilization: f64,
}

impl SyntheticService {
    /// Initialize the service running at `state`'s capacity
    pub fn new(config: SyntheticServiceConfig, state: &State) -> Result<Self> {
        let load = Normal::new(config.mean_load, config.load_std_dev).map_err(|e| {
            Error::InvalidParameter {
                name: "load_std_dev",
                value: config.load_std_dev,
                detail: e.to_string(),
            }
        })?;
        if !(config.capacity_per_unit > 0.0) {
            return Err(Error::InvalidParameter {
                name: "capacity_per_unit",
                value: config.capacity_per_unit,
                detail: String::from("must be positive"),
            });
        }
        Ok(Self {
            config,
            load,
            instances: state.instances,
            cpu: state.cpu.unwrap_or(1),
            utilization: 0.0,
        })
    }

    /// Requests per period the current deployment can serve
    pub fn capacity(&self) -> f64 {
        self.instances as f64 * self.cpu as f64 * self.config.capacity_per_unit
    }

    /// Apply `action`, run one period and return its `(cost, load)`
    pub fn step<R: Rng + ?Sized>(&mut self, action: &Action, rng: &mut R) -> (f64, f64) {
        self.instances = self.instances.saturating_add_signed(action.instance_delta).max(1);
        if let Some(dc) = action.cpu_delta {
            self.cpu = self.cpu.saturating_add_signed(dc).max(1);
        }

        let load = self.load.sample(rng).max(0.0);
        self.utilization = load / self.capacity();

        let units = self.instances as f64 * self.cpu as f64;
        let mut cost = units * self.config.resource_cost;
        if self.utilization > self.config.target_utilization {
            cost += self.config.violation_cost;
        }
        (cost, load)
    }
}

impl Service for SyntheticService {
    fn utilization(&self) -> f64 {
        self.utilization
    }
}
