use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    algo::{greedy_action, DynaQ, QLearning, UpdateRule},
    config::AgentConfig,
    decay::Constant,
    ds::QTable,
    env::Service,
    exploration::{Policy, Softmax},
    memory::Transition,
    space::{Action, ActionSpace, CapacitySpace, State},
    Error, Result,
};

/// An online learner that decides, once per control tick, how to change a service's capacity
///
/// The agent owns its Q-table and exploration state. How observations turn into Q-table
/// updates is delegated to the update rule `U`, so [`DynaQ`] and plain [`QLearning`] share
/// all of the action-selection code.
///
/// A driver alternates two calls:
/// 1. [`pick_action`](Self::pick_action) commits the scaling action for the coming period
/// 2. [`update`](Self::update) reports the cost of that period and lets the agent learn
///
/// ### Generics
/// - `S` - The [`ActionSpace`] the agent learns over
/// - `U` - The [`UpdateRule`] applied to every observation
#[derive(Debug)]
pub struct ScalingAgent<S: ActionSpace = CapacitySpace, U: UpdateRule = DynaQ> {
    space: S,
    rule: U,
    q_table: QTable,
    policy: Policy,
    gamma: f64,
    temperature: f64,
    state: State,
    picked_action: Action,
    t: u64,   // tick counter, starts at 1
    load: f64, // last observed load
    rng: StdRng,
}

impl<S: ActionSpace> ScalingAgent<S, DynaQ> {
    /// Initialize a Dyna-Q agent using the config's learning rate and planning steps
    pub fn dyna_q(config: AgentConfig, space: S, initial_state: State) -> Result<Self> {
        let rule = DynaQ::new(config.alpha, config.planning_steps, &space);
        Self::new(config, space, rule, initial_state)
    }
}

impl<S: ActionSpace> ScalingAgent<S, QLearning> {
    /// Initialize a Q-learning agent that never plans
    pub fn q_learning(config: AgentConfig, space: S, initial_state: State) -> Result<Self> {
        let rule = QLearning::new(config.alpha);
        Self::new(config, space, rule, initial_state)
    }
}

impl<S: ActionSpace, U: UpdateRule> ScalingAgent<S, U> {
    /// Initialize a new agent at `initial_state`
    ///
    /// The committed action starts as the no-op action of the scaling mode.
    ///
    /// The rule carries its own learning rate (and planning steps), so `config.alpha` and
    /// `config.planning_steps` only matter to [`dyna_q`](ScalingAgent::dyna_q) and
    /// [`q_learning`](ScalingAgent::q_learning).
    ///
    /// Fails if the config or the rule is invalid, if the config's mode differs from the
    /// space's, if the rule was built for another space, or if `initial_state` cannot be
    /// indexed by the space.
    pub fn new(config: AgentConfig, space: S, rule: U, initial_state: State) -> Result<Self> {
        config.validate()?;
        rule.check(&space)?;
        let mode = space.mode();
        if config.mode != mode {
            return Err(Error::ConfigurationMismatch {
                mode,
                detail: format!("config requests {} but the space is {mode}", config.mode),
            });
        }
        space.index_state(&initial_state)?;

        let picked_action = Action::noop(mode);
        space.index_action(&picked_action)?;

        info!(
            "agent initialized: mode {mode}, policy {}, {} states x {} actions",
            config.policy,
            space.n_states(),
            space.n_actions()
        );

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            q_table: QTable::new(space.n_states(), space.n_actions(), config.initial_q),
            policy: config.build_policy(),
            gamma: config.gamma,
            temperature: config.temperature,
            space,
            rule,
            state: initial_state,
            picked_action,
            t: 1,
            load: 0.0,
            rng,
        })
    }

    /// Run one full update cycle for the period that just ended
    ///
    /// The successor state is the committed action applied to the current state, with
    /// utilization re-read from `service`. The Q-table is updated, the state advances,
    /// and the update rule may then learn further (Dyna-Q records the transition and plans).
    ///
    /// **Returns** the absolute change of the Q-value of the transition just observed
    pub fn update<V>(&mut self, service: &V, tick: u64, cost: f64, load: f64) -> Result<f64>
    where
        V: Service + ?Sized,
    {
        let action = self.picked_action;
        if !self.space.is_valid_action(&self.state, &action) {
            return Err(Error::IllegalAction {
                state: self.state,
                action,
            });
        }
        let mut next_state = self.state.apply(&action).ok_or(Error::IllegalAction {
            state: self.state,
            action,
        })?;
        next_state.utilization = self.space.discretize(service.utilization());

        let transition = Transition {
            state: self.state,
            action,
            next_state,
            cost,
        };
        let delta = self.rule.learn(
            &mut self.q_table,
            &self.space,
            self.gamma,
            &transition,
            &mut self.rng,
        )?;

        debug!(
            "tick {tick} (t={}): {} {action} -> {next_state} cost {cost} load {load} delta {delta}",
            self.t,
            self.state
        );

        self.state = next_state;
        self.load = load;
        self.t += 1;
        Ok(delta)
    }

    /// Choose the next action per the configured policy and commit it
    ///
    /// Learned values are left untouched.
    pub fn pick_action(&mut self) -> Result<Action> {
        let s = self.space.index_state(&self.state)?;
        let legal = self.space.legal_actions(&self.state);
        let ix = self
            .policy
            .select(
                (self.t - 1) as f64,
                self.q_table.row(s),
                &legal,
                &mut self.rng,
            )
            .ok_or(Error::NoLegalAction(self.state))?;
        self.picked_action = self.space.actions()[ix];
        Ok(self.picked_action)
    }

    /// Commit `action` for the coming period regardless of policy
    pub fn commit(&mut self, action: Action) -> Result<()> {
        self.space.index_action(&action)?;
        if !self.space.is_valid_action(&self.state, &action) {
            return Err(Error::IllegalAction {
                state: self.state,
                action,
            });
        }
        self.picked_action = action;
        Ok(())
    }

    /// Run the update rule's planning phase on its own
    pub fn plan(&mut self) -> Result<()> {
        self.rule
            .plan(&mut self.q_table, &self.space, self.gamma, &mut self.rng)
    }

    /// The legal action with minimal Q-value at `state`, ties broken by enumeration order
    pub fn greedy_action(&self, state: &State) -> Result<Action> {
        greedy_action(&self.q_table, &self.space, state)
    }

    /// Softmax probability of every action at the current state, in enumeration order
    ///
    /// Computed at the configured temperature whatever the active policy is.
    pub fn softmax_probabilities(&self) -> Result<Vec<f64>> {
        let s = self.space.index_state(&self.state)?;
        let legal = self.space.legal_actions(&self.state);
        if legal.is_empty() {
            return Err(Error::NoLegalAction(self.state));
        }
        let softmax = Softmax::new(Constant::new(self.temperature));
        Ok(softmax.probabilities(0.0, self.q_table.row(s), &legal))
    }

    pub fn q_value(&self, state: &State, action: &Action) -> Result<f64> {
        let s = self.space.index_state(state)?;
        let a = self.space.index_action(action)?;
        Ok(self.q_table.get(s, a))
    }

    /// Overwrite a single learned value, e.g. when restoring a table
    pub fn set_q_value(&mut self, state: &State, action: &Action, value: f64) -> Result<()> {
        let s = self.space.index_state(state)?;
        let a = self.space.index_action(action)?;
        self.q_table.set(s, a, value);
        Ok(())
    }

    /// Current exploration probability, if the policy is epsilon greedy
    pub fn epsilon(&self) -> Option<f64> {
        match &self.policy {
            Policy::EpsilonGreedy(policy) => Some(policy.epsilon((self.t - 1) as f64)),
            Policy::Softmax(_) => None,
        }
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn picked_action(&self) -> &Action {
        &self.picked_action
    }

    /// The tick counter, 1 before the first update
    pub fn tick(&self) -> u64 {
        self.t
    }

    /// Load reported with the last update
    pub fn load(&self) -> f64 {
        self.load
    }

    pub fn space(&self) -> &S {
        &self.space
    }

    pub fn rule(&self) -> &U {
        &self.rule
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }
}
