/// A dense table of learned expected discounted costs
///
/// Entries are addressed by `(state, action)` enumeration positions handed out by an
/// [`ActionSpace`](crate::space::ActionSpace). The table is allocated once at
/// `n_states × n_actions` and entries are only ever overwritten.
#[derive(Debug, Clone, PartialEq)]
pub struct QTable {
    values: Vec<f64>,
    n_states: usize,
    n_actions: usize,
}

impl QTable {
    /// Allocate a table with every entry set to `initial`
    pub fn new(n_states: usize, n_actions: usize, initial: f64) -> Self {
        Self {
            values: vec![initial; n_states * n_actions],
            n_states,
            n_actions,
        }
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// **Panics** if either index is out of range
    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.values[self.offset(state, action)]
    }

    /// **Panics** if either index is out of range
    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        let ix = self.offset(state, action);
        self.values[ix] = value;
    }

    /// All action values of `state` in enumeration order
    pub fn row(&self, state: usize) -> &[f64] {
        let start = self.offset(state, 0);
        &self.values[start..start + self.n_actions]
    }

    fn offset(&self, state: usize, action: usize) -> usize {
        assert!(
            state < self.n_states && action < self.n_actions,
            "Q-table index ({state}, {action}) out of range for {}x{} table",
            self.n_states,
            self.n_actions
        );
        state * self.n_actions + action
    }
}
