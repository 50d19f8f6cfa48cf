/// An implementation of a time-decaying value
pub trait Decay {
    /// Calculate value at time `t`
    fn evaluate(&self, t: f64) -> f64;
}

/// A constant value
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Constant {
    value: f64,
}

impl Constant {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Decay for Constant {
    fn evaluate(&self, _t: f64) -> f64 {
        self.value
    }
}

/// v(t) = v<sub>f</sub> + (v<sub>i</sub> - v<sub>f</sub>) / (1 + rt)
///
/// Only the harmonic schedule is constructible: evaluating it at `t - 1` gives the `1/t`
/// exploration schedule of the scaling agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InverseTime {
    rate: f64,
    vi: f64,
    vf: f64,
}

impl InverseTime {
    /// The harmonic schedule `v(t) = 1 / (1 + t)`
    pub fn harmonic() -> Self {
        Self {
            rate: 1.0,
            vi: 1.0,
            vf: 0.0,
        }
    }
}

impl Decay for InverseTime {
    fn evaluate(&self, t: f64) -> f64 {
        let &Self { rate, vi, vf } = self;
        vf + (vi - vf) / (1.0 + rate * t)
    }
}
