use log::warn;
use rand::Rng;

use crate::decay::Decay;

/// Softmax exploration policy (also known as Boltzmann exploration) with time-decaying temperature
///
/// Values are costs, so each legal action is weighted by `exp(-Q / τ)`. Illegal actions get
/// probability exactly 0 and do not take part in the normalization.
#[derive(Debug, Clone)]
pub struct Softmax<D: Decay> {
    temperature: D,
}

impl<D: Decay> Softmax<D> {
    pub fn new(decay: D) -> Self {
        Self { temperature: decay }
    }

    pub fn temperature(&self, t: f64) -> f64 {
        self.temperature.evaluate(t)
    }

    /// Selection probability of every action in enumeration order
    pub fn probabilities(&self, t: f64, values: &[f64], legal: &[usize]) -> Vec<f64> {
        let tau = self.temperature(t);
        let mut probs = vec![0.0; values.len()];
        // shift by the lowest cost so the largest weight is exactly 1
        let floor = legal
            .iter()
            .map(|&i| values[i])
            .fold(f64::INFINITY, f64::min);
        for &i in legal {
            probs[i] = (-(values[i] - floor) / tau).exp();
        }
        let sum: f64 = probs.iter().sum();
        if sum > 0.0 && sum.is_finite() {
            probs.iter_mut().for_each(|p| *p /= sum);
        }
        probs
    }

    pub fn select<R: Rng + ?Sized>(
        &self,
        t: f64,
        values: &[f64],
        legal: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        let probs = self.probabilities(t, values, legal);
        walk(&probs, legal, rng.gen::<f64>())
    }
}

/// Walk the cumulative distribution in enumeration order and return the first position
/// whose cumulative probability exceeds `p`
///
/// If rounding keeps the running sum at or below `p`, the last legal position is returned.
pub(crate) fn walk(probs: &[f64], legal: &[usize], p: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for &i in legal {
        cumulative += probs[i];
        if cumulative > p {
            return Some(i);
        }
    }
    let last = legal.last().copied();
    if last.is_some() {
        warn!("softmax cumulative sum {cumulative} never exceeded {p}, taking last legal action");
    }
    last
}
