use fxhash::FxHashMap;

use super::{bound_below, Parameter, ParameterKey, VisitCounter};
use crate::error::{Result, TdError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarianceMode {
    /// Grows with the variance of the target, up to 1.
    Increasing,
    /// `1 - Increasing`.
    Decreasing,
}

#[derive(Debug, Clone, Copy, Default)]
struct TargetStats {
    mean: f64,
    mean_squared: f64,
    weights_var: f64,
    value: Option<f64>,
}

/// Adaptive schedule driven by the variance of the targets it is called with.
///
/// Keeps, per key, incremental estimates of the mean and mean of squares of
/// the target plus the squared-weight accumulator of the estimator. Until
/// two targets have been seen the initial value is used.
#[derive(Debug, Clone)]
pub struct VarianceParameter {
    initial_value: f64,
    mode: VarianceMode,
    exponential: bool,
    tol: f64,
    min_value: Option<f64>,
    counter: VisitCounter,
    stats: FxHashMap<ParameterKey, TargetStats>,
}

impl VarianceParameter {
    pub fn new(
        initial_value: f64,
        mode: VarianceMode,
        exponential: bool,
        tol: f64,
        min_value: Option<f64>,
    ) -> Result<Self> {
        if tol <= 0.0 {
            return Err(TdError::InvalidConfig(format!(
                "variance tolerance must be positive, got {}",
                tol
            )));
        }
        Ok(Self {
            initial_value,
            mode,
            exponential,
            tol,
            min_value,
            counter: VisitCounter::default(),
            stats: FxHashMap::default(),
        })
    }

    fn compute_parameter(&self, variance: f64) -> f64 {
        let increasing: f64 = if self.exponential {
            1.0 - (variance * 0.5_f64.ln() / self.tol).exp()
        } else if variance < self.tol {
            variance / self.tol
        } else {
            1.0
        };
        match self.mode {
            VarianceMode::Increasing => increasing,
            VarianceMode::Decreasing => 1.0 - increasing,
        }
    }
}

impl Parameter for VarianceParameter {
    fn value(&mut self, key: ParameterKey, target: Option<f64>, factor: Option<f64>) -> Result<f64> {
        let target: f64 = target.ok_or(TdError::MissingTarget)?;
        let factor: f64 = factor.unwrap_or(1.0);
        let n_updates: u64 = self.counter.increment(key);
        let stats: TargetStats = *self.stats.entry(key).or_default();

        let n: f64 = (n_updates - 1) as f64;
        let parameter_value: f64 = if n < 2.0 {
            self.initial_value
        } else {
            let variance: f64 = n * (stats.mean_squared - stats.mean.powi(2)) / (n - 1.0);
            self.compute_parameter(variance * stats.weights_var)
        };

        let n_updates: f64 = n_updates as f64;
        let weight: f64 = factor * parameter_value;
        let updated: TargetStats = TargetStats {
            mean: stats.mean + (target - stats.mean) / n_updates,
            mean_squared: stats.mean_squared + (target.powi(2) - stats.mean_squared) / n_updates,
            weights_var: (1.0 - weight).powi(2) * stats.weights_var + weight.powi(2),
            value: Some(parameter_value),
        };
        self.stats.insert(key, updated);

        Ok(bound_below(parameter_value, self.min_value))
    }

    fn peek(&self, key: ParameterKey) -> f64 {
        let value: f64 = self
            .stats
            .get(&key)
            .and_then(|s| s.value)
            .unwrap_or(self.initial_value);
        bound_below(value, self.min_value)
    }

    fn reset(&mut self) {
        self.counter.clear();
        self.stats.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: ParameterKey = ParameterKey::StateAction(0, 0);

    #[test]
    fn needs_a_target() {
        let mut delta: VarianceParameter =
            VarianceParameter::new(0.5, VarianceMode::Increasing, false, 1.0, None).unwrap();
        assert_eq!(delta.call(KEY), Err(TdError::MissingTarget));
        assert!(VarianceParameter::new(0.5, VarianceMode::Increasing, false, 0.0, None).is_err());
    }

    #[test]
    fn initial_value_until_enough_samples() {
        let mut delta: VarianceParameter =
            VarianceParameter::new(0.5, VarianceMode::Increasing, false, 1.0, None).unwrap();
        assert_eq!(delta.value(KEY, Some(1.0), None), Ok(0.5));
        assert_eq!(delta.value(KEY, Some(3.0), None), Ok(0.5));
        assert_eq!(delta.peek(KEY), 0.5);
    }

    #[test]
    fn constant_targets_have_no_variance() {
        let mut increasing: VarianceParameter =
            VarianceParameter::new(0.5, VarianceMode::Increasing, false, 1.0, None).unwrap();
        let mut decreasing: VarianceParameter =
            VarianceParameter::new(0.5, VarianceMode::Decreasing, false, 1.0, None).unwrap();
        let mut last: (f64, f64) = (0.0, 0.0);
        for _ in 0..10 {
            last = (
                increasing.value(KEY, Some(2.0), None).unwrap(),
                decreasing.value(KEY, Some(2.0), None).unwrap(),
            );
        }
        assert_eq!(last, (0.0, 1.0));
    }

    #[test]
    fn noisy_targets_raise_the_increasing_value() {
        let mut delta: VarianceParameter =
            VarianceParameter::new(0.1, VarianceMode::Increasing, false, 0.5, None).unwrap();
        let mut value: f64 = 0.0;
        for i in 0..20 {
            let target: f64 = if i % 2 == 0 { -10.0 } else { 10.0 };
            value = delta.value(KEY, Some(target), None).unwrap();
            assert!((0.0..=1.0).contains(&value));
        }
        assert!(value > 0.1);
    }
}
