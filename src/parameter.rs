mod decay;
mod variance;

pub use decay::{ConstantParameter, CustomDecayParameter, ExponentialDecayParameter, LinearDecayParameter};
pub use variance::{VarianceMode, VarianceParameter};

use enum_dispatch::enum_dispatch;
use fxhash::FxHashMap;

use crate::error::Result;

/// What a schedule counts visits of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    StateAction(usize, usize),
    /// Single shared counter, used when states are not enumerable.
    Global,
}

/// Step-size schedule: every call counts one visit of `key` and returns
/// the coefficient for that visit.
#[enum_dispatch]
pub trait Parameter {
    fn value(&mut self, key: ParameterKey, target: Option<f64>, factor: Option<f64>) -> Result<f64>;

    /// Current coefficient of `key` without counting a visit.
    fn peek(&self, key: ParameterKey) -> f64;

    fn reset(&mut self);

    fn call(&mut self, key: ParameterKey) -> Result<f64> {
        self.value(key, None, None)
    }
}

#[derive(Debug, Clone)]
#[enum_dispatch(Parameter)]
pub enum EnumParameter {
    ConstantParameter(ConstantParameter),
    ExponentialDecayParameter(ExponentialDecayParameter),
    LinearDecayParameter(LinearDecayParameter),
    CustomDecayParameter(CustomDecayParameter),
    VarianceParameter(VarianceParameter),
}

#[derive(Debug, Clone, Default)]
pub(crate) struct VisitCounter {
    counts: FxHashMap<ParameterKey, u64>,
}

impl VisitCounter {
    pub(crate) fn increment(&mut self, key: ParameterKey) -> u64 {
        let n: &mut u64 = self.counts.entry(key).or_insert(0);
        *n += 1;
        *n
    }

    pub(crate) fn get(&self, key: ParameterKey) -> u64 {
        *self.counts.get(&key).unwrap_or(&0)
    }

    pub(crate) fn clear(&mut self) {
        self.counts.clear();
    }
}

#[inline(always)]
pub(crate) fn bound_below(value: f64, min_value: Option<f64>) -> f64 {
    match min_value {
        Some(min) if value < min => min,
        _ => value,
    }
}
