use std::fmt::Debug;
use std::rc::Rc;

use super::{bound_below, Parameter, ParameterKey, VisitCounter};
use crate::error::{Result, TdError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantParameter {
    value: f64,
}

impl ConstantParameter {
    pub fn new(value: f64) -> Self {
        Self { value }
    }
}

impl Parameter for ConstantParameter {
    fn value(&mut self, _key: ParameterKey, _target: Option<f64>, _factor: Option<f64>) -> Result<f64> {
        Ok(self.value)
    }

    fn peek(&self, _key: ParameterKey) -> f64 {
        self.value
    }

    fn reset(&mut self) {}
}

/// `initial_value / n^decay_exp`, `n` being the visits of the key.
#[derive(Debug, Clone)]
pub struct ExponentialDecayParameter {
    initial_value: f64,
    decay_exp: f64,
    min_value: Option<f64>,
    counter: VisitCounter,
}

impl ExponentialDecayParameter {
    pub fn new(initial_value: f64, decay_exp: f64, min_value: Option<f64>) -> Result<Self> {
        if decay_exp < 0.0 {
            return Err(TdError::InvalidConfig(format!(
                "decay exponent must not be negative, got {}",
                decay_exp
            )));
        }
        Ok(Self {
            initial_value,
            decay_exp,
            min_value,
            counter: VisitCounter::default(),
        })
    }

    fn compute(&self, n: u64) -> f64 {
        let n: f64 = n.max(1) as f64;
        bound_below(self.initial_value / n.powf(self.decay_exp), self.min_value)
    }
}

impl Parameter for ExponentialDecayParameter {
    fn value(&mut self, key: ParameterKey, _target: Option<f64>, _factor: Option<f64>) -> Result<f64> {
        let n: u64 = self.counter.increment(key);
        Ok(self.compute(n))
    }

    fn peek(&self, key: ParameterKey) -> f64 {
        self.compute(self.counter.get(key))
    }

    fn reset(&mut self) {
        self.counter.clear();
    }
}

/// Linear interpolation from `initial_value` to `min_value` over `n_steps` visits.
#[derive(Debug, Clone)]
pub struct LinearDecayParameter {
    initial_value: f64,
    min_value: f64,
    coeff: f64,
    counter: VisitCounter,
}

impl LinearDecayParameter {
    pub fn new(initial_value: f64, min_value: f64, n_steps: u64) -> Result<Self> {
        if n_steps == 0 {
            return Err(TdError::InvalidConfig("n_steps must be positive".to_string()));
        }
        if min_value > initial_value {
            return Err(TdError::InvalidConfig(format!(
                "min value {} above initial value {}",
                min_value, initial_value
            )));
        }
        Ok(Self {
            initial_value,
            min_value,
            coeff: (min_value - initial_value) / n_steps as f64,
            counter: VisitCounter::default(),
        })
    }

    fn compute(&self, n: u64) -> f64 {
        bound_below(self.coeff * n as f64 + self.initial_value, Some(self.min_value))
    }
}

impl Parameter for LinearDecayParameter {
    fn value(&mut self, key: ParameterKey, _target: Option<f64>, _factor: Option<f64>) -> Result<f64> {
        let n: u64 = self.counter.increment(key);
        Ok(self.compute(n))
    }

    fn peek(&self, key: ParameterKey) -> f64 {
        self.compute(self.counter.get(key))
    }

    fn reset(&mut self) {
        self.counter.clear();
    }
}

/// Decay law supplied by the caller as a function of the visit count.
#[derive(Clone)]
pub struct CustomDecayParameter {
    law: Rc<dyn Fn(u64) -> f64>,
    min_value: Option<f64>,
    counter: VisitCounter,
}

impl Debug for CustomDecayParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomDecayParameter")
            .field("min_value", &self.min_value)
            .field("counter", &self.counter)
            .finish()
    }
}

impl CustomDecayParameter {
    pub fn new(law: Rc<dyn Fn(u64) -> f64>, min_value: Option<f64>) -> Self {
        Self {
            law,
            min_value,
            counter: VisitCounter::default(),
        }
    }
}

impl Parameter for CustomDecayParameter {
    fn value(&mut self, key: ParameterKey, _target: Option<f64>, _factor: Option<f64>) -> Result<f64> {
        let n: u64 = self.counter.increment(key);
        Ok(bound_below((self.law)(n), self.min_value))
    }

    fn peek(&self, key: ParameterKey) -> f64 {
        bound_below((self.law)(self.counter.get(key)), self.min_value)
    }

    fn reset(&mut self) {
        self.counter.clear();
    }
}
