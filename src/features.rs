use std::fmt::Debug;
use std::rc::Rc;

use ndarray::Array1;

use crate::error::{Result, TdError};
use crate::observation::Observation;

/// Maps an observation to the feature vector seen by a regressor.
pub trait Features {
    fn phi(&self, obs: &Observation) -> Result<Array1<f64>>;

    fn size(&self) -> usize;
}

/// Continuous observations used as they are.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityFeatures {
    size: usize,
}

impl IdentityFeatures {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl Features for IdentityFeatures {
    fn phi(&self, obs: &Observation) -> Result<Array1<f64>> {
        let values: &Array1<f64> = obs.values()?;
        if values.len() != self.size {
            return Err(TdError::FeatureShape {
                expected: self.size,
                found: values.len(),
            });
        }
        Ok(values.clone())
    }

    fn size(&self) -> usize {
        self.size
    }
}

/// Indicator vector of a discrete observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneHotFeatures {
    n_states: usize,
}

impl OneHotFeatures {
    pub fn new(n_states: usize) -> Self {
        Self { n_states }
    }
}

impl Features for OneHotFeatures {
    fn phi(&self, obs: &Observation) -> Result<Array1<f64>> {
        let index: usize = obs.index()?;
        if index >= self.n_states {
            return Err(TdError::IndexOutOfRange {
                kind: "state",
                index,
                size: self.n_states,
            });
        }
        let mut phi: Array1<f64> = Array1::zeros(self.n_states);
        phi[index] = 1.0;
        Ok(phi)
    }

    fn size(&self) -> usize {
        self.n_states
    }
}

pub type BasisFunction = Rc<dyn Fn(&Array1<f64>) -> Array1<f64>>;

/// Caller supplied basis over continuous observations.
#[derive(Clone)]
pub struct FunctionFeatures {
    size: usize,
    basis: BasisFunction,
}

impl Debug for FunctionFeatures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionFeatures")
            .field("size", &self.size)
            .finish()
    }
}

impl FunctionFeatures {
    pub fn new(size: usize, basis: BasisFunction) -> Self {
        Self { size, basis }
    }
}

impl Features for FunctionFeatures {
    fn phi(&self, obs: &Observation) -> Result<Array1<f64>> {
        let phi: Array1<f64> = (self.basis)(obs.values()?);
        if phi.len() != self.size {
            return Err(TdError::FeatureShape {
                expected: self.size,
                found: phi.len(),
            });
        }
        Ok(phi)
    }

    fn size(&self) -> usize {
        self.size
    }
}
