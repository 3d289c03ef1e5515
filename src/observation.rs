use ndarray::Array1;

use crate::error::{Result, TdError};

/// State as seen by an update rule: a discrete table index or a
/// continuous vector handed to a feature extractor.
#[derive(Debug, Clone, PartialEq)]
pub enum Observation {
    Discrete(usize),
    Continuous(Array1<f64>),
}

impl Observation {
    pub fn index(&self) -> Result<usize> {
        match self {
            Observation::Discrete(index) => Ok(*index),
            Observation::Continuous(_) => Err(TdError::ObservationKind {
                expected: "discrete",
            }),
        }
    }

    pub fn values(&self) -> Result<&Array1<f64>> {
        match self {
            Observation::Continuous(values) => Ok(values),
            Observation::Discrete(_) => Err(TdError::ObservationKind {
                expected: "continuous",
            }),
        }
    }
}

impl From<usize> for Observation {
    fn from(index: usize) -> Self {
        Observation::Discrete(index)
    }
}

impl From<Array1<f64>> for Observation {
    fn from(values: Array1<f64>) -> Self {
        Observation::Continuous(values)
    }
}

/// A single environment step.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: Observation,
    pub action: usize,
    pub reward: f64,
    pub next_state: Observation,
    pub absorbing: bool,
}

impl Transition {
    pub fn new(
        state: Observation,
        action: usize,
        reward: f64,
        next_state: Observation,
        absorbing: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            absorbing,
        }
    }

    pub fn discrete(state: usize, action: usize, reward: f64, next_state: usize, absorbing: bool) -> Self {
        Self::new(
            Observation::Discrete(state),
            action,
            reward,
            Observation::Discrete(next_state),
            absorbing,
        )
    }

    pub fn continuous(
        state: Array1<f64>,
        action: usize,
        reward: f64,
        next_state: Array1<f64>,
        absorbing: bool,
    ) -> Self {
        Self::new(
            Observation::Continuous(state),
            action,
            reward,
            Observation::Continuous(next_state),
            absorbing,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn observation_kinds() {
        let discrete: Observation = 3_usize.into();
        assert_eq!(discrete.index(), Ok(3));
        assert!(discrete.values().is_err());

        let continuous: Observation = array![0.5, -0.5].into();
        assert_eq!(continuous.values().unwrap(), &array![0.5, -0.5]);
        assert_eq!(
            continuous.index(),
            Err(TdError::ObservationKind {
                expected: "discrete"
            })
        );
    }
}
