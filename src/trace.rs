use std::str::FromStr;

use ndarray::{Array, Array2};

use crate::error::TdError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TraceKind {
    /// Visited entries are set to 1.
    #[default]
    Replacing,
    /// Visited entries are incremented by 1.
    Accumulating,
}

impl FromStr for TraceKind {
    type Err = TdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replacing" => Ok(TraceKind::Replacing),
            "accumulating" => Ok(TraceKind::Accumulating),
            other => Err(TdError::InvalidConfig(format!("unknown trace kind {}", other))),
        }
    }
}

/// Eligibility trace with the shape of a value table.
#[derive(Debug, Clone, PartialEq)]
pub struct EligibilityTrace {
    kind: TraceKind,
    trace: Array2<f64>,
}

impl EligibilityTrace {
    pub fn new(n_states: usize, n_actions: usize, kind: TraceKind) -> Self {
        Self {
            kind,
            trace: Array::zeros((n_states, n_actions)),
        }
    }

    pub fn kind(&self) -> TraceKind {
        self.kind
    }

    pub fn update(&mut self, state: usize, action: usize) {
        match self.kind {
            TraceKind::Replacing => self.trace[[state, action]] = 1.0,
            TraceKind::Accumulating => self.trace[[state, action]] += 1.0,
        }
    }

    pub fn decay(&mut self, factor: f64) {
        self.trace *= factor;
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.trace[[state, action]]
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.trace
    }

    pub fn reset(&mut self) {
        self.trace.fill(0.0);
    }
}
