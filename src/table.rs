use std::ops::{Index, IndexMut};

use ndarray::{Array, Array1, Array2, ArrayView1};

use crate::error::{Result, TdError};
use crate::mdp::MdpInfo;
use crate::utils::max;

/// Dense `(state, action)` value store.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    initial_value: f64,
    table: Array2<f64>,
}

impl Table {
    pub fn new(n_states: usize, n_actions: usize, initial_value: f64) -> Self {
        Self {
            initial_value,
            table: Array::from_elem((n_states, n_actions), initial_value),
        }
    }

    pub fn from_mdp(mdp_info: &MdpInfo, initial_value: f64) -> Self {
        let (n_states, n_actions) = mdp_info.size();
        Self::new(n_states, n_actions, initial_value)
    }

    pub fn shape(&self) -> (usize, usize) {
        self.table.dim()
    }

    pub fn n_actions(&self) -> usize {
        self.table.ncols()
    }

    pub fn get(&self, state: usize, action: usize) -> f64 {
        self.table[[state, action]]
    }

    pub fn set(&mut self, state: usize, action: usize, value: f64) {
        self.table[[state, action]] = value;
    }

    /// Values of every action in `state`.
    pub fn row(&self, state: usize) -> ArrayView1<f64> {
        self.table.row(state)
    }

    pub fn max(&self, state: usize) -> f64 {
        max(self.table.row(state))
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.table
    }

    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.table
    }

    /// Copies the contents of `other` without reallocating.
    pub fn assign(&mut self, other: &Table) {
        self.table.assign(&other.table);
    }

    pub fn reset(&mut self) {
        self.table.fill(self.initial_value);
    }
}

impl Index<(usize, usize)> for Table {
    type Output = f64;

    fn index(&self, (state, action): (usize, usize)) -> &f64 {
        &self.table[[state, action]]
    }
}

impl IndexMut<(usize, usize)> for Table {
    fn index_mut(&mut self, (state, action): (usize, usize)) -> &mut f64 {
        &mut self.table[[state, action]]
    }
}

/// Ordered collection of independent tables of the same shape.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleTable {
    models: Vec<Table>,
}

impl EnsembleTable {
    pub fn new(n_models: usize, n_states: usize, n_actions: usize, initial_value: f64) -> Result<Self> {
        Self::from_tables(
            (0..n_models)
                .map(|_| Table::new(n_states, n_actions, initial_value))
                .collect(),
        )
    }

    pub fn from_mdp(n_models: usize, mdp_info: &MdpInfo, initial_value: f64) -> Result<Self> {
        let (n_states, n_actions) = mdp_info.size();
        Self::new(n_models, n_states, n_actions, initial_value)
    }

    pub fn from_tables(models: Vec<Table>) -> Result<Self> {
        if models.is_empty() {
            return Err(TdError::InvalidConfig("empty ensemble".to_string()));
        }
        let shape: (usize, usize) = models[0].shape();
        if models.iter().any(|m| m.shape() != shape) {
            return Err(TdError::InvalidConfig(
                "ensemble models with different shapes".to_string(),
            ));
        }
        Ok(Self { models })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.models[0].shape()
    }

    pub fn model(&self, idx: usize) -> &Table {
        &self.models[idx]
    }

    pub fn model_mut(&mut self, idx: usize) -> &mut Table {
        &mut self.models[idx]
    }

    /// Mean of the members' action values in `state`.
    pub fn predict(&self, state: usize) -> Array1<f64> {
        let mut mean: Array1<f64> = Array1::zeros(self.shape().1);
        for model in self.models.iter() {
            mean += &model.row(state);
        }
        mean / self.models.len() as f64
    }

    pub fn reset(&mut self) {
        for model in self.models.iter_mut() {
            model.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn table_is_initialized_and_indexed() {
        let mut table: Table = Table::new(3, 2, 1e10);
        assert_eq!(table.shape(), (3, 2));
        assert!(table.values().iter().all(|v| *v == 1e10));

        table.set(1, 0, 2.0);
        table[(1, 1)] += 3.0;
        assert_eq!(table.get(1, 0), 2.0);
        assert_eq!(table[(1, 1)], 1e10 + 3.0);
        assert_eq!(table.row(1), array![2.0, 1e10 + 3.0]);

        table.reset();
        assert_eq!(table.get(1, 0), 1e10);
    }

    #[test]
    fn assign_copies_values() {
        let mut a: Table = Table::new(2, 2, 0.0);
        let mut b: Table = Table::new(2, 2, 0.0);
        b.set(0, 1, 5.0);
        a.assign(&b);
        assert_eq!(a.get(0, 1), 5.0);
        b.set(0, 1, 6.0);
        assert_eq!(a.get(0, 1), 5.0);
    }

    #[test]
    fn ensemble_members_are_independent() {
        let mut ensemble: EnsembleTable = EnsembleTable::new(2, 2, 3, 0.0).unwrap();
        assert_eq!(ensemble.len(), 2);
        ensemble.model_mut(0).set(1, 2, 4.0);
        assert_eq!(ensemble.model(0).get(1, 2), 4.0);
        assert_eq!(ensemble.model(1).get(1, 2), 0.0);
        assert_eq!(ensemble.predict(1), array![0.0, 0.0, 2.0]);
    }

    #[test]
    fn ensemble_rejects_mismatched_shapes() {
        assert!(EnsembleTable::from_tables(vec![]).is_err());
        assert!(
            EnsembleTable::from_tables(vec![Table::new(2, 2, 0.0), Table::new(3, 2, 0.0)])
                .is_err()
        );
    }
}
