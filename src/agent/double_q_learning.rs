use std::rc::Rc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace, warn};

use super::TemporalDifference;
use crate::error::{Result, TdError};
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::EnsembleTable;
use crate::utils::argmax_random_tie;

/// Double Q-learning: two estimators, one picks the greedy action and the
/// other evaluates it.
pub struct DoubleQLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: Vec<EnumParameter>,
    q: EnsembleTable,
    rng: StdRng,
}

impl DoubleQLearning {
    pub fn new(mdp_info: Rc<MdpInfo>, learning_rate: EnumParameter, seed: u64) -> Result<Self> {
        let q: EnsembleTable = EnsembleTable::from_mdp(2, &mdp_info, 0.0)?;
        Self::with_ensemble(mdp_info, learning_rate, q, seed)
    }

    /// Uses a caller supplied ensemble, which must hold exactly two tables
    /// matching the MDP.
    pub fn with_ensemble(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        q: EnsembleTable,
        seed: u64,
    ) -> Result<Self> {
        if q.len() != 2 {
            warn!(models = q.len(), "double q-learning ensemble of the wrong size");
            return Err(TdError::EnsembleSize {
                expected: 2,
                found: q.len(),
            });
        }
        if q.shape() != mdp_info.size() {
            return Err(TdError::InvalidConfig(format!(
                "ensemble of shape {:?} for an MDP of size {:?}",
                q.shape(),
                mdp_info.size()
            )));
        }
        debug!(gamma = mdp_info.gamma, seed, "double q-learning");
        Ok(Self {
            mdp_info,
            learning_rate: vec![learning_rate.clone(), learning_rate],
            q,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn q(&self) -> &EnsembleTable {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut EnsembleTable {
        &mut self.q
    }
}

impl TemporalDifference for DoubleQLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;

        let approximator_idx: usize = if self.rng.gen::<f64>() < 0.5 { 0 } else { 1 };
        let q_current: f64 = self.q.model(approximator_idx)[(curr_obs, curr_action)];

        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            let best_next_action: usize =
                argmax_random_tie(self.q.model(approximator_idx).row(next_obs), &mut self.rng);
            self.q.model(1 - approximator_idx)[(next_obs, best_next_action)]
        };

        let learning_rate: f64 = self.learning_rate[approximator_idx]
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_current;
        self.q.model_mut(approximator_idx)[(curr_obs, curr_action)] =
            q_current + learning_rate * temporal_difference;

        trace!(temporal_difference, approximator_idx, "double q-learning update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::{ConstantParameter, ExponentialDecayParameter};
    use crate::table::Table;
    use crate::test_utils::assert_close;

    fn mdp_info() -> Rc<MdpInfo> {
        Rc::new(MdpInfo::discrete(2, 2, 0.5, 100).unwrap())
    }

    #[test]
    fn ensemble_must_have_two_models() {
        for n_models in [1, 3] {
            let q: EnsembleTable = EnsembleTable::new(n_models, 2, 2, 0.0).unwrap();
            assert_eq!(
                DoubleQLearning::with_ensemble(mdp_info(), ConstantParameter::new(0.1).into(), q, 0)
                    .err(),
                Some(TdError::EnsembleSize {
                    expected: 2,
                    found: n_models
                })
            );
        }
        let q: EnsembleTable = EnsembleTable::new(2, 3, 2, 0.0).unwrap();
        assert!(
            DoubleQLearning::with_ensemble(mdp_info(), ConstantParameter::new(0.1).into(), q, 0)
                .is_err()
        );
    }

    #[test]
    fn members_are_selected_evenly() {
        let mut agent: DoubleQLearning =
            DoubleQLearning::new(mdp_info(), ConstantParameter::new(1.0).into(), 11).unwrap();
        let mut selected: [usize; 2] = [0; 2];
        let n_calls: usize = 4000;
        for _ in 0..n_calls {
            agent.q_mut().reset();
            agent.fit(&[Transition::discrete(0, 0, 1.0, 1, true)]).unwrap();
            for (idx, count) in selected.iter_mut().enumerate() {
                if agent.q().model(idx).get(0, 0) == 1.0 {
                    *count += 1;
                }
            }
        }
        assert_eq!(selected[0] + selected[1], n_calls);
        let frequency: f64 = selected[0] as f64 / n_calls as f64;
        assert!((frequency - 0.5).abs() < 0.05, "frequency {}", frequency);
    }

    #[test]
    fn other_model_evaluates_the_greedy_action() {
        let first: Table = {
            let mut t: Table = Table::new(2, 2, 0.0);
            t.set(1, 1, 10.0);
            t
        };
        let second: Table = {
            let mut t: Table = Table::new(2, 2, 0.0);
            t.set(1, 0, 10.0);
            t.set(1, 1, 2.0);
            t
        };
        let q: EnsembleTable = EnsembleTable::from_tables(vec![first, second]).unwrap();
        let mut agent: DoubleQLearning =
            DoubleQLearning::with_ensemble(mdp_info(), ConstantParameter::new(1.0).into(), q, 5)
                .unwrap();
        agent.fit(&[Transition::discrete(0, 0, 0.0, 1, false)]).unwrap();
        // model 0 picks action 1 and model 1 values it at 2; model 1 picks
        // action 0 and model 0 values it at 0
        let updated: (f64, f64) = (agent.q().model(0).get(0, 0), agent.q().model(1).get(0, 0));
        assert!(
            (updated.0 == 1.0 && updated.1 == 0.0) || (updated.0 == 0.0 && updated.1 == 0.0),
            "{:?}",
            updated
        );
    }

    #[test]
    fn zero_learning_rate_changes_nothing() {
        let mut agent: DoubleQLearning =
            DoubleQLearning::new(mdp_info(), ConstantParameter::new(0.0).into(), 7).unwrap();
        agent.q_mut().model_mut(0).set(1, 0, 3.0);
        agent.q_mut().model_mut(1).set(1, 1, 2.0);
        let before: EnsembleTable = agent.q().clone();
        for _ in 0..10 {
            agent.fit(&[Transition::discrete(0, 0, 5.0, 1, false)]).unwrap();
        }
        assert_eq!(agent.q(), &before);
    }

    #[test]
    fn each_member_owns_its_schedule() {
        let mdp_info: Rc<MdpInfo> = Rc::new(MdpInfo::discrete(2, 1, 0.0, 10).unwrap());
        let mut agent: DoubleQLearning = DoubleQLearning::new(
            mdp_info,
            ExponentialDecayParameter::new(1.0, 1.0, None).unwrap().into(),
            3,
        )
        .unwrap();
        for _ in 0..50 {
            agent.fit(&[Transition::discrete(0, 0, 2.0, 1, true)]).unwrap();
        }
        // the first visit of each member uses a step size of one
        assert_close(agent.q().model(0).get(0, 0), 2.0);
        assert_close(agent.q().model(1).get(0, 0), 2.0);
    }
}
