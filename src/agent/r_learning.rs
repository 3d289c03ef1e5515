use std::rc::Rc;

use tracing::{debug, trace};

use super::{qlearning, TemporalDifference};
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// Undiscounted average-reward learning. The discount of the MDP is not
/// used; `rho` tracks the reward rate and moves only on greedy steps.
pub struct RLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    beta: EnumParameter,
    q: Table,
    rho: f64,
}

impl RLearning {
    pub fn new(mdp_info: Rc<MdpInfo>, learning_rate: EnumParameter, beta: EnumParameter) -> Self {
        debug!("r-learning");
        Self {
            q: Table::from_mdp(&mdp_info, 0.0),
            mdp_info,
            learning_rate,
            beta,
            rho: 0.0,
        }
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }

    /// Average reward estimate.
    pub fn rho(&self) -> f64 {
        self.rho
    }
}

impl TemporalDifference for RLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;
        let key: ParameterKey = ParameterKey::StateAction(curr_obs, curr_action);

        let q_current: f64 = self.q[(curr_obs, curr_action)];
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            qlearning(self.q.row(next_obs))
        };

        let learning_rate: f64 = self.learning_rate.call(key)?;
        let temporal_difference: f64 = transition.reward - self.rho + future_q_value - q_current;
        let q_new: f64 = q_current + learning_rate * temporal_difference;
        self.q[(curr_obs, curr_action)] = q_new;

        let q_max: f64 = self.q.max(curr_obs);
        if q_new == q_max {
            let rho_difference: f64 = transition.reward + future_q_value - q_max - self.rho;
            self.rho += self.beta.call(key)? * rho_difference;
        }

        trace!(temporal_difference, rho = self.rho, "r-learning update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter::ConstantParameter;
    use crate::test_utils::assert_close;

    fn agent(alpha: f64) -> RLearning {
        let mdp_info: MdpInfo = MdpInfo::discrete(1, 2, 0.9, 100).unwrap();
        RLearning::new(
            Rc::new(mdp_info),
            ConstantParameter::new(alpha).into(),
            ConstantParameter::new(0.1).into(),
        )
    }

    #[test]
    fn rho_follows_only_greedy_updates() {
        let mut agent: RLearning = agent(0.5);
        agent.fit(&[Transition::discrete(0, 0, 1.0, 0, false)]).unwrap();
        // delta = 1, Q(0, 0) = 0.5 is the new max
        assert_close(agent.q().get(0, 0), 0.5);
        assert_close(agent.rho(), 0.1 * (1.0 + 0.0 - 0.5));

        let rho: f64 = agent.rho();
        agent.fit(&[Transition::discrete(0, 1, 0.0, 0, false)]).unwrap();
        // delta = 0 - 0.05 + 0.5 = 0.45, Q(0, 1) = 0.225 stays below the max
        assert_close(agent.q().get(0, 1), 0.225);
        assert_eq!(agent.rho(), rho);
    }

    #[test]
    fn discount_is_ignored() {
        let mut agent: RLearning = agent(1.0);
        agent.q_mut().set(0, 1, 2.0);
        agent.fit(&[Transition::discrete(0, 0, 1.0, 0, false)]).unwrap();
        assert_close(agent.q().get(0, 0), 3.0);
    }

    #[test]
    fn absorbing_state_has_no_bootstrap() {
        let mut agent: RLearning = agent(1.0);
        agent.q_mut().set(0, 1, 2.0);
        agent.fit(&[Transition::discrete(0, 0, 1.0, 0, true)]).unwrap();
        assert_close(agent.q().get(0, 0), 1.0);
        assert_eq!(agent.rho(), 0.0);
    }

    #[test]
    fn zero_learning_rate_changes_nothing() {
        let mut agent: RLearning = agent(0.0);
        agent.q_mut().set(0, 1, 2.0);
        let before: Table = agent.q().clone();
        agent.fit(&[Transition::discrete(0, 1, 5.0, 0, false)]).unwrap();
        assert_eq!(agent.q(), &before);
    }
}
