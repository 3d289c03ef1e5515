use std::rc::Rc;

use ndarray::Array1;
use tracing::{debug, trace};

use super::{check_probs, expected_sarsa, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// Expected SARSA: bootstraps from the mean next value under the policy.
pub struct ExpectedSarsa {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    action_selection: Box<dyn ActionSelection>,
    q: Table,
}

impl ExpectedSarsa {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        action_selection: Box<dyn ActionSelection>,
    ) -> Self {
        debug!(gamma = mdp_info.gamma, "expected sarsa");
        Self {
            q: Table::from_mdp(&mdp_info, 0.0),
            mdp_info,
            learning_rate,
            action_selection,
        }
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }
}

impl TemporalDifference for ExpectedSarsa {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;

        let q_current: f64 = self.q[(curr_obs, curr_action)];
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            let policy_probs: Array1<f64> = self
                .action_selection
                .get_exploration_probs(&transition.next_state, self.q.row(next_obs));
            check_probs(&policy_probs, self.mdp_info.n_actions())?;
            expected_sarsa(self.q.row(next_obs), &policy_probs)
        };

        let learning_rate: f64 = self
            .learning_rate
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_current;
        self.q[(curr_obs, curr_action)] = q_current + learning_rate * temporal_difference;

        trace!(temporal_difference, "expected sarsa update");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TdError;
    use crate::parameter::ConstantParameter;
    use crate::test_utils::{assert_close, FixedProbs};
    use ndarray::array;

    fn agent(alpha: f64, probs: Array1<f64>) -> ExpectedSarsa {
        let mdp_info: MdpInfo = MdpInfo::discrete(3, 2, 0.9, 100).unwrap();
        ExpectedSarsa::new(
            Rc::new(mdp_info),
            ConstantParameter::new(alpha).into(),
            Box::new(FixedProbs(probs)),
        )
    }

    #[test]
    fn bootstraps_from_the_policy_mean() {
        let mut agent: ExpectedSarsa = agent(0.5, array![0.75, 0.25]);
        agent.q_mut().set(0, 1, 2.0);
        agent.q_mut().set(2, 0, 4.0);
        agent.q_mut().set(2, 1, 4.0);
        agent.fit(&[Transition::discrete(0, 1, 1.0, 2, false)]).unwrap();
        assert_close(agent.q().get(0, 1), 3.3);

        agent.q_mut().set(1, 0, 0.0);
        agent.q_mut().set(2, 1, 8.0);
        agent.fit(&[Transition::discrete(1, 0, 0.0, 2, false)]).unwrap();
        // mean = 0.75 * 4 + 0.25 * 8 = 5
        assert_close(agent.q().get(1, 0), 0.5 * 0.9 * 5.0);
    }

    #[test]
    fn absorbing_state_has_no_bootstrap() {
        let mut agent: ExpectedSarsa = agent(1.0, array![0.5, 0.5]);
        agent.q_mut().set(2, 0, 100.0);
        agent.fit(&[Transition::discrete(0, 0, 2.0, 2, true)]).unwrap();
        assert_eq!(agent.q().get(0, 0), 2.0);
    }

    #[test]
    fn zero_learning_rate_changes_nothing() {
        let mut agent: ExpectedSarsa = agent(0.0, array![0.5, 0.5]);
        agent.q_mut().set(2, 0, 1.0);
        let before: Table = agent.q().clone();
        agent.fit(&[Transition::discrete(0, 0, 2.0, 2, false)]).unwrap();
        assert_eq!(agent.q(), &before);
    }

    #[test]
    fn distribution_must_cover_every_action() {
        let mut agent: ExpectedSarsa = agent(0.5, array![1.0]);
        assert_eq!(
            agent.fit(&[Transition::discrete(0, 0, 2.0, 2, false)]),
            Err(TdError::FeatureShape {
                expected: 2,
                found: 1
            })
        );
    }
}
