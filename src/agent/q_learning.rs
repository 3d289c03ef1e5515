use std::rc::Rc;

use tracing::{debug, trace};

use super::{qlearning, TemporalDifference};
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// Watkins' off-policy Q-learning.
pub struct QLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    q: Table,
}

impl QLearning {
    pub fn new(mdp_info: Rc<MdpInfo>, learning_rate: EnumParameter) -> Self {
        debug!(gamma = mdp_info.gamma, "q-learning");
        Self {
            q: Table::from_mdp(&mdp_info, 0.0),
            mdp_info,
            learning_rate,
        }
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }
}

impl TemporalDifference for QLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;

        let q_current: f64 = self.q[(curr_obs, curr_action)];
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            qlearning(self.q.row(next_obs))
        };

        let learning_rate: f64 = self
            .learning_rate
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_current;
        self.q[(curr_obs, curr_action)] = q_current + learning_rate * temporal_difference;

        trace!(temporal_difference, "q-learning update");
        Ok(())
    }
}
