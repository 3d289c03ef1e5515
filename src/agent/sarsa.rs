use std::rc::Rc;

use tracing::{debug, trace};

use super::{sarsa, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// One-step on-policy SARSA.
pub struct Sarsa {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    action_selection: Box<dyn ActionSelection>,
    q: Table,
    next_action: Option<usize>,
}

impl Sarsa {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        action_selection: Box<dyn ActionSelection>,
    ) -> Self {
        debug!(gamma = mdp_info.gamma, "sarsa");
        Self {
            q: Table::from_mdp(&mdp_info, 0.0),
            mdp_info,
            learning_rate,
            action_selection,
            next_action: None,
        }
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }
}

impl TemporalDifference for Sarsa {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;

        let q_current: f64 = self.q[(curr_obs, curr_action)];
        let next_action: usize = self.mdp_info.check_action(
            self.action_selection
                .get_action(&transition.next_state, self.q.row(next_obs)),
        )?;
        self.next_action = Some(next_action);
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            sarsa(self.q.row(next_obs), next_action)
        };

        let learning_rate: f64 = self
            .learning_rate
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_current;
        self.q[(curr_obs, curr_action)] = q_current + learning_rate * temporal_difference;

        trace!(temporal_difference, next_action, "sarsa update");
        Ok(())
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}
