use std::rc::Rc;

use tracing::{debug, trace};

use super::{qlearning, TemporalDifference};
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// Speedy Q-learning: bootstraps from both the current table and the one
/// of the previous step.
pub struct SpeedyQLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    q: Table,
    old_q: Table,
}

impl SpeedyQLearning {
    pub fn new(mdp_info: Rc<MdpInfo>, learning_rate: EnumParameter) -> Self {
        debug!(gamma = mdp_info.gamma, "speedy q-learning");
        let q: Table = Table::from_mdp(&mdp_info, 0.0);
        Self {
            old_q: q.clone(),
            q,
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

    /// Table as it was before the last update.
    pub fn old_q(&self) -> &Table {
        &self.old_q
    }
}

impl TemporalDifference for SpeedyQLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;

        let (max_q_cur, max_q_old) = if transition.absorbing {
            (0.0, 0.0)
        } else {
            (qlearning(self.q.row(next_obs)), qlearning(self.old_q.row(next_obs)))
        };
        let target_cur: f64 = transition.reward + self.mdp_info.gamma * max_q_cur;
        let target_old: f64 = transition.reward + self.mdp_info.gamma * max_q_old;

        let learning_rate: f64 = self
            .learning_rate
            .call(ParameterKey::StateAction(curr_obs, curr_action))?;
        let q_cur: f64 = self.q[(curr_obs, curr_action)];
        let q_new: f64 = q_cur
            + learning_rate * (target_old - q_cur)
            + (1.0 - learning_rate) * (target_cur - target_old);

        self.old_q.assign(&self.q);
        self.q[(curr_obs, curr_action)] = q_new;

        trace!(temporal_difference = target_old - q_cur, "speedy q-learning update");
        Ok(())
    }
}
