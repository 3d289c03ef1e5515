use std::rc::Rc;

use tracing::{debug, trace};

use super::{check_lambda, sarsa, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::error::Result;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;
use crate::trace::{EligibilityTrace, TraceKind};

/// Tabular SARSA(lambda).
pub struct SarsaLambda {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    lambda_factor: f64,
    action_selection: Box<dyn ActionSelection>,
    q: Table,
    trace: EligibilityTrace,
    next_action: Option<usize>,
}

impl SarsaLambda {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        lambda_factor: f64,
        trace_kind: TraceKind,
        action_selection: Box<dyn ActionSelection>,
    ) -> Result<Self> {
        let lambda_factor: f64 = check_lambda(lambda_factor)?;
        let (n_states, n_actions) = mdp_info.size();
        debug!(gamma = mdp_info.gamma, lambda_factor, ?trace_kind, "sarsa(lambda)");
        Ok(Self {
            q: Table::new(n_states, n_actions, 0.0),
            trace: EligibilityTrace::new(n_states, n_actions, trace_kind),
            mdp_info,
            learning_rate,
            lambda_factor,
            action_selection,
            next_action: None,
        })
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_mut(&mut self) -> &mut Table {
        &mut self.q
    }

    pub fn trace(&self) -> &EligibilityTrace {
        &self.trace
    }
}

impl TemporalDifference for SarsaLambda {
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
        self.trace.update(curr_obs, curr_action);
        self.q
            .values_mut()
            .scaled_add(learning_rate * temporal_difference, self.trace.values());
        self.trace
            .decay(self.mdp_info.gamma * self.lambda_factor);

        trace!(temporal_difference, next_action, "sarsa(lambda) update");
        Ok(())
    }

    fn episode_start(&mut self) {
        self.trace.reset();
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}
