use std::rc::Rc;

use tracing::{debug, trace, warn};

use super::{qlearning, sarsa, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::error::{Result, TdError};
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter, ParameterKey};
use crate::table::Table;

/// Options of [`RQLearning`]. Exactly one of `beta` and `delta` must be set.
#[derive(Debug, Clone, Default)]
pub struct RQLearningConfig {
    /// Bootstrap from the greedy value instead of the policy's next action.
    pub off_policy: bool,
    pub beta: Option<EnumParameter>,
    pub delta: Option<EnumParameter>,
}

#[derive(Debug, Clone)]
enum ContinuationRate {
    Beta(EnumParameter),
    /// Scaled by the learning rate, which is also passed as the factor.
    Delta(EnumParameter),
}

impl ContinuationRate {
    fn value(&mut self, key: ParameterKey, q_next: f64, learning_rate: f64) -> Result<f64> {
        match self {
            ContinuationRate::Beta(beta) => beta.value(key, Some(q_next), None),
            ContinuationRate::Delta(delta) => {
                Ok(learning_rate * delta.value(key, Some(q_next), Some(learning_rate))?)
            }
        }
    }
}

/// RQ-learning: learns the reward `r_tilde` and the continuation value
/// `q_tilde` separately and combines them as `Q = r_tilde + gamma * q_tilde`.
pub struct RQLearning {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    continuation_rate: ContinuationRate,
    off_policy: bool,
    action_selection: Box<dyn ActionSelection>,
    q: Table,
    q_tilde: Table,
    r_tilde: Table,
    next_action: Option<usize>,
}

impl RQLearning {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        action_selection: Box<dyn ActionSelection>,
        config: RQLearningConfig,
    ) -> Result<Self> {
        let continuation_rate: ContinuationRate = match (config.beta, config.delta) {
            (Some(beta), None) => ContinuationRate::Beta(beta),
            (None, Some(delta)) => ContinuationRate::Delta(delta),
            (beta, delta) => {
                warn!(
                    beta = beta.is_some(),
                    delta = delta.is_some(),
                    "rq-learning needs exactly one continuation rate"
                );
                return Err(TdError::ContinuationRate);
            }
        };
        debug!(gamma = mdp_info.gamma, off_policy = config.off_policy, "rq-learning");
        let q: Table = Table::from_mdp(&mdp_info, 0.0);
        Ok(Self {
            q_tilde: q.clone(),
            r_tilde: q.clone(),
            q,
            mdp_info,
            learning_rate,
            continuation_rate,
            off_policy: config.off_policy,
            action_selection,
            next_action: None,
        })
    }

    pub fn q(&self) -> &Table {
        &self.q
    }

    pub fn q_tilde(&self) -> &Table {
        &self.q_tilde
    }

    pub fn r_tilde(&self) -> &Table {
        &self.r_tilde
    }

    fn next_q(&mut self, transition: &Transition, next_obs: usize) -> Result<f64> {
        if self.off_policy {
            return Ok(qlearning(self.q.row(next_obs)));
        }
        let next_action: usize = self.mdp_info.check_action(
            self.action_selection
                .get_action(&transition.next_state, self.q.row(next_obs)),
        )?;
        self.next_action = Some(next_action);
        Ok(sarsa(self.q.row(next_obs), next_action))
    }
}

impl TemporalDifference for RQLearning {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let (curr_obs, next_obs) = self.mdp_info.discrete_indices(transition)?;
        let curr_action: usize = transition.action;
        let key: ParameterKey = ParameterKey::StateAction(curr_obs, curr_action);

        self.next_action = None;

        let learning_rate: f64 = self
            .learning_rate
            .value(key, Some(transition.reward), None)?;
        let continuation: Option<(f64, f64)> = if transition.absorbing {
            None
        } else {
            let future_q_value: f64 = self.next_q(transition, next_obs)?;
            let continuation_rate: f64 =
                self.continuation_rate
                    .value(key, future_q_value, learning_rate)?;
            Some((future_q_value, continuation_rate))
        };

        let r_current: f64 = self.r_tilde[(curr_obs, curr_action)];
        self.r_tilde[(curr_obs, curr_action)] =
            r_current + learning_rate * (transition.reward - r_current);
        if let Some((future_q_value, continuation_rate)) = continuation {
            let q_tilde_current: f64 = self.q_tilde[(curr_obs, curr_action)];
            self.q_tilde[(curr_obs, curr_action)] =
                q_tilde_current + continuation_rate * (future_q_value - q_tilde_current);
        }

        self.q[(curr_obs, curr_action)] = self.r_tilde[(curr_obs, curr_action)]
            + self.mdp_info.gamma * self.q_tilde[(curr_obs, curr_action)];

        trace!(
            r_tilde = self.r_tilde[(curr_obs, curr_action)],
            q_tilde = self.q_tilde[(curr_obs, curr_action)],
            "rq-learning update"
        );
        Ok(())
    }

    fn episode_start(&mut self) {
        self.next_action = None;
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}
