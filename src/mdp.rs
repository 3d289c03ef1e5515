mod space;

pub use space::{SpaceInfo, SpaceType, SpaceTypeBounds};

use tracing::warn;

use crate::error::{Result, TdError};
use crate::observation::Transition;

/// Immutable description of the decision process shared by a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct MdpInfo {
    pub observation_space: SpaceInfo,
    pub action_space: SpaceInfo,
    pub gamma: f64,
    pub horizon: usize,
}

impl MdpInfo {
    pub fn new(
        observation_space: SpaceInfo,
        action_space: SpaceInfo,
        gamma: f64,
        horizon: usize,
    ) -> Result<Self> {
        if action_space.get_type() != SpaceType::Discrete {
            warn!("rejected a non discrete action space");
            return Err(TdError::Unsupported("a non discrete action space"));
        }
        if !(0.0..=1.0).contains(&gamma) {
            warn!(gamma, "rejected discount factor");
            return Err(TdError::InvalidConfig(format!(
                "gamma must be in [0, 1], got {}",
                gamma
            )));
        }
        if horizon == 0 {
            return Err(TdError::InvalidConfig("horizon must be positive".to_string()));
        }
        Ok(Self {
            observation_space,
            action_space,
            gamma,
            horizon,
        })
    }

    /// Shorthand for a finite MDP with `n_states` states and `n_actions` actions.
    pub fn discrete(n_states: usize, n_actions: usize, gamma: f64, horizon: usize) -> Result<Self> {
        Self::new(
            SpaceInfo::discrete(n_states)?,
            SpaceInfo::discrete(n_actions)?,
            gamma,
            horizon,
        )
    }

    pub fn n_states(&self) -> usize {
        self.observation_space.get_discrete_combinations()
    }

    pub fn n_actions(&self) -> usize {
        self.action_space.get_discrete_combinations()
    }

    /// Table shape `(n_states, n_actions)`.
    pub fn size(&self) -> (usize, usize) {
        (self.n_states(), self.n_actions())
    }

    pub fn check_action(&self, action: usize) -> Result<usize> {
        let size: usize = self.n_actions();
        if action >= size {
            return Err(TdError::IndexOutOfRange {
                kind: "action",
                index: action,
                size,
            });
        }
        Ok(action)
    }

    pub fn check_state(&self, state: usize) -> Result<usize> {
        let size: usize = self.n_states();
        if state >= size {
            return Err(TdError::IndexOutOfRange {
                kind: "state",
                index: state,
                size,
            });
        }
        Ok(state)
    }

    /// Validates a transition for a tabular rule and returns its
    /// `(state, next_state)` indices.
    pub fn discrete_indices(&self, transition: &Transition) -> Result<(usize, usize)> {
        if self.observation_space.get_type() != SpaceType::Discrete {
            return Err(TdError::Unsupported("a tabular rule on a non discrete state space"));
        }
        let state: usize = self.check_state(transition.state.index()?)?;
        let next_state: usize = self.check_state(transition.next_state.index()?)?;
        self.check_action(transition.action)?;
        Ok((state, next_state))
    }
}
