use std::rc::Rc;

use ndarray::Array1;
use tracing::{debug, trace, warn};

use super::{check_lambda, parameter_key, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::approximator::Regressor;
use crate::error::{Result, TdError};
use crate::features::Features;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter};

/// SARSA(lambda) over a parametric action-value function, with an
/// accumulating trace in weight space.
pub struct SarsaLambdaContinuous {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    lambda_factor: f64,
    approximator: Box<dyn Regressor>,
    features: Box<dyn Features>,
    action_selection: Box<dyn ActionSelection>,
    trace: Array1<f64>,
    next_action: Option<usize>,
}

impl SarsaLambdaContinuous {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        lambda_factor: f64,
        approximator: Box<dyn Regressor>,
        features: Box<dyn Features>,
        action_selection: Box<dyn ActionSelection>,
    ) -> Result<Self> {
        let lambda_factor: f64 = check_lambda(lambda_factor)?;
        if features.size() != approximator.input_size() {
            warn!(
                features = features.size(),
                input = approximator.input_size(),
                "features do not fit the approximator"
            );
            return Err(TdError::FeatureShape {
                expected: approximator.input_size(),
                found: features.size(),
            });
        }
        if approximator.n_actions() != mdp_info.n_actions() {
            return Err(TdError::InvalidConfig(format!(
                "approximator over {} actions for an MDP with {}",
                approximator.n_actions(),
                mdp_info.n_actions()
            )));
        }
        debug!(
            gamma = mdp_info.gamma,
            lambda_factor,
            weights = approximator.weights_size(),
            "sarsa(lambda) with approximation"
        );
        Ok(Self {
            trace: Array1::zeros(approximator.weights_size()),
            mdp_info,
            learning_rate,
            lambda_factor,
            approximator,
            features,
            action_selection,
            next_action: None,
        })
    }

    pub fn approximator(&self) -> &dyn Regressor {
        self.approximator.as_ref()
    }

    pub fn approximator_mut(&mut self) -> &mut dyn Regressor {
        self.approximator.as_mut()
    }

    pub fn weights(&self) -> Array1<f64> {
        self.approximator.get_weights()
    }

    pub fn trace(&self) -> &Array1<f64> {
        &self.trace
    }
}

impl TemporalDifference for SarsaLambdaContinuous {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let curr_action: usize = self.mdp_info.check_action(transition.action)?;
        let phi_state: Array1<f64> = self.features.phi(&transition.state)?;
        let q_current: f64 = self.approximator.predict(&phi_state, curr_action);

        let learning_rate: f64 = self
            .learning_rate
            .call(parameter_key(&transition.state, curr_action))?;

        let phi_next_state: Array1<f64> = self.features.phi(&transition.next_state)?;
        let next_q_values: Array1<f64> = self.approximator.predict_all(&phi_next_state);
        let next_action: usize = self.mdp_info.check_action(
            self.action_selection
                .get_action(&transition.next_state, next_q_values.view()),
        )?;
        self.next_action = Some(next_action);
        let future_q_value: f64 = if transition.absorbing {
            0.0
        } else {
            next_q_values[next_action]
        };

        self.trace *= self.mdp_info.gamma * self.lambda_factor;
        self.trace += &self.approximator.diff(&phi_state, curr_action);

        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_current;
        let mut weights: Array1<f64> = self.approximator.get_weights();
        weights.scaled_add(learning_rate * temporal_difference, &self.trace);
        self.approximator.set_weights(weights)?;

        trace!(temporal_difference, next_action, "sarsa(lambda) with approximation update");
        Ok(())
    }

    fn episode_start(&mut self) {
        self.trace.fill(0.0);
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approximator::LinearApproximator;
    use crate::features::{IdentityFeatures, OneHotFeatures};
    use crate::mdp::SpaceInfo;
    use crate::parameter::ConstantParameter;
    use crate::test_utils::{assert_close, FixedAction};
    use ndarray::array;

    fn mdp_info() -> Rc<MdpInfo> {
        let observation_space: SpaceInfo = SpaceInfo::continuous(&[-1.0, -1.0], &[1.0, 1.0]).unwrap();
        Rc::new(MdpInfo::new(observation_space, SpaceInfo::discrete(2).unwrap(), 0.5, 100).unwrap())
    }

    fn agent(alpha: f64) -> SarsaLambdaContinuous {
        SarsaLambdaContinuous::new(
            mdp_info(),
            ConstantParameter::new(alpha).into(),
            0.5,
            Box::new(LinearApproximator::new(2, 2)),
            Box::new(IdentityFeatures::new(2)),
            Box::new(FixedAction(0)),
        )
        .unwrap()
    }

    #[test]
    fn weights_follow_the_trace() {
        let mut agent: SarsaLambdaContinuous = agent(0.5);
        agent
            .fit(&[Transition::continuous(array![1.0, 0.0], 0, 1.0, array![0.0, 1.0], false)])
            .unwrap();
        assert_eq!(agent.trace(), &array![1.0, 0.0, 0.0, 0.0]);
        assert_eq!(agent.weights(), array![0.5, 0.0, 0.0, 0.0]);
        assert_eq!(agent.next_action(), Some(0));

        agent
            .fit(&[Transition::continuous(array![0.0, 1.0], 1, 0.0, array![1.0, 0.0], false)])
            .unwrap();
        assert_eq!(agent.trace(), &array![0.25, 0.0, 0.0, 1.0]);
        // delta = 0.5 * 0.5, step = 0.5 * delta
        let weights: Array1<f64> = agent.weights();
        assert_close(weights[0], 0.5 + 0.125 * 0.25);
        assert_close(weights[3], 0.125);
    }

    #[test]
    fn absorbing_state_has_no_bootstrap() {
        let mut agent: SarsaLambdaContinuous = agent(1.0);
        agent
            .approximator_mut()
            .set_weights(array![0.0, 0.0, 5.0, 5.0])
            .unwrap();
        agent
            .fit(&[Transition::continuous(array![1.0, 0.0], 0, 2.0, array![1.0, 1.0], true)])
            .unwrap();
        assert_eq!(agent.weights(), array![2.0, 0.0, 5.0, 5.0]);
    }

    #[test]
    fn episode_start_clears_the_trace() {
        let mut agent: SarsaLambdaContinuous = agent(0.5);
        agent
            .fit(&[Transition::continuous(array![1.0, 1.0], 1, 1.0, array![0.0, 1.0], false)])
            .unwrap();
        agent.episode_start();
        assert!(agent.trace().iter().all(|e| *e == 0.0));
    }

    #[test]
    fn zero_learning_rate_changes_nothing() {
        let mut agent: SarsaLambdaContinuous = agent(0.0);
        agent
            .approximator_mut()
            .set_weights(array![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        agent
            .fit(&[Transition::continuous(array![1.0, 1.0], 1, 1.0, array![0.0, 1.0], false)])
            .unwrap();
        assert_eq!(agent.weights(), array![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn bad_next_state_leaves_trace_and_weights_alone() {
        let mut agent: SarsaLambdaContinuous = agent(0.5);
        agent
            .approximator_mut()
            .set_weights(array![1.0, 2.0, 3.0, 4.0])
            .unwrap();
        assert_eq!(
            agent.fit(&[Transition::continuous(array![1.0, 0.0], 0, 1.0, array![0.0], false)]),
            Err(TdError::FeatureShape { expected: 2, found: 1 })
        );
        assert!(agent.trace().iter().all(|e| *e == 0.0));
        assert_eq!(agent.weights(), array![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn features_must_fit_the_approximator() {
        let result = SarsaLambdaContinuous::new(
            mdp_info(),
            ConstantParameter::new(0.1).into(),
            0.5,
            Box::new(LinearApproximator::new(2, 2)),
            Box::new(OneHotFeatures::new(3)),
            Box::new(FixedAction(0)),
        );
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some(TdError::FeatureShape { expected: 2, found: 3 }.to_string())
        );
    }
}
