use std::rc::Rc;

use ndarray::Array1;
use tracing::{debug, trace};

use super::{check_lambda, parameter_key, TemporalDifference};
use crate::action_selection::ActionSelection;
use crate::approximator::{action_features, LinearApproximator, Regressor};
use crate::error::Result;
use crate::features::Features;
use crate::mdp::MdpInfo;
use crate::observation::Transition;
use crate::parameter::{EnumParameter, Parameter};

/// True online SARSA(lambda) with a dutch trace, linear approximation only.
pub struct TrueOnlineSarsaLambda {
    mdp_info: Rc<MdpInfo>,
    learning_rate: EnumParameter,
    lambda_factor: f64,
    approximator: LinearApproximator,
    features: Box<dyn Features>,
    action_selection: Box<dyn ActionSelection>,
    trace: Array1<f64>,
    q_old: Option<f64>,
    next_action: Option<usize>,
}

impl TrueOnlineSarsaLambda {
    pub fn new(
        mdp_info: Rc<MdpInfo>,
        learning_rate: EnumParameter,
        lambda_factor: f64,
        features: Box<dyn Features>,
        action_selection: Box<dyn ActionSelection>,
    ) -> Result<Self> {
        let lambda_factor: f64 = check_lambda(lambda_factor)?;
        let approximator: LinearApproximator =
            LinearApproximator::new(features.size(), mdp_info.n_actions());
        debug!(
            gamma = mdp_info.gamma,
            lambda_factor,
            weights = approximator.weights_size(),
            "true online sarsa(lambda)"
        );
        Ok(Self {
            trace: Array1::zeros(approximator.weights_size()),
            mdp_info,
            learning_rate,
            lambda_factor,
            approximator,
            features,
            action_selection,
            q_old: None,
            next_action: None,
        })
    }

    pub fn approximator(&self) -> &LinearApproximator {
        &self.approximator
    }

    pub fn approximator_mut(&mut self) -> &mut LinearApproximator {
        &mut self.approximator
    }

    pub fn weights(&self) -> Array1<f64> {
        self.approximator.get_weights()
    }

    pub fn trace(&self) -> &Array1<f64> {
        &self.trace
    }

    /// Bootstrap value of the previous step, `None` at the start of an episode.
    pub fn q_old(&self) -> Option<f64> {
        self.q_old
    }
}

impl TemporalDifference for TrueOnlineSarsaLambda {
    fn update(&mut self, transition: &Transition) -> Result<()> {
        let n_actions: usize = self.mdp_info.n_actions();
        let curr_action: usize = self.mdp_info.check_action(transition.action)?;
        let phi_state: Array1<f64> = self.features.phi(&transition.state)?;
        let phi_state_action: Array1<f64> = action_features(&phi_state, curr_action, n_actions);
        let q_current: f64 = self.approximator.predict(&phi_state, curr_action);
        let q_old: f64 = self.q_old.unwrap_or(q_current);

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

        let decay: f64 = self.mdp_info.gamma * self.lambda_factor;
        let e_phi: f64 = self.trace.dot(&phi_state_action);
        self.trace *= decay;
        self.trace
            .scaled_add(learning_rate * (1.0 - decay * e_phi), &phi_state_action);

        let temporal_difference: f64 =
            transition.reward + self.mdp_info.gamma * future_q_value - q_old;
        let mut weights: Array1<f64> = self.approximator.get_weights();
        weights.scaled_add(temporal_difference, &self.trace);
        weights.scaled_add(learning_rate * (q_old - q_current), &phi_state_action);
        self.approximator.set_weights(weights)?;
        self.q_old = Some(future_q_value);

        trace!(temporal_difference, next_action, "true online sarsa(lambda) update");
        Ok(())
    }

    fn episode_start(&mut self) {
        self.q_old = None;
        self.trace.fill(0.0);
    }

    fn next_action(&self) -> Option<usize> {
        self.next_action
    }
}
