use ndarray::{Array1, ArrayView1};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::ActionSelection;
use crate::error::{Result, TdError};
use crate::observation::Observation;
use crate::utils::{argmax_random_tie, max};

/// Uniform action with probability `epsilon`, greedy otherwise. Ties
/// between greedy actions are broken uniformly.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f64,
    rng: StdRng,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            epsilon: 0.1,
            rng: StdRng::seed_from_u64(42),
        }
    }
}

impl EpsilonGreedy {
    pub fn new(epsilon: f64, seed: u64) -> Result<Self> {
        Ok(Self {
            epsilon: check_epsilon(epsilon)?,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn should_explore(&mut self) -> bool {
        self.epsilon != 0.0 && self.rng.gen::<f64>() < self.epsilon
    }

    pub fn get_epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        self.epsilon = check_epsilon(epsilon)?;
        Ok(())
    }
}

fn check_epsilon(epsilon: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&epsilon) {
        return Err(TdError::InvalidConfig(format!(
            "epsilon must be in [0, 1], got {}",
            epsilon
        )));
    }
    Ok(epsilon)
}

impl ActionSelection for EpsilonGreedy {
    fn get_action(&mut self, _obs: &Observation, values: ArrayView1<f64>) -> usize {
        if self.should_explore() {
            self.rng.gen_range(0..values.len())
        } else {
            argmax_random_tie(values, &mut self.rng)
        }
    }

    fn get_exploration_probs(&mut self, _obs: &Observation, values: ArrayView1<f64>) -> Array1<f64> {
        let n_actions: usize = values.len();
        let best: f64 = max(values);
        let n_best: usize = values.iter().filter(|v| **v == best).count();
        values.mapv(|v| {
            let greedy: f64 = if v == best {
                (1.0 - self.epsilon) / n_best as f64
            } else {
                0.0
            };
            greedy + self.epsilon / n_actions as f64
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::assert_close;
    use ndarray::array;

    #[test]
    fn probabilities_split_ties() {
        let mut policy: EpsilonGreedy = EpsilonGreedy::new(0.2, 0).unwrap();
        let probs: Array1<f64> =
            policy.get_exploration_probs(&Observation::Discrete(0), array![1.0, 3.0, 3.0, 0.0].view());
        assert_close(probs[0], 0.05);
        assert_close(probs[1], 0.45);
        assert_close(probs[2], 0.45);
        assert_close(probs.sum(), 1.0);
    }

    #[test]
    fn greedy_without_exploration() {
        let mut policy: EpsilonGreedy = EpsilonGreedy::new(0.0, 3).unwrap();
        for _ in 0..50 {
            assert_eq!(
                policy.get_action(&Observation::Discrete(0), array![0.0, 2.0, 1.0].view()),
                1
            );
        }
    }

    #[test]
    fn explores_every_action() {
        let mut policy: EpsilonGreedy = EpsilonGreedy::new(1.0, 5).unwrap();
        let mut seen: [bool; 3] = [false; 3];
        for _ in 0..200 {
            seen[policy.get_action(&Observation::Discrete(0), array![0.0, 2.0, 1.0].view())] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn epsilon_is_validated() {
        assert!(EpsilonGreedy::new(1.5, 0).is_err());
        let mut policy: EpsilonGreedy = EpsilonGreedy::default();
        assert_eq!(policy.get_epsilon(), 0.1);
        policy.set_epsilon(0.3).unwrap();
        assert_eq!(policy.get_epsilon(), 0.3);
        assert!(policy.set_epsilon(-0.1).is_err());
    }
}
