use ndarray::ArrayView1;
use rand::seq::SliceRandom;
use rand::Rng;

/// Index of the first maximum, like `np.argmax`.
#[inline(always)]
pub fn argmax<T: PartialOrd>(values: impl Iterator<Item = T>) -> usize {
    let mut result: usize = 0;
    let mut best: Option<T> = None;
    for (i, v) in values.enumerate() {
        let improves: bool = match &best {
            Some(m) => v > *m,
            None => true,
        };
        if improves {
            best = Some(v);
            result = i;
        }
    }
    result
}

#[inline(always)]
pub fn max(values: ArrayView1<f64>) -> f64 {
    values.iter().fold(f64::NEG_INFINITY, |acc, x| acc.max(*x))
}

/// Uniformly random index among the maxima of `values`.
pub fn argmax_random_tie<R: Rng>(values: ArrayView1<f64>, rng: &mut R) -> usize {
    let best: f64 = max(values);
    let ties: Vec<usize> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v == best)
        .map(|(i, _)| i)
        .collect();
    *ties.choose(rng).unwrap_or(&0)
}

/// Index drawn from `probs` given a uniform sample `random` in `[0, 1)`.
#[inline(always)]
pub fn categorical_sample(probs: &[f64], random: f64) -> usize {
    let mut b: f64 = 0.0;
    let r = probs.iter().map(|a| {
        b += a;
        b > random
    });
    argmax(r)
}
