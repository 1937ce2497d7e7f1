extern crate ndarray;

use ndarray::*;

use rand::prelude::*;
use rand::distributions::WeightedIndex;
use rand_distr::StandardNormal;
use ndarray_rand::RandomExt;

use crate::component::*;
use crate::errors::*;
use crate::mixture::*;
use crate::params::*;

///Draws `num_samples` vectors from a single component as
///x = z_l * A^T + mu, optionally adding the residual noise
///z_d * sqrt(D) element-wise.
pub fn draw_from_component<R : Rng + ?Sized>(rng : &mut R, num_samples : usize,
                                             component : &Component,
                                             add_noise : bool) -> Array2<f64> {
    let d = component.dim();
    let l = component.rank();

    let z_l : Array2<f64> = Array::random_using((num_samples, l), StandardNormal, rng);
    let mut result = z_l.dot(&component.low_rank_factor().t()) + component.mean();

    if (add_noise) {
        let z_d : Array2<f64> = Array::random_using((num_samples, d), StandardNormal, rng);
        let noise_std = component.noise_variance().mapv(f64::sqrt);
        result += &(&z_d * &noise_std);
    }
    result
}

///The mixing weight vector with the drift-correction policy applied.
///If the weights sum to something within [`WEIGHT_SUM_EPS`] of one, the
///excess is subtracted from the single largest weight. This asymmetric
///correction is deliberate: drift of this size is accumulated floating-point
///noise, and proportional renormalization would perturb every component.
///A deviation beyond the tolerance is an error, not something to fix up.
pub fn corrected_mixing_weights(mixture : &Mfa) -> Result<Vec<f64>, MfaError> {
    let mut weights = mixture.mixing_weights();
    let sum : f64 = weights.iter().sum();
    let excess = sum - 1.0;
    if (excess.abs() > WEIGHT_SUM_EPS) {
        return Err(MfaError::InvalidDistribution {
            sum,
            tolerance : WEIGHT_SUM_EPS
        });
    }
    if (excess != 0.0) {
        let mut max_index = 0;
        for i in 1..weights.len() {
            if (weights[i] > weights[max_index]) {
                max_index = i;
            }
        }
        weights[max_index] -= excess;
    }
    Result::Ok(weights)
}

///Draws `num_samples` vectors from the full mixture: a categorical draw over
///the corrected mixing weights assigns each output row to a component, then
///each component fills its assigned rows in one block draw. Row i always
///holds a draw from the component assigned to row i, but rows assigned to
///the same component are filled in a single grouped pass rather than in
///independent draw order.
pub fn draw_from_mixture<R : Rng + ?Sized>(rng : &mut R, num_samples : usize,
                                           mixture : &Mfa,
                                           add_noise : bool) -> Result<Array2<f64>, MfaError> {
    let weights = corrected_mixing_weights(mixture)?;
    let weight_sum : f64 = weights.iter().sum();

    let chooser = WeightedIndex::new(&weights).map_err(|_| MfaError::InvalidDistribution {
        sum : weight_sum,
        tolerance : WEIGHT_SUM_EPS
    })?;
    let assignments : Vec<usize> = (0..num_samples).map(|_| chooser.sample(rng)).collect();

    let mut samples = Array::zeros((num_samples, mixture.dim()));
    for k in 0..mixture.num_components() {
        let rows : Vec<usize> = assignments.iter().enumerate()
                                           .filter(|(_, &a)| a == k)
                                           .map(|(i, _)| i)
                                           .collect();
        if (rows.is_empty()) {
            continue;
        }
        let block = draw_from_component(rng, rows.len(), mixture.component(k)?, add_noise);
        for (j, &i) in rows.iter().enumerate() {
            samples.row_mut(i).assign(&block.row(j));
        }
    }
    Result::Ok(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn component_samples_have_right_moments() {
        let num_samples = 100000;
        let d = 10;
        let l = 4;

        let mut rng = rand::thread_rng();
        let component = random_component(d, l);

        //Noise disabled, so the true covariance is exactly A * A^T
        let samples = draw_from_component(&mut rng, num_samples, &component, false);

        let empirical_mean = samples.mean_axis(Axis(0)).unwrap();
        let mean_err = (&empirical_mean - component.mean()).mapv(|v| v * v).sum().sqrt();
        assert!(mean_err < 0.05, "mean error {}", mean_err);

        let centered = &samples - &empirical_mean;
        let empirical_cov = centered.t().dot(&centered) / (num_samples as f64);
        let true_cov = component.low_rank_factor().dot(&component.low_rank_factor().t());
        assert_equal_matrices_to_within(&empirical_cov, &true_cov, 0.1);
    }

    #[test]
    fn excess_comes_off_the_largest_weight() {
        let mixture = mixture_with_weights(&[0.9999992, 0.000001]);
        let corrected = corrected_mixing_weights(&mixture).unwrap();

        let excess = (0.9999992 + 0.000001) - 1.0;
        assert!((corrected[0] - (0.9999992 - excess)).abs() < 1e-15);
        assert_eq!(corrected[1], 0.000001);

        let sum : f64 = corrected.iter().sum();
        assert!((sum - 1.0).abs() < 1e-15);
    }

    #[test]
    fn weight_sum_outside_tolerance_is_an_error() {
        let mixture = mixture_with_weights(&[0.9, 0.11]);
        match corrected_mixing_weights(&mixture) {
            Err(MfaError::InvalidDistribution { sum, .. }) => {
                assert!((sum - 1.01).abs() < 1e-12);
            },
            _ => panic!("expected an invalid distribution error")
        }
    }

    #[test]
    fn mixture_rows_follow_their_assignments() {
        //With one component carrying all the weight, every row must come
        //from it, and the draw must succeed despite the tiny drift.
        let mut rng = rand::thread_rng();
        let mixture = mixture_with_weights(&[0.9999992, 0.000001]);
        let samples = draw_from_mixture(&mut rng, 50, &mixture, true).unwrap();
        assert_eq!(samples.shape(), &[50, mixture.dim()]);
    }
}
