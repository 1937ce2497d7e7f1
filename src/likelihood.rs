extern crate ndarray;
extern crate ndarray_linalg;

use ndarray::*;

use crate::batch::*;
use crate::component::*;
use crate::errors::*;
use crate::linalg_utils::*;
use crate::mixture::*;
use crate::params::*;

///Log-density of every row of `samples` under one component, given its
///derived Woodbury factors. The quadratic form
///(x - mu)^T Sigma^-1 (x - mu) is rearranged as
///X_c . (X_c * invD - (X_c * inv_sigma2) * inv_sigma1)
///so that the largest intermediate is n x d; no d x d matrix appears.
pub fn component_log_density(samples : &Batch, component : &Component,
                             cache : &ComponentCache) -> Array1<f64> {
    let inv_D = component.noise_variance().mapv(|v| 1.0 / v);

    let X_c = &samples.data() - component.mean();

    let diag_part = &X_c * &inv_D;
    let low_rank_part = X_c.dot(&cache.inv_sigma2).dot(&cache.inv_sigma1);
    let m_d = (&X_c * &(diag_part - low_rank_part)).sum_axis(Axis(1));

    (m_d + cache.log_det_factor).mapv(|v| -0.5 * v)
}

///Row-wise log(sum(exp(row))) computed stably by shifting each row by its
///maximum before exponentiating. Rows whose maximum is not finite (every
///entry underflowed to -inf) propagate that maximum unchanged.
pub fn log_sum_exp(log_probs : ArrayView2<f64>) -> Array1<f64> {
    let max_vals = log_probs.fold_axis(Axis(1), std::f64::NEG_INFINITY, |m, &v| m.max(v));
    let mut result = Array::zeros((log_probs.shape()[0],));
    for (i, row) in log_probs.outer_iter().enumerate() {
        let max_val = max_vals[[i,]];
        if (!max_val.is_finite()) {
            result[[i,]] = max_val;
            continue;
        }
        let sum_of_exp : f64 = row.iter().map(|&v| (v - max_val).exp()).sum();
        result[[i,]] = max_val + sum_of_exp.ln();
    }
    result
}

impl Mfa {
    pub(crate) fn check_batch(&self, samples : &Batch) -> Result<(), MfaError> {
        if (samples.dim() != self.dim()) {
            return Err(MfaError::DimensionMismatch {
                expected : self.dim(),
                found : samples.dim()
            });
        }
        Result::Ok(())
    }

    ///Per-sample log-density under component k, without the mixing weight.
    ///Computes and stores the component's cache on first use.
    pub fn component_log_likelihood(&mut self, samples : &Batch, k : usize) -> Result<Array1<f64>, MfaError> {
        self.check_batch(samples)?;
        self.component_mut(k)?.cached()?;

        let component = self.component(k)?;
        let cache = component.cache().unwrap();
        Result::Ok(component_log_density(samples, component, cache))
    }

    ///The n x K matrix whose column k holds ln(pi_k) plus the log-density
    ///of every sample under component k.
    pub fn components_log_probabilities(&mut self, samples : &Batch) -> Result<Array2<f64>, MfaError> {
        self.check_batch(samples)?;
        let mut result = Array::zeros((samples.num_samples(), self.num_components()));
        for k in 0..self.num_components() {
            let log_weight = self.component(k)?.mixing_weight().ln();
            let column = self.component_log_likelihood(samples, k)? + log_weight;
            result.column_mut(k).assign(&column);
        }
        Result::Ok(result)
    }

    ///Per-sample mixture log-density: log-sum-exp over the weighted
    ///per-component columns.
    pub fn log_probabilities(&mut self, samples : &Batch) -> Result<Array1<f64>, MfaError> {
        let components_log_probs = self.components_log_probabilities(samples)?;
        Result::Ok(log_sum_exp(components_log_probs.view()))
    }

    ///Total log-likelihood of the batch.
    pub fn log_likelihood(&mut self, samples : &Batch) -> Result<f64, MfaError> {
        Result::Ok(self.log_probabilities(samples)?.sum())
    }

    ///Per-sample mixture density. Underflows to zero for points far into
    ///the tails; callers needing those should stay in log space.
    pub fn probabilities(&mut self, samples : &Batch) -> Result<Array1<f64>, MfaError> {
        Result::Ok(self.log_probabilities(samples)?.mapv(f64::exp))
    }

    ///Log posterior responsibilities: each row of the weighted log-density
    ///matrix, shifted by that row's mixture log-density.
    pub fn log_responsibilities(&mut self, samples : &Batch) -> Result<Array2<f64>, MfaError> {
        let components_log_probs = self.components_log_probabilities(samples)?;
        let totals = log_sum_exp(components_log_probs.view()).insert_axis(Axis(1));
        Result::Ok(components_log_probs - totals)
    }

    ///Posterior responsibilities; each row sums to one.
    pub fn responsibilities(&mut self, samples : &Batch) -> Result<Array2<f64>, MfaError> {
        Result::Ok(self.log_responsibilities(samples)?.mapv(f64::exp))
    }

    ///The most probable generating component of each sample, the argmax of
    ///its responsibilities. This is what sample visualizations color by.
    pub fn most_probable_components(&mut self, samples : &Batch) -> Result<Vec<usize>, MfaError> {
        let log_resp = self.log_responsibilities(samples)?;
        Result::Ok(log_resp.outer_iter().map(|row| argmax(row)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn woodbury_matches_dense_reference() {
        for &(d, l) in [(5, 2), (20, 5), (50, 8)].iter() {
            let mut mixture = Mfa::new(vec![random_component(d, l)]).unwrap();
            let samples = random_batch(20, d);

            let fast = mixture.component_log_likelihood(&samples, 0).unwrap();
            let dense = dense_log_density(&samples, mixture.component(0).unwrap());

            for i in 0..20 {
                let err = (fast[[i,]] - dense[[i,]]).abs();
                let bound = DEFAULT_TEST_THRESH * (1.0 + dense[[i,]].abs());
                assert!(err < bound, "d={} l={} i={} fast={} dense={}", d, l, i, fast[[i,]], dense[[i,]]);
            }
        }
    }

    #[test]
    fn log_sum_exp_matches_naive_form() {
        let log_probs = random_matrix(10, 7);
        let stable = log_sum_exp(log_probs.view());
        for (i, row) in log_probs.outer_iter().enumerate() {
            let naive : f64 = row.iter().map(|&v| v.exp()).sum::<f64>().ln();
            assert!((stable[[i,]] - naive).abs() < 0.000000001);
        }
    }

    #[test]
    fn log_sum_exp_survives_extreme_magnitudes() {
        //A naive exp would overflow here; the shifted form must not.
        let log_probs = arr2(&[[1000.0, 999.0], [-1000.0, -1001.0]]);
        let stable = log_sum_exp(log_probs.view());
        let expected = 1000.0 + (1.0f64 + (-1.0f64).exp()).ln();
        assert!((stable[[0,]] - expected).abs() < 0.000000001);
        assert!(stable[[1,]].is_finite());
        assert!((stable[[1,]] - (expected - 2000.0)).abs() < 0.000000001);
    }

    #[test]
    fn responsibilities_rows_sum_to_one() {
        let mut mixture = random_mixture(4, 12, 3);
        let samples = random_batch(30, 12);
        let resp = mixture.responsibilities(&samples).unwrap();
        for row in resp.outer_iter() {
            let total : f64 = row.iter().sum();
            assert!((total - 1.0).abs() < 0.00000001, "row sum {}", total);
        }
    }

    #[test]
    fn single_vector_is_a_one_row_batch() {
        let d = 9;
        let mut mixture = random_mixture(3, d, 2);
        let point = random_vector(d);

        let as_matrix = Batch::from_matrix(point.clone().insert_axis(Axis(0)), d).unwrap();
        let as_vector = Batch::from_vector(point, d).unwrap();

        let from_matrix = mixture.log_probabilities(&as_matrix).unwrap();
        let from_vector = mixture.log_probabilities(&as_vector).unwrap();
        assert_eq!(from_matrix[[0,]], from_vector[[0,]]);
    }

    #[test]
    fn dimension_mismatch_is_rejected() {
        let mut mixture = random_mixture(2, 5, 2);
        let samples = random_batch(4, 7);
        match mixture.log_likelihood(&samples) {
            Err(MfaError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 5);
                assert_eq!(found, 7);
            },
            _ => panic!("expected a dimension mismatch")
        }
    }

    #[test]
    fn evaluation_populates_all_caches() {
        let mut mixture = random_mixture(3, 8, 2);
        for component in mixture.components() {
            assert!(component.cache().is_none());
        }
        let samples = random_batch(6, 8);
        mixture.log_likelihood(&samples).unwrap();
        for component in mixture.components() {
            assert!(component.cache().is_some());
        }
    }

    #[test]
    fn most_probable_component_finds_the_obvious_owner() {
        //Two well-separated components; points drawn near one mean must be
        //attributed to it.
        let d = 6;
        let near = Component::new(0.5, Array::zeros((d,)), random_matrix(d, 2),
                                  random_noise_variance(d)).unwrap();
        let far = Component::new(0.5, Array::from_elem((d,), 100.0), random_matrix(d, 2),
                                 random_noise_variance(d)).unwrap();
        let mut mixture = Mfa::new(vec![near, far]).unwrap();

        let samples = Batch::from_vector(Array::zeros((d,)), d).unwrap();
        let owners = mixture.most_probable_components(&samples).unwrap();
        assert_eq!(owners, vec![0]);
    }
}
