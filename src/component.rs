extern crate ndarray;
extern crate ndarray_linalg;

use ndarray::*;
use ndarray_linalg::*;

use crate::errors::*;
use crate::linalg_utils::*;

use std::f64::consts::PI;

///One mixture component with covariance factored as
///Sigma = A * A^T + diag(D), where A is the d x l low-rank factor
///and D is the per-dimension noise variance.
///
///The derived Woodbury factors are held in an optional [`ComponentCache`]
///which is populated on first likelihood evaluation. Mutating A or D through
///the setters drops the cache; the parameter fields are private so that the
///cache can never go stale relative to the parameters that produced it.
#[derive(Clone)]
pub struct Component {
    mixing_weight : f64,
    mean : Array1<f64>,
    low_rank_factor : Array2<f64>,
    noise_variance : Array1<f64>,
    cache : Option<ComponentCache>
}

///Per-component derived quantities that depend only on (A, D), not on the
///evaluated points. `inv_sigma1` (l x d) and `inv_sigma2` (d x l) let
///Sigma^-1 * v be applied as v * invD - inv_sigma2 * (inv_sigma1 * v),
///so no d x d matrix is ever formed.
#[derive(Clone)]
pub struct ComponentCache {
    pub inv_sigma1 : Array2<f64>,
    pub inv_sigma2 : Array2<f64>,
    ///d * ln(2 pi) + ln|Sigma|, with the determinant obtained from the
    ///Matrix Determinant Lemma: det(A A^T + diag(D)) = det(M) * prod(D).
    pub log_det_factor : f64
}

impl ComponentCache {
    pub fn compute(component : &Component) -> Result<ComponentCache, MfaError> {
        let A = &component.low_rank_factor;
        let D = &component.noise_variance;
        let d = A.shape()[0];
        let l = A.shape()[1];

        let inv_D = D.mapv(|v| 1.0 / v);

        //Woodbury capacitance matrix M = I_l + A^T (A * invD), an l x l
        //matrix, so inverting it is cheap relative to d.
        let A_scaled = scale_rows(A.view(), inv_D.view());
        let M = Array::eye(l) + A.t().dot(&A_scaled);

        let M_inv = M.inv().map_err(|e| MfaError::Linalg(e.to_string()))?;
        let M_det = M.det().map_err(|e| MfaError::Linalg(e.to_string()))?;

        let inv_sigma1 = A_scaled.t().to_owned();
        let inv_sigma2 = M_inv.dot(&inv_sigma1).t().to_owned();

        let log_det_sigma = M_det.ln() + D.mapv(f64::ln).sum();
        let log_det_factor = (d as f64) * (2.0 * PI).ln() + log_det_sigma;

        Ok(ComponentCache {
            inv_sigma1,
            inv_sigma2,
            log_det_factor
        })
    }
}

impl Component {
    pub fn new(mixing_weight : f64, mean : Array1<f64>, low_rank_factor : Array2<f64>,
               noise_variance : Array1<f64>) -> Result<Component, MfaError> {
        let d = low_rank_factor.shape()[0];
        let l = low_rank_factor.shape()[1];
        if (l > d) {
            return Err(MfaError::DimensionMismatch {
                expected : d,
                found : l
            });
        }
        if (mean.shape()[0] != d) {
            return Err(MfaError::DimensionMismatch {
                expected : d,
                found : mean.shape()[0]
            });
        }
        if (mixing_weight < 0.0) {
            return Err(MfaError::NegativeMixingWeight {
                value : mixing_weight
            });
        }
        check_noise_variance(&noise_variance, d)?;
        Ok(Component {
            mixing_weight,
            mean,
            low_rank_factor,
            noise_variance,
            cache : Option::None
        })
    }

    ///The ambient dimension d.
    pub fn dim(&self) -> usize {
        self.low_rank_factor.shape()[0]
    }

    ///The low-rank dimension l.
    pub fn rank(&self) -> usize {
        self.low_rank_factor.shape()[1]
    }

    pub fn mixing_weight(&self) -> f64 {
        self.mixing_weight
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn low_rank_factor(&self) -> &Array2<f64> {
        &self.low_rank_factor
    }

    pub fn noise_variance(&self) -> &Array1<f64> {
        &self.noise_variance
    }

    ///Replaces A, dropping any cache computed for the previous parameters.
    pub fn set_low_rank_factor(&mut self, low_rank_factor : Array2<f64>) -> Result<(), MfaError> {
        let d = self.dim();
        if (low_rank_factor.shape()[0] != d) {
            return Err(MfaError::DimensionMismatch {
                expected : d,
                found : low_rank_factor.shape()[0]
            });
        }
        if (low_rank_factor.shape()[1] > d) {
            return Err(MfaError::DimensionMismatch {
                expected : d,
                found : low_rank_factor.shape()[1]
            });
        }
        self.low_rank_factor = low_rank_factor;
        self.invalidate_cache();
        Result::Ok(())
    }

    ///Replaces D, dropping any cache computed for the previous parameters.
    pub fn set_noise_variance(&mut self, noise_variance : Array1<f64>) -> Result<(), MfaError> {
        check_noise_variance(&noise_variance, self.dim())?;
        self.noise_variance = noise_variance;
        self.invalidate_cache();
        Result::Ok(())
    }

    pub fn cache(&self) -> Option<&ComponentCache> {
        self.cache.as_ref()
    }

    pub fn set_cache(&mut self, cache : ComponentCache) {
        self.cache = Option::Some(cache);
    }

    pub fn invalidate_cache(&mut self) {
        self.cache = Option::None;
    }

    ///Returns the cache, computing it first if it is absent.
    pub fn cached(&mut self) -> Result<&ComponentCache, MfaError> {
        if (self.cache.is_none()) {
            let cache = ComponentCache::compute(self)?;
            self.cache = Option::Some(cache);
        }
        Result::Ok(self.cache.as_ref().unwrap())
    }

    ///Materializes the full d x d covariance A * A^T + diag(D).
    ///Only meant for visualization consumers and reference checks;
    ///the likelihood path never forms this matrix.
    pub fn covariance(&self) -> Array2<f64> {
        let mut result = self.low_rank_factor.dot(&self.low_rank_factor.t());
        for i in 0..self.dim() {
            result[[i, i]] += self.noise_variance[[i,]];
        }
        result
    }
}

fn check_noise_variance(noise_variance : &Array1<f64>, d : usize) -> Result<(), MfaError> {
    if (noise_variance.shape()[0] != d) {
        return Err(MfaError::DimensionMismatch {
            expected : d,
            found : noise_variance.shape()[0]
        });
    }
    for (i, &v) in noise_variance.iter().enumerate() {
        //Strict positivity: both a reciprocal and a logarithm of every
        //entry are taken when the cache is computed.
        if (v <= 0.0) {
            return Err(MfaError::Domain {
                index : i,
                value : v
            });
        }
    }
    Result::Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn rejects_nonpositive_noise_variance() {
        let mut noise = random_noise_variance(4);
        noise[[2,]] = 0.0;
        let result = Component::new(1.0, random_vector(4), random_matrix(4, 2), noise);
        match result {
            Err(MfaError::Domain { index, .. }) => assert_eq!(index, 2),
            _ => panic!("expected a domain error")
        }
    }

    #[test]
    fn rejects_mismatched_mean_length() {
        let result = Component::new(1.0, random_vector(5), random_matrix(4, 2),
                                    random_noise_variance(4));
        match result {
            Err(MfaError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 4);
                assert_eq!(found, 5);
            },
            _ => panic!("expected a dimension mismatch")
        }
    }

    #[test]
    fn oversized_rank_reports_the_offending_dimension() {
        let mut component = random_component(4, 2);
        match component.set_low_rank_factor(random_matrix(4, 5)) {
            Err(MfaError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 4);
                assert_eq!(found, 5);
            },
            _ => panic!("expected a dimension mismatch")
        }
    }

    #[test]
    fn parameter_mutation_invalidates_cache() {
        let mut component = random_component(6, 3);
        component.cached().unwrap();
        assert!(component.cache().is_some());

        component.set_low_rank_factor(random_matrix(6, 3)).unwrap();
        assert!(component.cache().is_none());

        component.cached().unwrap();
        component.set_noise_variance(random_noise_variance(6)).unwrap();
        assert!(component.cache().is_none());
    }
}
