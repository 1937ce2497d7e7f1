extern crate ndarray;

use ndarray::*;

use rand::prelude::*;
use rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;

use crate::component::*;
use crate::errors::*;
use crate::params::*;

///Options for randomized parameter generation. The defaults match the
///reference initialization: modest low-rank directions, noise variance
///spread over one decade, means in a centered box.
#[derive(Clone)]
pub struct RandomInit {
    pub low_rank_scale : f64,
    pub noise_variance : f64,
    pub mu_range : f64,
    pub isotropic_noise : bool
}

impl Default for RandomInit {
    fn default() -> RandomInit {
        RandomInit {
            low_rank_scale : DEFAULT_LOW_RANK_SCALE,
            noise_variance : DEFAULT_NOISE_VARIANCE,
            mu_range : DEFAULT_MU_RANGE,
            isotropic_noise : false
        }
    }
}

///The mixture: an index-ordered collection of [`Component`]s sharing one
///ambient dimension. This is the single source of truth for parameters;
///the likelihood engine reads components and writes caches back here.
pub struct Mfa {
    components : Vec<Component>
}

impl Mfa {
    pub fn new(components : Vec<Component>) -> Result<Mfa, MfaError> {
        if (components.is_empty()) {
            return Err(MfaError::EmptyMixture);
        }
        let dim = components[0].dim();
        for component in components.iter() {
            if (component.dim() != dim) {
                return Err(MfaError::DimensionMismatch {
                    expected : dim,
                    found : component.dim()
                });
            }
        }
        Result::Ok(Mfa {
            components
        })
    }

    ///Generates a mixture with randomized parameters: mixing weights are
    ///squared uniform draws from [0.2, 1) normalized to sum to one,
    ///noise variances are uniform over [noise/10, noise) per dimension
    ///(one shared draw per component when isotropic), low-rank factors are
    ///scaled standard normal, and means are uniform over the mu box.
    ///The low-rank dimension is min(MAX_RANK, dim).
    pub fn randomize<R : Rng + ?Sized>(rng : &mut R, num_components : usize, dim : usize,
                                       init : &RandomInit) -> Result<Mfa, MfaError> {
        info!("Randomizing {} components of dimension {}", num_components, dim);
        let l = MAX_RANK.min(dim);

        let mut weights : Vec<f64> = Vec::with_capacity(num_components);
        for _ in 0..num_components {
            let u : f64 = rng.gen_range(0.2, 1.0);
            weights.push(u * u);
        }
        let total : f64 = weights.iter().sum();
        for weight in weights.iter_mut() {
            *weight /= total;
        }

        let noise_low = init.noise_variance / 10.0;

        let mut components = Vec::with_capacity(num_components);
        for k in 0..num_components {
            let noise_variance = if (init.isotropic_noise) {
                let v : f64 = rng.gen_range(noise_low, init.noise_variance);
                Array::from_elem((dim,), v)
            } else {
                Array::random_using((dim,), Uniform::new(noise_low, init.noise_variance), rng)
            };
            let low_rank_factor : Array2<f64> =
                init.low_rank_scale * Array::random_using((dim, l), StandardNormal, rng);
            let mean = Array::random_using((dim,), Uniform::new(-init.mu_range, init.mu_range), rng);

            components.push(Component::new(weights[k], mean, low_rank_factor, noise_variance)?);
        }
        Mfa::new(components)
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    ///The shared ambient dimension d.
    pub fn dim(&self) -> usize {
        self.components[0].dim()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn component(&self, k : usize) -> Result<&Component, MfaError> {
        self.components.get(k).ok_or(MfaError::ComponentOutOfBounds {
            component : k,
            num_components : self.components.len()
        })
    }

    pub(crate) fn component_mut(&mut self, k : usize) -> Result<&mut Component, MfaError> {
        let num_components = self.components.len();
        self.components.get_mut(k).ok_or(MfaError::ComponentOutOfBounds {
            component : k,
            num_components
        })
    }

    ///Overwrites only the cached derived matrices of component k;
    ///parameters are untouched.
    pub fn set_cache(&mut self, k : usize, cache : ComponentCache) -> Result<(), MfaError> {
        self.component_mut(k)?.set_cache(cache);
        Result::Ok(())
    }

    pub fn mixing_weights(&self) -> Vec<f64> {
        self.components.iter().map(|c| c.mixing_weight()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn randomized_mixture_is_well_formed() {
        let mut rng = rand::thread_rng();
        let mixture = Mfa::randomize(&mut rng, 5, 20, &RandomInit::default()).unwrap();

        assert_eq!(mixture.num_components(), 5);
        assert_eq!(mixture.dim(), 20);

        let weight_sum : f64 = mixture.mixing_weights().iter().sum();
        assert!((weight_sum - 1.0).abs() < 0.000000000001);

        for component in mixture.components() {
            assert_eq!(component.dim(), 20);
            assert_eq!(component.rank(), 8);
        }
    }

    #[test]
    fn rank_is_capped_by_dimension() {
        let mut rng = rand::thread_rng();
        let mixture = Mfa::randomize(&mut rng, 2, 3, &RandomInit::default()).unwrap();
        for component in mixture.components() {
            assert_eq!(component.rank(), 3);
        }
    }

    #[test]
    fn component_lookup_is_range_checked() {
        let mixture = random_mixture(3, 6, 2);
        assert!(mixture.component(2).is_ok());
        match mixture.component(3) {
            Err(MfaError::ComponentOutOfBounds { component, num_components }) => {
                assert_eq!(component, 3);
                assert_eq!(num_components, 3);
            },
            _ => panic!("expected an out of bounds error")
        }
    }

    #[test]
    fn mixtures_must_be_dimension_consistent() {
        let components = vec![random_component(4, 2), random_component(5, 2)];
        assert!(Mfa::new(components).is_err());
    }

    #[test]
    fn empty_mixtures_are_rejected() {
        match Mfa::new(Vec::new()) {
            Err(MfaError::EmptyMixture) => {},
            _ => panic!("expected an empty mixture error")
        }
    }
}
