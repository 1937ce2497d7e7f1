extern crate ndarray;

use ndarray::*;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::batch::*;
use crate::component::*;
use crate::errors::*;
use crate::likelihood::*;
use crate::mixture::*;

///Fans the per-component log-probability computation out over a fixed-size
///worker pool. Each task owns one output column, tagged by component index,
///so the merge never depends on completion order. Workers share only
///read-only state; caches they compute are local and handed back to the
///caller through [`ParallelLogProbs`] for explicit merge-back.
///
///Column for column, the result follows the exact floating-point evaluation
///order of [`Mfa::components_log_probabilities`].
pub struct ParallelEvaluator {
    pool : ThreadPool
}

impl ParallelEvaluator {
    pub fn new(num_workers : usize) -> Result<ParallelEvaluator, MfaError> {
        let pool = ThreadPoolBuilder::new()
                                     .num_threads(num_workers)
                                     .build()
                                     .map_err(|e| MfaError::WorkerPool(e.to_string()))?;
        Result::Ok(ParallelEvaluator {
            pool
        })
    }

    ///Parallel counterpart of [`Mfa::components_log_probabilities`]. The
    ///first failing task aborts the whole batch; partial columns are
    ///discarded.
    pub fn components_log_probabilities(&self, mixture : &Mfa,
                                        samples : &Batch) -> Result<ParallelLogProbs, MfaError> {
        mixture.check_batch(samples)?;
        trace!("Parallel log-probability fan-out over {} components", mixture.num_components());

        let columns = self.pool.install(|| {
            mixture.components()
                   .par_iter()
                   .enumerate()
                   .map(|(k, component)| evaluate_component(k, component, samples))
                   .collect::<Result<Vec<_>, MfaError>>()
        })?;

        let mut log_probs = Array::zeros((samples.num_samples(), mixture.num_components()));
        let mut caches = Vec::new();
        for (k, column, fresh_cache) in columns {
            log_probs.column_mut(k).assign(&column);
            if let Some(cache) = fresh_cache {
                caches.push((k, cache));
            }
        }
        trace!("Parallel fan-out complete");
        Result::Ok(ParallelLogProbs {
            log_probs,
            caches
        })
    }
}

fn evaluate_component(k : usize, component : &Component,
                      samples : &Batch) -> Result<(usize, Array1<f64>, Option<ComponentCache>), MfaError> {
    //Reuse a cache already present in the store; otherwise compute a local
    //one and report it back for merge-back.
    let (cache, fresh) = match component.cache() {
        Option::Some(cache) => (cache.clone(), false),
        Option::None => (ComponentCache::compute(component)?, true)
    };
    let log_weight = component.mixing_weight().ln();
    let column = component_log_density(samples, component, &cache) + log_weight;
    let fresh_cache = if (fresh) { Option::Some(cache) } else { Option::None };
    Result::Ok((k, column, fresh_cache))
}

///The n x K weighted log-density matrix plus any caches the workers had to
///compute. Dropping this without calling [`ParallelLogProbs::merge_caches`]
///simply discards that work.
pub struct ParallelLogProbs {
    pub log_probs : Array2<f64>,
    caches : Vec<(usize, ComponentCache)>
}

impl ParallelLogProbs {
    ///Writes the worker-computed caches into the store and yields the
    ///log-probability matrix.
    pub fn merge_caches(self, mixture : &mut Mfa) -> Result<Array2<f64>, MfaError> {
        let ParallelLogProbs { log_probs, caches } = self;
        for (k, cache) in caches {
            mixture.set_cache(k, cache)?;
        }
        Result::Ok(log_probs)
    }

    pub fn into_log_probs(self) -> Array2<f64> {
        self.log_probs
    }
}
