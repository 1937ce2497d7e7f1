#![allow(unused_parens)]

#[macro_use] extern crate log;

use mfa_lib::batch::*;
use mfa_lib::codec;
use mfa_lib::likelihood::*;
use mfa_lib::mixture::*;
use mfa_lib::parallel::*;
use mfa_lib::params::*;
use mfa_lib::sampler::*;

///Illustrative entry point: randomize a high-dimensional model, draw a
///synthetic dataset, evaluate its log-likelihood serially and in parallel,
///and optionally persist the model to a path given as the first argument.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();

    let num_components = 3;
    let dim = 500;
    let num_samples = 5000;

    let mut rng = rand::thread_rng();

    info!("Randomizing model");
    let init = RandomInit {
        low_rank_scale : 0.2,
        noise_variance : 0.01,
        mu_range : 0.2,
        ..RandomInit::default()
    };
    let mut mixture = Mfa::randomize(&mut rng, num_components, dim, &init)?;

    info!("Drawing {} samples", num_samples);
    let samples = draw_from_mixture(&mut rng, num_samples, &mixture, true)?;
    let batch = Batch::from_matrix(samples, mixture.dim())?;

    info!("Evaluating log-likelihood serially");
    let serial_ll = mixture.log_likelihood(&batch)?;
    println!("Log likelihood (serial)   = {}", serial_ll);

    info!("Evaluating log-likelihood with {} workers", DEFAULT_POOL_SIZE);
    let evaluator = ParallelEvaluator::new(DEFAULT_POOL_SIZE)?;
    let log_probs = evaluator.components_log_probabilities(&mixture, &batch)?
                             .merge_caches(&mut mixture)?;
    let parallel_ll = log_sum_exp(log_probs.view()).sum();
    println!("Log likelihood (parallel) = {}", parallel_ll);

    if let Some(path) = std::env::args().nth(1) {
        info!("Writing model to {}", path);
        let bytes = codec::serialize(&mixture)?;
        std::fs::write(&path, &bytes)?;
    }
    Ok(())
}
