//! Mixture of Factor Analyzers for high-dimensional data.
//!
//! A Gaussian mixture model where each component's covariance is factored
//! as a low-rank term plus per-dimension noise, Sigma = A * A^T + diag(D),
//! with A a d x l matrix and l typically much smaller than d. Likelihood
//! evaluation goes through the Woodbury identity and the Matrix Determinant
//! Lemma, so nothing of size d x d is ever stored or inverted.
//!
//! Starting points: [`crate::mixture::Mfa`] for the model itself and its
//! likelihood operations, [`crate::sampler`] for drawing synthetic data,
//! [`crate::parallel::ParallelEvaluator`] for fanning component
//! evaluations across a worker pool, and [`crate::codec`] for persistence.

#![allow(dead_code)]
#![allow(non_snake_case)]
#![allow(unused_imports)]
#![allow(unused_parens)]

#[macro_use] extern crate log;
pub mod params;
pub mod errors;
pub mod linalg_utils;
pub mod batch;
pub mod component;
pub mod mixture;
pub mod sampler;
pub mod likelihood;
pub mod parallel;
pub mod codec;
pub mod test_utils;
