extern crate ndarray;
extern crate ndarray_linalg;

use ndarray::*;
use ndarray_linalg::*;
use rand_distr::{StandardNormal, Uniform};
use ndarray_rand::RandomExt;

use crate::batch::*;
use crate::component::*;
use crate::mixture::*;

use std::f64::consts::PI;

pub fn assert_equal_matrices_to_within(one : &Array2<f64>, two : &Array2<f64>, thresh : f64) {
    let diff = one - two;
    let frob_norm = diff.opnorm_fro().unwrap();
    if (frob_norm > thresh) {
        panic!("matrices differ by {} > {}", frob_norm, thresh);
    }
}

pub fn random_matrix(t : usize, s : usize) -> Array2<f64> {
    Array::random((t, s), StandardNormal)
}

pub fn random_vector(t : usize) -> Array1<f64> {
    Array::random((t,), StandardNormal)
}

///Noise variances bounded away from zero so reference inverses stay
///well-conditioned.
pub fn random_noise_variance(d : usize) -> Array1<f64> {
    Array::random((d,), Uniform::new(0.05, 0.5))
}

pub fn random_batch(n : usize, d : usize) -> Batch {
    Batch::from_matrix(random_matrix(n, d), d).unwrap()
}

pub fn random_component(d : usize, l : usize) -> Component {
    random_component_with_weight(d, l, 1.0)
}

pub fn random_component_with_weight(d : usize, l : usize, mixing_weight : f64) -> Component {
    //Half-scale factor keeps the empirical-covariance sampling error small
    //relative to the moment-test thresholds
    let low_rank_factor = 0.5 * random_matrix(d, l);
    Component::new(mixing_weight, random_vector(d), low_rank_factor,
                   random_noise_variance(d)).unwrap()
}

///A mixture of equally weighted random components.
pub fn random_mixture(num_components : usize, d : usize, l : usize) -> Mfa {
    let weight = 1.0 / (num_components as f64);
    let components = (0..num_components)
        .map(|_| random_component_with_weight(d, l, weight))
        .collect();
    Mfa::new(components).unwrap()
}

///A two-plus-component mixture with the given mixing weights and small
///random parameters; for exercising the weight-correction policy.
pub fn mixture_with_weights(weights : &[f64]) -> Mfa {
    let components = weights.iter()
        .map(|&w| random_component_with_weight(4, 2, w))
        .collect();
    Mfa::new(components).unwrap()
}

///O(d^3) reference log-density: materializes Sigma = A A^T + diag(D) and
///uses a dense inverse and determinant. The Woodbury path must agree with
///this to tight tolerance.
pub fn dense_log_density(samples : &Batch, component : &Component) -> Array1<f64> {
    let sigma = component.covariance();
    let inv_sigma = sigma.inv().unwrap();
    let (_, ln_det) = sigma.sln_det().unwrap();

    let d = component.dim() as f64;
    let c_factor = d * (2.0 * PI).ln() + ln_det;

    let mut result = Array::zeros((samples.num_samples(),));
    for (i, row) in samples.data().outer_iter().enumerate() {
        let x_c = &row - component.mean();
        let m_d = x_c.dot(&inv_sigma.dot(&x_c));
        result[[i,]] = -0.5 * (m_d + c_factor);
    }
    result
}
