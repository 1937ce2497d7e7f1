use thiserror::Error;

///Errors surfaced by model construction, evaluation, sampling and persistence.
///All of these are fatal for the operation in progress; the only silent
///numeric adjustment anywhere in the crate is the documented largest-weight
///correction in [`crate::sampler::corrected_mixing_weights`].
#[derive(Clone, Debug, Error)]
pub enum MfaError {
    #[error("input has dimension {found} but the model dimension is {expected}")]
    DimensionMismatch { expected : usize, found : usize },

    #[error("mixing weights sum to {sum}, which is more than {tolerance} away from 1")]
    InvalidDistribution { sum : f64, tolerance : f64 },

    #[error("mixing weights must be non-negative, got {value}")]
    NegativeMixingWeight { value : f64 },

    #[error("noise variance must be strictly positive, got {value} at dimension {index}")]
    Domain { index : usize, value : f64 },

    #[error("asked for component {component} but there are {num_components} components")]
    ComponentOutOfBounds { component : usize, num_components : usize },

    #[error("mixture must contain at least one component")]
    EmptyMixture,

    #[error("failed to encode or decode model parameters: {0}")]
    Serialization(String),

    #[error("failed to build the worker pool: {0}")]
    WorkerPool(String),

    #[error("linear algebra failure: {0}")]
    Linalg(String),
}
