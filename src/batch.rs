extern crate ndarray;

use ndarray::*;

use crate::errors::*;

///A validated n x d batch of evaluation points. Construction is the only
///place shapes are negotiated: a matrix must already have d columns, and a
///bare length-d vector is promoted to a 1 x d batch. Anything else is
///rejected rather than silently reshaped.
pub struct Batch {
    data : Array2<f64>
}

impl Batch {
    pub fn from_matrix(data : Array2<f64>, dim : usize) -> Result<Batch, MfaError> {
        if (data.shape()[1] != dim) {
            return Err(MfaError::DimensionMismatch {
                expected : dim,
                found : data.shape()[1]
            });
        }
        Result::Ok(Batch {
            data
        })
    }

    pub fn from_vector(data : Array1<f64>, dim : usize) -> Result<Batch, MfaError> {
        if (data.shape()[0] != dim) {
            return Err(MfaError::DimensionMismatch {
                expected : dim,
                found : data.shape()[0]
            });
        }
        Result::Ok(Batch {
            data : data.insert_axis(Axis(0))
        })
    }

    pub fn num_samples(&self) -> usize {
        self.data.shape()[0]
    }

    pub fn dim(&self) -> usize {
        self.data.shape()[1]
    }

    pub fn data(&self) -> ArrayView2<f64> {
        self.data.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn vector_becomes_single_row_batch() {
        let batch = Batch::from_vector(random_vector(7), 7).unwrap();
        assert_eq!(batch.num_samples(), 1);
        assert_eq!(batch.dim(), 7);
    }

    #[test]
    fn wrong_length_vector_is_rejected() {
        match Batch::from_vector(random_vector(6), 7) {
            Err(MfaError::DimensionMismatch { expected, found }) => {
                assert_eq!(expected, 7);
                assert_eq!(found, 6);
            },
            _ => panic!("expected a dimension mismatch")
        }
    }

    #[test]
    fn wrong_width_matrix_is_rejected() {
        assert!(Batch::from_matrix(random_matrix(3, 5), 4).is_err());
    }
}
