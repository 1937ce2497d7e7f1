extern crate ndarray;

use ndarray::*;
use serde::{Serialize, Deserialize};

use crate::component::*;
use crate::errors::*;
use crate::mixture::*;

///Wire form of one component. The derived cache is deliberately absent:
///it is recomputed on first evaluation after a load. The mean travels as a
///bare sequence, which is also what older persisted models contain; it is
///coerced back to a vector at load time.
#[derive(Serialize, Deserialize)]
struct ComponentRecord {
    mixing_weight : f64,
    mean : Vec<f64>,
    low_rank_factor : Array2<f64>,
    noise_variance : Array1<f64>
}

///Serializes the full component mapping to an opaque byte blob.
///Round-tripping reproduces every parameter bit-for-bit.
pub fn serialize(mixture : &Mfa) -> Result<Vec<u8>, MfaError> {
    let records : Vec<ComponentRecord> =
        mixture.components().iter().map(|component| ComponentRecord {
            mixing_weight : component.mixing_weight(),
            mean : component.mean().to_vec(),
            low_rank_factor : component.low_rank_factor().clone(),
            noise_variance : component.noise_variance().clone()
        }).collect();
    bincode::serialize(&records).map_err(|e| MfaError::Serialization(e.to_string()))
}

pub fn deserialize(bytes : &[u8]) -> Result<Mfa, MfaError> {
    let records : Vec<ComponentRecord> = bincode::deserialize(bytes)
        .map_err(|e| MfaError::Serialization(e.to_string()))?;
    let mut components = Vec::with_capacity(records.len());
    for record in records {
        let mean = Array::from(record.mean);
        components.push(Component::new(record.mixing_weight, mean,
                                       record.low_rank_factor, record.noise_variance)?);
    }
    Mfa::new(components)
}
