use crate::error::IoError;
use ndarray::{Array2, Array4};

fn ragged(what: &str) -> IoError {
    IoError::ModelStructureMismatch(format!("{} is not rectangular", what))
}

pub(super) fn vec2_to_array2(vec: &[Vec<f32>]) -> Result<Array2<f32>, IoError> {
    let rows = vec.len();
    let cols = if rows > 0 { vec[0].len() } else { 0 };
    if vec.iter().any(|row| row.len() != cols) {
        return Err(ragged("2D weight"));
    }
    let flat: Vec<f32> = vec.iter().flat_map(|row| row.iter().cloned()).collect();
    Array2::from_shape_vec((rows, cols), flat)
        .map_err(|e| IoError::ModelStructureMismatch(e.to_string()))
}

pub(super) fn vec4_to_array4(vec: &[Vec<Vec<Vec<f32>>>]) -> Result<Array4<f32>, IoError> {
    let d0 = vec.len();
    let d1 = vec.first().map_or(0, |v| v.len());
    let d2 = vec.first().and_then(|v| v.first()).map_or(0, |v| v.len());
    let d3 = vec
        .first()
        .and_then(|v| v.first())
        .and_then(|v| v.first())
        .map_or(0, |v| v.len());

    let rectangular = vec.iter().all(|v1| {
        v1.len() == d1
            && v1
                .iter()
                .all(|v2| v2.len() == d2 && v2.iter().all(|v3| v3.len() == d3))
    });
    if !rectangular {
        return Err(ragged("4D weight"));
    }

    let flat: Vec<f32> = vec
        .iter()
        .flat_map(|v1| {
            v1.iter()
                .flat_map(|v2| v2.iter().flat_map(|v3| v3.iter().cloned()))
        })
        .collect();
    Array4::from_shape_vec((d0, d1, d2, d3), flat)
        .map_err(|e| IoError::ModelStructureMismatch(e.to_string()))
}
