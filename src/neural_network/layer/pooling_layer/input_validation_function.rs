use super::*;

/// Validates pool size for 2D pooling.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if any dimension is 0.
pub(super) fn validate_pool_size_2d(pool_size: (usize, usize)) -> Result<(), ModelError> {
    if pool_size.0 == 0 || pool_size.1 == 0 {
        return Err(ModelError::InputValidationError(
            "Pool size dimensions must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates strides for 2D pooling.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if any stride is 0.
pub(super) fn validate_strides_2d(strides: (usize, usize)) -> Result<(), ModelError> {
    if strides.0 == 0 || strides.1 == 0 {
        return Err(ModelError::InputValidationError(
            "Strides must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates that a pooling input is 4D and yields a non-empty output.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if the tensor is not 4D or the
/// pooled height/width would be 0.
pub(super) fn validate_pooling_input_2d(
    input: &Tensor,
    pool_size: (usize, usize),
    strides: (usize, usize),
    ceil_mode: bool,
    layer: &str,
) -> Result<(), ModelError> {
    if input.ndim() != 4 {
        return Err(ModelError::InputValidationError(format!(
            "{} expects a 4D input [batch, channels, height, width], got {}D",
            layer,
            input.ndim()
        )));
    }
    let output_shape =
        calculate_output_shape_2d_pooling(input.shape(), pool_size, strides, ceil_mode);
    if output_shape[2] == 0 || output_shape[3] == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} input {:?} is smaller than the {}x{} pooling window",
            layer,
            input.shape(),
            pool_size.0,
            pool_size.1
        )));
    }
    Ok(())
}
