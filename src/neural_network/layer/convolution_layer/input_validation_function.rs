use super::*;

/// Validates the filters parameter.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if filters is 0.
pub(super) fn validate_filters(filters: usize) -> Result<(), ModelError> {
    if filters == 0 {
        return Err(ModelError::InputValidationError(
            "Number of filters must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates kernel size for 2D convolution.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if any dimension is 0.
pub(super) fn validate_kernel_size_2d(kernel_size: (usize, usize)) -> Result<(), ModelError> {
    if kernel_size.0 == 0 || kernel_size.1 == 0 {
        return Err(ModelError::InputValidationError(
            "Kernel dimensions must be greater than 0".to_string(),
        ));
    }
    Ok(())
}

/// Validates strides for 2D convolution.
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

/// Validates a channel count.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if `channels` is 0.
pub(super) fn validate_channels(channels: usize, what: &str) -> Result<(), ModelError> {
    if channels == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} must be greater than 0",
            what
        )));
    }
    Ok(())
}

/// Validates a forward input: 4D with the expected number of channels.
///
/// # Errors
///
/// Returns `ModelError::InputValidationError` if the tensor is not 4D, has a
/// different channel count or has an empty height or width.
pub(super) fn validate_input_4d(
    input: &Tensor,
    expected_channels: usize,
    layer: &str,
) -> Result<(), ModelError> {
    if input.ndim() != 4 {
        return Err(ModelError::InputValidationError(format!(
            "{} expects a 4D input [batch, channels, height, width], got {}D",
            layer,
            input.ndim()
        )));
    }
    if input.shape()[1] != expected_channels {
        return Err(ModelError::InputValidationError(format!(
            "{} expects {} input channels, got {}",
            layer,
            expected_channels,
            input.shape()[1]
        )));
    }
    if input.shape()[2] == 0 || input.shape()[3] == 0 {
        return Err(ModelError::InputValidationError(format!(
            "{} expects a non-empty spatial size, got {}x{}",
            layer,
            input.shape()[2],
            input.shape()[3]
        )));
    }
    Ok(())
}
