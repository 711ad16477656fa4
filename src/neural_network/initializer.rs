use crate::error::ModelError;
use ndarray::{Array4, s};
use rand::Rng;
use rand_distr::{Distribution, Normal};

/// Makes a 2D bilinear kernel suitable for initializing an upsampling
/// (transposed convolution) layer.
///
/// The returned tensor has shape `(in_channels, out_channels, kernel_size, kernel_size)`.
/// It is zero everywhere except the diagonal planes `(i, i)`, which hold the separable
/// tent filter
///
/// `(1 - |row - center| / factor) * (1 - |col - center| / factor)`
///
/// with `factor = (kernel_size + 1) / 2` and `center = factor - 1` for odd kernels,
/// `factor - 0.5` for even ones. When `in_channels != out_channels` only the first
/// `min(in_channels, out_channels)` diagonal planes are filled.
///
/// # Parameters
///
/// - `in_channels` - Number of input channels of the transposed convolution
/// - `out_channels` - Number of output channels of the transposed convolution
/// - `kernel_size` - Side length of the square kernel
///
/// # Returns
///
/// * `Array4<f32>` - The kernel, computed in `f64` and stored as `f32`
///
/// # Example
/// ```rust
/// use portraitseg::neural_network::initializer::get_upsampling_weight;
///
/// let weight = get_upsampling_weight(1, 1, 3);
/// assert_eq!(weight.shape(), &[1, 1, 3, 3]);
/// assert_eq!(weight[[0, 0, 1, 1]], 1.0);
/// assert_eq!(weight[[0, 0, 0, 0]], 0.25);
/// ```
pub fn get_upsampling_weight(
    in_channels: usize,
    out_channels: usize,
    kernel_size: usize,
) -> Array4<f32> {
    let mut weight = Array4::zeros((in_channels, out_channels, kernel_size, kernel_size));
    if kernel_size == 0 {
        return weight;
    }

    let factor = kernel_size.div_ceil(2) as f64;
    let center = if kernel_size % 2 == 1 {
        factor - 1.0
    } else {
        factor - 0.5
    };

    let tent: Vec<f64> = (0..kernel_size)
        .map(|i| 1.0 - (i as f64 - center).abs() / factor)
        .collect();

    for c in 0..in_channels.min(out_channels) {
        let mut plane = weight.slice_mut(s![c, c, .., ..]);
        for ((row, col), value) in plane.indexed_iter_mut() {
            *value = (tent[row] * tent[col]) as f32;
        }
    }

    weight
}

/// Standard deviation of a fan-out Kaiming (He) normal initialization:
/// `sqrt(2 / n)` with `n = kernel_height * kernel_width * out_channels`.
pub fn kaiming_fan_out_std(out_channels: usize, kernel_size: (usize, usize)) -> f64 {
    let n = kernel_size.0 * kernel_size.1 * out_channels;
    (2.0 / n as f64).sqrt()
}

/// Draws a `(out_channels, in_channels, kernel_height, kernel_width)` tensor from
/// `N(0, 2 / n)` with `n = kernel_height * kernel_width * out_channels`.
///
/// # Parameters
///
/// - `shape` - Tensor shape as (out_channels, in_channels, kernel_height, kernel_width)
/// - `rng` - Source of randomness; a seeded generator gives reproducible weights
///
/// # Errors
///
/// - `ModelError::InputValidationError` - If `out_channels` or the kernel area is zero
pub fn kaiming_normal_fan_out<R: Rng + ?Sized>(
    shape: (usize, usize, usize, usize),
    rng: &mut R,
) -> Result<Array4<f32>, ModelError> {
    let normal = kaiming_normal(shape.0, (shape.2, shape.3))?;
    Ok(Array4::from_shape_simple_fn(shape, || {
        normal.sample(&mut *rng) as f32
    }))
}

fn kaiming_normal(
    out_channels: usize,
    kernel_size: (usize, usize),
) -> Result<Normal<f64>, ModelError> {
    if out_channels == 0 || kernel_size.0 == 0 || kernel_size.1 == 0 {
        return Err(ModelError::InputValidationError(format!(
            "Kaiming initialization needs non-zero output channels and kernel size, got {} and {:?}",
            out_channels, kernel_size
        )));
    }
    Normal::new(0.0, kaiming_fan_out_std(out_channels, kernel_size))
        .map_err(|e| ModelError::ProcessingError(e.to_string()))
}

/// Widens a convolution kernel with freshly initialized input channels.
///
/// For every output filter the existing input-channel planes are copied verbatim
/// and `extra_channels` new planes are appended, drawn independently from
/// `N(0, 2 / n)` with `n = kernel_height * kernel_width * out_channels`.
/// PortraitFCN+ uses this to turn a pretrained `(64, 3, 3, 3)` first layer into a
/// `(64, 6, 3, 3)` one.
///
/// # Parameters
///
/// - `source` - Existing kernel \[out_channels, in_channels, kernel_height, kernel_width\]
/// - `extra_channels` - Number of input channels to append
/// - `rng` - Source of randomness for the new planes
///
/// # Returns
///
/// - `Ok(Array4<f32>)` - Kernel of shape \[out_channels, in_channels + extra_channels, kernel_height, kernel_width\]
/// - `Err(ModelError::InputValidationError)` - If `source` has no filters or an empty kernel
///
/// # Example
/// ```rust
/// use portraitseg::neural_network::initializer::splice_input_channels;
/// use ndarray::Array4;
/// use rand::SeedableRng;
/// use rand::rngs::StdRng;
///
/// let pretrained = Array4::<f32>::ones((64, 3, 3, 3));
/// let mut rng = StdRng::seed_from_u64(7);
/// let spliced = splice_input_channels(&pretrained, 3, &mut rng).unwrap();
/// assert_eq!(spliced.shape(), &[64, 6, 3, 3]);
/// assert_eq!(spliced[[10, 2, 1, 1]], 1.0);
/// ```
pub fn splice_input_channels<R: Rng + ?Sized>(
    source: &Array4<f32>,
    extra_channels: usize,
    rng: &mut R,
) -> Result<Array4<f32>, ModelError> {
    let (out_channels, in_channels, kernel_height, kernel_width) = source.dim();
    let normal = kaiming_normal(out_channels, (kernel_height, kernel_width))?;

    let mut spliced = Array4::zeros((
        out_channels,
        in_channels + extra_channels,
        kernel_height,
        kernel_width,
    ));
    spliced
        .slice_mut(s![.., ..in_channels, .., ..])
        .assign(source);

    // Filter by filter, so a given seed always lands on the same weights
    for mut filter in spliced.outer_iter_mut() {
        filter
            .slice_mut(s![in_channels.., .., ..])
            .map_inplace(|value| *value = normal.sample(&mut *rng) as f32);
    }

    Ok(spliced)
}
