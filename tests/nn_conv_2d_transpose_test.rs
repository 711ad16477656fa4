use approx::assert_relative_eq;
use ndarray::{Array4, s};
use portraitseg::neural_network::initializer::get_upsampling_weight;
use portraitseg::prelude::*;

#[test]
fn test_conv_2d_transpose_output_shape() {
    let mut upscore2 = Conv2DTranspose::new(2, 2, (4, 4), (2, 2)).unwrap();
    let x = Array4::<f32>::ones((1, 2, 4, 4)).into_dyn();
    assert_eq!(upscore2.forward(&x).unwrap().shape(), &[1, 2, 10, 10]);
    assert_eq!(upscore2.output_shape(), "(1, 2, 10, 10)");

    let mut upscore8 = Conv2DTranspose::new(3, 3, (16, 16), (8, 8)).unwrap();
    let x = Array4::<f32>::ones((2, 3, 10, 10)).into_dyn();
    assert_eq!(upscore8.forward(&x).unwrap().shape(), &[2, 3, 88, 88]);
}

#[test]
fn test_conv_2d_transpose_starts_bilinear() {
    let upscore = Conv2DTranspose::new(3, 3, (4, 4), (2, 2)).unwrap();
    assert_eq!(upscore.get_kernel(), &get_upsampling_weight(3, 3, 4));
    assert_eq!(upscore.param_count(), TrainingParameters::Trainable(3 * 3 * 4 * 4));
}

#[test]
fn test_bilinear_upsampling_preserves_constant_interior() {
    let mut upscore = Conv2DTranspose::new(1, 1, (4, 4), (2, 2)).unwrap();
    let x = Array4::<f32>::from_elem((1, 1, 4, 4), 3.0).into_dyn();
    let output = upscore.forward(&x).unwrap();

    for i in 2..8 {
        for j in 2..8 {
            assert_relative_eq!(output[[0, 0, i, j]], 3.0, epsilon = 1e-6);
        }
    }
    // Border pixels only see part of the kernel
    assert_relative_eq!(output[[0, 0, 0, 0]], 3.0 * 0.25 * 0.25, epsilon = 1e-6);
}

#[test]
fn test_bilinear_upsampling_keeps_channels_apart() {
    let mut upscore = Conv2DTranspose::new(2, 2, (4, 4), (2, 2)).unwrap();
    let mut x = Array4::<f32>::zeros((1, 2, 3, 3));
    x.slice_mut(s![0, 1, .., ..]).fill(1.0);
    let output = upscore.forward(&x.into_dyn()).unwrap();

    assert!(output.slice(s![0, 0, .., ..]).iter().all(|&v| v == 0.0));
    assert!(output.slice(s![0, 1, .., ..]).iter().any(|&v| v > 0.0));
}

#[test]
fn test_conv_2d_transpose_scatter_with_custom_kernel() {
    let mut upscore = Conv2DTranspose::new(1, 1, (2, 2), (1, 1)).unwrap();
    upscore.set_weights(Array4::ones((1, 1, 2, 2))).unwrap();

    let mut x = Array4::<f32>::zeros((1, 1, 2, 2));
    x[[0, 0, 0, 0]] = 1.0;
    x[[0, 0, 1, 1]] = 2.0;
    let output = upscore.forward(&x.into_dyn()).unwrap();

    assert_eq!(output.shape(), &[1, 1, 3, 3]);
    assert_relative_eq!(output[[0, 0, 0, 0]], 1.0);
    assert_relative_eq!(output[[0, 0, 1, 1]], 3.0);
    assert_relative_eq!(output[[0, 0, 2, 2]], 2.0);
    assert_relative_eq!(output[[0, 0, 0, 2]], 0.0);
}

#[test]
fn test_conv_2d_transpose_validation() {
    assert!(Conv2DTranspose::new(0, 2, (4, 4), (2, 2)).is_err());
    assert!(Conv2DTranspose::new(2, 2, (4, 4), (0, 2)).is_err());

    let mut upscore = Conv2DTranspose::new(2, 2, (4, 4), (2, 2)).unwrap();
    assert!(upscore.set_weights(Array4::zeros((2, 2, 3, 3))).is_err());

    let wrong_channels = Array4::<f32>::ones((1, 3, 4, 4)).into_dyn();
    assert!(matches!(
        upscore.forward(&wrong_channels),
        Err(ModelError::InputValidationError(_))
    ));

    let empty = Array4::<f32>::ones((1, 2, 0, 4)).into_dyn();
    assert!(matches!(
        upscore.forward(&empty),
        Err(ModelError::InputValidationError(_))
    ));
}
