use approx::assert_relative_eq;
use ndarray::{Array, Array2, Array4};
use portraitseg::prelude::*;

fn ramp_3x3() -> Tensor {
    Array::from_iter((0..9).map(|v| v as f32))
        .into_shape_with_order((1, 1, 3, 3))
        .unwrap()
        .into_dyn()
}

#[test]
fn test_conv_2d_known_values() {
    let mut conv = Conv2D::new(1, (2, 2), 1, (1, 1), PaddingType::Valid, Linear::new()).unwrap();
    conv.set_weights(Array4::ones((1, 1, 2, 2)), Array2::zeros((1, 1)))
        .unwrap();

    let output = conv.forward(&ramp_3x3()).unwrap();
    assert_eq!(output.shape(), &[1, 1, 2, 2]);
    assert_relative_eq!(output[[0, 0, 0, 0]], 8.0);
    assert_relative_eq!(output[[0, 0, 0, 1]], 12.0);
    assert_relative_eq!(output[[0, 0, 1, 0]], 20.0);
    assert_relative_eq!(output[[0, 0, 1, 1]], 24.0);
}

#[test]
fn test_conv_2d_bias_and_relu() {
    let mut conv = Conv2D::new(2, (1, 1), 1, (1, 1), PaddingType::Valid, ReLU::new()).unwrap();
    let mut bias = Array2::zeros((1, 2));
    bias[[0, 1]] = -100.0;
    conv.set_weights(Array4::ones((2, 1, 1, 1)), bias).unwrap();

    let output = conv.forward(&ramp_3x3()).unwrap();
    assert_relative_eq!(output[[0, 0, 2, 2]], 8.0);
    // The second filter is pushed below zero everywhere and clamped
    assert!(output.slice(ndarray::s![0, 1, .., ..]).iter().all(|&v| v == 0.0));
}

#[test]
fn test_conv_2d_explicit_padding_grows_output() {
    let mut conv = Conv2D::new(
        4,
        (3, 3),
        3,
        (1, 1),
        PaddingType::Explicit(100, 100),
        ReLU::new(),
    )
    .unwrap();
    let x = Array4::<f32>::ones((1, 3, 8, 8)).into_dyn();
    let output = conv.forward(&x).unwrap();
    assert_eq!(output.shape(), &[1, 4, 206, 206]);
    assert_eq!(conv.output_shape(), "(1, 4, 206, 206)");
}

#[test]
fn test_conv_2d_same_padding_and_strides() {
    let x = Array4::<f32>::ones((2, 1, 7, 7)).into_dyn();

    let mut same = Conv2D::new(2, (3, 3), 1, (1, 1), PaddingType::Same, Linear::new()).unwrap();
    assert_eq!(same.forward(&x).unwrap().shape(), &[2, 2, 7, 7]);

    let mut strided =
        Conv2D::new(2, (3, 3), 1, (2, 2), PaddingType::Valid, Linear::new()).unwrap();
    assert_eq!(strided.forward(&x).unwrap().shape(), &[2, 2, 3, 3]);
}

#[test]
fn test_conv_2d_input_validation() {
    let mut conv = Conv2D::new(2, (3, 3), 3, (1, 1), PaddingType::Valid, ReLU::new()).unwrap();

    let wrong_channels = Array4::<f32>::ones((1, 4, 8, 8)).into_dyn();
    assert!(matches!(
        conv.forward(&wrong_channels),
        Err(ModelError::InputValidationError(_))
    ));

    let too_small = Array4::<f32>::ones((1, 3, 2, 2)).into_dyn();
    assert!(conv.forward(&too_small).is_err());

    let not_4d = Array::<f32, _>::ones((3, 8, 8)).into_dyn();
    assert!(conv.forward(&not_4d).is_err());

    assert!(Conv2D::new(0, (3, 3), 3, (1, 1), PaddingType::Valid, ReLU::new()).is_err());
    assert!(Conv2D::new(2, (0, 3), 3, (1, 1), PaddingType::Valid, ReLU::new()).is_err());
    assert!(Conv2D::new(2, (3, 3), 3, (0, 1), PaddingType::Valid, ReLU::new()).is_err());
}

#[test]
fn test_conv_2d_rejects_empty_spatial_input() {
    let mut same = Conv2D::new(1, (3, 3), 1, (1, 1), PaddingType::Same, Linear::new()).unwrap();
    let no_rows = Array4::<f32>::zeros((1, 1, 0, 5)).into_dyn();
    assert!(matches!(
        same.forward(&no_rows),
        Err(ModelError::InputValidationError(_))
    ));
    let no_cols = Array4::<f32>::zeros((1, 1, 5, 0)).into_dyn();
    assert!(matches!(
        same.forward(&no_cols),
        Err(ModelError::InputValidationError(_))
    ));

    let mut padded =
        Conv2D::new(1, (3, 3), 1, (1, 1), PaddingType::Explicit(100, 100), Linear::new())
            .unwrap();
    assert!(padded.forward(&no_rows).is_err());
}

#[test]
fn test_conv_2d_set_weights_validation() {
    let mut conv = Conv2D::new(2, (3, 3), 3, (1, 1), PaddingType::Valid, ReLU::new()).unwrap();

    assert!(
        conv.set_weights(Array4::zeros((3, 3, 3, 3)), Array2::zeros((1, 3)))
            .is_err()
    );
    assert!(
        conv.set_weights(Array4::zeros((2, 3, 1, 1)), Array2::zeros((1, 2)))
            .is_err()
    );
    assert!(
        conv.set_weights(Array4::zeros((2, 3, 3, 3)), Array2::zeros((1, 3)))
            .is_err()
    );

    // Changing the number of input channels is allowed
    conv.set_weights(Array4::zeros((2, 5, 3, 3)), Array2::zeros((1, 2)))
        .unwrap();
    assert_eq!(conv.get_in_channels(), 5);
}

#[test]
fn test_conv_2d_param_count_and_weights() {
    let conv = Conv2D::new(4, (3, 3), 3, (1, 1), PaddingType::Valid, ReLU::new()).unwrap();
    assert_eq!(conv.param_count(), TrainingParameters::Trainable(4 * 3 * 3 * 3 + 4));
    assert_eq!(conv.layer_type(), "Conv2D");
    assert_eq!(conv.output_shape(), "(None, 4, None, None)");

    match conv.get_weights() {
        LayerWeight::Conv2D(w) => {
            assert_eq!(w.weight.shape(), &[4, 3, 3, 3]);
            assert!(w.bias.iter().all(|&v| v == 0.0));
        }
        _ => panic!("Conv2D should expose Conv2D weights"),
    }
}

#[test]
fn test_conv_2d_parallel_matches_sequential() {
    let mut conv = Conv2D::new(4, (3, 3), 2, (1, 1), PaddingType::Same, Linear::new()).unwrap();
    // 8 batches * 4 filters * 32 * 32 is above the parallel threshold; 1 batch is below it
    let batch = Array4::<f32>::from_shape_fn((8, 2, 32, 32), |(b, c, i, j)| {
        ((b + 2 * c + 3 * i + 5 * j) % 7) as f32 - 3.0
    })
    .into_dyn();
    let full = conv.forward(&batch).unwrap();

    let single = batch
        .slice(ndarray::s![5..6, .., .., ..])
        .to_owned()
        .into_dyn();
    let alone = conv.forward(&single).unwrap();
    assert_eq!(
        full.slice(ndarray::s![5..6, .., .., ..]).to_owned().into_dyn(),
        alone
    );
}
