use super::*;

#[test]
fn relu_clamps_negatives() {
    let mut relu = ReLU::new();
    let x = ramp(2, 3).mapv(|v| v - 2.0);
    let output = relu.forward(&x).unwrap();
    assert_eq!(
        output.iter().cloned().collect::<Vec<_>>(),
        vec![0.0, 0.0, 0.0, 1.0, 2.0, 3.0]
    );
    assert_eq!(relu.output_shape(), "(1, 1, 2, 3)");
}

#[test]
fn relu_rejects_nan_and_empty_input() {
    let mut relu = ReLU::new();
    let mut x = ramp(2, 2);
    x[[0, 0, 1, 1]] = f32::NAN;
    assert!(relu.forward(&x).is_err());
    assert!(relu.forward(&Tensor::zeros(IxDyn(&[0]))).is_err());
}

#[test]
fn linear_is_identity() {
    let mut linear = Linear::new();
    let x = ramp(3, 3).mapv(|v| v - 4.0);
    assert_eq!(linear.forward(&x).unwrap(), x);
    assert_eq!(linear.param_count(), TrainingParameters::NoTrainable);
}
