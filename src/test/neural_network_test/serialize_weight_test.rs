use super::*;

#[test]
fn serializable_conv_2d_weight_keeps_layout() {
    let mut conv = Conv2D::new(2, (1, 1), 3, (1, 1), PaddingType::Valid, Linear::new()).unwrap();
    let weights = Array::from_iter((0..6).map(|v| v as f32))
        .into_shape_with_order((2, 3, 1, 1))
        .unwrap();
    conv.set_weights(weights.clone(), array![[0.5f32, -0.5]]).unwrap();

    let serialized = SerializableLayerWeight::from_layer_weight(&conv.get_weights());
    match serialized {
        SerializableLayerWeight::Conv2D(w) => {
            assert_eq!(w.weight[1][2][0][0], 5.0);
            assert_eq!(w.bias, vec![vec![0.5, -0.5]]);
            let (weight, bias) = w.to_arrays().unwrap();
            assert_eq!(weight, weights);
            assert_eq!(bias, array![[0.5f32, -0.5]]);
        }
        other => panic!("expected Conv2D weights, got {}", other.kind()),
    }
}

#[test]
fn ragged_weights_are_rejected() {
    let ragged = SerializableConv2DWeight {
        weight: vec![vec![vec![vec![1.0]]], vec![vec![vec![1.0, 2.0]]]],
        bias: vec![vec![0.0, 0.0]],
    };
    let mut conv = Conv2D::new(2, (1, 1), 1, (1, 1), PaddingType::Valid, Linear::new()).unwrap();
    assert!(matches!(
        ragged.apply_to_layer(&mut conv),
        Err(IoError::ModelStructureMismatch(_))
    ));
}

#[test]
fn pooling_and_dropout_have_no_weights() {
    let pool = MaxPooling2D::new((2, 2), None, true).unwrap();
    let dropout = SpatialDropout2D::new(0.5).unwrap();
    assert_eq!(
        SerializableLayerWeight::from_layer_weight(&pool.get_weights()),
        SerializableLayerWeight::Empty
    );
    assert_eq!(
        SerializableLayerWeight::from_layer_weight(&dropout.get_weights()),
        SerializableLayerWeight::Empty
    );
}

#[test]
fn layer_weight_is_tagged_in_json() {
    let upscore = Conv2DTranspose::new(1, 1, (2, 2), (2, 2)).unwrap();
    let serialized = SerializableLayerWeight::from_layer_weight(&upscore.get_weights());
    let json = serde_json::to_string(&serialized).unwrap();
    assert!(json.contains("\"type\":\"Conv2DTranspose\""));
    let back: SerializableLayerWeight = serde_json::from_str(&json).unwrap();
    assert_eq!(back, serialized);
}
