use super::*;

#[test]
fn pooled_length_floor_drops_partial_window() {
    assert_eq!(pooled_length(5, 2, 2, false), 2);
    assert_eq!(pooled_length(4, 2, 2, false), 2);
    assert_eq!(pooled_length(1, 2, 2, false), 0);
}

#[test]
fn pooled_length_ceil_keeps_partial_window() {
    assert_eq!(pooled_length(5, 2, 2, true), 3);
    assert_eq!(pooled_length(4, 2, 2, true), 2);
    assert_eq!(pooled_length(1, 2, 2, true), 1);
}

#[test]
fn pooled_length_follows_fcn8s_trunk() {
    // conv1_1 turns an 8x8 image into 206x206 because of the 100-pixel padding
    let mut size = 206;
    let mut sizes = Vec::new();
    for _ in 0..5 {
        size = pooled_length(size, 2, 2, true);
        sizes.push(size);
    }
    assert_eq!(sizes, vec![103, 52, 26, 13, 7]);
}

#[test]
fn transposed_length_matches_fcn8s_upsamplers() {
    assert_eq!(transposed_length(1, 4, 2), 4);
    assert_eq!(transposed_length(4, 4, 2), 10);
    assert_eq!(transposed_length(10, 16, 8), 88);
    assert_eq!(transposed_length(0, 4, 2), 0);
}

#[test]
fn output_shape_2d_pooling() {
    assert_eq!(
        calculate_output_shape_2d_pooling(&[2, 3, 13, 13], (2, 2), (2, 2), true),
        vec![2, 3, 7, 7]
    );
    assert_eq!(
        calculate_output_shape_2d_pooling(&[2, 3, 13, 13], (2, 2), (2, 2), false),
        vec![2, 3, 6, 6]
    );
}

#[test]
fn padding_resolution() {
    assert_eq!(PaddingType::Valid.resolve(8, 8, (3, 3), (1, 1)), (0, 0, 0, 0));
    assert_eq!(
        PaddingType::Explicit(100, 100).resolve(8, 8, (3, 3), (1, 1)),
        (100, 100, 100, 100)
    );
    assert_eq!(PaddingType::Same.resolve(8, 8, (3, 3), (1, 1)), (1, 1, 1, 1));
}

#[test]
fn format_shape_prints_tuple() {
    assert_eq!(format_shape(&[1, 2, 8, 8]), "(1, 2, 8, 8)");
}
