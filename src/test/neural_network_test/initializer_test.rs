use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn upsampling_weight_single_channel_3x3() {
    let weight = get_upsampling_weight(1, 1, 3);
    assert_eq!(weight.shape(), &[1, 1, 3, 3]);
    assert_relative_eq!(weight[[0, 0, 1, 1]], 1.0);
    // Tent of [0.5, 1.0, 0.5] in both directions
    assert_relative_eq!(weight[[0, 0, 0, 0]], 0.25);
    assert_relative_eq!(weight[[0, 0, 2, 2]], 0.25);
    assert_relative_eq!(weight[[0, 0, 0, 1]], 0.5);
}

#[test]
fn upsampling_weight_is_diagonal() {
    for kernel_size in [1, 3, 4, 5, 16] {
        let weight = get_upsampling_weight(3, 3, kernel_size);
        assert_eq!(weight.shape(), &[3, 3, kernel_size, kernel_size]);

        for i in 0..3 {
            for j in 0..3 {
                let plane = weight.slice(s![i, j, .., ..]);
                if i != j {
                    assert!(plane.iter().all(|&v| v == 0.0));
                } else {
                    assert_eq!(plane, weight.slice(s![0, 0, .., ..]));
                }
            }
        }
    }
}

#[test]
fn upsampling_weight_centre_is_one_for_odd_kernels() {
    for kernel_size in [1, 3, 5, 7] {
        let weight = get_upsampling_weight(2, 2, kernel_size);
        let c = kernel_size / 2;
        assert_relative_eq!(weight[[1, 1, c, c]], 1.0);
    }
}

#[test]
fn upsampling_weight_values_in_unit_interval() {
    for kernel_size in 1..=16 {
        let weight = get_upsampling_weight(2, 2, kernel_size);
        assert!(weight.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
}

#[test]
fn upsampling_weight_even_kernel_is_symmetric() {
    let weight = get_upsampling_weight(1, 1, 4);
    let expected = [0.25f32, 0.75, 0.75, 0.25];
    for row in 0..4 {
        for col in 0..4 {
            assert_relative_eq!(weight[[0, 0, row, col]], expected[row] * expected[col]);
        }
    }
}

#[test]
fn upsampling_weight_with_unequal_channels_fills_shared_diagonal() {
    let weight = get_upsampling_weight(2, 4, 3);
    assert_eq!(weight.shape(), &[2, 4, 3, 3]);
    assert_relative_eq!(weight[[0, 0, 1, 1]], 1.0);
    assert_relative_eq!(weight[[1, 1, 1, 1]], 1.0);
    assert!(weight.slice(s![.., 2.., .., ..]).iter().all(|&v| v == 0.0));
}

#[test]
fn kaiming_std_uses_fan_out() {
    assert_relative_eq!(kaiming_fan_out_std(64, (3, 3)), (2.0f64 / 576.0).sqrt());
    assert_relative_eq!(kaiming_fan_out_std(2, (1, 1)), 1.0);
}

#[test]
fn kaiming_normal_rejects_empty_shapes() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(kaiming_normal_fan_out((0, 3, 3, 3), &mut rng).is_err());
    assert!(kaiming_normal_fan_out((4, 3, 0, 3), &mut rng).is_err());
    assert_eq!(
        kaiming_normal_fan_out((4, 3, 3, 3), &mut rng).unwrap().shape(),
        &[4, 3, 3, 3]
    );
}

#[test]
fn splice_copies_source_planes_exactly() {
    let source = Array::from_iter((0..64 * 3 * 3 * 3).map(|v| v as f32 * 0.01))
        .into_shape_with_order((64, 3, 3, 3))
        .unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let spliced = splice_input_channels(&source, 3, &mut rng).unwrap();

    assert_eq!(spliced.shape(), &[64, 6, 3, 3]);
    assert_eq!(spliced.slice(s![.., ..3, .., ..]), source);
}

#[test]
fn splice_tail_is_not_derived_from_source() {
    let source = Array4::<f32>::from_elem((64, 3, 3, 3), 7.0);
    let mut rng = StdRng::seed_from_u64(2);
    let spliced = splice_input_channels(&source, 3, &mut rng).unwrap();

    let tail = spliced.slice(s![.., 3.., .., ..]);
    assert!(tail.iter().all(|&v| v != 7.0));
    // Planes of different filters are drawn independently
    assert_ne!(tail.slice(s![0, .., .., ..]), tail.slice(s![1, .., .., ..]));
}

#[test]
fn splice_is_deterministic_for_a_seed() {
    let source = Array4::<f32>::zeros((8, 3, 3, 3));
    let a = splice_input_channels(&source, 3, &mut StdRng::seed_from_u64(9)).unwrap();
    let b = splice_input_channels(&source, 3, &mut StdRng::seed_from_u64(9)).unwrap();
    let c = splice_input_channels(&source, 3, &mut StdRng::seed_from_u64(10)).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn splice_without_extra_channels_is_a_copy() {
    let source = Array4::<f32>::ones((4, 3, 3, 3));
    let mut rng = StdRng::seed_from_u64(3);
    assert_eq!(splice_input_channels(&source, 0, &mut rng).unwrap(), source);
}

#[test]
fn splice_rejects_empty_source() {
    let source = Array4::<f32>::zeros((0, 3, 3, 3));
    let mut rng = StdRng::seed_from_u64(4);
    assert!(matches!(
        splice_input_channels(&source, 3, &mut rng),
        Err(ModelError::InputValidationError(_))
    ));
}
