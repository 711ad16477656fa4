use ndarray::Array4;
use portraitseg::models::{Fcn8s, Fcn8sConfig};
use portraitseg::prelude::*;
use std::path::PathBuf;

fn tiny_config() -> Fcn8sConfig {
    Fcn8sConfig::default()
        .with_n_class(2)
        .with_widths([2, 2, 2, 2, 2])
        .with_fc_width(4)
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("portraitseg_{}_{}.json", name, std::process::id()))
}

#[test]
fn test_checkpoint_round_trip_reproduces_weights() {
    let source = Fcn8s::new(tiny_config()).unwrap();
    let path = temp_path("round_trip");
    source.save_to_path(&path).unwrap();

    let mut target = Fcn8s::new(tiny_config()).unwrap();
    // Xavier draws differ between the two models before loading
    assert_ne!(
        source.get_conv1_1().get_kernel(),
        target.get_conv1_1().get_kernel()
    );
    target.load_from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(source.to_checkpoint(), target.to_checkpoint());

    let x = Array4::<f32>::from_shape_fn((1, 3, 8, 8), |(_, c, i, j)| (c + i + j) as f32 * 0.1)
        .into_dyn();
    let mut source = source;
    assert_eq!(source.forward(&x).unwrap(), target.forward(&x).unwrap());
}

#[test]
fn test_checkpoint_file_round_trip() {
    let model = Fcn8s::new(tiny_config()).unwrap();
    let checkpoint = model.to_checkpoint();
    let path = temp_path("file");
    checkpoint.save_to_path(&path).unwrap();

    let loaded = Checkpoint::load_from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(loaded, checkpoint);
    assert_eq!(loaded.layers.len(), 21);
    assert_eq!(loaded.layers[0].name, "conv1_1");
    assert!(loaded.get("pool1").is_none());
    assert!(loaded.get("upscore8").is_some());
}

#[test]
fn test_loading_into_other_shape_fails() {
    let wide = Fcn8s::new(tiny_config().with_widths([4, 2, 2, 2, 2])).unwrap();
    let path = temp_path("mismatch");
    wide.save_to_path(&path).unwrap();

    let mut narrow = Fcn8s::new(tiny_config()).unwrap();
    let result = narrow.load_from_path(&path);
    std::fs::remove_file(&path).unwrap();

    assert!(matches!(result, Err(IoError::ModelStructureMismatch(_))));
}

#[test]
fn test_loading_other_class_count_fails() {
    let model = Fcn8s::new(tiny_config().with_n_class(3)).unwrap();
    let checkpoint = model.to_checkpoint();

    let mut two_class = Fcn8s::new(tiny_config()).unwrap();
    assert!(matches!(
        two_class.load_checkpoint(&checkpoint),
        Err(IoError::ModelStructureMismatch(_))
    ));
}

#[test]
fn test_missing_and_corrupt_checkpoint_files() {
    let missing = temp_path("does_not_exist");
    assert!(matches!(
        Checkpoint::load_from_path(&missing),
        Err(IoError::StdIoError(_))
    ));

    let corrupt = temp_path("corrupt");
    std::fs::write(&corrupt, "{ \"layers\": [ {").unwrap();
    let result = Checkpoint::load_from_path(&corrupt);
    std::fs::remove_file(&corrupt).unwrap();
    assert!(matches!(result, Err(IoError::JsonError(_))));
}
