use std::fs;

use saliency::models::{simple_cnn, Network};
use saliency::tensor::Tensor;
use saliency::weights::{load_network, save_network};

fn varied_input() -> Tensor {
    let data = (0..3 * 8 * 8).map(|i| (i as f32 * 0.37).sin()).collect();
    Tensor::new(data, vec![1, 3, 8, 8])
}

#[test]
fn weights_round_trip_restores_outputs() {
    let dir = std::env::temp_dir().join("saliency-weights-test");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("net.bin");
    let path = path.to_str().unwrap();

    let mut saved = simple_cnn(8, 3);
    let mut restored = simple_cnn(8, 3);
    let input = varied_input();

    let before = saved.forward(&input);
    save_network(path, &mut saved).unwrap();
    load_network(path, &mut restored).unwrap();
    let after = restored.forward(&input);

    assert_eq!(before.data, after.data);
}

#[test]
fn load_into_mismatched_architecture_fails() {
    let dir = std::env::temp_dir().join("saliency-weights-mismatch-test");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("net.bin");
    let path = path.to_str().unwrap();

    let mut saved = simple_cnn(8, 3);
    save_network(path, &mut saved).unwrap();

    let mut other = simple_cnn(8, 4);
    let err = load_network(path, &mut other).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
}
