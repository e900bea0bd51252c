// Exercises the public surface the way a caller composes layers: forward
// passes chained by hand, then gradients handed backwards layer by layer.

use approx::assert_abs_diff_eq;
use layerkit::prelude::*;

#[test]
fn layer_types_report_their_kind() {
    let layers: Vec<Box<dyn Layer>> = vec![
        Box::new(Dense::with_seed(2, 0).unwrap()),
        Box::new(ReLU::new()),
        Box::new(LeakyReLU::default()),
        Box::new(SoftMax::new()),
        Box::new(Sigmoid::new()),
        Box::new(Tanh::new()),
    ];
    let kinds: Vec<String> = layers.iter().map(|l| l.typ()).collect();
    assert_eq!(
        kinds,
        vec!["Dense", "ReLU", "LeakyReLU", "SoftMax", "Sigmoid", "Tanh"]
    );
}

#[test]
fn dense_then_sigmoid_round_trip() {
    let mut dense = Dense::from_parameters(array![[1.0, -1.0], [0.5, 0.5]], array![0.0, 0.0]).unwrap();
    let mut sigmoid = Sigmoid::new();

    let x = array![2.0, 1.0];
    let z = dense.forward(&x).unwrap();
    let a = sigmoid.forward(&z).unwrap();
    assert_abs_diff_eq!(z, array![1.0, 1.5]);
    assert_abs_diff_eq!(a, z.mapv(|v| 1.0 / (1.0 + (-v).exp())));

    // chaining backwards: the activation's input gradient feeds the dense layer
    let upstream = array![1.0, 1.0];
    let (_, da) = sigmoid.backprop(&upstream).unwrap();
    let (trainable, dx) = dense.backprop(&da).unwrap();

    assert_eq!(trainable.len(), 2);
    assert!(trainable.contains_key("weights"));
    assert!(trainable.contains_key("biases"));
    assert_eq!(dx.len(), 2);
}

#[test]
fn dense_metadata_before_and_after_build() {
    let mut layer = Dense::with_seed(5, 11).unwrap();
    assert!(!layer.built());
    assert_eq!(layer.output_shape(), Some(5));
    assert_eq!(layer.input_shape(), None);
    assert_eq!(layer.n_param(), 0);
    assert!(layer.trainable().is_empty());

    layer.forward(&array![1.0, 2.0, 3.0]).unwrap();
    assert_eq!(layer.n_param(), 5 * 3 + 5);
    assert_eq!(layer.input_shape(), Some(3));
}

#[test]
fn cache_tracks_latest_forward_call() {
    let mut layer = Tanh::new();
    layer.forward(&array![1.0]).unwrap();
    layer.forward(&array![-2.0]).unwrap();

    let cache = layer.cache();
    assert_abs_diff_eq!(cache.input.as_ref().unwrap(), &array![-2.0]);
    assert_abs_diff_eq!(
        cache.output.as_ref().unwrap(),
        &array![(-2.0f64).tanh()]
    );
}
