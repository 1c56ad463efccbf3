use rand::rngs::StdRng;
use rand::SeedableRng;

use neurostep::{Network, NetworkSpec};

fn trained() -> Network {
    let spec = NetworkSpec {
        inputs: vec![0.05, 0.1],
        expected_outputs: vec![0.01, 0.99],
        unit_counts: vec![2, 2],
        biases: vec![0.35, 0.6],
        learning_rate: 0.5,
        activation: "sigmoid".into(),
    };
    let mut net = spec.build_with_rng(&mut StdRng::seed_from_u64(42));
    net.train().take(8 * 10 + 3).for_each(drop);
    net
}

#[test]
fn document_round_trip_keeps_weights_and_clears_computed_outputs() {
    let net = trained();
    let restored = Network::from_json(&net.to_json().unwrap()).unwrap();

    assert_eq!(restored.inputs(), net.inputs());
    assert_eq!(restored.expected_outputs, net.expected_outputs);
    assert_eq!(restored.learning_rate, net.learning_rate);
    assert_eq!(restored.activation(), "sigmoid");
    assert_eq!(restored.biases(), net.biases());
    assert_eq!(restored.layers.len(), net.layers.len());

    for (a, b) in restored.layers.iter().zip(&net.layers) {
        assert_eq!(a.bias(), b.bias());
        for (ua, ub) in a.units.iter().zip(&b.units) {
            assert_eq!(ua.weights(), ub.weights());
            assert_eq!(ua.activation, ub.activation);
            if ua.layer_index == 0 {
                assert_eq!(ua.output, ub.output);
            } else {
                assert!(ua.output.is_none());
            }
        }
    }
}

#[test]
fn restored_network_recomputes_the_same_outputs() {
    let mut net = trained();
    let mut restored = Network::from_json(&net.to_json_pretty().unwrap()).unwrap();
    assert_eq!(restored.forward(), net.forward());
}

#[test]
fn legacy_underscored_document_loads() {
    let doc = r#"{
        "_inputs": [1, 2],
        "expected_outputs": [0.5],
        "learning_rate": "0.25",
        "_fn": "tanh",
        "_biases": [0.1],
        "layers": [
            {"layer_index": 0, "_bias": 0, "_fn": "", "units": [
                {"layer_index": 0, "unit_index": 0, "bias": 0, "inputs": [], "weights": [], "output": 1},
                {"layer_index": 0, "unit_index": 1, "bias": 0, "inputs": [], "weights": [], "output": 2}
            ]},
            {"layer_index": 1, "_bias": 0.1, "_fn": "tanh", "units": [
                {"layer_index": 1, "unit_index": 0, "bias": 0.1, "fn": "tanh",
                 "inputs": [1, 2], "weights": "0.5,x,0.25", "output": 0.9, "net": 1.1, "sigma": null}
            ]}
        ]
    }"#;

    let mut net = Network::from_json(doc).unwrap();
    assert_eq!(net.inputs(), &[1.0, 2.0]);
    assert_eq!(net.learning_rate, 0.25);
    assert_eq!(net.activation(), "tanh");
    assert_eq!(net.biases(), &[0.1]);
    assert_eq!(net.layers[1].bias(), 0.1);
    assert_eq!(net.layers[1].activation(), "tanh");

    let unit = net.unit(1, 0).unwrap();
    assert_eq!(unit.weights(), &[0.5, 0.0, 0.25]);
    assert_eq!(unit.inputs().len(), 3);
    assert!(unit.output.is_none());
    assert_eq!(net.unit(0, 1).unwrap().output, Some(2.0));

    let outputs = net.forward();
    assert_eq!(outputs.len(), 1);
    assert!((outputs[0] - (0.5f64 + 0.1).tanh()).abs() < 1e-12);
}

#[test]
fn save_and_load_through_a_file() {
    let net = trained();
    let path = std::env::temp_dir().join(format!("neurostep-persist-{}.json", std::process::id()));

    net.save_json(&path).unwrap();
    let loaded = Network::load_json(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.layers.len(), net.layers.len());
    assert_eq!(loaded.unit(2, 1).unwrap().weights(), net.unit(2, 1).unwrap().weights());
}

#[test]
fn malformed_document_is_an_error() {
    assert!(Network::from_json("{\"layers\": 3}").is_err());
    assert!(Network::load_json("/nonexistent/neurostep/network.json").is_err());
}

#[test]
fn spec_file_round_trip() {
    let spec = NetworkSpec::from_fields("0.05, 0.1", "0.01,0.99", "2,2", "0.35,0.6", 0.5, "sigmoid");
    let path = std::env::temp_dir().join(format!("neurostep-spec-{}.json", std::process::id()));
    let path = path.to_string_lossy().into_owned();

    spec.save_json(&path).unwrap();
    let loaded = NetworkSpec::load_json(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(loaded, spec);
}

#[test]
fn random_weights_reload_bit_for_bit() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..200 {
        let inputs: Vec<f64> = (0..4).map(|_| rand::Rng::gen::<f64>(&mut rng)).collect();
        let net = Network::with_rng(inputs, vec![0.5], &[8, 8, 1], vec![0.1, 0.2, 0.3], &mut rng);
        let restored = Network::from_json(&net.to_json().unwrap()).unwrap();

        for (a, b) in restored.layers.iter().zip(&net.layers) {
            for (ua, ub) in a.units.iter().zip(&b.units) {
                let bits = |w: &[f64]| w.iter().map(|x| x.to_bits()).collect::<Vec<_>>();
                assert_eq!(bits(ua.weights()), bits(ub.weights()));
                if ua.layer_index == 0 {
                    assert_eq!(ua.output.map(f64::to_bits), ub.output.map(f64::to_bits));
                }
            }
        }
        assert_eq!(
            restored.inputs().iter().map(|x| x.to_bits()).collect::<Vec<_>>(),
            net.inputs().iter().map(|x| x.to_bits()).collect::<Vec<_>>()
        );
    }
}
