use rand::rngs::StdRng;
use rand::SeedableRng;

use neurostep::{Network, NetworkSpec, Phase, StepSequence, TrainProcess};

/// The network holds a single example, so each XOR case is swapped in with
/// `update` and trained for one forward+backward cycle before moving on.
fn main() {
    let cases = [
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
        ([0.0, 1.0], 1.0),
        ([0.0, 0.0], 0.0),
    ];

    let spec = NetworkSpec {
        inputs: vec![0.0, 0.0],
        expected_outputs: vec![0.0],
        unit_counts: vec![3, 1],
        biases: vec![0.5, 0.5],
        learning_rate: 0.5,
        activation: "sigmoid".into(),
    };
    let mut network = spec.build_with_rng(&mut StdRng::seed_from_u64(1));

    // One unit at a time: print the first cycle in full.
    let mut process = TrainProcess::new();
    while process.epochs() == 0 {
        let Some(token) = process.advance(&mut network) else { break };
        let unit = &network.layers[token.layer_index].units[token.unit_index];
        match process.phase() {
            Phase::Forward => println!("forward  {:?} out   = {:.6}", token, unit.output.unwrap_or(0.0)),
            Phase::Backward => println!("backward {:?} sigma = {:.6}", token, unit.sigma.unwrap_or(0.0)),
        }
    }

    for epoch in 0..20000 {
        let mut total = 0.0;
        for (inputs, target) in &cases {
            train_case(&mut network, inputs, *target, spec.learning_rate);
            total += network.err();
        }
        if epoch % 2000 == 0 {
            println!("Epoch {epoch}: err = {total:.6}");
        }
    }

    for (inputs, _) in &cases {
        network.update(inputs.to_vec(), vec![0.0], spec.learning_rate, spec.biases.clone());
        println!("Input: {:?} -> Output: {:.4}", inputs, network.forward()[0]);
    }
}

fn train_case(network: &mut Network, inputs: &[f64], target: f64, learning_rate: f64) {
    network.update(inputs.to_vec(), vec![target], learning_rate, vec![0.5, 0.5]);
    let mut process = TrainProcess::new();
    while process.epochs() == 0 && process.advance(network).is_some() {}
}
