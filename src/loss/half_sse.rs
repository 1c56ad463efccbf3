/// The network error `E = ½ Σ (output_k - expected_k)²`.
///
/// A missing target (fewer expected values than output units) reads as 0.
pub struct HalfSquaredError;

impl HalfSquaredError {
    /// Scalar error over all output units.
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        let sum: f64 = predicted.iter().enumerate()
            .map(|(k, out)| (out - target(expected, k)).powi(2))
            .sum();
        sum / 2.0
    }

    /// Per-output seed for the backward pass: `expected_k - output_k`.
    ///
    /// This is the *negated* gradient ∂E/∂out_k.  The backward pass pairs it
    /// with a synthetic downstream weight of -1 so the output layer can use the
    /// same delta rule as the hidden layers.
    pub fn output_seeds(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().enumerate()
            .map(|(k, out)| target(expected, k) - out)
            .collect()
    }
}

fn target(expected: &[f64], k: usize) -> f64 {
    expected.get(k).copied().unwrap_or(0.0)
}
