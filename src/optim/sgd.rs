/// Plain per-step gradient descent on a single unit's incoming weights.
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update `w -= sigma * lr * x` to every live weight.
    ///
    /// A weight that is exactly 0 is a frozen connection (it models "not
    /// connected") and is left untouched regardless of `sigma`.
    pub fn step(&self, weights: &mut [f64], inputs: &[f64], sigma: f64) {
        for (weight, input) in weights.iter_mut().zip(inputs.iter()) {
            if *weight != 0.0 {
                *weight -= sigma * self.learning_rate * input;
            }
        }
    }
}
