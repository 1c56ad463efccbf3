use std::f64::consts::E;

/// Activation functions known to the registry.
///
/// Units store the activation by *name* (see `Unit::activation`), and resolve
/// it through `ActivationFunction::from_name` every time they step.  Names the
/// registry does not recognise fall back to `Identity`, so networks saved with
/// a missing or unknown `fn` still compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActivationFunction {
    Sigmoid,
    Tanh,
    #[default]
    Identity,
}

impl ActivationFunction {
    /// Looks up an activation by name.  Unknown names resolve to `Identity`.
    pub fn from_name(name: &str) -> ActivationFunction {
        match name {
            "sigmoid" => ActivationFunction::Sigmoid,
            "tanh" => ActivationFunction::Tanh,
            _ => ActivationFunction::Identity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Tanh => "tanh",
            ActivationFunction::Identity => "identity",
        }
    }

    /// Applies the activation to a unit's net input.
    pub fn function(&self, net: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-net)),
            ActivationFunction::Tanh => {
                let (pos, neg) = (E.powf(net), E.powf(-net));
                (pos - neg) / (pos + neg)
            }
            ActivationFunction::Identity => net,
        }
    }

    /// Derivative of the activation, expressed in terms of the unit's
    /// *output* rather than its net input.
    ///
    /// Callers must therefore only use this after a forward step has set the
    /// output it is given.
    pub fn derivative(&self, output: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => output * (1.0 - output),
            ActivationFunction::Tanh => 1.0 - output * output,
            ActivationFunction::Identity => 1.0,
        }
    }
}
