use serde::{Serialize, Deserialize};

use crate::layers::unit::StepToken;
use crate::network::network::Network;

/// Which kind of pass a step belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Forward,
    Backward,
}

/// A resumable, pull-based sequence of unit-level steps over a network.
///
/// The cursor keeps only its position, never a borrow of the network, so a
/// host can store it next to the network and advance it from its own
/// scheduling loop.  Each `advance` fully commits one unit's forward
/// evaluation or weight update before returning, which makes it safe to stop
/// between any two calls.
pub trait StepSequence {
    /// Performs the next unit step, or returns `None` when the sequence is
    /// exhausted.
    fn advance(&mut self, network: &mut Network) -> Option<StepToken>;

    fn is_exhausted(&self) -> bool;

    /// Phase of the step most recently returned by `advance`.
    fn phase(&self) -> Phase;

    /// Completed forward+backward cycles; always 0 for single passes.
    fn epochs(&self) -> usize {
        0
    }
}

/// A step sequence bound to the network it drives, usable as an `Iterator`.
pub struct Steps<'a, S: StepSequence> {
    network: &'a mut Network,
    cursor: S,
}

impl<'a, S: StepSequence> Steps<'a, S> {
    pub fn new(network: &'a mut Network, cursor: S) -> Steps<'a, S> {
        Steps { network, cursor }
    }

    /// Read access to the network between steps.
    pub fn network(&self) -> &Network {
        self.network
    }

    pub fn cursor(&self) -> &S {
        &self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor.is_exhausted()
    }

    /// Releases the network borrow, keeping the position for later.
    pub fn into_cursor(self) -> S {
        self.cursor
    }
}

impl<'a, S: StepSequence> Iterator for Steps<'a, S> {
    type Item = StepToken;

    fn next(&mut self) -> Option<StepToken> {
        self.cursor.advance(self.network)
    }
}
