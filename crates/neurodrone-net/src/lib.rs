//! Fixed-topology feedforward networks for evolved drone controllers.
//!
//! A [`NeuralNetwork`] is a plain weight tensor plus scratch activation
//! storage. There is no training in the gradient sense: networks are
//! constructed with random weights, evaluated with [`NeuralNetwork::feed_forward`],
//! copied with [`Clone`], and perturbed in place with [`NeuralNetwork::mutate`].
//! The generational selection logic that decides *which* networks survive
//! lives in the `neurodrone-evolution` crate.
//!
//! All randomness is injected through `rand::Rng` bounds so that seeded runs
//! are reproducible.

pub use self::{
    model::NetworkModel,
    network::{DEFAULT_MUTATION_CHANCE, NeuralNetwork},
};

pub mod model;
pub mod network;

/// A topology with fewer than two layers, or a layer of zero neurons.
///
/// Fatal at construction time: no usable network is produced.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid topology {layers:?}: need at least two layers, all non-empty")]
pub struct InvalidTopologyError {
    /// The rejected layer sizes.
    pub layers: Vec<usize>,
}

/// An input vector whose length disagrees with the network's input layer.
///
/// Recoverable: [`NeuralNetwork::feed_forward`](crate::NeuralNetwork::feed_forward)
/// zero-fills its output before returning this, so the caller can keep going
/// with a neutral action vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("input length mismatch: expected {expected}, got {actual}")]
pub struct InputLenMismatchError {
    /// Required input width (`layers[0]`).
    pub expected: usize,
    /// Length of the vector that was supplied.
    pub actual: usize,
}

/// A flattened weight buffer whose length disagrees with the topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("weight count mismatch: topology needs {expected} weights, got {actual}")]
pub struct WeightCountMismatchError {
    /// Number of weights the topology requires.
    pub expected: usize,
    /// Number of weights that were supplied.
    pub actual: usize,
}

/// Failure to rebuild a network from persisted parts.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum NetworkLoadError {
    #[display("{_0}")]
    InvalidTopology(InvalidTopologyError),
    #[display("{_0}")]
    WeightCountMismatch(WeightCountMismatchError),
}
