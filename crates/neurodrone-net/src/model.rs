use serde::{Deserialize, Serialize};

use crate::{NetworkLoadError, NeuralNetwork};

/// Persistable form of a [`NeuralNetwork`].
///
/// Topology as an ordered layer-size list, followed by the flattened weight
/// tensor in `(layer, source, target)` order. The element count is checked
/// on load, so a truncated or padded file never yields a usable network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkModel {
    /// Neuron count per layer, input first, output last.
    pub layers: Vec<usize>,
    /// Flattened weights, `(layer, source, target)` order.
    pub weights: Vec<f32>,
}

impl NetworkModel {
    /// Snapshots a network's topology and weights.
    #[must_use]
    pub fn from_network(network: &NeuralNetwork) -> Self {
        Self {
            layers: network.layers().to_vec(),
            weights: network.flat_weights().collect(),
        }
    }

    /// Rebuilds the network this model was snapshotted from.
    ///
    /// # Errors
    ///
    /// [`NetworkLoadError`] if the stored topology is invalid or the weight
    /// count does not match it.
    pub fn to_network(&self) -> Result<NeuralNetwork, NetworkLoadError> {
        NeuralNetwork::from_flat_weights(&self.layers, &self.weights)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut net = NeuralNetwork::new(&[3, 4, 2], &mut rng).unwrap();

        let model = NetworkModel::from_network(&net);
        let json = serde_json::to_string(&model).unwrap();
        let restored: NetworkModel = serde_json::from_str(&json).unwrap();
        let mut rebuilt = restored.to_network().unwrap();

        let input = [0.4, -0.1, 0.8];
        assert_eq!(
            net.feed_forward(&input).unwrap(),
            rebuilt.feed_forward(&input).unwrap()
        );
    }

    #[test]
    fn test_tampered_weight_count_rejected() {
        let mut rng = Pcg32::seed_from_u64(6);
        let net = NeuralNetwork::new(&[3, 4, 2], &mut rng).unwrap();

        let mut model = NetworkModel::from_network(&net);
        model.weights.pop();
        assert!(matches!(
            model.to_network(),
            Err(NetworkLoadError::WeightCountMismatch(_))
        ));
    }
}
