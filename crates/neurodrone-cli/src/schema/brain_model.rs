use chrono::{DateTime, Utc};
use neurodrone_evolution::EvolutionSeed;
use neurodrone_net::NetworkModel;
use serde::{Deserialize, Serialize};

/// A trained controller as stored on disk.
///
/// The network itself is stored as topology plus the flattened weight
/// tensor (see [`NetworkModel`]); the surrounding fields record where the
/// brain came from. The seed replays the exact training run that produced
/// it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrainModel {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    /// Seed of the training run that produced this brain.
    pub seed: EvolutionSeed,
    /// Generations completed when the run ended.
    pub generations: u32,
    /// Fitness the brain scored when it was recorded.
    pub fitness: f32,
    pub network: NetworkModel,
}

#[cfg(test)]
mod tests {
    use neurodrone_net::NeuralNetwork;
    use rand::SeedableRng as _;
    use rand_pcg::Pcg32;

    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut rng = Pcg32::seed_from_u64(8);
        let net = NeuralNetwork::new(&[10, 16, 3], &mut rng).unwrap();
        let model = BrainModel {
            name: "corridor".to_owned(),
            trained_at: Utc::now(),
            seed: EvolutionSeed::from_bytes([0x42; 16]),
            generations: 40,
            fitness: 123.5,
            network: NetworkModel::from_network(&net),
        };

        let json = serde_json::to_string_pretty(&model).unwrap();
        let restored: BrainModel = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.seed, model.seed);
        assert_eq!(restored.network, model.network);
        let rebuilt = restored.network.to_network().unwrap();
        assert_eq!(rebuilt.layers(), [10, 16, 3]);
    }
}
