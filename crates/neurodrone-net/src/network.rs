use rand::Rng;

use crate::{InputLenMismatchError, InvalidTopologyError, NetworkLoadError, WeightCountMismatchError};

/// Default per-weight mutation probability for exploratory mutation.
///
/// Breeding uses a lighter rate (see `neurodrone-evolution`); this is the
/// rate used when a caller wants a heavily perturbed copy.
pub const DEFAULT_MUTATION_CHANCE: f32 = 0.25;

/// A fixed-topology feedforward network with tanh activations and no bias.
///
/// The topology (neuron count per layer) is immutable after construction.
/// Weight values change only through [`Self::mutate`]. Activation storage is
/// owned scratch space, overwritten by every [`Self::feed_forward`] call; a
/// caller that needs to retain an output must copy it.
///
/// # Reproducibility
///
/// Construction and mutation draw from a caller-supplied [`Rng`], so a seeded
/// generator yields bit-identical networks across runs.
///
/// # Example
///
/// ```
/// use neurodrone_net::NeuralNetwork;
/// use rand::SeedableRng as _;
/// use rand_pcg::Pcg32;
///
/// let mut rng = Pcg32::seed_from_u64(7);
/// let mut net = NeuralNetwork::new(&[3, 4, 2], &mut rng).unwrap();
/// let out = net.feed_forward(&[0.5, -0.2, 0.9]).unwrap();
/// assert_eq!(out.len(), 2);
/// ```
#[derive(Debug)]
pub struct NeuralNetwork {
    layers: Vec<usize>,
    activations: Vec<Vec<f32>>,
    weights: Vec<Vec<Vec<f32>>>,
}

impl Clone for NeuralNetwork {
    /// Deep-copies topology and weights; activations are transient scratch
    /// and start zeroed in the copy.
    fn clone(&self) -> Self {
        Self {
            layers: self.layers.clone(),
            activations: zeroed_activations(&self.layers),
            weights: self.weights.clone(),
        }
    }
}

fn zeroed_activations(layers: &[usize]) -> Vec<Vec<f32>> {
    layers.iter().map(|&n| vec![0.0; n]).collect()
}

fn validate_topology(layers: &[usize]) -> Result<(), InvalidTopologyError> {
    if layers.len() < 2 || layers.contains(&0) {
        return Err(InvalidTopologyError {
            layers: layers.to_vec(),
        });
    }
    Ok(())
}

impl NeuralNetwork {
    /// Creates a network with every weight drawn uniformly from [-1, 1].
    ///
    /// # Arguments
    ///
    /// * `layers` - Neuron count per layer, input first, output last
    /// * `rng` - Random number generator
    ///
    /// # Errors
    ///
    /// [`InvalidTopologyError`] if `layers` has fewer than two entries or
    /// any entry is zero.
    pub fn new<R>(layers: &[usize], rng: &mut R) -> Result<Self, InvalidTopologyError>
    where
        R: Rng + ?Sized,
    {
        validate_topology(layers)?;
        let weights = layers
            .windows(2)
            .map(|pair| {
                (0..pair[0])
                    .map(|_| (0..pair[1]).map(|_| rng.random_range(-1.0..=1.0)).collect())
                    .collect()
            })
            .collect();
        Ok(Self {
            layers: layers.to_vec(),
            activations: zeroed_activations(layers),
            weights,
        })
    }

    /// Rebuilds a network from a topology and a flattened weight buffer in
    /// `(layer, source, target)` order, as produced by [`Self::flat_weights`].
    ///
    /// # Errors
    ///
    /// [`NetworkLoadError`] if the topology is invalid or the buffer length
    /// does not match the weight count the topology requires. Never yields a
    /// partially-filled network.
    pub fn from_flat_weights(layers: &[usize], flat: &[f32]) -> Result<Self, NetworkLoadError> {
        validate_topology(layers).map_err(NetworkLoadError::InvalidTopology)?;
        let expected = Self::weight_count(layers);
        if flat.len() != expected {
            return Err(NetworkLoadError::WeightCountMismatch(
                WeightCountMismatchError {
                    expected,
                    actual: flat.len(),
                },
            ));
        }

        let mut weights = Vec::with_capacity(layers.len() - 1);
        let mut offset = 0;
        for pair in layers.windows(2) {
            let mut rows = Vec::with_capacity(pair[0]);
            for _ in 0..pair[0] {
                rows.push(flat[offset..offset + pair[1]].to_vec());
                offset += pair[1];
            }
            weights.push(rows);
        }

        Ok(Self {
            layers: layers.to_vec(),
            activations: zeroed_activations(layers),
            weights,
        })
    }

    /// Number of weights a network of the given topology holds.
    #[must_use]
    pub fn weight_count(layers: &[usize]) -> usize {
        layers.windows(2).map(|pair| pair[0] * pair[1]).sum()
    }

    /// Neuron count per layer, input first, output last.
    #[must_use]
    pub fn layers(&self) -> &[usize] {
        &self.layers
    }

    /// Required input width (`layers[0]`).
    #[must_use]
    pub fn input_len(&self) -> usize {
        self.layers[0]
    }

    /// Output width (`layers[last]`).
    #[must_use]
    pub fn output_len(&self) -> usize {
        self.layers[self.layers.len() - 1]
    }

    /// Propagates `inputs` through the network and returns the output layer.
    ///
    /// Each neuron computes `tanh(Σ upstream_activation × weight)`; there is
    /// no bias term. Deterministic: the same weights and input produce
    /// bit-identical output. The returned slice borrows scratch storage that
    /// the next call overwrites.
    ///
    /// # Errors
    ///
    /// [`InputLenMismatchError`] when `inputs.len() != layers[0]`. The output
    /// layer is zero-filled first, so [`Self::output`] still yields a
    /// correctly-sized neutral vector; the mismatch is recoverable and the
    /// caller decides whether to flag, substitute, or abort.
    pub fn feed_forward(&mut self, inputs: &[f32]) -> Result<&[f32], InputLenMismatchError> {
        if inputs.len() != self.layers[0] {
            let last = self.activations.len() - 1;
            self.activations[last].fill(0.0);
            return Err(InputLenMismatchError {
                expected: self.layers[0],
                actual: inputs.len(),
            });
        }

        self.activations[0].copy_from_slice(inputs);
        for i in 1..self.layers.len() {
            for j in 0..self.layers[i] {
                let mut sum = 0.0;
                for k in 0..self.layers[i - 1] {
                    sum += self.activations[i - 1][k] * self.weights[i - 1][k][j];
                }
                self.activations[i][j] = sum.tanh();
            }
        }
        Ok(self.output())
    }

    /// The output layer's activations as last computed.
    ///
    /// All zeros before the first [`Self::feed_forward`] call and after a
    /// rejected one.
    #[must_use]
    pub fn output(&self) -> &[f32] {
        &self.activations[self.activations.len() - 1]
    }

    /// Perturbs each weight independently with probability `chance`.
    ///
    /// A selected weight gets a perturbation drawn uniformly from
    /// [-0.5, 0.5] added in place. Topology never changes. Intended for
    /// freshly cloned networks; mutating genetic material still referenced
    /// elsewhere is the caller's bug to avoid: [`Clone`] first.
    ///
    /// # Arguments
    ///
    /// * `chance` - Per-weight mutation probability in [0, 1]
    /// * `rng` - Random number generator
    pub fn mutate<R>(&mut self, chance: f32, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for transition in &mut self.weights {
            for row in transition {
                for weight in row {
                    if rng.random_bool(chance.into()) {
                        *weight += rng.random_range(-0.5..=0.5);
                    }
                }
            }
        }
    }

    /// Iterates all weights in `(layer, source, target)` order.
    ///
    /// This is the persistence order: [`Self::from_flat_weights`] with the
    /// collected values and the same topology reproduces the network.
    pub fn flat_weights(&self) -> impl Iterator<Item = f32> + '_ {
        self.weights.iter().flatten().flatten().copied()
    }
}
