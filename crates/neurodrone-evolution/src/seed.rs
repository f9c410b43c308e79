use std::{fmt, str::FromStr};

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for a deterministic evolution run.
///
/// 128 bits initializing the engine's random number generator. The same seed
/// reproduces the entire run, initial weights and mutation trials and parent
/// picks included, which enables replaying a training session from its
/// recorded seed and deterministic testing.
///
/// Displays, parses, and serializes as a 32-character hex string.
///
/// # Example
///
/// ```
/// use neurodrone_evolution::EvolutionSeed;
/// use rand::Rng as _;
///
/// let seed: EvolutionSeed = rand::rng().random();
/// let restored: EvolutionSeed = seed.to_string().parse().unwrap();
/// assert_eq!(seed, restored);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvolutionSeed([u8; 16]);

impl EvolutionSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn into_bytes(self) -> [u8; 16] {
        self.0
    }
}

/// A seed string that is not exactly 32 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid seed {input:?}: expected 32 hex characters")]
pub struct ParseSeedError {
    /// The rejected input.
    pub input: String,
}

impl fmt::Display for EvolutionSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for EvolutionSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 {
            return Err(ParseSeedError {
                input: s.to_owned(),
            });
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| ParseSeedError {
            input: s.to_owned(),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

/// Enables `rng.random()` for seed generation.
impl Distribution<EvolutionSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> EvolutionSeed {
        let mut bytes = [0; 16];
        rng.fill(&mut bytes);
        EvolutionSeed(bytes)
    }
}

impl Serialize for EvolutionSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EvolutionSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_parse_round_trip() {
        let seed = EvolutionSeed::from_bytes([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ]);
        let text = seed.to_string();
        assert_eq!(text, "0123456789abcdeffedcba9876543210");
        assert_eq!(text.parse::<EvolutionSeed>().unwrap(), seed);
    }

    #[test]
    fn test_leading_zeros_preserved() {
        let seed = EvolutionSeed::from_bytes([0; 16]);
        assert_eq!(seed.to_string(), "00000000000000000000000000000000");
    }

    #[test]
    fn test_uppercase_hex_accepted() {
        let seed: EvolutionSeed = "0123456789ABCDEFFEDCBA9876543210".parse().unwrap();
        assert_eq!(seed.into_bytes()[0], 0x01);
    }

    #[test]
    fn test_wrong_length_rejected() {
        assert!("abc".parse::<EvolutionSeed>().is_err());
        assert!(
            "0123456789abcdeffedcba98765432100"
                .parse::<EvolutionSeed>()
                .is_err()
        );
    }

    #[test]
    fn test_non_hex_rejected() {
        assert!(
            "zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz"
                .parse::<EvolutionSeed>()
                .is_err()
        );
    }

    #[test]
    fn test_json_round_trip() {
        let seed = EvolutionSeed::from_bytes([0xA5; 16]);
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(json, "\"a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5a5\"");
        let restored: EvolutionSeed = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, seed);
    }
}
