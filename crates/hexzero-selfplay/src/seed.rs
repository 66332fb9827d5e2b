use std::fmt::Write as _;

use rand::{
    Rng,
    distr::{Distribution, StandardUniform},
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Seed for the driver's move-sampling RNG.
///
/// 128 bits, serialized as a 32-character hex string. Runs that share a seed
/// (and deterministic policies) replay identically, which is what fixed-seed
/// regression tests and reproducible experiments rely on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSeed([u8; 16]);

impl GameSeed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    #[must_use]
    pub const fn to_bytes(self) -> [u8; 16] {
        self.0
    }
}

impl Serialize for GameSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let num = u128::from_be_bytes(self.0);
        let mut hex = String::with_capacity(2 * self.0.len());
        write!(&mut hex, "{num:032x}").unwrap();
        serializer.serialize_str(&hex)
    }
}

impl<'de> Deserialize<'de> for GameSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex = String::deserialize(deserializer)?;
        if hex.len() != 32 {
            return Err(serde::de::Error::custom(format!(
                "invalid seed: expected 32 hex characters, got {}",
                hex.len()
            )));
        }
        let num = u128::from_str_radix(&hex, 16)
            .map_err(|e| serde::de::Error::custom(format!("invalid seed: {hex} ({e})")))?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Distribution<GameSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> GameSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        GameSeed(seed)
    }
}
