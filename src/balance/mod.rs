//! Monte-Carlo room census.
//!
//! Generates many rooms (each from its own derived seed) in parallel and
//! reports how often each room type came up against the weights that should
//! have produced it. Used to sanity-check the escalation curve before
//! touching the weight constants.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use tracing::info;

use crate::corruption::{CorruptionError, CorruptionRng};
use crate::encounter::spawn_encounter;
use crate::generation::{generate_room, room_type_weights, RoomType};
use crate::logging::TimingSpan;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CensusConfig {
    pub rooms: u64,
    pub personalization_level: u32,
    pub base_seed: u64,
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            rooms: 10_000,
            personalization_level: 0,
            base_seed: 42,
        }
    }
}

/// Observed vs expected share for one room type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeShare {
    pub room_type: RoomType,
    pub count: u64,
    pub observed: f64,
    pub expected: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomCensus {
    pub rooms: u64,
    pub personalization_level: u32,
    pub shares: Vec<TypeShare>,
    pub mean_doors: f64,
    pub sealed_rate: f64,
    pub mean_enemies: f64,
    pub mean_coins: f64,
    pub star_rate: f64,
}

impl RoomCensus {
    pub fn share(&self, room_type: RoomType) -> Option<&TypeShare> {
        self.shares.iter().find(|s| s.room_type == room_type)
    }

    /// Largest |observed - expected| across room types
    pub fn max_deviation(&self) -> f64 {
        self.shares
            .iter()
            .map(|s| (s.observed - s.expected).abs())
            .fold(0.0, f64::max)
    }
}

/// Per-room tally, folded into the census
#[derive(Debug, Clone, Copy)]
struct RoomSample {
    room_type: RoomType,
    doors: usize,
    enemies: usize,
    coins: usize,
    star: bool,
}

/// Seed for the `index`-th room of a census
pub fn census_seed(base_seed: u64, index: u64) -> u64 {
    let mut hasher = Sha3_256::new();
    hasher.update(base_seed.to_le_bytes());
    hasher.update(index.to_le_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

fn sample_room(seed: u64, personalization_level: u32) -> Result<RoomSample, CorruptionError> {
    let mut rng = CorruptionRng::from_seed(seed);
    let room = generate_room(&mut rng, personalization_level)?;
    let encounter = spawn_encounter(&mut rng, room.room_type, personalization_level)?;
    Ok(RoomSample {
        room_type: room.room_type,
        doors: room.doors.count(),
        enemies: encounter.enemies.len(),
        coins: encounter.coins.len(),
        star: encounter.objective.is_some(),
    })
}

/// Run the census across all cores
pub fn run_room_census(config: &CensusConfig) -> Result<RoomCensus, CorruptionError> {
    let _span = TimingSpan::new("room_census");

    let samples: Vec<RoomSample> = (0..config.rooms)
        .into_par_iter()
        .map(|i| sample_room(census_seed(config.base_seed, i), config.personalization_level))
        .collect::<Result<_, _>>()?;

    let census = summarize(&samples, config.personalization_level);
    info!(
        rooms = census.rooms,
        level = census.personalization_level,
        max_deviation = census.max_deviation(),
        sealed_rate = census.sealed_rate,
        "Room census complete"
    );
    Ok(census)
}

fn summarize(samples: &[RoomSample], personalization_level: u32) -> RoomCensus {
    let weights = room_type_weights(personalization_level);
    let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();
    let n = samples.len() as f64;
    let mean = |value: f64| if samples.is_empty() { 0.0 } else { value / n };

    let shares = weights
        .iter()
        .map(|(room_type, weight)| {
            let count = samples.iter().filter(|s| s.room_type == *room_type).count() as u64;
            TypeShare {
                room_type: *room_type,
                count,
                observed: mean(count as f64),
                expected: weight / total_weight,
            }
        })
        .collect();

    RoomCensus {
        rooms: samples.len() as u64,
        personalization_level,
        shares,
        mean_doors: mean(samples.iter().map(|s| s.doors as f64).sum()),
        sealed_rate: mean(samples.iter().filter(|s| s.doors == 0).count() as f64),
        mean_enemies: mean(samples.iter().map(|s| s.enemies as f64).sum()),
        mean_coins: mean(samples.iter().map(|s| s.coins as f64).sum()),
        star_rate: mean(samples.iter().filter(|s| s.star).count() as f64),
    }
}
