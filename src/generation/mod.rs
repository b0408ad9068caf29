//! Room Generator.
//!
//! Builds a [`RoomDescriptor`] from the current personalization level. The
//! room-type weights are the escalation mechanic: Corrupted and Endless rooms
//! gain one unit of weight per personalization level while Normal and Liminal
//! stay fixed. The descriptor is pure data; the scene adapter materializes it.

pub mod features;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::*;
use crate::corruption::{CorruptionError, CorruptionRng};

pub use features::{FeatureSpec, ShapeKind};

/// Room archetype, fixed for the lifetime of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomType {
    Normal,
    Liminal,
    Corrupted,
    Endless,
}

impl RoomType {
    pub const ALL: [RoomType; 4] = [
        RoomType::Normal,
        RoomType::Liminal,
        RoomType::Corrupted,
        RoomType::Endless,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Normal => "normal",
            RoomType::Liminal => "liminal",
            RoomType::Corrupted => "corrupted",
            RoomType::Endless => "endless",
        }
    }
}

/// Selection weights for a given personalization level.
///
/// Normal:1, Liminal:2, Corrupted:3+level, Endless:1+level
pub fn room_type_weights(personalization_level: u32) -> [(RoomType, f64); 4] {
    let level = personalization_level as f64;
    [
        (RoomType::Normal, NORMAL_WEIGHT),
        (RoomType::Liminal, LIMINAL_WEIGHT),
        (RoomType::Corrupted, CORRUPTED_BASE_WEIGHT + level),
        (RoomType::Endless, ENDLESS_BASE_WEIGHT + level),
    ]
}

pub fn choose_room_type(
    rng: &mut CorruptionRng,
    personalization_level: u32,
) -> Result<RoomType, CorruptionError> {
    let weights = room_type_weights(personalization_level);
    rng.weighted_choice(&weights).copied()
}

/// Cardinal wall / travel direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'N' => Some(Direction::North),
            'S' => Some(Direction::South),
            'E' => Some(Direction::East),
            'W' => Some(Direction::West),
            _ => None,
        }
    }
}

/// Door presence per wall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WallDoors {
    pub north: bool,
    pub south: bool,
    pub east: bool,
    pub west: bool,
}

impl WallDoors {
    pub fn roll(rng: &mut CorruptionRng) -> Self {
        Self {
            north: rng.chance(DOOR_PROBABILITY),
            south: rng.chance(DOOR_PROBABILITY),
            east: rng.chance(DOOR_PROBABILITY),
            west: rng.chance(DOOR_PROBABILITY),
        }
    }

    pub fn has(&self, direction: Direction) -> bool {
        match direction {
            Direction::North => self.north,
            Direction::South => self.south,
            Direction::East => self.east,
            Direction::West => self.west,
        }
    }

    pub fn open(&self) -> impl Iterator<Item = Direction> + '_ {
        Direction::ALL.into_iter().filter(|d| self.has(*d))
    }

    pub fn count(&self) -> usize {
        self.open().count()
    }

    /// No way out. Legal; the game keeps running.
    pub fn is_sealed(&self) -> bool {
        self.count() == 0
    }
}

/// Everything needed to materialize one room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomDescriptor {
    pub room_type: RoomType,
    pub size: f32,
    pub wall_height: f32,
    pub doors: WallDoors,
    pub ceiling: bool,
    pub features: Vec<FeatureSpec>,
}

impl RoomDescriptor {
    pub fn flickering_lights(&self) -> usize {
        self.features
            .iter()
            .filter(|f| matches!(f, FeatureSpec::FlickerLight { flickers: true, .. }))
            .count()
    }
}

/// Generate a room whose type is drawn from the escalating weights
pub fn generate_room(
    rng: &mut CorruptionRng,
    personalization_level: u32,
) -> Result<RoomDescriptor, CorruptionError> {
    let room_type = choose_room_type(rng, personalization_level)?;
    Ok(generate_room_of_type(rng, room_type))
}

/// Generate a room of a known type (the opening room picks its type uniformly)
pub fn generate_room_of_type(rng: &mut CorruptionRng, room_type: RoomType) -> RoomDescriptor {
    let doors = WallDoors::roll(rng);
    let ceiling = rng.chance(CEILING_PROBABILITY);
    let features = features::generate_features(rng, room_type);

    if doors.is_sealed() {
        warn!(room = room_type.as_str(), "Generated a room with no doors");
    }
    debug!(
        room = room_type.as_str(),
        doors = doors.count(),
        ceiling,
        features = features.len(),
        "Room generated"
    );

    RoomDescriptor {
        room_type,
        size: ROOM_SIZE,
        wall_height: WALL_HEIGHT,
        doors,
        ceiling,
        features,
    }
}
