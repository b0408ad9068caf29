//! Room Transition Coordinator.
//!
//! Owns the single active room and sequences the move to the next one:
//!
//! 1. [`RoomTransitionCoordinator::begin`] starts the fade-out and tells the
//!    caller how long to wait before the rebuild.
//! 2. [`RoomTransitionCoordinator::complete`] runs as one step after the fade:
//!    the new room and encounter are generated, swapped in for the old pair,
//!    the floor counter advances and, every fifth floor, a narrative line is
//!    drawn.
//!
//! There is never a moment with zero or two active rooms while playing.
//! Reachability of the new room is not checked; a room without doors is kept.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::constants::*;
use crate::corruption::CorruptionError;
use crate::encounter::{spawn_encounter, spawn_opening_encounter, EncounterSpec};
use crate::generation::{generate_room, generate_room_of_type, Direction, RoomDescriptor, RoomType};
use crate::geometry::Position;
use crate::narrative;
use crate::session::GameContext;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransitionError {
    #[error("no transition in progress")]
    NotTransitioning,
    #[error(transparent)]
    Corruption(#[from] CorruptionError),
}

/// Player spawn when the opening room is built
pub const LEVEL_SPAWN: Position = Position::new(0.0, ENTRY_HEIGHT, 0.0);

/// Where the player lands after walking through a door in `direction`:
/// against the wall opposite the one they left by.
pub fn entry_point(direction: Direction) -> Position {
    match direction {
        Direction::North => Position::new(0.0, ENTRY_HEIGHT, -ENTRY_OFFSET),
        Direction::South => Position::new(0.0, ENTRY_HEIGHT, ENTRY_OFFSET),
        Direction::East => Position::new(-ENTRY_OFFSET, ENTRY_HEIGHT, 0.0),
        Direction::West => Position::new(ENTRY_OFFSET, ENTRY_HEIGHT, 0.0),
    }
}

/// Door centre for the wall facing `direction`
pub fn door_position(direction: Direction) -> Position {
    match direction {
        Direction::North => Position::new(0.0, DOOR_HEIGHT, DOOR_OFFSET),
        Direction::South => Position::new(0.0, DOOR_HEIGHT, -DOOR_OFFSET),
        Direction::East => Position::new(DOOR_OFFSET, DOOR_HEIGHT, 0.0),
        Direction::West => Position::new(-DOOR_OFFSET, DOOR_HEIGHT, 0.0),
    }
}

/// The room the player is standing in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveRoom {
    pub id: u64,
    pub descriptor: RoomDescriptor,
    pub encounter: EncounterSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransitionPhase {
    #[default]
    Idle,
    FadingOut {
        direction: Direction,
    },
}

/// Returned by `begin`: fade now, rebuild after `fade_duration`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionPlan {
    pub direction: Direction,
    pub fade_duration: f32,
}

/// Result of putting a new room in place
#[derive(Debug, Clone, PartialEq)]
pub struct RoomSwap {
    /// Room that was torn down, if any
    pub retired: Option<ActiveRoom>,
    pub room_id: u64,
    pub spawn_point: Position,
    /// Floor after the swap
    pub floor: u32,
    pub narrative: Option<String>,
}

/// Message table for a given floor
pub type FloorMessages = fn(u32) -> Vec<String>;

fn default_floor_messages(floor: u32) -> Vec<String> {
    narrative::floor_messages(floor).to_vec()
}

#[derive(Debug, Clone)]
pub struct RoomTransitionCoordinator {
    active: Option<ActiveRoom>,
    phase: TransitionPhase,
    next_room_id: u64,
    fade_duration: f32,
    narrative_interval: u32,
    floor_messages: FloorMessages,
}

impl Default for RoomTransitionCoordinator {
    fn default() -> Self {
        Self::new(FADE_DURATION, NARRATIVE_FLOOR_INTERVAL)
    }
}

impl RoomTransitionCoordinator {
    pub fn new(fade_duration: f32, narrative_interval: u32) -> Self {
        Self {
            active: None,
            phase: TransitionPhase::Idle,
            next_room_id: 1,
            fade_duration,
            narrative_interval: narrative_interval.max(1),
            floor_messages: default_floor_messages,
        }
    }

    /// Replace the lines drawn on narrative floors
    pub fn with_floor_messages(mut self, floor_messages: FloorMessages) -> Self {
        self.floor_messages = floor_messages;
        self
    }

    pub fn active(&self) -> Option<&ActiveRoom> {
        self.active.as_ref()
    }

    pub fn phase(&self) -> TransitionPhase {
        self.phase
    }

    pub fn is_transitioning(&self) -> bool {
        self.phase != TransitionPhase::Idle
    }

    pub fn fade_duration(&self) -> f32 {
        self.fade_duration
    }

    /// Start leaving through `direction`. Ignored while another fade is in
    /// flight or when there is no room to leave.
    pub fn begin(&mut self, direction: Direction) -> Option<TransitionPlan> {
        if self.is_transitioning() || self.active.is_none() {
            return None;
        }
        self.phase = TransitionPhase::FadingOut { direction };
        info!(?direction, "Room transition started");
        Some(TransitionPlan {
            direction,
            fade_duration: self.fade_duration,
        })
    }

    /// The fade has finished: swap rooms in one step.
    ///
    /// The fade is consumed even on failure; the old room then stays active
    /// and the floor counter is left alone.
    pub fn complete(&mut self, ctx: &mut GameContext) -> Result<RoomSwap, TransitionError> {
        let TransitionPhase::FadingOut { direction } = self.phase else {
            return Err(TransitionError::NotTransitioning);
        };
        self.phase = TransitionPhase::Idle;

        let level = ctx.personalization_level();
        let descriptor = generate_room(ctx.rng(), level)?;
        let encounter = spawn_encounter(ctx.rng(), descriptor.room_type, level)?;

        let floor = ctx.current_floor().saturating_add(1);
        let narrative = if floor % self.narrative_interval == 0 {
            Some(narrative::draw(ctx.rng(), &(self.floor_messages)(floor))?)
        } else {
            None
        };

        ctx.advance_floor();
        let (retired, room_id) = self.install(descriptor, encounter);

        info!(
            floor,
            room_id,
            personalization = level,
            "Room transition complete"
        );
        if let Some(line) = &narrative {
            info!(floor, "{}", line);
        }

        Ok(RoomSwap {
            retired,
            room_id,
            spawn_point: entry_point(direction),
            floor,
            narrative,
        })
    }

    /// Build the first room of a fresh level. Any fade in flight is dropped.
    pub fn open_level(&mut self, ctx: &mut GameContext) -> Result<RoomSwap, TransitionError> {
        let room_type = *ctx
            .rng()
            .pick(&RoomType::ALL)
            .unwrap_or(&RoomType::Normal);
        let descriptor = generate_room_of_type(ctx.rng(), room_type);
        let encounter = spawn_opening_encounter(ctx.rng())?;

        let (retired, room_id) = self.install(descriptor, encounter);
        self.phase = TransitionPhase::Idle;
        info!(room_id, room = room_type.as_str(), "Level opened");

        Ok(RoomSwap {
            retired,
            room_id,
            spawn_point: LEVEL_SPAWN,
            floor: ctx.current_floor(),
            narrative: None,
        })
    }

    /// Leave play entirely (back to the menu)
    pub fn close(&mut self) -> Option<ActiveRoom> {
        self.phase = TransitionPhase::Idle;
        self.active.take()
    }

    fn install(
        &mut self,
        descriptor: RoomDescriptor,
        encounter: EncounterSpec,
    ) -> (Option<ActiveRoom>, u64) {
        if descriptor.doors.is_sealed() {
            warn!("New room is sealed; no door leads out");
        }
        let room_id = self.next_room_id;
        self.next_room_id += 1;
        let retired = self.active.replace(ActiveRoom {
            id: room_id,
            descriptor,
            encounter,
        });
        (retired, room_id)
    }
}
