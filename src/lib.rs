//! Liminal Castle - Procedural Core Library
//!
//! Deterministic logic for a corrupted-castle explorer:
//! - Corruption RNG (seeded, weighted choices)
//! - Room generation with escalating room-type weights
//! - Encounter spawning (enemies, coins, stars)
//! - Game state machine, scheduler and room transitions
//! - In-room events and atmosphere escalation
//! - Scene engine seam with a headless recording implementation
//! - Bevy host plugin for headless runs

pub mod balance;
pub mod constants;
pub mod corruption;
pub mod encounter;
pub mod engine;
pub mod gameflow;
pub mod gameplay;
pub mod generation;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod menu;
pub mod narrative;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod transition;
