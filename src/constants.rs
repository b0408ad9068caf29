//! Centralized game constants for the liminal castle core.
//!
//! Every probability, range and offset the generators and the transition
//! coordinator rely on lives here so the escalation curve can be read in one
//! place. Message tables live in `narrative`.

// =====================================================
// Room geometry
// =====================================================

/// Edge length of every room (rooms are square)
pub const ROOM_SIZE: f32 = 40.0;

/// Wall height; lights hang just below it
pub const WALL_HEIGHT: f32 = 15.0;

/// Per-wall probability that a door is cut into it
pub const DOOR_PROBABILITY: f64 = 0.7;

/// Probability that a room has a ceiling
pub const CEILING_PROBABILITY: f64 = 0.7;

/// Features and encounters are scattered within +/- this on x and z
pub const FEATURE_SPREAD: f32 = 15.0;

/// Distance of door centres from the room centre
pub const DOOR_OFFSET: f32 = 19.5;

/// Height of door centres
pub const DOOR_HEIGHT: f32 = 2.5;

// =====================================================
// Room type weights: Normal:1, Liminal:2, Corrupted:3+p, Endless:1+p
// =====================================================

pub const NORMAL_WEIGHT: f64 = 1.0;
pub const LIMINAL_WEIGHT: f64 = 2.0;
pub const CORRUPTED_BASE_WEIGHT: f64 = 3.0;
pub const ENDLESS_BASE_WEIGHT: f64 = 1.0;

// =====================================================
// Room features
// =====================================================

pub const LIMINAL_LIGHT_COUNT: usize = 3;
pub const LIMINAL_LIGHT_HEIGHT: f32 = 14.0;
/// Chance a fluorescent light is one of the flickering ones
pub const FLICKER_ELIGIBILITY: f64 = 0.3;
/// Flicker toggle interval range in seconds
pub const FLICKER_INTERVAL: (f32, f32) = (0.1, 0.5);

pub const PILLAR_COUNT: (u32, u32) = (2, 5);
pub const PILLAR_HEIGHT: f32 = 7.5;

pub const FLOATING_SHAPE_COUNT: (u32, u32) = (5, 10);
pub const FLOATING_SHAPE_HEIGHT: (f32, f32) = (2.0, 12.0);
pub const FLOATING_SHAPE_SCALE: (f32, f32) = (1.0, 3.0);
pub const FLOATING_SHAPE_SPIN: (f32, f32) = (5.0, 15.0);

pub const CORRUPTED_PANEL_CHANCE: f64 = 0.5;
pub const CORRUPTED_PANEL_HEIGHT: f32 = 7.0;

/// Endless mirror segments run z = -18..=18 every 6 units
pub const MIRROR_Z_RANGE: (i32, i32) = (-18, 18);
pub const MIRROR_Z_STRIDE: usize = 6;
pub const MIRROR_X_OFFSET: f32 = 10.0;
pub const MIRROR_HEIGHT: f32 = 5.0;

// =====================================================
// Encounters
// =====================================================

pub const CORRUPTED_ENEMY_COUNT: (u32, u32) = (3, 8);
pub const OPENING_ENEMY_COUNT: (u32, u32) = (2, 5);
pub const ENEMY_HEIGHT: f32 = 0.5;
pub const BASE_ENEMY_SPEED: f32 = 2.0;
pub const GLITCH_SPEED: (f32, f32) = (1.0, 4.0);
pub const PATROL_RADIUS: (f32, f32) = (3.0, 8.0);

pub const CHAIN_CHOMP_CHANCE: f64 = 0.3;
pub const CHAIN_CHOMP_LUNGE_SPEED: f32 = 40.0;
pub const CHAIN_CHOMP_DETECTION_RADIUS: f32 = 30.0;

pub const LIMINAL_COIN_COUNT: (u32, u32) = (10, 20);
pub const LIMINAL_COIN_SPREAD: f32 = 18.0;
pub const COIN_HEIGHT: f32 = 1.0;

/// Endless coins run z = -15..=15 every 5 units
pub const ENDLESS_COIN_Z_RANGE: (i32, i32) = (-15, 15);
pub const ENDLESS_COIN_Z_STRIDE: usize = 5;

pub const OPENING_COIN_COUNT: (u32, u32) = (5, 15);
pub const OPENING_COIN_CURSE_CHANCE: f64 = 0.2;
pub const OPENING_COIN_BOB_CHANCE: f64 = 0.3;
pub const COIN_BOB_HEIGHT: (f32, f32) = (1.0, 3.0);

pub const STAR_CHANCE: f64 = 0.2;
pub const CURSED_STAR_CHANCE: f64 = 0.1;
pub const STAR_HEIGHT: (f32, f32) = (1.0, 10.0);

pub const OPENING_STAR_CUBE_CHANCE: f64 = 0.3;
pub const OPENING_STAR_CURSE_CHANCE: f64 = 0.2;
pub const OPENING_STAR_HIDDEN_CHANCE: f64 = 0.5;

// =====================================================
// Room transitions
// =====================================================

/// Fade out, and fade back in, duration in seconds
pub const FADE_DURATION: f32 = 0.3;

/// Fade overlay is removed this long after the fade-in starts
pub const FADE_CLEANUP_DELAY: f32 = 0.4;

/// A narrative message is drawn every N floors
pub const NARRATIVE_FLOOR_INTERVAL: u32 = 5;

/// Player spawn after entering through a door (keyed by travel direction)
pub const ENTRY_OFFSET: f32 = 18.0;
pub const ENTRY_HEIGHT: f32 = 5.0;

// =====================================================
// Game flow
// =====================================================

pub const SPLASH_DURATION: f32 = 3.0;
/// The splash caption may flicker once per period
pub const SPLASH_GLITCH_PERIOD: f32 = 0.1;
pub const SPLASH_GLITCH_CHANCE: f64 = 0.3;
pub const SPLASH_CAPTION_SCALE: f32 = 3.0;
pub const SPLASH_GLITCH_SCALE_JITTER: f32 = 0.2;
pub const DEBUG_PERSONALIZATION_STEP: u32 = 5;
pub const DEFAULT_TICK_RATE: u32 = 60;

// =====================================================
// In-room events
// =====================================================

pub const VOID_THRESHOLD: f32 = -50.0;
pub const COIN_DUPLICATION_CHANCE: f64 = 0.1;
pub const COIN_DUPLICATION_COUNT: (u32, u32) = (2, 5);
pub const COIN_DUPLICATION_SPREAD: f32 = 2.0;
pub const DUPLICATE_COIN_CURSE_CHANCE: f64 = 0.3;

pub const STOMP_REINFORCEMENT_CHANCE: f64 = 0.3;
pub const STOMP_REINFORCEMENT_SPREAD: f32 = 5.0;

pub const STAR_WARP_CHANCE: f64 = 0.3;
/// The star is collected by proximity rather than contact
pub const STAR_PICKUP_RADIUS: f32 = 4.0;

pub const DAMAGE_SHAKE: (f32, f32) = (0.5, 5.0);
pub const DAMAGE_TEXT_JITTER: f32 = 0.3;

// =====================================================
// Atmosphere escalation
// =====================================================

pub const BASE_FOG_DENSITY: f32 = 0.02;
pub const FOG_PER_LEVEL: f32 = 0.005;
pub const FOG_ESCALATION_LEVEL: u32 = 5;
pub const FOV_GLITCH_LEVEL: u32 = 10;
pub const FOV_GLITCH_CHANCE_PER_LEVEL: f64 = 0.001;
pub const FOV_GLITCH_RANGE: (i32, i32) = (60, 120);
pub const DEFAULT_FOV: f32 = 90.0;
pub const FOV_RESTORE_DELAY: f32 = 0.5;

// =====================================================
// Player glitches
// =====================================================

pub const PLAYER_GLITCH_INTERVAL: (f32, f32) = (10.0, 30.0);
pub const PLAYER_RECOLOR_REVERT: (f32, f32) = (2.0, 5.0);
pub const PLAYER_RESCALE_REVERT: f32 = 3.0;
pub const PLAYER_SPEED_REVERT: f32 = 5.0;
pub const PLAYER_SPEED_RANGE: (f32, f32) = (4.0, 12.0);
pub const PLAYER_BASE_SPEED: f32 = 8.0;

// =====================================================
// Menu
// =====================================================

pub const MENU_FIRST_CYCLE_DELAY: f32 = 5.0;
pub const TITLE_CYCLE_INTERVAL: (f32, f32) = (3.0, 8.0);
pub const MENU_MESSAGE_INTERVAL: (f32, f32) = (4.0, 10.0);

pub const MENU_FOG_DENSITY: f32 = 0.05;
pub const MENU_BACKDROP_COUNT: usize = 30;
pub const MENU_STAR_COUNT: usize = 20;
pub const MENU_STAR_JITTER_CHANCE: f64 = 0.3;
pub const MENU_PARTICLE_COUNT: usize = 15;

pub const HEAD_GLITCH_INTERVAL: (f32, f32) = (2.0, 5.0);
pub const HEAD_RECOLOR_REVERT: f32 = 0.2;
pub const HEAD_STRETCH_REVERT: f32 = 0.3;
pub const HEAD_TOGGLE_REVERT: f32 = 0.5;
pub const HEAD_SCALE: f32 = 3.0;
pub const HEAD_STRETCH_JITTER: f32 = 0.5;

pub const HEAD_BLINK_INTERVAL: (f32, f32) = (0.5, 3.0);
pub const BLINK_DURATION: f32 = 0.15;
pub const BLINK_SQUINT: f32 = 0.05;
pub const BLINK_SHUT_CHANCE: f64 = 0.2;
