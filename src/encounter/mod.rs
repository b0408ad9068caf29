//! Encounter Spawner.
//!
//! Populates a room with enemies, coins and an optional star, keyed on the
//! room type:
//!
//! | Room      | Enemies                        | Coins                          |
//! |-----------|--------------------------------|--------------------------------|
//! | Corrupted | 3-8 goomba family, 30% chomp   | none                           |
//! | Liminal   | none                           | 10-20 gold                     |
//! | Endless   | none                           | z = -15..=15 step 5, alternating cursed |
//! | Normal    | none                           | none                           |
//!
//! Any room has a 20% chance of a star, 10% of which render cursed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::*;
use crate::corruption::{CorruptionError, CorruptionRng};
use crate::generation::RoomType;
use crate::geometry::{Position, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Goomba,
    DarkGoomba,
    Glitch,
    ChainChomp,
}

impl EnemyKind {
    /// Goomba-family enemies can be stomped
    pub fn is_stompable(&self) -> bool {
        !matches!(self, EnemyKind::ChainChomp)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemySpec {
    pub kind: EnemyKind,
    pub position: Position,
    pub speed: f32,
    pub patrol_radius: f32,
    /// Random body colour for glitches
    pub tint: Option<Rgb>,
    /// Only meaningful for chain chomps
    pub chained: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSpec {
    pub position: Position,
    /// Picking up a cursed coin costs a coin instead of granting one
    pub cursed: bool,
    pub bob_height: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectiveModel {
    Star,
    Cube,
}

/// The star. `cursed` only changes how it is drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveSpec {
    pub position: Position,
    pub cursed: bool,
    pub visible: bool,
    pub model: ObjectiveModel,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EncounterSpec {
    pub enemies: Vec<EnemySpec>,
    pub coins: Vec<CoinSpec>,
    pub objective: Option<ObjectiveSpec>,
}

impl EncounterSpec {
    pub fn cursed_coins(&self) -> usize {
        self.coins.iter().filter(|c| c.cursed).count()
    }
}

/// Stars hidden in the opening room sit at one of these awkward spots
pub const HIDDEN_STAR_POSITIONS: [Position; 4] = [
    Position::new(15.0, 12.0, 15.0),
    Position::new(-18.0, 1.0, -18.0),
    Position::new(0.0, -5.0, 0.0),
    Position::new(0.0, 20.0, 0.0),
];

/// Chain chomps are posted at the room centre
const CHOMP_POST: Position = Position::ORIGIN;

/// Populate a freshly generated room
pub fn spawn_encounter(
    rng: &mut CorruptionRng,
    room_type: RoomType,
    personalization_level: u32,
) -> Result<EncounterSpec, CorruptionError> {
    let mut encounter = EncounterSpec::default();

    match room_type {
        RoomType::Corrupted => {
            let count = rng.range_u32(CORRUPTED_ENEMY_COUNT);
            for _ in 0..count {
                let position = scattered_enemy_position(rng);
                encounter.enemies.push(roll_goomba(rng, position)?);
            }
            if rng.chance(CHAIN_CHOMP_CHANCE) {
                encounter.enemies.push(unchained_chomp());
            }
        }
        RoomType::Liminal => {
            let count = rng.range_u32(LIMINAL_COIN_COUNT);
            for _ in 0..count {
                encounter.coins.push(CoinSpec {
                    position: Position::new(
                        rng.spread(LIMINAL_COIN_SPREAD),
                        COIN_HEIGHT,
                        rng.spread(LIMINAL_COIN_SPREAD),
                    ),
                    cursed: false,
                    bob_height: None,
                });
            }
        }
        RoomType::Endless => encounter.coins = endless_coin_line(),
        RoomType::Normal => {}
    }

    if rng.chance(STAR_CHANCE) {
        encounter.objective = Some(ObjectiveSpec {
            position: Position::new(
                rng.spread(FEATURE_SPREAD),
                rng.range_f32(STAR_HEIGHT),
                rng.spread(FEATURE_SPREAD),
            ),
            cursed: rng.chance(CURSED_STAR_CHANCE),
            visible: true,
            model: ObjectiveModel::Star,
        });
    }

    debug!(
        room = room_type.as_str(),
        personalization = personalization_level,
        enemies = encounter.enemies.len(),
        coins = encounter.coins.len(),
        star = encounter.objective.is_some(),
        "Encounter spawned"
    );

    Ok(encounter)
}

/// Encounter for the first room of a fresh level (also used on restart)
pub fn spawn_opening_encounter(rng: &mut CorruptionRng) -> Result<EncounterSpec, CorruptionError> {
    let mut encounter = EncounterSpec::default();

    let enemies = rng.range_u32(OPENING_ENEMY_COUNT);
    for _ in 0..enemies {
        let position = scattered_enemy_position(rng);
        encounter.enemies.push(roll_goomba(rng, position)?);
    }

    let coins = rng.range_u32(OPENING_COIN_COUNT);
    for _ in 0..coins {
        let cursed = rng.chance(OPENING_COIN_CURSE_CHANCE);
        let position = Position::new(
            rng.spread(FEATURE_SPREAD),
            COIN_HEIGHT,
            rng.spread(FEATURE_SPREAD),
        );
        let bob_height = rng
            .chance(OPENING_COIN_BOB_CHANCE)
            .then(|| rng.range_f32(COIN_BOB_HEIGHT));
        encounter.coins.push(CoinSpec {
            position,
            cursed,
            bob_height,
        });
    }

    let model = if rng.chance(OPENING_STAR_CUBE_CHANCE) {
        ObjectiveModel::Cube
    } else {
        ObjectiveModel::Star
    };
    let cursed = rng.chance(OPENING_STAR_CURSE_CHANCE);
    let position = *rng
        .pick(&HIDDEN_STAR_POSITIONS)
        .unwrap_or(&HIDDEN_STAR_POSITIONS[0]);
    let visible = !rng.chance(OPENING_STAR_HIDDEN_CHANCE);
    encounter.objective = Some(ObjectiveSpec {
        position,
        cursed,
        visible,
        model,
    });

    Ok(encounter)
}

fn scattered_enemy_position(rng: &mut CorruptionRng) -> Position {
    Position::new(
        rng.spread(FEATURE_SPREAD),
        ENEMY_HEIGHT,
        rng.spread(FEATURE_SPREAD),
    )
}

/// One goomba-family enemy; variants are equally likely, glitches are faster
/// and wear a random colour
pub fn roll_goomba(
    rng: &mut CorruptionRng,
    position: Position,
) -> Result<EnemySpec, CorruptionError> {
    const VARIANTS: [(EnemyKind, f64); 3] = [
        (EnemyKind::Goomba, 1.0),
        (EnemyKind::DarkGoomba, 1.0),
        (EnemyKind::Glitch, 1.0),
    ];
    let kind = *rng.weighted_choice(&VARIANTS)?;

    let (speed, tint) = match kind {
        EnemyKind::Glitch => (rng.range_f32(GLITCH_SPEED), Some(rng.color())),
        _ => (BASE_ENEMY_SPEED, None),
    };
    let patrol_radius = rng.range_f32(PATROL_RADIUS);

    Ok(EnemySpec {
        kind,
        position,
        speed,
        patrol_radius,
        tint,
        chained: false,
    })
}

fn unchained_chomp() -> EnemySpec {
    EnemySpec {
        kind: EnemyKind::ChainChomp,
        position: CHOMP_POST.offset(-5.0, 4.0, 0.0),
        speed: CHAIN_CHOMP_LUNGE_SPEED,
        patrol_radius: CHAIN_CHOMP_DETECTION_RADIUS,
        tint: None,
        chained: false,
    }
}

/// Coins down the middle of an endless room; every other one is cursed
fn endless_coin_line() -> Vec<CoinSpec> {
    let (start, end) = ENDLESS_COIN_Z_RANGE;
    (start..=end)
        .step_by(ENDLESS_COIN_Z_STRIDE)
        .enumerate()
        .map(|(i, z)| CoinSpec {
            position: Position::new(0.0, COIN_HEIGHT, z as f32),
            cursed: i % 2 == 0,
            bob_height: None,
        })
        .collect()
}
