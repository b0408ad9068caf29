//! In-room events: pickups, stomps, damage, void falls, and the slow creep of
//! atmosphere corruption as personalization rises.
//!
//! Each handler mutates the [`GameContext`] and returns an outcome describing
//! what the scene should show. None of them touch the scene directly.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::corruption::{CorruptionError, CorruptionRng};
use crate::encounter::{roll_goomba, CoinSpec, EnemySpec, ObjectiveSpec};
use crate::geometry::{Position, Rgb};
use crate::narrative;
use crate::session::GameContext;

/// Respawn point after touching an enemy
pub const DAMAGE_RESPAWN: Position = Position::new(0.0, 10.0, 0.0);

/// Respawn point after falling into the void
pub const VOID_RESPAWN: Position = Position::new(0.0, 10.0, -10.0);

#[derive(Debug, Clone, PartialEq)]
pub struct CoinPickup {
    pub coins: u32,
    pub message: Option<&'static str>,
    /// Extra coins that sprang from this one
    pub duplicates: Vec<CoinSpec>,
}

pub fn collect_coin(
    ctx: &mut GameContext,
    coin: &CoinSpec,
) -> CoinPickup {
    let coins = ctx.collect_coin(coin.cursed);
    let message = coin.cursed.then_some(narrative::CURSED_COIN_MESSAGE);

    let rng = ctx.rng();
    let mut duplicates = Vec::new();
    if rng.chance(COIN_DUPLICATION_CHANCE) {
        let count = rng.range_u32(COIN_DUPLICATION_COUNT);
        for _ in 0..count {
            let position = coin.position.offset(
                rng.spread(COIN_DUPLICATION_SPREAD),
                0.0,
                rng.spread(COIN_DUPLICATION_SPREAD),
            );
            duplicates.push(CoinSpec {
                position,
                cursed: rng.chance(DUPLICATE_COIN_CURSE_CHANCE),
                bob_height: None,
            });
        }
    }

    CoinPickup {
        coins,
        message,
        duplicates,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StarPickup {
    pub stars: u32,
    pub message: String,
    pub warp: Option<Position>,
}

/// Cursed stars count the same as gold ones
pub fn collect_star(
    ctx: &mut GameContext,
    _star: &ObjectiveSpec,
) -> Result<StarPickup, CorruptionError> {
    let stars = ctx.collect_star();
    let message = narrative::draw(ctx.rng(), &narrative::star_messages(stars))?;

    let rng = ctx.rng();
    let warp = rng.chance(STAR_WARP_CHANCE).then(|| {
        Position::new(
            rng.spread(FEATURE_SPREAD),
            ENTRY_HEIGHT,
            rng.spread(FEATURE_SPREAD),
        )
    });

    Ok(StarPickup {
        stars,
        message,
        warp,
    })
}

/// Stomped enemies sometimes call for backup
pub fn stomp(
    ctx: &mut GameContext,
    enemy: &EnemySpec,
) -> Result<Option<EnemySpec>, CorruptionError> {
    let rng = ctx.rng();
    if !rng.chance(STOMP_REINFORCEMENT_CHANCE) {
        return Ok(None);
    }
    let position = enemy.position.offset(
        rng.spread(STOMP_REINFORCEMENT_SPREAD),
        0.0,
        rng.spread(STOMP_REINFORCEMENT_SPREAD),
    );
    roll_goomba(rng, position).map(Some)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageOutcome {
    pub respawn: Position,
    pub personalization_level: u32,
    pub message: String,
    /// Screen-space offset of the message
    pub message_offset: (f32, f32),
    /// (duration, magnitude)
    pub shake: (f32, f32),
}

pub fn take_damage(ctx: &mut GameContext) -> Result<DamageOutcome, CorruptionError> {
    let personalization_level = ctx.personalize(1);
    let rng = ctx.rng();
    let message = narrative::draw(rng, &narrative::DAMAGE_MESSAGES)?;
    let message_offset = (
        rng.spread(DAMAGE_TEXT_JITTER),
        rng.spread(DAMAGE_TEXT_JITTER),
    );
    Ok(DamageOutcome {
        respawn: DAMAGE_RESPAWN,
        personalization_level,
        message,
        message_offset,
        shake: DAMAGE_SHAKE,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct VoidOutcome {
    pub respawn: Position,
    pub personalization_level: u32,
    pub message: &'static str,
}

pub fn fell_into_void(player: Position) -> bool {
    player.y < VOID_THRESHOLD
}

pub fn void_death(ctx: &mut GameContext) -> VoidOutcome {
    VoidOutcome {
        respawn: VOID_RESPAWN,
        personalization_level: ctx.personalize(1),
        message: narrative::VOID_MESSAGE,
    }
}

/// Fog density for a personalization level; `None` keeps the base fog
pub fn fog_density(personalization_level: u32) -> Option<f32> {
    (personalization_level > FOG_ESCALATION_LEVEL)
        .then(|| BASE_FOG_DENSITY + personalization_level as f32 * FOG_PER_LEVEL)
}

/// Occasionally yank the camera fov once personalization is high enough
pub fn roll_fov_glitch(rng: &mut CorruptionRng, personalization_level: u32) -> Option<f32> {
    if personalization_level <= FOV_GLITCH_LEVEL {
        return None;
    }
    let p = FOV_GLITCH_CHANCE_PER_LEVEL * personalization_level as f64;
    rng.chance(p)
        .then(|| rng.range_i32(FOV_GLITCH_RANGE) as f32)
}

/// Temporary corruption of the player's body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerGlitch {
    Recolor { hat: Rgb, body: Rgb },
    Rescale { x: f32, y: f32 },
    Speed(f32),
}

impl PlayerGlitch {
    pub fn roll(rng: &mut CorruptionRng) -> Self {
        const HATS: [Rgb; 3] = [Rgb::RED, Rgb::BLACK, Rgb::GREEN];
        const BODIES: [Rgb; 3] = [Rgb::BLUE, Rgb::BLACK, Rgb::RED];
        match rng.range_u32((0, 2)) {
            0 => PlayerGlitch::Recolor {
                hat: *rng.pick(&HATS).unwrap_or(&Rgb::RED),
                body: *rng.pick(&BODIES).unwrap_or(&Rgb::BLUE),
            },
            1 => PlayerGlitch::Rescale {
                x: rng.range_f32((0.8, 1.2)),
                y: rng.range_f32((0.9, 1.1)),
            },
            _ => PlayerGlitch::Speed(rng.range_f32(PLAYER_SPEED_RANGE)),
        }
    }

    /// How long until the glitch is undone
    pub fn revert_after(&self, rng: &mut CorruptionRng) -> f32 {
        match self {
            PlayerGlitch::Recolor { .. } => rng.range_f32(PLAYER_RECOLOR_REVERT),
            PlayerGlitch::Rescale { .. } => PLAYER_RESCALE_REVERT,
            PlayerGlitch::Speed(_) => PLAYER_SPEED_REVERT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(seed: u64) -> GameContext {
        GameContext::new(CorruptionRng::from_seed(seed))
    }

    fn coin(cursed: bool) -> CoinSpec {
        CoinSpec {
            position: Position::new(1.0, 1.0, 1.0),
            cursed,
            bob_height: None,
        }
    }

    #[test]
    fn test_cursed_coin_at_zero_stays_zero() {
        let mut c = ctx(1);
        let pickup = collect_coin(&mut c, &coin(true));
        assert_eq!(pickup.coins, 0);
        assert_eq!(pickup.message, Some("CURSED"));
    }

    #[test]
    fn test_gold_coin_adds_one() {
        let mut c = ctx(1);
        let pickup = collect_coin(&mut c, &coin(false));
        assert_eq!(pickup.coins, 1);
        assert!(pickup.message.is_none());
    }

    #[test]
    fn test_duplicates_near_origin_coin() {
        let mut c = ctx(2);
        let mut duplicated = 0;
        for _ in 0..500 {
            let pickup = collect_coin(&mut c, &coin(false));
            if !pickup.duplicates.is_empty() {
                duplicated += 1;
                assert!((2..=5).contains(&pickup.duplicates.len()));
                for d in &pickup.duplicates {
                    assert!((d.position.x - 1.0).abs() <= 2.0);
                    assert!((d.position.z - 1.0).abs() <= 2.0);
                }
            }
        }
        assert!(duplicated > 20 && duplicated < 90, "duplicated {duplicated}");
    }

    #[test]
    fn test_cursed_star_still_counts() {
        let mut c = ctx(3);
        let star = ObjectiveSpec {
            position: Position::ORIGIN,
            cursed: true,
            visible: true,
            model: crate::encounter::ObjectiveModel::Star,
        };
        let pickup = collect_star(&mut c, &star).unwrap();
        assert_eq!(pickup.stars, 1);
        assert!(narrative::star_messages(1).contains(&pickup.message));
        assert_eq!(c.progress().stars, 1);
    }

    #[test]
    fn test_damage_raises_personalization() {
        let mut c = ctx(4);
        let out = take_damage(&mut c).unwrap();
        assert_eq!(out.personalization_level, 1);
        assert_eq!(out.respawn, DAMAGE_RESPAWN);
        assert!(narrative::DAMAGE_MESSAGES.contains(&out.message.as_str()));
        assert!(out.message_offset.0.abs() <= 0.3);
    }

    #[test]
    fn test_void() {
        assert!(fell_into_void(Position::new(0.0, -50.5, 0.0)));
        assert!(!fell_into_void(Position::new(0.0, -50.0, 0.0)));
        let mut c = ctx(5);
        let out = void_death(&mut c);
        assert_eq!(out.respawn, VOID_RESPAWN);
        assert_eq!(out.personalization_level, 1);
        assert_eq!(out.message, "EVERY COPY IS PERSONALIZED");
    }

    #[test]
    fn test_fog_escalation() {
        assert_eq!(fog_density(5), None);
        let fog = fog_density(6).unwrap();
        assert!((fog - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_fov_glitch_gated() {
        let mut rng = CorruptionRng::from_seed(6);
        for _ in 0..1000 {
            assert!(roll_fov_glitch(&mut rng, 10).is_none());
        }
        let glitches: Vec<f32> = (0..2000)
            .filter_map(|_| roll_fov_glitch(&mut rng, 500))
            .collect();
        assert!(!glitches.is_empty());
        assert!(glitches.iter().all(|f| (60.0..=120.0).contains(f)));
    }

    #[test]
    fn test_player_glitch_revert_times() {
        let mut rng = CorruptionRng::from_seed(7);
        for _ in 0..100 {
            let g = PlayerGlitch::roll(&mut rng);
            let t = g.revert_after(&mut rng);
            match g {
                PlayerGlitch::Recolor { .. } => assert!((2.0..=5.0).contains(&t)),
                PlayerGlitch::Rescale { .. } => assert_eq!(t, 3.0),
                PlayerGlitch::Speed(s) => {
                    assert!((4.0..=12.0).contains(&s));
                    assert_eq!(t, 5.0);
                }
            }
        }
    }
}
