//! Property-based tests using proptest
//!
//! Invariants that must hold for every seed and input sequence:
//! - Room-type weights: corruption only ever grows with personalization
//! - Session counters: personalization never drops, coins never underflow
//! - Generators: feature and encounter counts stay inside their ranges
//! - Transitions: exactly one active room, one floor per completed swap

use proptest::prelude::*;

use liminal_core::constants::*;
use liminal_core::corruption::CorruptionRng;
use liminal_core::encounter::{spawn_encounter, spawn_opening_encounter, EnemyKind, HIDDEN_STAR_POSITIONS};
use liminal_core::generation::{generate_room, room_type_weights, Direction, FeatureSpec, RoomType};
use liminal_core::session::GameContext;
use liminal_core::transition::{entry_point, RoomTransitionCoordinator, TransitionError};

fn weight_of(level: u32, room_type: RoomType) -> f64 {
    room_type_weights(level)
        .iter()
        .find(|(t, _)| *t == room_type)
        .map(|(_, w)| *w)
        .unwrap()
}

fn any_direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(Direction::ALL.to_vec())
}

fn any_room_type() -> impl Strategy<Value = RoomType> {
    prop::sample::select(RoomType::ALL.to_vec())
}

// ============================================================
// Room-type weights
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_weights_monotonic(a in 0u32..1_000, b in 0u32..1_000) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(weight_of(hi, RoomType::Corrupted) >= weight_of(lo, RoomType::Corrupted));
        prop_assert!(weight_of(hi, RoomType::Endless) >= weight_of(lo, RoomType::Endless));
        prop_assert_eq!(weight_of(hi, RoomType::Normal), weight_of(lo, RoomType::Normal));
        prop_assert_eq!(weight_of(hi, RoomType::Liminal), weight_of(lo, RoomType::Liminal));
    }

    #[test]
    fn prop_weights_always_valid(level in any::<u32>(), seed in any::<u64>()) {
        let weights = room_type_weights(level);
        prop_assert!(weights.iter().all(|(_, w)| w.is_finite() && *w > 0.0));
        let mut rng = CorruptionRng::from_seed(seed);
        prop_assert!(rng.weighted_choice(&weights).is_ok());
    }
}

// ============================================================
// Session counters
// ============================================================

#[derive(Debug, Clone, Copy)]
enum SessionOp {
    Personalize(u32),
    Coin { cursed: bool },
    Star,
    Floor,
    Reset,
}

fn session_op() -> impl Strategy<Value = SessionOp> {
    prop_oneof![
        (0u32..10).prop_map(SessionOp::Personalize),
        any::<bool>().prop_map(|cursed| SessionOp::Coin { cursed }),
        Just(SessionOp::Star),
        Just(SessionOp::Floor),
        Just(SessionOp::Reset),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_personalization_never_decreases(ops in prop::collection::vec(session_op(), 0..100)) {
        let mut ctx = GameContext::new(CorruptionRng::from_seed(1));
        let mut last = ctx.personalization_level();
        let mut floor = ctx.current_floor();
        for op in ops {
            match op {
                SessionOp::Personalize(n) => { ctx.personalize(n); }
                SessionOp::Coin { cursed } => { ctx.collect_coin(cursed); }
                SessionOp::Star => { ctx.collect_star(); }
                SessionOp::Floor => { ctx.advance_floor(); }
                SessionOp::Reset => ctx.reset_level_counters(),
            }
            prop_assert!(ctx.personalization_level() >= last);
            prop_assert!(ctx.current_floor() >= floor);
            last = ctx.personalization_level();
            floor = ctx.current_floor();
        }
    }

    #[test]
    fn prop_coins_match_saturating_model(pickups in prop::collection::vec(any::<bool>(), 0..200)) {
        let mut ctx = GameContext::new(CorruptionRng::from_seed(2));
        let mut expected: u32 = 0;
        for cursed in pickups {
            expected = if cursed { expected.saturating_sub(1) } else { expected + 1 };
            prop_assert_eq!(ctx.collect_coin(cursed), expected);
        }
    }
}

// ============================================================
// Generators
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    #[test]
    fn prop_room_is_well_formed(seed in any::<u64>(), level in 0u32..50) {
        let mut rng = CorruptionRng::from_seed(seed);
        let room = generate_room(&mut rng, level).unwrap();
        prop_assert_eq!(room.size, ROOM_SIZE);
        prop_assert_eq!(room.wall_height, WALL_HEIGHT);
        prop_assert!(room.doors.count() <= 4);

        let count = |pred: fn(&FeatureSpec) -> bool| room.features.iter().filter(|f| pred(f)).count();
        match room.room_type {
            RoomType::Normal => prop_assert!(room.features.is_empty()),
            RoomType::Liminal => {
                prop_assert_eq!(count(|f| matches!(f, FeatureSpec::FlickerLight { .. })), LIMINAL_LIGHT_COUNT);
                let pillars = count(|f| matches!(f, FeatureSpec::Pillar { .. }));
                prop_assert!((2..=5).contains(&pillars));
            }
            RoomType::Corrupted => {
                let shapes = count(|f| matches!(f, FeatureSpec::FloatingShape { .. }));
                prop_assert!((5..=10).contains(&shapes));
                let panels = count(|f| matches!(f, FeatureSpec::CorruptedPanel { .. }));
                prop_assert!(panels <= 1);
            }
            RoomType::Endless => {
                prop_assert_eq!(count(|f| matches!(f, FeatureSpec::MirrorWall { .. })), 7);
            }
        }
        for feature in &room.features {
            let p = feature.position();
            prop_assert!(p.x.abs() <= DOOR_OFFSET && p.z.abs() <= DOOR_OFFSET);
        }
    }

    #[test]
    fn prop_encounter_ranges(seed in any::<u64>(), room_type in any_room_type(), level in 0u32..50) {
        let mut rng = CorruptionRng::from_seed(seed);
        let encounter = spawn_encounter(&mut rng, room_type, level).unwrap();
        let goombas = encounter.enemies.iter().filter(|e| e.kind.is_stompable()).count();
        let chomps = encounter.enemies.iter().filter(|e| e.kind == EnemyKind::ChainChomp).count();

        match room_type {
            RoomType::Corrupted => {
                prop_assert!((3..=8).contains(&goombas));
                prop_assert!(chomps <= 1);
                prop_assert!(encounter.coins.is_empty());
            }
            RoomType::Liminal => {
                prop_assert!(encounter.enemies.is_empty());
                prop_assert!((10..=20).contains(&encounter.coins.len()));
                prop_assert_eq!(encounter.cursed_coins(), 0);
            }
            RoomType::Endless => {
                prop_assert!(encounter.enemies.is_empty());
                prop_assert_eq!(encounter.coins.len(), 7);
                prop_assert_eq!(encounter.cursed_coins(), 4);
            }
            RoomType::Normal => {
                prop_assert!(encounter.enemies.is_empty());
                prop_assert!(encounter.coins.is_empty());
            }
        }
        prop_assert!(encounter.enemies.iter().all(|e| !e.chained));
        if let Some(star) = &encounter.objective {
            prop_assert!(star.visible);
            prop_assert!(star.position.x.abs() <= FEATURE_SPREAD);
        }
    }

    #[test]
    fn prop_opening_encounter_ranges(seed in any::<u64>()) {
        let mut rng = CorruptionRng::from_seed(seed);
        let encounter = spawn_opening_encounter(&mut rng).unwrap();
        prop_assert!((2..=5).contains(&encounter.enemies.len()));
        prop_assert!(encounter.enemies.iter().all(|e| e.kind.is_stompable()));
        prop_assert!((5..=15).contains(&encounter.coins.len()));
        let star = encounter.objective.as_ref().unwrap();
        prop_assert!(HIDDEN_STAR_POSITIONS.contains(&star.position));
    }

    #[test]
    fn prop_generation_is_deterministic(seed in any::<u64>(), level in 0u32..30) {
        let a = generate_room(&mut CorruptionRng::from_seed(seed), level).unwrap();
        let b = generate_room(&mut CorruptionRng::from_seed(seed), level).unwrap();
        prop_assert_eq!(a, b);
    }
}

// ============================================================
// Transitions
// ============================================================

#[derive(Debug, Clone, Copy)]
enum CoordinatorOp {
    Begin(Direction),
    Complete,
    OpenLevel,
}

fn coordinator_op() -> impl Strategy<Value = CoordinatorOp> {
    prop_oneof![
        3 => any_direction().prop_map(CoordinatorOp::Begin),
        3 => Just(CoordinatorOp::Complete),
        1 => Just(CoordinatorOp::OpenLevel),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_transition_invariants(seed in any::<u64>(), ops in prop::collection::vec(coordinator_op(), 0..60)) {
        let mut ctx = GameContext::new(CorruptionRng::from_seed(seed));
        let mut coordinator = RoomTransitionCoordinator::default();
        coordinator.open_level(&mut ctx).unwrap();
        let mut pending: Option<Direction> = None;

        for op in ops {
            let floor = ctx.current_floor();
            let room_id = coordinator.active().map(|r| r.id).unwrap();
            match op {
                CoordinatorOp::Begin(direction) => {
                    let plan = coordinator.begin(direction);
                    prop_assert_eq!(plan.is_some(), pending.is_none());
                    if plan.is_some() {
                        pending = Some(direction);
                    }
                    prop_assert_eq!(coordinator.active().map(|r| r.id), Some(room_id));
                }
                CoordinatorOp::Complete => match (coordinator.complete(&mut ctx), pending.take()) {
                    (Ok(swap), Some(direction)) => {
                        prop_assert_eq!(swap.floor, floor + 1);
                        prop_assert_eq!(swap.spawn_point, entry_point(direction));
                        prop_assert_eq!(swap.retired.map(|r| r.id), Some(room_id));
                        prop_assert_eq!(swap.narrative.is_some(), swap.floor % NARRATIVE_FLOOR_INTERVAL == 0);
                        prop_assert!(swap.room_id > room_id);
                    }
                    (Err(e), None) => {
                        prop_assert_eq!(e, TransitionError::NotTransitioning);
                        prop_assert_eq!(ctx.current_floor(), floor);
                    }
                    (result, pending) => {
                        prop_assert!(false, "complete returned {:?} with pending {:?}", result, pending);
                    }
                },
                CoordinatorOp::OpenLevel => {
                    coordinator.open_level(&mut ctx).unwrap();
                    pending = None;
                    prop_assert_eq!(ctx.current_floor(), floor);
                }
            }
            prop_assert!(coordinator.active().is_some());
            prop_assert_eq!(coordinator.is_transitioning(), pending.is_some());
        }
    }
}
