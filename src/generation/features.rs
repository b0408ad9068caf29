//! Per-room-type decoration.
//!
//! Liminal rooms get fluorescent lights and pillars, corrupted rooms get
//! floating spinning geometry and sometimes a red wall panel, endless rooms
//! get a corridor of mirror posts. Normal rooms stay bare.

use serde::{Deserialize, Serialize};

use super::RoomType;
use crate::constants::*;
use crate::corruption::CorruptionRng;
use crate::geometry::{Position, Rgb};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Cube,
    Sphere,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureSpec {
    Pillar {
        position: Position,
    },
    /// Ceiling light; `flickers` lights toggle on a timer while the room lives
    FlickerLight {
        position: Position,
        flickers: bool,
    },
    FloatingShape {
        position: Position,
        shape: ShapeKind,
        scale: f32,
        color: Rgb,
        /// Euler angles in degrees
        rotation: Position,
        /// Seconds per full spin
        spin_period: f32,
    },
    /// Red panel over one side wall, facing inward
    CorruptedPanel {
        position: Position,
        yaw: f32,
    },
    MirrorWall {
        position: Position,
    },
}

impl FeatureSpec {
    pub fn position(&self) -> Position {
        match self {
            FeatureSpec::Pillar { position }
            | FeatureSpec::FlickerLight { position, .. }
            | FeatureSpec::FloatingShape { position, .. }
            | FeatureSpec::CorruptedPanel { position, .. }
            | FeatureSpec::MirrorWall { position } => *position,
        }
    }
}

pub fn generate_features(rng: &mut CorruptionRng, room_type: RoomType) -> Vec<FeatureSpec> {
    match room_type {
        RoomType::Normal => Vec::new(),
        RoomType::Liminal => liminal_features(rng),
        RoomType::Corrupted => corrupted_features(rng),
        RoomType::Endless => endless_features(),
    }
}

fn scattered(rng: &mut CorruptionRng, y: f32) -> Position {
    Position::new(rng.spread(FEATURE_SPREAD), y, rng.spread(FEATURE_SPREAD))
}

fn liminal_features(rng: &mut CorruptionRng) -> Vec<FeatureSpec> {
    let mut features = Vec::new();

    for _ in 0..LIMINAL_LIGHT_COUNT {
        let position = scattered(rng, LIMINAL_LIGHT_HEIGHT);
        let flickers = rng.chance(FLICKER_ELIGIBILITY);
        features.push(FeatureSpec::FlickerLight { position, flickers });
    }

    let pillars = rng.range_u32(PILLAR_COUNT);
    for _ in 0..pillars {
        features.push(FeatureSpec::Pillar {
            position: scattered(rng, PILLAR_HEIGHT),
        });
    }

    features
}

fn corrupted_features(rng: &mut CorruptionRng) -> Vec<FeatureSpec> {
    let count = rng.range_u32(FLOATING_SHAPE_COUNT);
    let mut features = Vec::with_capacity(count as usize + 1);

    for _ in 0..count {
        let shape = if rng.chance(0.5) {
            ShapeKind::Cube
        } else {
            ShapeKind::Sphere
        };
        let scale = rng.range_f32(FLOATING_SHAPE_SCALE);
        let y = rng.range_f32(FLOATING_SHAPE_HEIGHT);
        let position = Position::new(rng.spread(FEATURE_SPREAD), y, rng.spread(FEATURE_SPREAD));
        let color = rng.color();
        let rotation = Position::new(
            rng.range_i32((0, 360)) as f32,
            rng.range_i32((0, 360)) as f32,
            rng.range_i32((0, 360)) as f32,
        );
        let spin_period = rng.range_f32(FLOATING_SHAPE_SPIN);
        features.push(FeatureSpec::FloatingShape {
            position,
            shape,
            scale,
            color,
            rotation,
            spin_period,
        });
    }

    if rng.chance(CORRUPTED_PANEL_CHANCE) {
        let x = if rng.chance(0.5) { -DOOR_OFFSET } else { DOOR_OFFSET };
        let yaw = if rng.chance(0.5) { 90.0 } else { -90.0 };
        features.push(FeatureSpec::CorruptedPanel {
            position: Position::new(x, CORRUPTED_PANEL_HEIGHT, 0.0),
            yaw,
        });
    }

    features
}

/// Mirror posts every `MIRROR_Z_STRIDE` along z, alternating sides
fn endless_features() -> Vec<FeatureSpec> {
    let (start, end) = MIRROR_Z_RANGE;
    (start..=end)
        .step_by(MIRROR_Z_STRIDE)
        .enumerate()
        .map(|(i, z)| {
            let x = if i % 2 == 0 {
                -MIRROR_X_OFFSET
            } else {
                MIRROR_X_OFFSET
            };
            FeatureSpec::MirrorWall {
                position: Position::new(x, MIRROR_HEIGHT, z as f32),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_of(features: &[FeatureSpec], pred: fn(&FeatureSpec) -> bool) -> usize {
        features.iter().filter(|f| pred(f)).count()
    }

    #[test]
    fn test_normal_has_no_features() {
        let mut rng = CorruptionRng::from_seed(1);
        assert!(generate_features(&mut rng, RoomType::Normal).is_empty());
    }

    #[test]
    fn test_liminal_lights_and_pillars() {
        let mut rng = CorruptionRng::from_seed(2);
        for _ in 0..200 {
            let f = generate_features(&mut rng, RoomType::Liminal);
            let lights = count_of(&f, |f| matches!(f, FeatureSpec::FlickerLight { .. }));
            let pillars = count_of(&f, |f| matches!(f, FeatureSpec::Pillar { .. }));
            assert_eq!(lights, LIMINAL_LIGHT_COUNT);
            assert!((2..=5).contains(&pillars), "pillars: {pillars}");
            for feature in &f {
                let p = feature.position();
                assert!(p.x.abs() <= FEATURE_SPREAD && p.z.abs() <= FEATURE_SPREAD);
            }
        }
    }

    #[test]
    fn test_corrupted_shapes_and_panel() {
        let mut rng = CorruptionRng::from_seed(3);
        let mut panels = 0;
        for _ in 0..400 {
            let f = generate_features(&mut rng, RoomType::Corrupted);
            let shapes = count_of(&f, |f| matches!(f, FeatureSpec::FloatingShape { .. }));
            let room_panels = count_of(&f, |f| matches!(f, FeatureSpec::CorruptedPanel { .. }));
            assert!((5..=10).contains(&shapes), "shapes: {shapes}");
            assert!(room_panels <= 1);
            panels += room_panels;
        }
        let rate = panels as f64 / 400.0;
        assert!((rate - 0.5).abs() < 0.1, "panel rate {rate}");
    }

    #[test]
    fn test_endless_mirrors_alternate() {
        let f = endless_features();
        assert_eq!(f.len(), 7);
        let xs: Vec<f32> = f.iter().map(|m| m.position().x).collect();
        for pair in xs.windows(2) {
            assert_eq!(pair[0], -pair[1], "mirror sides must alternate");
        }
        let zs: Vec<f32> = f.iter().map(|m| m.position().z).collect();
        assert_eq!(zs, vec![-18.0, -12.0, -6.0, 0.0, 6.0, 12.0, 18.0]);
    }
}
