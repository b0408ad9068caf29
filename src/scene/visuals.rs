//! Descriptor → visual translation.
//!
//! Turns room, encounter and menu descriptors into engine-neutral
//! [`VisualDescriptor`]s that a [`SceneEngine`](super::SceneEngine) can spawn.
//! Nothing here touches game state.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::corruption::CorruptionRng;
use crate::encounter::{CoinSpec, EnemyKind, EnemySpec, ObjectiveModel, ObjectiveSpec};
use crate::generation::{Direction, FeatureSpec, RoomDescriptor, RoomType, ShapeKind};
use crate::geometry::{Position, Rgb};
use crate::menu::MenuHead;
use crate::transition::door_position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Model {
    Cube,
    Sphere,
    Cylinder,
    Plane,
    Star,
}

/// What an entity is, so the engine can tell contacts apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualRole {
    Floor,
    Wall,
    Ceiling,
    Door(Direction),
    Light,
    Prop,
    Enemy,
    Coin,
    Objective,
    FadeOverlay,
    Backdrop,
    MenuHead,
    MenuStar,
    MenuParticle,
}

/// Looping back-and-forth motion towards `offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    pub offset: Position,
    /// Seconds for one leg of the loop
    pub period: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualDescriptor {
    pub role: VisualRole,
    pub model: Model,
    pub position: Position,
    pub scale: Position,
    /// Euler angles in degrees
    pub rotation: Position,
    pub color: Rgb,
    pub collider: bool,
    pub visible: bool,
    /// Seconds per full turn around y, if it spins
    pub spin_period: Option<f32>,
    /// Vertical bob amplitude, if it bobs
    pub bob_height: Option<f32>,
    pub drift: Option<Drift>,
}

impl VisualDescriptor {
    pub fn new(role: VisualRole, model: Model, position: Position) -> Self {
        Self {
            role,
            model,
            position,
            scale: Position::new(1.0, 1.0, 1.0),
            rotation: Position::ORIGIN,
            color: Rgb::WHITE,
            collider: false,
            visible: true,
            spin_period: None,
            bob_height: None,
            drift: None,
        }
    }

    pub fn scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Position::new(x, y, z);
        self
    }

    pub fn uniform_scale(self, s: f32) -> Self {
        self.scale(s, s, s)
    }

    pub fn rotation(mut self, rotation: Position) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn collider(mut self) -> Self {
        self.collider = true;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn spin(mut self, period: f32) -> Self {
        self.spin_period = Some(period);
        self
    }

    pub fn bob(mut self, height: Option<f32>) -> Self {
        self.bob_height = height;
        self
    }

    pub fn drift(mut self, offset: Position, period: f32) -> Self {
        self.drift = Some(Drift { offset, period });
        self
    }
}

/// Floor, four walls and the optional ceiling
pub fn room_shell(room: &RoomDescriptor) -> Vec<VisualDescriptor> {
    let normal = room.room_type == RoomType::Normal;
    let floor_color = if normal { Rgb::WHITE } else { Rgb::DARK_GRAY };
    let wall_color = if normal { Rgb::LIGHT_GRAY } else { Rgb::BLACK };
    let half = room.size / 2.0;
    let h = room.wall_height;

    let mut shell = vec![VisualDescriptor::new(VisualRole::Floor, Model::Plane, Position::ORIGIN)
        .scale(room.size, 1.0, room.size)
        .color(floor_color)
        .collider()];

    let walls = [
        (Position::new(0.0, h / 2.0, half), (room.size, h, 1.0)),
        (Position::new(0.0, h / 2.0, -half), (room.size, h, 1.0)),
        (Position::new(half, h / 2.0, 0.0), (1.0, h, room.size)),
        (Position::new(-half, h / 2.0, 0.0), (1.0, h, room.size)),
    ];
    for (position, (sx, sy, sz)) in walls {
        shell.push(
            VisualDescriptor::new(VisualRole::Wall, Model::Cube, position)
                .scale(sx, sy, sz)
                .color(wall_color)
                .collider(),
        );
    }

    if room.ceiling {
        shell.push(
            VisualDescriptor::new(VisualRole::Ceiling, Model::Plane, Position::new(0.0, h, 0.0))
                .scale(room.size, 1.0, room.size)
                .rotation(Position::new(180.0, 0.0, 0.0))
                .color(wall_color),
        );
    }

    shell
}

pub fn feature_visual(feature: &FeatureSpec) -> VisualDescriptor {
    match feature {
        FeatureSpec::FlickerLight { position, .. } => {
            VisualDescriptor::new(VisualRole::Light, Model::Cube, *position)
                .scale(2.0, 0.2, 8.0)
                .color(Rgb::YELLOW)
        }
        FeatureSpec::Pillar { position } => {
            VisualDescriptor::new(VisualRole::Prop, Model::Cube, *position)
                .scale(2.0, WALL_HEIGHT, 2.0)
                .color(Rgb::GRAY)
                .collider()
        }
        FeatureSpec::FloatingShape {
            position,
            shape,
            scale,
            color,
            rotation,
            spin_period,
        } => {
            let model = match shape {
                ShapeKind::Cube => Model::Cube,
                ShapeKind::Sphere => Model::Sphere,
            };
            VisualDescriptor::new(VisualRole::Prop, model, *position)
                .uniform_scale(*scale)
                .rotation(*rotation)
                .color(*color)
                .spin(*spin_period)
        }
        FeatureSpec::CorruptedPanel { position, yaw } => {
            VisualDescriptor::new(VisualRole::Prop, Model::Plane, *position)
                .scale(10.0, 1.0, 10.0)
                .rotation(Position::new(0.0, *yaw, 0.0))
                .color(Rgb::RED)
        }
        FeatureSpec::MirrorWall { position } => {
            VisualDescriptor::new(VisualRole::Prop, Model::Cube, *position)
                .scale(0.5, 10.0, 0.5)
                .color(Rgb::DARK_GRAY)
        }
    }
}

pub fn door_visual(direction: Direction) -> VisualDescriptor {
    let (sx, sz) = match direction {
        Direction::North | Direction::South => (5.0, 0.5),
        Direction::East | Direction::West => (0.5, 5.0),
    };
    VisualDescriptor::new(VisualRole::Door(direction), Model::Cube, door_position(direction))
        .scale(sx, 5.0, sz)
        .color(Rgb::BLACK)
        .collider()
}

pub fn enemy_visual(enemy: &EnemySpec) -> VisualDescriptor {
    match enemy.kind {
        EnemyKind::ChainChomp => {
            VisualDescriptor::new(VisualRole::Enemy, Model::Sphere, enemy.position)
                .uniform_scale(8.0)
                .color(Rgb::BLACK)
                .collider()
        }
        kind => {
            let color = match kind {
                EnemyKind::DarkGoomba => Rgb::BLACK,
                EnemyKind::Glitch => enemy.tint.unwrap_or(Rgb::RED),
                _ => Rgb::BROWN,
            };
            VisualDescriptor::new(VisualRole::Enemy, Model::Cube, enemy.position)
                .scale(1.0, 0.7, 1.0)
                .color(color)
                .collider()
        }
    }
}

pub fn coin_visual(coin: &CoinSpec) -> VisualDescriptor {
    VisualDescriptor::new(VisualRole::Coin, Model::Cylinder, coin.position)
        .uniform_scale(0.5)
        .rotation(Position::new(90.0, 0.0, 0.0))
        .color(if coin.cursed { Rgb::BLACK } else { Rgb::GOLD })
        .collider()
        .bob(coin.bob_height)
}

pub fn objective_visual(star: &ObjectiveSpec) -> VisualDescriptor {
    let model = match star.model {
        ObjectiveModel::Star => Model::Star,
        ObjectiveModel::Cube => Model::Cube,
    };
    VisualDescriptor::new(VisualRole::Objective, model, star.position)
        .uniform_scale(3.0)
        .rotation(Position::new(0.0, 45.0, 0.0))
        .color(if star.cursed { Rgb::BLACK } else { Rgb::YELLOW })
        .visible(star.visible)
        .spin(5.0)
}

/// Black cube around the camera; its alpha is animated by the engine
pub fn fade_overlay() -> VisualDescriptor {
    VisualDescriptor::new(VisualRole::FadeOverlay, Model::Cube, Position::ORIGIN)
        .uniform_scale(100.0)
        .color(Rgb::BLACK)
}

pub fn splash_backdrop() -> VisualDescriptor {
    VisualDescriptor::new(VisualRole::Backdrop, Model::Cube, Position::new(0.0, 0.0, -5.0))
        .scale(50.0, 50.0, 1.0)
        .color(Rgb::BLACK)
}

/// Head, hat and face parts for the title screen
pub fn menu_head_visuals(head: &MenuHead) -> Vec<VisualDescriptor> {
    let part = |model, x, y, z| VisualDescriptor::new(VisualRole::MenuHead, model, Position::new(x, y, z));
    let skin = Rgb::PEACH;
    let hat_color = if head.hat_black { Rgb::BLACK } else { Rgb::RED };
    let eye_color = |red: bool| if red { Rgb::RED } else { Rgb::BLACK };

    vec![
        part(Model::Sphere, 0.0, 0.0, 0.0)
            .uniform_scale(3.0)
            .color(if head.head_black { Rgb::BLACK } else { skin }),
        part(Model::Sphere, 0.0, 1.2, 0.0)
            .scale(3.2, 1.5, 3.2)
            .color(hat_color)
            .visible(head.hat_present),
        part(Model::Cylinder, 0.0, 0.3, 0.5)
            .scale(4.0, 0.2, 4.0)
            .rotation(Position::new(15.0, 0.0, 0.0))
            .color(hat_color)
            .visible(head.hat_present),
        part(Model::Cube, 0.0, 0.5, 1.4)
            .scale(0.8, 0.8, 0.1)
            .color(Rgb::WHITE)
            .visible(head.hat_present),
        part(Model::Sphere, -0.6, 0.2, 1.2)
            .scale(0.3, 0.4, 0.3)
            .color(eye_color(head.left_eye.red))
            .visible(head.left_eye.present),
        part(Model::Sphere, 0.6, 0.2, 1.2)
            .scale(0.3, 0.4, 0.3)
            .color(eye_color(head.right_eye.red))
            .visible(head.right_eye.present),
        part(Model::Sphere, 0.0, -0.1, 1.3).scale(0.4, 0.3, 0.6).color(skin),
        part(Model::Cube, 0.0, -0.4, 1.1)
            .scale(1.2, 0.15, 0.3)
            .color(if head.mustache_black { Rgb::BLACK } else { Rgb::BROWN })
            .visible(head.mustache_present),
        part(Model::Sphere, -1.4, 0.0, 0.2).scale(0.6, 0.8, 0.4).color(skin),
        part(Model::Sphere, 1.4, 0.0, 0.2).scale(0.6, 0.8, 0.4).color(skin),
    ]
}

/// Void behind the title head: slowly spinning black shapes, a field of
/// miscoloured stars (some jittering sideways) and drifting dark particles
pub fn menu_backdrop(rng: &mut CorruptionRng) -> Vec<VisualDescriptor> {
    const MODELS: [Model; 3] = [Model::Cube, Model::Sphere, Model::Cylinder];
    const STAR_COLORS: [Rgb; 4] = [Rgb::YELLOW, Rgb::RED, Rgb::BLACK, Rgb::WHITE];
    const PARTICLE_COLORS: [Rgb; 3] = [Rgb::BLACK, Rgb::RED, Rgb::DARK_GRAY];

    let mut backdrop = Vec::with_capacity(MENU_BACKDROP_COUNT + MENU_STAR_COUNT + MENU_PARTICLE_COUNT);
    for _ in 0..MENU_BACKDROP_COUNT {
        let model = *rng.pick(&MODELS).unwrap_or(&Model::Cube);
        let scale = rng.range_f32((1.0, 5.0));
        let position = Position::new(
            rng.spread(20.0),
            rng.spread(15.0),
            rng.range_f32((-30.0, -10.0)),
        );
        backdrop.push(
            VisualDescriptor::new(VisualRole::Backdrop, model, position)
                .uniform_scale(scale)
                .color(Rgb::BLACK)
                .spin(rng.range_f32((10.0, 30.0))),
        );
    }

    for _ in 0..MENU_STAR_COUNT {
        let color = *rng.pick(&STAR_COLORS).unwrap_or(&Rgb::YELLOW);
        let scale = rng.range_f32((0.05, 0.2));
        let position = Position::new(
            rng.spread(15.0),
            rng.spread(10.0),
            rng.range_f32((-20.0, -5.0)),
        );
        let mut star = VisualDescriptor::new(VisualRole::MenuStar, Model::Cube, position)
            .uniform_scale(scale)
            .color(color);
        if rng.chance(MENU_STAR_JITTER_CHANCE) {
            star = star.drift(Position::new(rng.spread(5.0), 0.0, 0.0), 0.1);
        }
        backdrop.push(star);
    }

    for _ in 0..MENU_PARTICLE_COUNT {
        let model = *rng.pick(&MODELS[..2]).unwrap_or(&Model::Cube);
        let color = *rng.pick(&PARTICLE_COLORS).unwrap_or(&Rgb::BLACK);
        let scale = rng.range_f32((0.02, 0.1));
        let position = Position::new(
            rng.spread(10.0),
            rng.spread(5.0),
            rng.range_f32((-15.0, 0.0)),
        );
        let offset = Position::new(rng.spread(5.0), rng.spread(2.0), 0.0);
        backdrop.push(
            VisualDescriptor::new(VisualRole::MenuParticle, model, position)
                .uniform_scale(scale)
                .color(color)
                .drift(offset, rng.range_f32((2.0, 5.0))),
        );
    }
    backdrop
}
