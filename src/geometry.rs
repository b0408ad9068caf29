use bevy::math::Vec3;
use serde::{Deserialize, Serialize};

/// World-space position, serializable independently of the engine's vector type
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    pub const ORIGIN: Position = Position::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn offset(self, dx: f32, dy: f32, dz: f32) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }

    pub fn distance(self, other: Position) -> f32 {
        Vec3::from(self).distance(Vec3::from(other))
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const GRAY: Rgb = Rgb(128, 128, 128);
    pub const LIGHT_GRAY: Rgb = Rgb(192, 192, 192);
    pub const DARK_GRAY: Rgb = Rgb(64, 64, 64);
    pub const RED: Rgb = Rgb(255, 0, 0);
    pub const GREEN: Rgb = Rgb(0, 255, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    pub const YELLOW: Rgb = Rgb(255, 255, 0);
    pub const GOLD: Rgb = Rgb(255, 215, 0);
    pub const BROWN: Rgb = Rgb(139, 69, 19);
    pub const PEACH: Rgb = Rgb(255, 218, 185);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_distance() {
        let p = Position::ORIGIN.offset(3.0, 0.0, 4.0);
        assert_eq!(p, Position::new(3.0, 0.0, 4.0));
        assert!((p.distance(Position::ORIGIN) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_vec3_conversion() {
        let v: Vec3 = Position::new(1.0, 2.0, 3.0).into();
        assert_eq!(v, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Position::from(v), Position::new(1.0, 2.0, 3.0));
    }
}
