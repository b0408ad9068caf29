//! Title screen corruption.
//!
//! The head on the title screen is rolled once per menu visit; some copies are
//! missing a hat, an eye, or carry the wrong letter on the cap. While the menu
//! is up the head keeps glitching and blinking, and the splash caption before
//! it flickers. Everything here is a pure roll; the engine applies and reverts.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::corruption::CorruptionRng;
use crate::geometry::Rgb;
use crate::narrative::TITLE_VARIATIONS;

const WRONG_EMBLEMS: [char; 4] = ['W', 'L', '?', '⬛'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EyeRoll {
    pub present: bool,
    pub red: bool,
}

impl EyeRoll {
    fn roll(rng: &mut CorruptionRng) -> Self {
        Self {
            red: rng.chance(0.1),
            present: !rng.chance(0.05),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuHead {
    pub head_black: bool,
    pub hat_present: bool,
    pub hat_black: bool,
    pub emblem: char,
    pub left_eye: EyeRoll,
    pub right_eye: EyeRoll,
    pub mustache_present: bool,
    pub mustache_black: bool,
}

impl MenuHead {
    pub fn roll(rng: &mut CorruptionRng) -> Self {
        let head_black = rng.chance(0.1);
        let hat_black = rng.chance(0.2);
        let hat_present = !rng.chance(0.1);
        let emblem = if rng.chance(0.7) {
            'M'
        } else {
            *rng.pick(&WRONG_EMBLEMS).unwrap_or(&'?')
        };
        let left_eye = EyeRoll::roll(rng);
        let right_eye = EyeRoll::roll(rng);
        let mustache_black = rng.chance(0.2);
        let mustache_present = !rng.chance(0.1);

        Self {
            head_black,
            hat_present,
            hat_black,
            emblem,
            left_eye,
            right_eye,
            mustache_present,
            mustache_black,
        }
    }

    pub fn is_pristine(&self) -> bool {
        !self.head_black
            && self.hat_present
            && !self.hat_black
            && self.emblem == 'M'
            && self.left_eye == (EyeRoll { present: true, red: false })
            && self.right_eye == (EyeRoll { present: true, red: false })
            && self.mustache_present
            && !self.mustache_black
    }
}

/// Parts of the title head, in the order they are spawned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HeadPart {
    Head,
    Hat,
    Brim,
    Emblem,
    LeftEye,
    RightEye,
    Nose,
    Mustache,
    LeftEar,
    RightEar,
}

impl HeadPart {
    pub const ALL: [HeadPart; 10] = [
        HeadPart::Head,
        HeadPart::Hat,
        HeadPart::Brim,
        HeadPart::Emblem,
        HeadPart::LeftEye,
        HeadPart::RightEye,
        HeadPart::Nose,
        HeadPart::Mustache,
        HeadPart::LeftEar,
        HeadPart::RightEar,
    ];

    pub const EYES: [HeadPart; 2] = [HeadPart::LeftEye, HeadPart::RightEye];

    /// Parts a colour glitch can land on
    const RECOLORABLE: [HeadPart; 4] = [
        HeadPart::Nose,
        HeadPart::LeftEar,
        HeadPart::RightEar,
        HeadPart::Head,
    ];

    /// Parts a visibility glitch can flip
    const TOGGLEABLE: [HeadPart; 3] = [HeadPart::LeftEye, HeadPart::RightEye, HeadPart::Mustache];

    pub fn index(self) -> usize {
        self as usize
    }
}

const GLITCH_COLORS: [Rgb; 3] = [Rgb::BLACK, Rgb::RED, Rgb::WHITE];

/// A short-lived distortion of the title head
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HeadGlitch {
    Recolor { part: HeadPart, color: Rgb },
    /// Head sphere widened or narrowed; height and depth stay put
    Stretch { width: f32 },
    /// Flip the part's visibility
    Toggle { part: HeadPart },
}

impl HeadGlitch {
    /// Four glitch kinds are equally likely; the fourth (a position glitch)
    /// never moves anything, so it rolls `None`.
    pub fn roll(rng: &mut CorruptionRng) -> Option<Self> {
        match rng.range_u32((0, 3)) {
            0 => Some(HeadGlitch::Recolor {
                part: *rng.pick(&HeadPart::RECOLORABLE)?,
                color: *rng.pick(&GLITCH_COLORS)?,
            }),
            1 => Some(HeadGlitch::Stretch {
                width: HEAD_SCALE + rng.spread(HEAD_STRETCH_JITTER),
            }),
            2 => Some(HeadGlitch::Toggle {
                part: *rng.pick(&HeadPart::TOGGLEABLE)?,
            }),
            _ => None,
        }
    }

    pub fn part(&self) -> HeadPart {
        match self {
            HeadGlitch::Recolor { part, .. } | HeadGlitch::Toggle { part } => *part,
            HeadGlitch::Stretch { .. } => HeadPart::Head,
        }
    }

    /// Seconds until the part is put back
    pub fn revert_after(&self) -> f32 {
        match self {
            HeadGlitch::Recolor { .. } => HEAD_RECOLOR_REVERT,
            HeadGlitch::Stretch { .. } => HEAD_STRETCH_REVERT,
            HeadGlitch::Toggle { .. } => HEAD_TOGGLE_REVERT,
        }
    }
}

/// Eye height during a blink: a squint, or shut flat one time in five
pub fn blink_height(rng: &mut CorruptionRng) -> f32 {
    if rng.chance(BLINK_SHUT_CHANCE) {
        0.0
    } else {
        BLINK_SQUINT
    }
}

/// Restyle of the splash caption
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptionFlicker {
    pub color: Rgb,
    pub scale: f32,
}

impl CaptionFlicker {
    pub fn roll(rng: &mut CorruptionRng) -> Option<Self> {
        if !rng.chance(SPLASH_GLITCH_CHANCE) {
            return None;
        }
        const COLORS: [Rgb; 3] = [Rgb::RED, Rgb::WHITE, Rgb::BLACK];
        Some(Self {
            color: *rng.pick(&COLORS)?,
            scale: SPLASH_CAPTION_SCALE + rng.spread(SPLASH_GLITCH_SCALE_JITTER),
        })
    }
}

/// Which title variation is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TitleCycle {
    index: usize,
}

impl TitleCycle {
    pub fn current(&self) -> &'static str {
        TITLE_VARIATIONS[self.index]
    }

    pub fn advance(&mut self) -> &'static str {
        self.index = (self.index + 1) % TITLE_VARIATIONS.len();
        self.current()
    }
}
