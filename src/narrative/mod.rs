//! Fixed message tables and their draws.
//!
//! Messages are observational only: drawing one never touches game state
//! beyond the shared random source.

use crate::corruption::{CorruptionError, CorruptionRng};

pub const SPLASH_PRESENTS: &str = "TEAM SPECIALEMU AGI Division Presents";
pub const SPLASH_TITLE: &str = "SPECIAL 64 EMULATOR v1.0";

pub const VOID_MESSAGE: &str = "EVERY COPY IS PERSONALIZED";
pub const CURSED_COIN_MESSAGE: &str = "CURSED";
pub const WARP_MESSAGE: &str = "WHERE AM I?";

pub const DAMAGE_MESSAGES: [&str; 4] = ["OUCH", "ERROR", "???", "⬛⬛⬛"];

pub const TITLE_VARIATIONS: [&str; 4] = [
    "B3313 1.0",
    "B̸3̷3̶1̴3̵",
    "ERROR",
    "PERSONALIZATION AI ACTIVE",
];

pub const MENU_MESSAGES: [&str; 5] = [
    "Every copy is personalized",
    "The AI is watching",
    "You want fun?",
    "L is real 2401",
    "⬛⬛⬛⬛⬛⬛⬛⬛",
];

pub const START_PROMPTS: [&str; 4] = ["PRESS START", "P̸R̷E̶S̵S̴ ̵S̶T̸A̷R̶T̵", "ENTER", "WAKE UP"];

/// Messages shown on every `NARRATIVE_FLOOR_INTERVAL`th floor
pub fn floor_messages(floor: u32) -> [String; 5] {
    [
        format!("FLOOR -{floor}"),
        "DEEPER AND DEEPER".to_string(),
        "NO ESCAPE".to_string(),
        "THE CASTLE REMEMBERS".to_string(),
        "YOU'VE BEEN HERE BEFORE".to_string(),
    ]
}

pub fn star_messages(stars: u32) -> [String; 5] {
    [
        "YOU GOT A STAR!".to_string(),
        "ANOTHER SOUL COLLECTED".to_string(),
        "THE PERSONALIZATION CONTINUES".to_string(),
        format!("STAR #{stars}... BUT AT WHAT COST?"),
        "⭐⭐⭐⭐⭐".to_string(),
    ]
}

/// Equal-weight draw from a message table
pub fn draw<S: AsRef<str>>(rng: &mut CorruptionRng, messages: &[S]) -> Result<String, CorruptionError> {
    let weighted: Vec<(&str, f64)> = messages.iter().map(|m| (m.as_ref(), 1.0)).collect();
    rng.weighted_choice(&weighted).map(|m| m.to_string())
}
