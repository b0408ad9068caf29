//! Game context: the one place session state lives.
//!
//! Owns the random source and the progress counters. Components receive it
//! explicitly; nothing is ambient.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::corruption::CorruptionRng;

/// Counters that survive menu round-trips
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Progress {
    pub current_floor: u32,
    pub personalization_level: u32,
    pub coins: u32,
    pub stars: u32,
}

#[derive(Debug, Clone)]
pub struct GameContext {
    rng: CorruptionRng,
    progress: Progress,
}

impl GameContext {
    pub fn new(rng: CorruptionRng) -> Self {
        Self {
            rng,
            progress: Progress::default(),
        }
    }

    pub fn rng(&mut self) -> &mut CorruptionRng {
        &mut self.rng
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn personalization_level(&self) -> u32 {
        self.progress.personalization_level
    }

    pub fn current_floor(&self) -> u32 {
        self.progress.current_floor
    }

    /// Raise personalization. There is no way to lower it.
    pub fn personalize(&mut self, amount: u32) -> u32 {
        self.progress.personalization_level =
            self.progress.personalization_level.saturating_add(amount);
        info!(
            level = self.progress.personalization_level,
            "Personalization increased"
        );
        self.progress.personalization_level
    }

    pub fn advance_floor(&mut self) -> u32 {
        self.progress.current_floor = self.progress.current_floor.saturating_add(1);
        self.progress.current_floor
    }

    /// Normal coins add one; cursed coins take one away, never below zero
    pub fn collect_coin(&mut self, cursed: bool) -> u32 {
        self.progress.coins = if cursed {
            self.progress.coins.saturating_sub(1)
        } else {
            self.progress.coins.saturating_add(1)
        };
        self.progress.coins
    }

    pub fn collect_star(&mut self) -> u32 {
        self.progress.stars = self.progress.stars.saturating_add(1);
        self.progress.stars
    }

    /// Fresh level setup: coins and stars go, floor and personalization stay
    pub fn reset_level_counters(&mut self) {
        self.progress.coins = 0;
        self.progress.stars = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> GameContext {
        GameContext::new(CorruptionRng::from_seed(1))
    }

    #[test]
    fn test_cursed_coin_floors_at_zero() {
        let mut c = ctx();
        assert_eq!(c.collect_coin(true), 0);
        assert_eq!(c.collect_coin(false), 1);
        assert_eq!(c.collect_coin(false), 2);
        assert_eq!(c.collect_coin(true), 1);
    }

    #[test]
    fn test_reset_keeps_floor_and_personalization() {
        let mut c = ctx();
        c.personalize(3);
        c.advance_floor();
        c.advance_floor();
        c.collect_coin(false);
        c.collect_star();
        c.reset_level_counters();
        let p = c.progress();
        assert_eq!(p.coins, 0);
        assert_eq!(p.stars, 0);
        assert_eq!(p.current_floor, 2);
        assert_eq!(p.personalization_level, 3);
    }

    #[test]
    fn test_personalize_saturates() {
        let mut c = ctx();
        c.personalize(u32::MAX);
        assert_eq!(c.personalize(5), u32::MAX);
    }

    #[test]
    fn test_progress_serialization() {
        let mut c = ctx();
        c.collect_star();
        let json = serde_json::to_string(&c.progress()).unwrap();
        assert!(json.contains("\"stars\":1"));
        let back: Progress = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c.progress());
    }
}
