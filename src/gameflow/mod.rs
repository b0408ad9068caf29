//! Game Flow State Machine
//!
//! Splash → Menu → Playing → Menu ... with quit from the menu as the only way
//! out. The machine only decides *which* transition happens; the engine carries
//! out the resulting [`FlowCommand`] (tearing down the splash, regenerating the
//! opening room, and so on).
//!
//! | Mode    | Space / Enter | Escape        | R       | P              | F          |
//! |---------|---------------|---------------|---------|----------------|------------|
//! | Splash  | EnterMenu     | EnterMenu     | -       | -              | -          |
//! | Menu    | StartLevel    | Quit          | -       | -              | -          |
//! | Playing | -             | ReturnToMenu  | Restart | Personalize(5) | Fullscreen |

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::DEBUG_PERSONALIZATION_STEP;

/// Mirrors the engine's mode into Bevy state so host systems can hang off
/// `OnEnter`/`OnExit`.
pub struct GameFlowPlugin;

impl Plugin for GameFlowPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<GameMode>()
            .add_systems(OnEnter(GameMode::Menu), on_enter_menu)
            .add_systems(OnEnter(GameMode::Playing), on_enter_playing);
    }
}

fn on_enter_menu() {
    debug!("Host state: Menu");
}

fn on_enter_playing() {
    debug!("Host state: Playing");
}

/// Top-level mode; exactly one is active
#[derive(States, Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameMode {
    #[default]
    Splash,
    Menu,
    Playing,
}

/// Keys the core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKey {
    Space,
    Enter,
    Escape,
    Restart,
    DebugPersonalize,
    ToggleFullscreen,
}

/// Work the engine must do after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowCommand {
    EnterMenu,
    StartLevel,
    RestartLevel,
    ReturnToMenu,
    Quit,
    Personalize(u32),
    ToggleFullscreen,
}

#[derive(Debug, Clone)]
pub struct GameFlow {
    mode: GameMode,
    quit_requested: bool,
    debug_step: u32,
}

impl Default for GameFlow {
    fn default() -> Self {
        Self::with_debug_step(DEBUG_PERSONALIZATION_STEP)
    }
}

impl GameFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flow whose `P` key adds `debug_step` personalization
    pub fn with_debug_step(debug_step: u32) -> Self {
        Self {
            mode: GameMode::Splash,
            quit_requested: false,
            debug_step,
        }
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Splash timer ran out. A no-op if the splash was already skipped.
    pub fn on_splash_expired(&mut self) -> Option<FlowCommand> {
        if self.mode != GameMode::Splash {
            return None;
        }
        self.set_mode(GameMode::Menu);
        Some(FlowCommand::EnterMenu)
    }

    pub fn on_key(&mut self, key: InputKey) -> Option<FlowCommand> {
        if self.quit_requested {
            return None;
        }
        match (self.mode, key) {
            (GameMode::Splash, InputKey::Space | InputKey::Enter | InputKey::Escape) => {
                self.set_mode(GameMode::Menu);
                Some(FlowCommand::EnterMenu)
            }
            (GameMode::Menu, InputKey::Space | InputKey::Enter) => {
                self.set_mode(GameMode::Playing);
                Some(FlowCommand::StartLevel)
            }
            (GameMode::Menu, InputKey::Escape) => {
                info!("GameFlow: quit requested");
                self.quit_requested = true;
                Some(FlowCommand::Quit)
            }
            (GameMode::Playing, InputKey::Escape) => {
                self.set_mode(GameMode::Menu);
                Some(FlowCommand::ReturnToMenu)
            }
            (GameMode::Playing, InputKey::Restart) => Some(FlowCommand::RestartLevel),
            (GameMode::Playing, InputKey::DebugPersonalize) => {
                Some(FlowCommand::Personalize(self.debug_step))
            }
            (GameMode::Playing, InputKey::ToggleFullscreen) => Some(FlowCommand::ToggleFullscreen),
            _ => None,
        }
    }

    fn set_mode(&mut self, mode: GameMode) {
        info!("GameFlow: {:?} -> {:?}", self.mode, mode);
        self.mode = mode;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_splash() {
        assert_eq!(GameFlow::new().mode(), GameMode::Splash);
    }

    #[test]
    fn test_splash_expiry_once() {
        let mut flow = GameFlow::new();
        assert_eq!(flow.on_splash_expired(), Some(FlowCommand::EnterMenu));
        assert_eq!(flow.mode(), GameMode::Menu);
        assert_eq!(flow.on_splash_expired(), None);
    }

    #[test]
    fn test_skip_then_expiry_is_noop() {
        let mut flow = GameFlow::new();
        assert_eq!(flow.on_key(InputKey::Escape), Some(FlowCommand::EnterMenu));
        assert_eq!(flow.on_splash_expired(), None);
        assert_eq!(flow.mode(), GameMode::Menu);
    }

    #[test]
    fn test_full_cycle() {
        let mut flow = GameFlow::new();
        flow.on_key(InputKey::Space);
        assert_eq!(flow.on_key(InputKey::Enter), Some(FlowCommand::StartLevel));
        assert_eq!(flow.mode(), GameMode::Playing);
        assert_eq!(flow.on_key(InputKey::Escape), Some(FlowCommand::ReturnToMenu));
        assert_eq!(flow.mode(), GameMode::Menu);
        assert_eq!(flow.on_key(InputKey::Space), Some(FlowCommand::StartLevel));
        assert_eq!(flow.mode(), GameMode::Playing);
    }

    #[test]
    fn test_debug_keys_only_while_playing() {
        let mut flow = GameFlow::new();
        assert_eq!(flow.on_key(InputKey::DebugPersonalize), None);
        flow.on_key(InputKey::Space);
        assert_eq!(flow.on_key(InputKey::ToggleFullscreen), None);
        flow.on_key(InputKey::Space);
        assert_eq!(
            flow.on_key(InputKey::DebugPersonalize),
            Some(FlowCommand::Personalize(5))
        );
        assert_eq!(
            flow.on_key(InputKey::ToggleFullscreen),
            Some(FlowCommand::ToggleFullscreen)
        );
        assert_eq!(flow.on_key(InputKey::Restart), Some(FlowCommand::RestartLevel));
        assert_eq!(flow.mode(), GameMode::Playing);
    }

    #[test]
    fn test_custom_debug_step() {
        let mut flow = GameFlow::with_debug_step(2);
        flow.on_key(InputKey::Space);
        flow.on_key(InputKey::Space);
        assert_eq!(
            flow.on_key(InputKey::DebugPersonalize),
            Some(FlowCommand::Personalize(2))
        );
    }

    #[test]
    fn test_quit_is_terminal() {
        let mut flow = GameFlow::new();
        flow.on_key(InputKey::Enter);
        assert_eq!(flow.on_key(InputKey::Escape), Some(FlowCommand::Quit));
        assert!(flow.quit_requested());
        assert_eq!(flow.on_key(InputKey::Space), None);
    }

    #[test]
    fn test_game_mode_serialization() {
        let json = serde_json::to_string(&GameMode::Playing).unwrap();
        let back: GameMode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, GameMode::Playing);
    }
}
