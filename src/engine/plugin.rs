use bevy::prelude::*;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

use crate::engine::config::EngineConfig;
use crate::engine::GameEngine;
use crate::gameflow::{GameMode, InputKey};
use crate::generation::Direction;
use crate::input::{ScriptAction, ScriptedInput};
use crate::scene::HeadlessScene;

/// Hosts a [`GameEngine`] inside a Bevy app, backed by a [`HeadlessScene`].
/// Needs `StatesPlugin` and `GameFlowPlugin` for the mode mirror.
#[derive(Default)]
pub struct EnginePlugin {
    pub config: EngineConfig,
}

impl EnginePlugin {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }
}

impl Plugin for EnginePlugin {
    fn build(&self, app: &mut App) {
        let engine = GameEngine::new(self.config.clone());
        let script = self
            .config
            .script
            .as_ref()
            .and_then(|path| match ScriptedInput::from_file(path) {
                Ok(script) => {
                    info!(path = %path.display(), actions = script.remaining(), "Loaded key script");
                    Some(script)
                }
                Err(e) => {
                    warn!(path = %path.display(), "Failed to load key script: {}", e);
                    None
                }
            });

        app.insert_resource(EngineResource(Arc::new(RwLock::new(engine))))
            .insert_resource(SceneResource(HeadlessScene::new()))
            .insert_resource(ScriptResource(script))
            .init_resource::<PendingInput>()
            .add_systems(Startup, engine_start_system)
            .add_systems(
                Update,
                (
                    keyboard_input_system,
                    scripted_input_system,
                    engine_tick_system,
                    sync_game_mode_system,
                    exit_system,
                )
                    .chain(),
            );
    }
}

#[derive(Resource)]
pub struct EngineResource(pub Arc<RwLock<GameEngine>>);

#[derive(Resource)]
pub struct SceneResource(pub HeadlessScene);

#[derive(Resource)]
pub struct ScriptResource(pub Option<ScriptedInput>);

/// Input gathered this frame, consumed by the tick
#[derive(Resource, Default, Debug)]
pub struct PendingInput {
    pub keys: Vec<InputKey>,
    pub doors: Vec<Direction>,
}

const KEY_BINDINGS: [(KeyCode, InputKey); 6] = [
    (KeyCode::Space, InputKey::Space),
    (KeyCode::Enter, InputKey::Enter),
    (KeyCode::Escape, InputKey::Escape),
    (KeyCode::KeyR, InputKey::Restart),
    (KeyCode::KeyP, InputKey::DebugPersonalize),
    (KeyCode::KeyF, InputKey::ToggleFullscreen),
];

fn engine_start_system(engine_res: Res<EngineResource>, mut scene: ResMut<SceneResource>) {
    if let Ok(mut engine) = engine_res.0.write() {
        engine.start(&mut scene.0);
    }
}

/// Only present when the host adds an input plugin
fn keyboard_input_system(
    keyboard: Option<Res<ButtonInput<KeyCode>>>,
    mut pending: ResMut<PendingInput>,
) {
    let Some(keyboard) = keyboard else {
        return;
    };
    for (code, key) in KEY_BINDINGS {
        if keyboard.just_pressed(code) {
            pending.keys.push(key);
        }
    }
}

fn scripted_input_system(mut script: ResMut<ScriptResource>, mut pending: ResMut<PendingInput>) {
    let Some(script) = script.0.as_mut() else {
        return;
    };
    match script.next_action() {
        Some(ScriptAction::Key(key)) => pending.keys.push(key),
        Some(ScriptAction::Door(direction)) => pending.doors.push(direction),
        Some(ScriptAction::Wait) | None => {}
    }
}

fn engine_tick_system(
    time: Res<Time>,
    engine_res: Res<EngineResource>,
    mut scene: ResMut<SceneResource>,
    mut pending: ResMut<PendingInput>,
) {
    let Ok(mut engine) = engine_res.0.write() else {
        return;
    };
    for direction in pending.doors.drain(..) {
        match engine.door_handle(direction) {
            Some(door) => scene.0.touch(door, false),
            None => debug!(?direction, "No door on that wall"),
        }
    }
    let keys = std::mem::take(&mut pending.keys);
    if let Err(e) = engine.tick(time.delta_secs(), &keys, &mut scene.0) {
        error!("Engine tick failed: {}", e);
    }
}

fn sync_game_mode_system(
    engine_res: Res<EngineResource>,
    state: Res<State<GameMode>>,
    mut next: ResMut<NextState<GameMode>>,
) {
    let Ok(engine) = engine_res.0.read() else {
        return;
    };
    if *state.get() != engine.mode() {
        next.set(engine.mode());
    }
}

fn exit_system(
    engine_res: Res<EngineResource>,
    script: Res<ScriptResource>,
    mut exit: EventWriter<AppExit>,
) {
    let (quit, transitioning) = engine_res
        .0
        .read()
        .map(|e| (e.quit_requested(), e.is_transitioning()))
        .unwrap_or((false, false));
    let script_done = script.0.as_ref().is_some_and(ScriptedInput::is_finished);
    if should_exit(quit, script_done, transitioning) {
        info!(quit, script_done, "Shutting down");
        exit.send(AppExit::Success);
    }
}

/// Quit is immediate; a finished script waits for any fade to land first
fn should_exit(quit: bool, script_done: bool, transitioning: bool) -> bool {
    quit || (script_done && !transitioning)
}
