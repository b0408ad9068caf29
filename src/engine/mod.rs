//! Game Engine: orchestration layer
//!
//! [`GameEngine`] owns the session context, the flow state machine, the room
//! transition coordinator and the deadline scheduler, and drives them against
//! a [`SceneEngine`] once per tick:
//!
//! 1. Keys are fed to the flow machine and the resulting command is applied.
//! 2. The scheduler advances; due tasks (splash expiry, room rebuild, flicker,
//!    menu cycling, player glitches) run in deadline order.
//! 3. While playing, contacts reported by the scene are resolved into pickups,
//!    stomps, damage and door transitions, then the void and atmosphere checks
//!    run.
//!
//! Everything the engine spawns is tracked by handle, so tearing a room or a
//! screen down destroys exactly what it created and cancels its timers.

pub mod config;
pub mod plugin;

use std::collections::HashMap;

use tracing::{debug, info, warn};

pub use config::{ConfigError, EngineConfig, SEED_ENV};
pub use plugin::{EnginePlugin, EngineResource, PendingInput, SceneResource, ScriptResource};

use crate::constants::*;
use crate::encounter::{CoinSpec, EnemySpec, ObjectiveSpec};
use crate::gameflow::{FlowCommand, GameFlow, GameMode, InputKey};
use crate::gameplay::{self, PlayerGlitch};
use crate::generation::{Direction, FeatureSpec};
use crate::geometry::{Position, Rgb};
use crate::menu::{blink_height, CaptionFlicker, HeadGlitch, HeadPart, MenuHead, TitleCycle};
use crate::narrative;
use crate::scene::visuals;
use crate::scene::{
    CameraEffect, LabelSlot, LabelStyle, PlayerEffect, SceneEngine, SceneError, SceneHandle,
    SoundClip, TextOverlay, VisualDescriptor,
};
use crate::scheduler::Scheduler;
use crate::session::{GameContext, Progress};
use crate::transition::{ActiveRoom, RoomSwap, RoomTransitionCoordinator, TransitionError};

/// Deferred work, polled by the engine's scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledTask {
    SplashExpired,
    SplashGlitch,
    RoomRebuild,
    FadeCleanup(SceneHandle),
    Flicker { room_id: u64, light: SceneHandle },
    TitleCycle,
    MenuMessage,
    HeadGlitch,
    HeadGlitchRevert(HeadPart),
    HeadBlink,
    HeadBlinkRevert,
    PlayerGlitch,
    PlayerGlitchRevert,
    FovRestore,
}

impl ScheduledTask {
    /// Tasks that only make sense while a level is being played
    fn is_level_task(&self) -> bool {
        matches!(
            self,
            ScheduledTask::RoomRebuild
                | ScheduledTask::FadeCleanup(_)
                | ScheduledTask::Flicker { .. }
                | ScheduledTask::PlayerGlitch
                | ScheduledTask::PlayerGlitchRevert
                | ScheduledTask::FovRestore
        )
    }

    fn is_menu_task(&self) -> bool {
        matches!(
            self,
            ScheduledTask::TitleCycle
                | ScheduledTask::MenuMessage
                | ScheduledTask::HeadGlitch
                | ScheduledTask::HeadGlitchRevert(_)
                | ScheduledTask::HeadBlink
                | ScheduledTask::HeadBlinkRevert
        )
    }

    fn is_splash_task(&self) -> bool {
        matches!(self, ScheduledTask::SplashGlitch)
    }
}

/// Scene entities belonging to the materialized room
#[derive(Debug, Default)]
struct RoomEntities {
    room_id: u64,
    statics: Vec<SceneHandle>,
    /// Flickering lights and whether each is currently lit
    lights: HashMap<SceneHandle, bool>,
    doors: HashMap<SceneHandle, Direction>,
    enemies: HashMap<SceneHandle, EnemySpec>,
    coins: HashMap<SceneHandle, CoinSpec>,
    objective: Option<(SceneHandle, ObjectiveSpec)>,
}

impl RoomEntities {
    fn handles(&self) -> impl Iterator<Item = SceneHandle> + '_ {
        self.statics
            .iter()
            .copied()
            .chain(self.lights.keys().copied())
            .chain(self.doors.keys().copied())
            .chain(self.enemies.keys().copied())
            .chain(self.coins.keys().copied())
            .chain(self.objective.iter().map(|(h, _)| *h))
    }
}

fn ignore_scene_error(result: Result<(), SceneError>) {
    if let Err(e) = result {
        warn!("Scene: {}; ignored", e);
    }
}

pub struct GameEngine {
    config: EngineConfig,
    ctx: GameContext,
    flow: GameFlow,
    coordinator: RoomTransitionCoordinator,
    scheduler: Scheduler<ScheduledTask>,
    room: Option<RoomEntities>,
    fades: Vec<SceneHandle>,
    splash: Vec<SceneHandle>,
    menu: Vec<SceneHandle>,
    /// Title head parts, indexed by [`HeadPart::index`]
    head_parts: Vec<SceneHandle>,
    menu_head: Option<MenuHead>,
    title: TitleCycle,
    started: bool,
}

impl GameEngine {
    pub fn new(config: EngineConfig) -> Self {
        let ctx = GameContext::new(config.corruption_rng());
        info!(seed = ctx.seed(), "Game engine created");
        Self {
            flow: GameFlow::with_debug_step(config.debug_personalization_step),
            coordinator: RoomTransitionCoordinator::new(
                config.fade_duration,
                config.narrative_interval,
            ),
            config,
            ctx,
            scheduler: Scheduler::new(),
            room: None,
            fades: Vec::new(),
            splash: Vec::new(),
            menu: Vec::new(),
            head_parts: Vec::new(),
            menu_head: None,
            title: TitleCycle::default(),
            started: false,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.ctx.seed()
    }

    pub fn mode(&self) -> GameMode {
        self.flow.mode()
    }

    pub fn progress(&self) -> Progress {
        self.ctx.progress()
    }

    pub fn quit_requested(&self) -> bool {
        self.flow.quit_requested()
    }

    pub fn is_transitioning(&self) -> bool {
        self.coordinator.is_transitioning()
    }

    pub fn active_room(&self) -> Option<&ActiveRoom> {
        self.coordinator.active()
    }

    /// Seconds of engine time elapsed
    pub fn elapsed(&self) -> f64 {
        self.scheduler.now()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    pub fn has_task(&self, pred: impl FnMut(&ScheduledTask) -> bool) -> bool {
        self.scheduler.is_scheduled(pred)
    }

    pub fn door_handle(&self, direction: Direction) -> Option<SceneHandle> {
        let room = self.room.as_ref()?;
        room.doors
            .iter()
            .find(|(_, d)| **d == direction)
            .map(|(h, _)| *h)
    }

    pub fn enemy_handles(&self) -> Vec<SceneHandle> {
        self.room
            .as_ref()
            .map(|r| r.enemies.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn enemy(&self, handle: SceneHandle) -> Option<&EnemySpec> {
        self.room.as_ref()?.enemies.get(&handle)
    }

    pub fn coin(&self, handle: SceneHandle) -> Option<&CoinSpec> {
        self.room.as_ref()?.coins.get(&handle)
    }

    pub fn coin_handles(&self) -> Vec<SceneHandle> {
        self.room
            .as_ref()
            .map(|r| r.coins.keys().copied().collect())
            .unwrap_or_default()
    }

    pub fn objective(&self) -> Option<(SceneHandle, &ObjectiveSpec)> {
        let (handle, spec) = self.room.as_ref()?.objective.as_ref()?;
        Some((*handle, spec))
    }

    /// Show the splash screen and arm its timer. Calling twice does nothing.
    pub fn start(&mut self, scene: &mut dyn SceneEngine) {
        if self.started {
            return;
        }
        self.started = true;
        self.splash.push(scene.spawn(visuals::splash_backdrop()));
        scene.set_label(
            LabelSlot::SplashPresents,
            Some(narrative::SPLASH_PRESENTS.to_string()),
        );
        scene.set_label(LabelSlot::SplashTitle, Some(narrative::SPLASH_TITLE.to_string()));
        scene.style_label(
            LabelSlot::SplashPresents,
            LabelStyle { color: Rgb::RED, scale: SPLASH_CAPTION_SCALE },
        );
        scene.style_label(LabelSlot::SplashTitle, LabelStyle { color: Rgb::WHITE, scale: 2.0 });
        self.scheduler
            .schedule(self.config.splash_duration, ScheduledTask::SplashExpired);
        self.scheduler
            .schedule(SPLASH_GLITCH_PERIOD, ScheduledTask::SplashGlitch);
        info!("Splash shown");
    }

    /// Advance the game by `dt` seconds
    pub fn tick(
        &mut self,
        dt: f32,
        keys: &[InputKey],
        scene: &mut dyn SceneEngine,
    ) -> Result<(), TransitionError> {
        if !self.started {
            self.start(scene);
        }

        for &key in keys {
            self.handle_key(key, scene)?;
        }

        for task in self.scheduler.advance(dt) {
            self.run_task(task, scene)?;
        }

        let contacts = scene.contacts();
        if self.flow.mode() == GameMode::Playing && self.room.is_some() {
            for contact in contacts {
                self.resolve_contact(contact.entity, contact.from_above, scene)?;
            }
            self.check_star(scene)?;
            self.check_void(scene);
            self.escalate_atmosphere(scene);
            self.update_hud(scene);
        }

        Ok(())
    }

    /// Leave the current room through `direction`: fade out now, rebuild once
    /// the fade completes. Returns false if the request was ignored.
    pub fn transition(&mut self, direction: Direction, scene: &mut dyn SceneEngine) -> bool {
        if self.flow.mode() != GameMode::Playing {
            return false;
        }
        let Some(plan) = self.coordinator.begin(direction) else {
            debug!(?direction, "Door contact ignored; transition already running");
            return false;
        };

        let fade = scene.spawn(visuals::fade_overlay());
        ignore_scene_error(scene.fade(fade, 0.0, 0.0));
        ignore_scene_error(scene.fade(fade, 1.0, plan.fade_duration));
        self.fades.push(fade);
        self.scheduler
            .schedule(plan.fade_duration, ScheduledTask::RoomRebuild);
        true
    }

    fn handle_key(
        &mut self,
        key: InputKey,
        scene: &mut dyn SceneEngine,
    ) -> Result<(), TransitionError> {
        if key == InputKey::Space && self.flow.mode() == GameMode::Playing {
            ignore_scene_error(scene.play_sound(SoundClip::Jump));
        }
        match self.flow.on_key(key) {
            Some(command) => self.apply(command, scene),
            None => Ok(()),
        }
    }

    fn apply(
        &mut self,
        command: FlowCommand,
        scene: &mut dyn SceneEngine,
    ) -> Result<(), TransitionError> {
        debug!(?command, "Applying flow command");
        match command {
            FlowCommand::EnterMenu => {
                self.teardown_splash(scene);
                self.enter_menu(scene)?;
            }
            FlowCommand::StartLevel => {
                self.teardown_menu(scene);
                self.start_level(scene)?;
            }
            FlowCommand::RestartLevel => {
                self.teardown_level(scene);
                self.start_level(scene)?;
            }
            FlowCommand::ReturnToMenu => {
                self.teardown_level(scene);
                self.enter_menu(scene)?;
            }
            FlowCommand::Quit => info!("Quit requested from menu"),
            FlowCommand::Personalize(amount) => {
                let level = self.ctx.personalize(amount);
                info!(level, "Personalization Level: {}", level);
            }
            FlowCommand::ToggleFullscreen => scene.toggle_fullscreen(),
        }
        Ok(())
    }

    fn run_task(
        &mut self,
        task: ScheduledTask,
        scene: &mut dyn SceneEngine,
    ) -> Result<(), TransitionError> {
        let mode = self.flow.mode();
        if (task.is_level_task() && mode != GameMode::Playing)
            || (task.is_menu_task() && mode != GameMode::Menu)
            || (task.is_splash_task() && mode != GameMode::Splash)
        {
            return Ok(());
        }

        match task {
            ScheduledTask::SplashExpired => {
                if let Some(command) = self.flow.on_splash_expired() {
                    self.apply(command, scene)?;
                }
            }
            ScheduledTask::SplashGlitch => {
                if let Some(flicker) = CaptionFlicker::roll(self.ctx.rng()) {
                    scene.style_label(
                        LabelSlot::SplashPresents,
                        LabelStyle { color: flicker.color, scale: flicker.scale },
                    );
                }
                self.scheduler
                    .schedule(SPLASH_GLITCH_PERIOD, ScheduledTask::SplashGlitch);
            }
            ScheduledTask::RoomRebuild => self.rebuild_room(scene)?,
            ScheduledTask::FadeCleanup(handle) => {
                scene.destroy(handle);
                self.fades.retain(|h| *h != handle);
            }
            ScheduledTask::Flicker { room_id, light } => self.flicker(room_id, light, scene),
            ScheduledTask::TitleCycle => {
                scene.set_label(LabelSlot::MenuTitle, Some(self.title.advance().to_string()));
                if self.ctx.rng().chance(0.3) {
                    let prompt = narrative::draw(self.ctx.rng(), &narrative::START_PROMPTS)?;
                    scene.set_label(LabelSlot::MenuPrompt, Some(prompt));
                }
                let delay = self.ctx.rng().range_f32(TITLE_CYCLE_INTERVAL);
                self.scheduler.schedule(delay, ScheduledTask::TitleCycle);
            }
            ScheduledTask::MenuMessage => {
                let message = narrative::draw(self.ctx.rng(), &narrative::MENU_MESSAGES)?;
                scene.set_label(LabelSlot::MenuMessage, Some(message));
                let delay = self.ctx.rng().range_f32(MENU_MESSAGE_INTERVAL);
                self.scheduler.schedule(delay, ScheduledTask::MenuMessage);
            }
            ScheduledTask::HeadGlitch => {
                if let Some(glitch) = HeadGlitch::roll(self.ctx.rng()) {
                    self.glitch_head(glitch, scene);
                    self.scheduler.schedule(
                        glitch.revert_after(),
                        ScheduledTask::HeadGlitchRevert(glitch.part()),
                    );
                }
                let delay = self.ctx.rng().range_f32(HEAD_GLITCH_INTERVAL);
                self.scheduler.schedule(delay, ScheduledTask::HeadGlitch);
            }
            ScheduledTask::HeadGlitchRevert(part) => self.restore_head_part(part, scene),
            ScheduledTask::HeadBlink => {
                let height = blink_height(self.ctx.rng());
                for eye in HeadPart::EYES {
                    if let Some((handle, rest)) = self.head_part(eye) {
                        let squashed = Position::new(rest.scale.x, height, rest.scale.z);
                        ignore_scene_error(scene.set_scale(handle, squashed));
                    }
                }
                self.scheduler
                    .schedule(BLINK_DURATION, ScheduledTask::HeadBlinkRevert);
                let delay = self.ctx.rng().range_f32(HEAD_BLINK_INTERVAL);
                self.scheduler.schedule(delay, ScheduledTask::HeadBlink);
            }
            ScheduledTask::HeadBlinkRevert => {
                for eye in HeadPart::EYES {
                    self.restore_head_part(eye, scene);
                }
            }
            ScheduledTask::PlayerGlitch => {
                let glitch = PlayerGlitch::roll(self.ctx.rng());
                let revert = glitch.revert_after(self.ctx.rng());
                debug!(?glitch, revert, "Player glitch");
                scene.player_effect(PlayerEffect::Glitch(glitch));
                self.scheduler
                    .schedule(revert, ScheduledTask::PlayerGlitchRevert);
                self.schedule_player_glitch();
            }
            ScheduledTask::PlayerGlitchRevert => scene.player_effect(PlayerEffect::Restore),
            ScheduledTask::FovRestore => scene.camera(CameraEffect::Fov(DEFAULT_FOV)),
        }
        Ok(())
    }

    // =====================================================
    // Screens
    // =====================================================

    fn teardown_splash(&mut self, scene: &mut dyn SceneEngine) {
        for handle in self.splash.drain(..) {
            scene.destroy(handle);
        }
        scene.set_label(LabelSlot::SplashPresents, None);
        scene.set_label(LabelSlot::SplashTitle, None);
        self.scheduler.cancel_where(ScheduledTask::is_splash_task);
    }

    fn enter_menu(&mut self, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        scene.set_fog_density(MENU_FOG_DENSITY);

        let head = MenuHead::roll(self.ctx.rng());
        if !head.is_pristine() {
            debug!(?head, "Menu head corrupted");
        }
        for part in visuals::menu_head_visuals(&head) {
            self.head_parts.push(scene.spawn(part));
        }
        self.menu_head = Some(head);
        for shape in visuals::menu_backdrop(self.ctx.rng()) {
            self.menu.push(scene.spawn(shape));
        }

        self.title = TitleCycle::default();
        scene.set_label(LabelSlot::MenuTitle, Some(self.title.current().to_string()));
        scene.set_label(
            LabelSlot::MenuPrompt,
            Some(narrative::START_PROMPTS[0].to_string()),
        );
        let message = narrative::draw(self.ctx.rng(), &narrative::MENU_MESSAGES)?;
        scene.set_label(LabelSlot::MenuMessage, Some(message));

        self.scheduler
            .schedule(MENU_FIRST_CYCLE_DELAY, ScheduledTask::TitleCycle);
        self.scheduler
            .schedule(MENU_FIRST_CYCLE_DELAY, ScheduledTask::MenuMessage);
        let glitch_delay = self.ctx.rng().range_f32(HEAD_GLITCH_INTERVAL);
        self.scheduler.schedule(glitch_delay, ScheduledTask::HeadGlitch);
        let blink_delay = self.ctx.rng().range_f32(HEAD_BLINK_INTERVAL);
        self.scheduler.schedule(blink_delay, ScheduledTask::HeadBlink);
        Ok(())
    }

    /// Handle of a title head part with its resting look
    fn head_part(&self, part: HeadPart) -> Option<(SceneHandle, VisualDescriptor)> {
        let head = self.menu_head.as_ref()?;
        let handle = *self.head_parts.get(part.index())?;
        let rest = visuals::menu_head_visuals(head).into_iter().nth(part.index())?;
        Some((handle, rest))
    }

    fn glitch_head(&self, glitch: HeadGlitch, scene: &mut dyn SceneEngine) {
        let Some((handle, rest)) = self.head_part(glitch.part()) else {
            return;
        };
        debug!(?glitch, "Head glitch");
        let result = match glitch {
            HeadGlitch::Recolor { color, .. } => scene.set_color(handle, color),
            HeadGlitch::Stretch { width } => {
                scene.set_scale(handle, Position::new(width, rest.scale.y, rest.scale.z))
            }
            HeadGlitch::Toggle { .. } => scene.set_visible(handle, !rest.visible),
        };
        ignore_scene_error(result);
    }

    /// Put a head part back the way it was rolled
    fn restore_head_part(&self, part: HeadPart, scene: &mut dyn SceneEngine) {
        if let Some((handle, rest)) = self.head_part(part) {
            ignore_scene_error(scene.set_color(handle, rest.color));
            ignore_scene_error(scene.set_scale(handle, rest.scale));
            ignore_scene_error(scene.set_visible(handle, rest.visible));
        }
    }

    fn teardown_menu(&mut self, scene: &mut dyn SceneEngine) {
        for handle in self.menu.drain(..).chain(self.head_parts.drain(..)) {
            scene.destroy(handle);
        }
        self.menu_head = None;
        for slot in [LabelSlot::MenuTitle, LabelSlot::MenuPrompt, LabelSlot::MenuMessage] {
            scene.set_label(slot, None);
        }
        self.scheduler.cancel_where(ScheduledTask::is_menu_task);
    }

    fn start_level(&mut self, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        self.ctx.reset_level_counters();
        let swap = self.coordinator.open_level(&mut self.ctx)?;
        self.install_room(&swap, scene);

        scene.set_fog_density(BASE_FOG_DENSITY);
        scene.camera(CameraEffect::Fov(DEFAULT_FOV));
        ignore_scene_error(scene.play_sound(SoundClip::Ambience));
        self.schedule_player_glitch();
        self.update_hud(scene);
        Ok(())
    }

    fn teardown_level(&mut self, scene: &mut dyn SceneEngine) {
        self.coordinator.close();
        self.teardown_room(scene);
        for handle in self.fades.drain(..) {
            scene.destroy(handle);
        }
        self.scheduler.cancel_where(ScheduledTask::is_level_task);
        for slot in [LabelSlot::Coins, LabelSlot::Stars, LabelSlot::Personalization] {
            scene.set_label(slot, None);
        }
        scene.player_effect(PlayerEffect::Restore);
    }

    fn schedule_player_glitch(&mut self) {
        let delay = self.ctx.rng().range_f32(PLAYER_GLITCH_INTERVAL);
        self.scheduler.schedule(delay, ScheduledTask::PlayerGlitch);
    }

    fn update_hud(&self, scene: &mut dyn SceneEngine) {
        let progress = self.ctx.progress();
        scene.set_label(LabelSlot::Coins, Some(format!("Coins: {}", progress.coins)));
        scene.set_label(LabelSlot::Stars, Some(format!("Stars: {}", progress.stars)));
        scene.set_label(
            LabelSlot::Personalization,
            Some(format!("P.LVL: {}", progress.personalization_level)),
        );
    }

    // =====================================================
    // Rooms
    // =====================================================

    fn rebuild_room(&mut self, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        let swap = self.coordinator.complete(&mut self.ctx);
        if let Ok(swap) = &swap {
            self.install_room(swap, scene);
            if let Some(line) = &swap.narrative {
                scene.show_text(TextOverlay::new(line.clone(), (0.0, 0.3), 3.0, 3.0));
            }
        }

        // Fade back in either way; a failed swap leaves the old room in place
        if let Some(&fade) = self.fades.last() {
            ignore_scene_error(scene.fade(fade, 0.0, self.coordinator.fade_duration()));
            self.scheduler
                .schedule(FADE_CLEANUP_DELAY, ScheduledTask::FadeCleanup(fade));
        }
        swap.map(|_| ())
    }

    /// Replace whatever is materialized with the coordinator's active room
    fn install_room(&mut self, swap: &RoomSwap, scene: &mut dyn SceneEngine) {
        self.teardown_room(scene);
        let Some(room) = self.coordinator.active().cloned() else {
            return;
        };
        self.room = Some(self.materialize(&room, scene));
        scene.place_player(swap.spawn_point);
    }

    fn materialize(&mut self, room: &ActiveRoom, scene: &mut dyn SceneEngine) -> RoomEntities {
        let mut entities = RoomEntities {
            room_id: room.id,
            ..Default::default()
        };
        let descriptor = &room.descriptor;

        for visual in visuals::room_shell(descriptor) {
            entities.statics.push(scene.spawn(visual));
        }

        for feature in &descriptor.features {
            let handle = scene.spawn(visuals::feature_visual(feature));
            match feature {
                FeatureSpec::FlickerLight { flickers: true, .. } => {
                    entities.lights.insert(handle, true);
                    let delay = self.ctx.rng().range_f32(FLICKER_INTERVAL);
                    self.scheduler.schedule(
                        delay,
                        ScheduledTask::Flicker {
                            room_id: room.id,
                            light: handle,
                        },
                    );
                }
                _ => entities.statics.push(handle),
            }
        }

        for direction in descriptor.doors.open() {
            let handle = scene.spawn(visuals::door_visual(direction));
            entities.doors.insert(handle, direction);
        }

        let encounter = &room.encounter;
        for enemy in &encounter.enemies {
            let handle = scene.spawn(visuals::enemy_visual(enemy));
            entities.enemies.insert(handle, enemy.clone());
        }
        for coin in &encounter.coins {
            let handle = scene.spawn(visuals::coin_visual(coin));
            entities.coins.insert(handle, coin.clone());
        }
        if let Some(star) = &encounter.objective {
            let handle = scene.spawn(visuals::objective_visual(star));
            entities.objective = Some((handle, star.clone()));
        }

        debug!(
            room_id = room.id,
            room = descriptor.room_type.as_str(),
            entities = entities.handles().count(),
            "Room materialized"
        );
        entities
    }

    fn teardown_room(&mut self, scene: &mut dyn SceneEngine) {
        let Some(room) = self.room.take() else {
            return;
        };
        for handle in room.handles() {
            scene.destroy(handle);
        }
        let room_id = room.room_id;
        let cancelled = self.scheduler.cancel_where(
            |task| matches!(task, ScheduledTask::Flicker { room_id: id, .. } if *id == room_id),
        );
        debug!(room_id, cancelled, "Room torn down");
    }

    fn flicker(&mut self, room_id: u64, light: SceneHandle, scene: &mut dyn SceneEngine) {
        let Some(room) = self.room.as_mut().filter(|r| r.room_id == room_id) else {
            return;
        };
        let Some(lit) = room.lights.get_mut(&light) else {
            return;
        };
        *lit = !*lit;
        ignore_scene_error(scene.set_visible(light, *lit));

        let delay = self.ctx.rng().range_f32(FLICKER_INTERVAL);
        self.scheduler
            .schedule(delay, ScheduledTask::Flicker { room_id, light });
    }

    // =====================================================
    // In-room events
    // =====================================================

    fn resolve_contact(
        &mut self,
        entity: SceneHandle,
        from_above: bool,
        scene: &mut dyn SceneEngine,
    ) -> Result<(), TransitionError> {
        let Some(room) = self.room.as_mut() else {
            return Ok(());
        };

        if let Some(&direction) = room.doors.get(&entity) {
            self.transition(direction, scene);
        } else if let Some(coin) = room.coins.remove(&entity) {
            scene.destroy(entity);
            self.pick_up_coin(&coin, scene);
        } else if let Some(enemy) = room.enemies.get(&entity).cloned() {
            // Landing on a chain chomp does nothing
            if !from_above {
                self.take_damage(scene)?;
            } else if enemy.kind.is_stompable() {
                room.enemies.remove(&entity);
                scene.destroy(entity);
                self.stomp(&enemy, scene)?;
            }
        }
        Ok(())
    }

    fn pick_up_coin(&mut self, coin: &CoinSpec, scene: &mut dyn SceneEngine) {
        ignore_scene_error(scene.play_sound(SoundClip::Coin));
        let pickup = gameplay::collect_coin(&mut self.ctx, coin);
        if let Some(message) = pickup.message {
            scene.show_text(TextOverlay::new(message, (0.0, 0.2), 2.0, 1.0));
        }
        if !pickup.duplicates.is_empty() {
            debug!(count = pickup.duplicates.len(), "Coin duplicated");
        }
        if let Some(room) = self.room.as_mut() {
            for duplicate in pickup.duplicates {
                let handle = scene.spawn(visuals::coin_visual(&duplicate));
                room.coins.insert(handle, duplicate);
            }
        }
    }

    fn stomp(&mut self, enemy: &EnemySpec, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        ignore_scene_error(scene.play_sound(SoundClip::Stomp));
        if let Some(replacement) = gameplay::stomp(&mut self.ctx, enemy)? {
            debug!(kind = ?replacement.kind, "Stomped enemy called for backup");
            if let Some(room) = self.room.as_mut() {
                let handle = scene.spawn(visuals::enemy_visual(&replacement));
                room.enemies.insert(handle, replacement);
            }
        }
        Ok(())
    }

    fn take_damage(&mut self, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        let outcome = gameplay::take_damage(&mut self.ctx)?;
        scene.place_player(outcome.respawn);
        let (duration, magnitude) = outcome.shake;
        scene.camera(CameraEffect::Shake {
            duration,
            magnitude,
        });
        scene.show_text(TextOverlay::new(
            outcome.message,
            outcome.message_offset,
            4.0,
            1.0,
        ));
        Ok(())
    }

    fn check_star(&mut self, scene: &mut dyn SceneEngine) -> Result<(), TransitionError> {
        let player = scene.player_position();
        let Some(room) = self.room.as_mut() else {
            return Ok(());
        };
        let in_reach = room.objective.as_ref().is_some_and(|(_, star)| {
            star.visible && player.distance(star.position) < STAR_PICKUP_RADIUS
        });
        if !in_reach {
            return Ok(());
        }
        let Some((handle, star)) = room.objective.take() else {
            return Ok(());
        };

        scene.destroy(handle);
        ignore_scene_error(scene.play_sound(SoundClip::Star));
        let pickup = gameplay::collect_star(&mut self.ctx, &star)?;
        scene.show_text(TextOverlay::new(pickup.message, (0.0, 0.0), 5.0, 3.0).color(Rgb::YELLOW));
        if let Some(warp) = pickup.warp {
            scene.place_player(warp);
            scene.show_text(TextOverlay::new(narrative::WARP_MESSAGE, (0.0, -0.2), 3.0, 2.0));
        }
        Ok(())
    }

    fn check_void(&mut self, scene: &mut dyn SceneEngine) {
        if !gameplay::fell_into_void(scene.player_position()) {
            return;
        }
        let outcome = gameplay::void_death(&mut self.ctx);
        info!(level = outcome.personalization_level, "Player fell into the void");
        scene.place_player(outcome.respawn);
        scene.show_text(TextOverlay::new(outcome.message, (0.0, 0.0), 3.0, 2.0));
    }

    fn escalate_atmosphere(&mut self, scene: &mut dyn SceneEngine) {
        let level = self.ctx.personalization_level();
        if let Some(density) = gameplay::fog_density(level) {
            scene.set_fog_density(density);
        }
        if let Some(fov) = gameplay::roll_fov_glitch(self.ctx.rng(), level) {
            scene.camera(CameraEffect::Fov(fov));
            self.scheduler
                .schedule(FOV_RESTORE_DELAY, ScheduledTask::FovRestore);
        }
    }
}

// =====================================================
// Tests
// =====================================================
