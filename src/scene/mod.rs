//! Scene Engine collaborator.
//!
//! The core never draws, collides or mixes audio itself. It talks to whatever
//! hosts it through [`SceneEngine`]: spawn and destroy visuals, read player
//! contacts, play sounds, show text, nudge the camera. [`HeadlessScene`] is an
//! in-memory implementation that records every call, used by the headless
//! binary and by tests.

pub mod visuals;

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gameplay::PlayerGlitch;
use crate::geometry::{Position, Rgb};

pub use visuals::{Model, VisualDescriptor, VisualRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SceneHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundClip {
    Coin,
    Stomp,
    Star,
    Jump,
    Ambience,
}

impl SoundClip {
    pub const ALL: [SoundClip; 5] = [
        SoundClip::Coin,
        SoundClip::Stomp,
        SoundClip::Star,
        SoundClip::Jump,
        SoundClip::Ambience,
    ];
}

/// Failures the engine logs and moves past
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("sound clip {0:?} is not loaded")]
    MissingClip(SoundClip),
    #[error("no entity with handle {0:?}")]
    UnknownHandle(SceneHandle),
}

/// Transient on-screen message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextOverlay {
    pub text: String,
    /// Screen-space position, (0, 0) is the centre
    pub position: (f32, f32),
    pub scale: f32,
    pub duration: f32,
    pub color: Rgb,
}

impl TextOverlay {
    pub fn new(text: impl Into<String>, position: (f32, f32), scale: f32, duration: f32) -> Self {
        Self {
            text: text.into(),
            position,
            scale,
            duration,
            color: Rgb::RED,
        }
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

/// Persistent text slots (HUD, splash and menu captions)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LabelSlot {
    SplashPresents,
    SplashTitle,
    MenuTitle,
    MenuPrompt,
    MenuMessage,
    Coins,
    Stars,
    Personalization,
}

/// How a label is drawn
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelStyle {
    pub color: Rgb,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraEffect {
    Shake { duration: f32, magnitude: f32 },
    Fov(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlayerEffect {
    Glitch(PlayerGlitch),
    Restore,
}

/// Something the player is touching this frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub entity: SceneHandle,
    /// Falling onto it from above (a stomp if the entity is an enemy)
    pub from_above: bool,
}

pub trait SceneEngine {
    fn spawn(&mut self, visual: VisualDescriptor) -> SceneHandle;

    /// Unknown handles are ignored
    fn destroy(&mut self, handle: SceneHandle);

    fn set_visible(&mut self, handle: SceneHandle, visible: bool) -> Result<(), SceneError>;

    fn set_color(&mut self, handle: SceneHandle, color: Rgb) -> Result<(), SceneError>;

    fn set_scale(&mut self, handle: SceneHandle, scale: Position) -> Result<(), SceneError>;

    /// Animate the alpha of an entity towards `alpha` over `duration` seconds
    fn fade(&mut self, handle: SceneHandle, alpha: f32, duration: f32) -> Result<(), SceneError>;

    /// Entities touched by the player since the last call
    fn contacts(&mut self) -> Vec<Contact>;

    fn player_position(&self) -> Position;

    fn place_player(&mut self, position: Position);

    fn play_sound(&mut self, clip: SoundClip) -> Result<(), SceneError>;

    fn show_text(&mut self, overlay: TextOverlay);

    /// Clearing a label with `set_label(slot, None)` drops its style too
    fn set_label(&mut self, slot: LabelSlot, text: Option<String>);

    fn style_label(&mut self, slot: LabelSlot, style: LabelStyle);

    fn camera(&mut self, effect: CameraEffect);

    fn player_effect(&mut self, effect: PlayerEffect);

    fn set_fog_density(&mut self, density: f32);

    fn toggle_fullscreen(&mut self);
}

#[derive(Debug, Clone)]
pub struct HeadlessEntity {
    pub visual: VisualDescriptor,
    pub visible: bool,
    pub alpha: f32,
}

/// Entries kept per call log before the oldest are dropped
pub const DEFAULT_HISTORY: usize = 256;

fn record<T>(log: &mut VecDeque<T>, cap: usize, entry: T) {
    if cap == 0 {
        return;
    }
    while log.len() >= cap {
        log.pop_front();
    }
    log.push_back(entry);
}

/// Recording scene with no renderer behind it.
///
/// Sounds, overlays and effects are kept as bounded logs of the most recent
/// calls, so a long unattended run does not grow without limit.
#[derive(Debug, Clone)]
pub struct HeadlessScene {
    next_handle: u64,
    entities: BTreeMap<SceneHandle, HeadlessEntity>,
    pending_contacts: Vec<Contact>,
    player: Position,
    loaded_clips: HashSet<SoundClip>,
    history: usize,
    pub sounds: VecDeque<SoundClip>,
    pub overlays: VecDeque<TextOverlay>,
    pub labels: HashMap<LabelSlot, String>,
    pub label_styles: HashMap<LabelSlot, LabelStyle>,
    pub camera_effects: VecDeque<CameraEffect>,
    pub player_effects: VecDeque<PlayerEffect>,
    pub fog_density: f32,
    pub fullscreen: bool,
}

impl Default for HeadlessScene {
    fn default() -> Self {
        Self {
            next_handle: 1,
            entities: BTreeMap::new(),
            pending_contacts: Vec::new(),
            player: Position::ORIGIN,
            loaded_clips: SoundClip::ALL.into_iter().collect(),
            history: DEFAULT_HISTORY,
            sounds: VecDeque::new(),
            overlays: VecDeque::new(),
            labels: HashMap::new(),
            label_styles: HashMap::new(),
            camera_effects: VecDeque::new(),
            player_effects: VecDeque::new(),
            fog_density: 0.0,
            fullscreen: false,
        }
    }
}

impl HeadlessScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene where `clip` failed to load
    pub fn without_clip(mut self, clip: SoundClip) -> Self {
        self.loaded_clips.remove(&clip);
        self
    }

    /// Keep at most `entries` of each call log
    pub fn with_history(mut self, entries: usize) -> Self {
        self.history = entries;
        self
    }

    pub fn entity(&self, handle: SceneHandle) -> Option<&HeadlessEntity> {
        self.entities.get(&handle)
    }

    pub fn live_count(&self) -> usize {
        self.entities.len()
    }

    /// Handles of live entities matching `pred`, in spawn order
    pub fn find(&self, mut pred: impl FnMut(&VisualDescriptor) -> bool) -> Vec<SceneHandle> {
        self.entities
            .iter()
            .filter(|(_, e)| pred(&e.visual))
            .map(|(h, _)| *h)
            .collect()
    }

    pub fn count_role(&self, role: VisualRole) -> usize {
        self.find(|v| v.role == role).len()
    }

    /// Simulate the player touching an entity
    pub fn touch(&mut self, entity: SceneHandle, from_above: bool) {
        self.pending_contacts.push(Contact { entity, from_above });
    }

    /// Simulate player movement from the host's physics
    pub fn move_player(&mut self, position: Position) {
        self.player = position;
    }

    pub fn label(&self, slot: LabelSlot) -> Option<&str> {
        self.labels.get(&slot).map(String::as_str)
    }

    pub fn label_style(&self, slot: LabelSlot) -> Option<LabelStyle> {
        self.label_styles.get(&slot).copied()
    }

    fn entity_mut(&mut self, handle: SceneHandle) -> Result<&mut HeadlessEntity, SceneError> {
        self.entities
            .get_mut(&handle)
            .ok_or(SceneError::UnknownHandle(handle))
    }
}

impl SceneEngine for HeadlessScene {
    fn spawn(&mut self, visual: VisualDescriptor) -> SceneHandle {
        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        let visible = visual.visible;
        self.entities.insert(
            handle,
            HeadlessEntity {
                visual,
                visible,
                alpha: 1.0,
            },
        );
        handle
    }

    fn destroy(&mut self, handle: SceneHandle) {
        self.entities.remove(&handle);
    }

    fn set_visible(&mut self, handle: SceneHandle, visible: bool) -> Result<(), SceneError> {
        self.entity_mut(handle)?.visible = visible;
        Ok(())
    }

    fn set_color(&mut self, handle: SceneHandle, color: Rgb) -> Result<(), SceneError> {
        self.entity_mut(handle)?.visual.color = color;
        Ok(())
    }

    fn set_scale(&mut self, handle: SceneHandle, scale: Position) -> Result<(), SceneError> {
        self.entity_mut(handle)?.visual.scale = scale;
        Ok(())
    }

    fn fade(&mut self, handle: SceneHandle, alpha: f32, _duration: f32) -> Result<(), SceneError> {
        self.entity_mut(handle)?.alpha = alpha;
        Ok(())
    }

    fn contacts(&mut self) -> Vec<Contact> {
        std::mem::take(&mut self.pending_contacts)
    }

    fn player_position(&self) -> Position {
        self.player
    }

    fn place_player(&mut self, position: Position) {
        self.player = position;
    }

    fn play_sound(&mut self, clip: SoundClip) -> Result<(), SceneError> {
        if !self.loaded_clips.contains(&clip) {
            return Err(SceneError::MissingClip(clip));
        }
        record(&mut self.sounds, self.history, clip);
        Ok(())
    }

    fn show_text(&mut self, overlay: TextOverlay) {
        record(&mut self.overlays, self.history, overlay);
    }

    fn set_label(&mut self, slot: LabelSlot, text: Option<String>) {
        match text {
            Some(text) => {
                self.labels.insert(slot, text);
            }
            None => {
                self.labels.remove(&slot);
                self.label_styles.remove(&slot);
            }
        }
    }

    fn style_label(&mut self, slot: LabelSlot, style: LabelStyle) {
        self.label_styles.insert(slot, style);
    }

    fn camera(&mut self, effect: CameraEffect) {
        record(&mut self.camera_effects, self.history, effect);
    }

    fn player_effect(&mut self, effect: PlayerEffect) {
        record(&mut self.player_effects, self.history, effect);
    }

    fn set_fog_density(&mut self, density: f32) {
        self.fog_density = density;
    }

    fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_destroy() {
        let mut scene = HeadlessScene::new();
        let a = scene.spawn(VisualDescriptor::new(VisualRole::Coin, Model::Cylinder, Position::ORIGIN));
        let b = scene.spawn(VisualDescriptor::new(VisualRole::Wall, Model::Cube, Position::ORIGIN));
        assert_ne!(a, b);
        assert_eq!(scene.live_count(), 2);
        scene.destroy(a);
        scene.destroy(a);
        assert_eq!(scene.live_count(), 1);
        assert_eq!(scene.count_role(VisualRole::Wall), 1);
    }

    #[test]
    fn test_missing_clip() {
        let mut scene = HeadlessScene::new().without_clip(SoundClip::Jump);
        assert!(scene.play_sound(SoundClip::Coin).is_ok());
        assert_eq!(
            scene.play_sound(SoundClip::Jump),
            Err(SceneError::MissingClip(SoundClip::Jump))
        );
        assert_eq!(scene.sounds, vec![SoundClip::Coin]);
    }

    #[test]
    fn test_call_logs_are_bounded() {
        let mut scene = HeadlessScene::new().with_history(3);
        for i in 0..10 {
            scene.play_sound(SoundClip::Coin).unwrap();
            scene.show_text(TextOverlay::new(format!("{i}"), (0.0, 0.0), 1.0, 1.0));
            scene.camera(CameraEffect::Fov(i as f32));
            scene.player_effect(PlayerEffect::Restore);
        }
        assert_eq!(scene.sounds.len(), 3);
        assert_eq!(scene.player_effects.len(), 3);
        let texts: Vec<&str> = scene.overlays.iter().map(|o| o.text.as_str()).collect();
        assert_eq!(texts, ["7", "8", "9"]);
        assert_eq!(scene.camera_effects.front(), Some(&CameraEffect::Fov(7.0)));
    }

    #[test]
    fn test_default_history_cap() {
        let mut scene = HeadlessScene::new();
        for _ in 0..DEFAULT_HISTORY * 4 {
            scene.play_sound(SoundClip::Jump).unwrap();
        }
        assert_eq!(scene.sounds.len(), DEFAULT_HISTORY);
    }

    #[test]
    fn test_contacts_drain() {
        let mut scene = HeadlessScene::new();
        scene.touch(SceneHandle(4), false);
        assert_eq!(scene.contacts().len(), 1);
        assert!(scene.contacts().is_empty());
    }

    #[test]
    fn test_set_visible_unknown_handle() {
        let mut scene = HeadlessScene::new();
        assert_eq!(
            scene.set_visible(SceneHandle(99), false),
            Err(SceneError::UnknownHandle(SceneHandle(99)))
        );
    }

    #[test]
    fn test_labels() {
        let mut scene = HeadlessScene::new();
        scene.set_label(LabelSlot::Coins, Some("Coins: 3".into()));
        assert_eq!(scene.label(LabelSlot::Coins), Some("Coins: 3"));
        scene.style_label(LabelSlot::Coins, LabelStyle { color: Rgb::RED, scale: 2.0 });
        assert_eq!(scene.label_style(LabelSlot::Coins).map(|s| s.scale), Some(2.0));
        scene.set_label(LabelSlot::Coins, None);
        assert_eq!(scene.label(LabelSlot::Coins), None);
        assert!(scene.label_style(LabelSlot::Coins).is_none());
    }

    #[test]
    fn test_restyle_entity() {
        let mut scene = HeadlessScene::new();
        let h = scene.spawn(VisualDescriptor::new(VisualRole::MenuHead, Model::Sphere, Position::ORIGIN));
        scene.set_color(h, Rgb::BLACK).unwrap();
        scene.set_scale(h, Position::new(3.2, 3.0, 3.0)).unwrap();
        let visual = &scene.entity(h).unwrap().visual;
        assert_eq!(visual.color, Rgb::BLACK);
        assert_eq!(visual.scale, Position::new(3.2, 3.0, 3.0));
        scene.destroy(h);
        assert_eq!(scene.set_color(h, Rgb::RED), Err(SceneError::UnknownHandle(h)));
    }
}
