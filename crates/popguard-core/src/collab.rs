//! External collaborators.
//!
//! The core never renders, plays sounds or builds UI. It reports what
//! happened through these traits, injected once at construction via
//! [`Collaborators`]. Every trait method has a no-op default, so a host only
//! implements what it cares about.

use std::fmt;

use glam::Vec2;

use crate::entity::EntityRef;
use crate::event::GameEvent;
use crate::resolver::{CircleContacts, ContactDetector, EulerIntegrator, Integrator};
use crate::upgrade::DraftChoice;

/// Sound triggers.
pub trait AudioSink {
    /// A defender popped into the field.
    fn play_pop(&mut self) {}
    /// Something was destroyed.
    fn play_destroyed(&mut self) {}
}

/// Scene graph mirror of the arena.
pub trait SceneSink {
    /// An entity appeared. `tag` is the archetype or tier name.
    fn spawned(&mut self, _entity: EntityRef, _tag: &str, _position: Vec2) {}
    /// An entity was removed.
    fn despawned(&mut self, _entity: EntityRef) {}
    /// Every entity was removed at once.
    fn cleared(&mut self) {}
}

/// The upgrade draft panel.
pub trait DraftUi {
    /// Show the draft choices.
    fn present(&mut self, _choices: &[DraftChoice]) {}
    /// Hide the draft panel.
    fn dismiss(&mut self) {}
}

/// Collaborator that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct Null;

impl AudioSink for Null {}
impl SceneSink for Null {}
impl DraftUi for Null {}

/// The set of collaborators a [`Game`](crate::game::Game) talks to.
pub struct Collaborators {
    /// Sound triggers.
    pub audio: Box<dyn AudioSink>,
    /// Scene mirror.
    pub scene: Box<dyn SceneSink>,
    /// Draft panel.
    pub draft_ui: Box<dyn DraftUi>,
    /// Force integration.
    pub integrator: Box<dyn Integrator>,
    /// Projectile contacts.
    pub contacts: Box<dyn ContactDetector>,
}

impl Collaborators {
    /// Replaces the audio sink.
    #[must_use]
    pub fn with_audio(mut self, audio: impl AudioSink + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    /// Replaces the scene sink.
    #[must_use]
    pub fn with_scene(mut self, scene: impl SceneSink + 'static) -> Self {
        self.scene = Box::new(scene);
        self
    }

    /// Replaces the draft UI.
    #[must_use]
    pub fn with_draft_ui(mut self, draft_ui: impl DraftUi + 'static) -> Self {
        self.draft_ui = Box::new(draft_ui);
        self
    }

    /// Replaces the integrator.
    #[must_use]
    pub fn with_integrator(mut self, integrator: impl Integrator + 'static) -> Self {
        self.integrator = Box::new(integrator);
        self
    }

    /// Replaces the contact detector.
    #[must_use]
    pub fn with_contacts(mut self, contacts: impl ContactDetector + 'static) -> Self {
        self.contacts = Box::new(contacts);
        self
    }

    /// Forwards a tick's events to the audio, scene and draft collaborators.
    pub fn dispatch(&mut self, events: &[GameEvent]) {
        for event in events {
            match event {
                GameEvent::DefenderSpawned {
                    id,
                    archetype,
                    position,
                } => {
                    self.audio.play_pop();
                    self.scene
                        .spawned(EntityRef::Defender(*id), archetype.name(), *position);
                }
                GameEvent::EnemySpawned { id, tier, position } => {
                    let tag = format!("Enemy{}", tier.index());
                    self.scene.spawned(EntityRef::Enemy(*id), &tag, *position);
                }
                GameEvent::ProjectileFired {
                    id, tag, position, ..
                } => {
                    self.scene
                        .spawned(EntityRef::Projectile(*id), tag.name(), *position);
                }
                GameEvent::Destroyed { entity, .. } => {
                    self.audio.play_destroyed();
                    self.scene.despawned(*entity);
                }
                GameEvent::SceneCleared => self.scene.cleared(),
                GameEvent::DraftOffered { choices } => self.draft_ui.present(choices),
                GameEvent::DraftResolved { .. } => self.draft_ui.dismiss(),
                GameEvent::PhaseChanged { .. } | GameEvent::LevelCompleted { .. } => {}
            }
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self {
            audio: Box::new(Null),
            scene: Box::new(Null),
            draft_ui: Box::new(Null),
            integrator: Box::new(EulerIntegrator::default()),
            contacts: Box::new(CircleContacts::default()),
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
