//! Spoken and typed controller transmissions.
//!
//! Raw recognizer output flows through [`normalize`] into [`interpret`],
//! which resolves the addressed aircraft and matches the transmission
//! against the [`keywords`] template of its open request.
//! Aircraft transmissions flow the other way through a [`Synthesizer`].

use bevy::app::{self, App, Plugin};
use bevy::ecs::change_detection::{Res, ResMut};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::Command;
use bevy::ecs::world::World;

use crate::sim::aircraft::Voice;
use crate::sim::radio::{Class, Log};
use crate::sim::reference::Reference;

pub mod interpret;
pub mod keywords;
pub mod normalize;
pub mod ptt;
pub mod similarity;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_plugins(ptt::Plug);
        app.add_systems(app::Update, speak_system);
    }
}

/// Text-to-speech output of the platform.
pub trait Synthesizer: Send + Sync + 'static {
    /// Speaks `text` with the given voice, without blocking.
    fn speak(&mut self, text: &str, voice: Voice);

    /// Plays the audible error cue.
    fn error_cue(&mut self);
}

/// Forwards new transcript entries to the installed synthesizer.
#[derive(Resource)]
pub struct Speaker {
    synthesizer: Box<dyn Synthesizer>,
    forwarded:   usize,
}

impl Speaker {
    pub fn new(synthesizer: impl Synthesizer) -> Self {
        Self { synthesizer: Box::new(synthesizer), forwarded: 0 }
    }
}

fn speak_system(log: Res<Log>, switch: Res<ptt::VoiceSwitch>, speaker: Option<ResMut<Speaker>>) {
    let Some(mut speaker) = speaker else { return };
    let entries = log.entries();
    if speaker.forwarded > entries.len() {
        // the log was replaced by a new session
        speaker.forwarded = 0;
    }

    let start = speaker.forwarded;
    for entry in &entries[start..] {
        if entry.error_cue {
            speaker.synthesizer.error_cue();
        }
        if entry.class == Class::Radio
            && switch.receive
            && let (Some(phonetic), Some(voice)) = (&entry.phonetic, entry.voice)
        {
            speaker.synthesizer.speak(phonetic, voice);
        }
    }
    speaker.forwarded = entries.len();
}

/// Normalizes a raw transcript and interprets it unless the controller disregarded it.
pub fn transcribe(world: &mut World, raw: &str) {
    let Some(reference) = world.get_resource::<Reference>() else {
        bevy::log::warn!("Ignoring transmission before reference data is loaded");
        return;
    };

    let transcript = normalize::normalize(raw, &reference.tables);
    if transcript.is_empty() {
        return;
    }
    if normalize::is_disregarded(&transcript) {
        bevy::log::debug!("Transmission disregarded: {transcript}");
        return;
    }
    interpret::interpret(world, &transcript);
}

/// Interprets a typed or recognized transmission.
pub struct Transcribe(pub String);

impl Command for Transcribe {
    fn apply(self, world: &mut World) { transcribe(world, &self.0); }
}
