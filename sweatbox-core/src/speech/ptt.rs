//! Push-to-talk, the voice switch and the recognition session.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::app::{self, App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::Command;
use bevy::ecs::world::World;
use bevy::time::{Real, Time};
use itertools::Itertools;

use crate::config::Config;
use crate::sim::clock::Clock;
use crate::sim::radio::{Frequency, Log};


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        let config = app.world().get_resource::<Config>().cloned().unwrap_or_default();
        app.insert_resource(PushToTalk::new(config.push_to_talk_key.clone(), config.release_grace()));
        app.insert_resource(VoiceSwitch { transmit: config.voice_transmit, receive: config.voice_receive });
        app.add_systems(app::Update, poll_system);
    }
}

/// Speech-to-text input of the platform.
pub trait Recognizer: Send + Sync + 'static {
    /// Starts a session delivering its events to `sink`.
    fn start(&mut self, sink: Sink);

    /// Stops the current session.
    /// The recognizer should deliver [`Recognition::End`] once it has stopped.
    fn stop(&mut self);
}

/// An event of a recognition session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recognition {
    /// A recognized chunk of speech.
    Result(String),
    /// The session failed.
    Error(String),
    /// The session ended.
    End,
}

/// Where a recognizer delivers its events, from any thread.
#[derive(Debug, Clone, Default)]
pub struct Sink(Arc<Mutex<VecDeque<Recognition>>>);

impl Sink {
    pub fn send(&self, event: Recognition) {
        match self.0.lock() {
            Ok(mut queue) => queue.push_back(event),
            Err(_) => bevy::log::error!("Recognition queue is poisoned, dropping {event:?}"),
        }
    }

    fn drain(&self) -> Vec<Recognition> {
        self.0.lock().map(|mut queue| queue.drain(..).collect()).unwrap_or_default()
    }
}

/// The installed recognizer.
#[derive(Resource)]
pub struct Microphone {
    recognizer: Box<dyn Recognizer>,
    sink:       Sink,
}

impl Microphone {
    pub fn new(recognizer: impl Recognizer) -> Self {
        Self { recognizer: Box::new(recognizer), sink: Sink::default() }
    }
}

/// Transmit and receive switches of the voice position.
#[derive(Debug, Clone, Copy, Resource)]
pub struct VoiceSwitch {
    /// Whether pressing the push-to-talk key starts recognition.
    pub transmit: bool,
    /// Whether aircraft transmissions are spoken.
    pub receive:  bool,
}

/// State of the push-to-talk key and the recognition session it controls.
#[derive(Debug, Resource)]
pub struct PushToTalk {
    /// Key code that keys the microphone.
    pub key:   String,
    grace:     Duration,
    active:    bool,
    listening: bool,
    /// Real time at which the session should be stopped.
    stop_at:   Option<Duration>,
    chunks:    Vec<String>,
}

impl PushToTalk {
    #[must_use]
    pub fn new(key: String, grace: Duration) -> Self {
        Self { key, grace, active: false, listening: false, stop_at: None, chunks: Vec::new() }
    }

    /// Whether the key is held down.
    #[must_use]
    pub fn is_active(&self) -> bool { self.active }

    /// Whether a recognition session is running.
    #[must_use]
    pub fn is_listening(&self) -> bool { self.listening }
}

fn real_time(world: &World) -> Duration {
    world.get_resource::<Time<Real>>().map_or(Duration::ZERO, Time::elapsed)
}

/// The controller pressed a key.
pub struct KeyDown(pub String);

impl Command for KeyDown {
    fn apply(self, world: &mut World) {
        let paused = world.resource::<Clock>().paused;
        let ptt = world.resource::<PushToTalk>();
        if paused || ptt.active || ptt.key != self.0 {
            return;
        }

        if world.resource::<VoiceSwitch>().transmit {
            start_listening(world);
        } else {
            let now = world.resource::<Clock>().now;
            world.resource_mut::<Log>().system(now, "TX is disabled in your voice switch", true);
        }

        world.resource_mut::<PushToTalk>().active = true;
        world.resource_mut::<Frequency>().transmitting = true;
    }
}

fn start_listening(world: &mut World) {
    let Some(mut microphone) = world.get_resource_mut::<Microphone>() else {
        bevy::log::warn_once!("No speech recognizer installed");
        return;
    };
    let sink = microphone.sink.clone();
    microphone.recognizer.start(sink);

    let mut ptt = world.resource_mut::<PushToTalk>();
    ptt.listening = true;
    ptt.stop_at = None;
    ptt.chunks.clear();
}

/// The controller released a key.
pub struct KeyUp(pub String);

impl Command for KeyUp {
    fn apply(self, world: &mut World) {
        let now = real_time(world);
        let mut ptt = world.resource_mut::<PushToTalk>();
        if ptt.key != self.0 {
            return;
        }

        ptt.active = false;
        if ptt.listening {
            ptt.stop_at = Some(now + ptt.grace);
        }
        world.resource_mut::<Frequency>().transmitting = false;
    }
}

/// Rebinds the push-to-talk key.
pub struct SetKey(pub String);

impl Command for SetKey {
    fn apply(self, world: &mut World) {
        bevy::log::info!("Push-to-talk key set to {}", self.0);
        world.resource_mut::<PushToTalk>().key = self.0;
    }
}

/// Flips the voice switch.
pub struct SetVoiceSwitch(pub VoiceSwitch);

impl Command for SetVoiceSwitch {
    fn apply(self, world: &mut World) { *world.resource_mut::<VoiceSwitch>() = self.0; }
}

fn poll_system(world: &mut World) {
    let now = real_time(world);
    poll(world, now);
}

/// Stops a released session once its grace delay has passed
/// and handles the events delivered by the recognizer.
pub fn poll(world: &mut World, now: Duration) {
    let due = world.resource::<PushToTalk>().stop_at.is_some_and(|stop_at| now >= stop_at);
    if due {
        world.resource_mut::<PushToTalk>().stop_at = None;
        if let Some(mut microphone) = world.get_resource_mut::<Microphone>() {
            microphone.recognizer.stop();
        }
    }

    let Some(events) = world.get_resource::<Microphone>().map(|microphone| microphone.sink.drain()) else {
        return;
    };
    for event in events {
        match event {
            Recognition::Result(chunk) => {
                world.resource_mut::<PushToTalk>().chunks.push(chunk);
            }
            Recognition::Error(err) => {
                bevy::log::warn!("Speech recognition failed: {err}");
                if let Some(mut microphone) = world.get_resource_mut::<Microphone>() {
                    microphone.recognizer.stop();
                }
                let mut ptt = world.resource_mut::<PushToTalk>();
                ptt.listening = false;
                ptt.stop_at = None;
                ptt.chunks.clear();
            }
            Recognition::End => {
                let mut ptt = world.resource_mut::<PushToTalk>();
                let was_listening = std::mem::replace(&mut ptt.listening, false);
                let transcript = ptt.chunks.drain(..).join(" ");
                if was_listening && !transcript.trim().is_empty() {
                    super::transcribe(world, &transcript);
                }
            }
        }
    }
}
