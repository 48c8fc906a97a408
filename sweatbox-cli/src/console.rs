//! Standard input and output of the console front-end.

use std::io::{self, BufRead, Write};
use std::sync::Mutex;
use std::sync::mpsc;
use std::thread;

use bevy::app::{self, App, AppExit, Plugin};
use bevy::ecs::change_detection::Res;
use bevy::ecs::resource::Resource;
use bevy::ecs::system::{Command, Local};
use bevy::ecs::world::World;
use itertools::Itertools;
use sweatbox::config::SetDifficulty;
use sweatbox::sim::aircraft::{Aircraft, Voice};
use sweatbox::sim::clock::SetPaused;
use sweatbox::sim::mistake::MistakeLog;
use sweatbox::sim::radio::{Class, Log};
use sweatbox::sim::request::Requests;
use sweatbox::sim::schedule::{CompleteRequest, DiscardRequest, ReviewClearance};
use sweatbox::sim::strip::{
    Annotate, Bays, DeleteStrip, MoveStrip, PrintBlank, RequestStrip, StripKind, ToggleOffset,
};
use sweatbox::speech::{Speaker, Synthesizer, Transcribe};

use crate::command::{self, Line};

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.insert_resource(Stdin::spawn());
        app.insert_resource(Speaker::new(ConsoleSynthesizer));
        app.add_systems(app::Update, (input_system, print_system));
    }
}

/// Lines read from standard input by a background thread.
#[derive(Resource)]
struct Stdin(Mutex<mpsc::Receiver<String>>);

impl Stdin {
    fn spawn() -> Self {
        let (sender, receiver) = mpsc::channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if sender.send(line).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        bevy::log::error!("Cannot read standard input: {err}");
                        break;
                    }
                }
            }
        });
        Self(Mutex::new(receiver))
    }

    fn drain(&self) -> Vec<String> {
        self.0.lock().map(|receiver| receiver.try_iter().collect()).unwrap_or_default()
    }
}

fn input_system(world: &mut World) {
    let lines = world.resource::<Stdin>().drain();
    for line in lines {
        match command::parse(&line) {
            Ok(Some(line)) => execute(world, line),
            Ok(None) => {}
            Err(err) => println!("{err:#}"),
        }
    }
}

fn execute(world: &mut World, line: Line) {
    match line {
        Line::Transcript(text) => Transcribe(text).apply(world),
        Line::Complete(callsign) => CompleteRequest { callsign, by_voice: false }.apply(world),
        Line::Discard(callsign) => DiscardRequest { callsign }.apply(world),
        Line::Pause => SetPaused(true).apply(world),
        Line::Resume => SetPaused(false).apply(world),
        Line::Difficulty(difficulty) => SetDifficulty(difficulty).apply(world),
        Line::Review(callsign) => ReviewClearance { callsign }.apply(world),
        Line::Strip(callsign) => RequestStrip { callsign }.apply(world),
        Line::Blank => PrintBlank.apply(world),
        Line::Move { id, bay } => MoveStrip { id, bay }.apply(world),
        Line::Annotate { id, annotation, text } => Annotate { id, annotation, text }.apply(world),
        Line::Offset(id) => ToggleOffset(id).apply(world),
        Line::Delete(id) => DeleteStrip(id).apply(world),
        Line::Status => print_status(world),
        Line::Mistakes => print_mistakes(world),
        Line::Help => println!("{}", command::USAGE),
        Line::Quit => {
            world.write_message(AppExit::Success);
        }
    }
}

fn print_status(world: &mut World) {
    let mut aircraft: Vec<_> = world
        .query::<(&Aircraft, &Requests)>()
        .iter(world)
        .map(|(aircraft, requests)| {
            let open = requests.open.as_ref().map_or(String::new(), |request| format!(" [{}]", request.kind));
            format!("{:<8} {:<12} {}{open}", aircraft.callsign, aircraft.status, aircraft.parking_spot)
        })
        .collect();
    aircraft.sort();
    println!("Aircraft:\n  {}", aircraft.join("\n  "));

    let strips = world.resource::<Bays>().iter().map(|strip| {
        let label = match &strip.kind {
            StripKind::Flight(flight) => format!(
                "{} {} box10={:?} box12={:?}",
                flight.plan.callsign, flight.plan.route, flight.box10, flight.box12
            ),
            StripKind::Divider(name) | StripKind::HandwrittenDivider(name) => format!("-- {name} --"),
            StripKind::Blank => "(blank)".to_owned(),
        };
        let offset = if strip.offset { "  " } else { "" };
        format!("#{} {:<8} {offset}{label}", strip.id, strip.bay)
    });
    println!("Strips:\n  {}", strips.format("\n  "));
}

fn print_mistakes(world: &mut World) {
    let mut log = world.resource_mut::<MistakeLog>();
    let procedural = log.procedural().iter().map(|mistake| {
        format!(
            "{}: {}{}",
            mistake.kind.title(),
            mistake.details.as_deref().unwrap_or_default(),
            mistake.secondary.as_deref().map_or(String::new(), |secondary| format!(" ({secondary})")),
        )
    });
    let phraseology = log.phraseology().iter().map(|mistake| {
        format!("{}: {}", mistake.kind.title(), mistake.details.as_deref().unwrap_or_default())
    });
    println!("Mistakes:\n  {}", procedural.chain(phraseology).format("\n  "));
    log.take_unseen();
}

/// Prints new transcript entries.
fn print_system(log: Res<Log>, mut printed: Local<usize>) {
    let entries = log.entries();
    if *printed > entries.len() {
        *printed = 0;
    }
    for entry in &entries[*printed..] {
        let seconds = entry.time.as_secs();
        let prefix = format!("[{:02}:{:02}]", seconds / 60, seconds % 60);
        match entry.class {
            Class::System => println!("{prefix} ** {}", entry.content),
            _ => println!("{prefix} {} ({}): {}", entry.station, entry.class, entry.content),
        }
    }
    *printed = entries.len();
}

/// Speech output for a terminal without a speech engine.
struct ConsoleSynthesizer;

impl Synthesizer for ConsoleSynthesizer {
    fn speak(&mut self, text: &str, voice: Voice) {
        bevy::log::debug!("Speaking with voice {} at pitch {}: {text}", voice.slot, voice.pitch);
    }

    fn error_cue(&mut self) {
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|()| stdout.flush()) {
            bevy::log::debug!("Cannot play error cue: {err}");
        }
    }
}
