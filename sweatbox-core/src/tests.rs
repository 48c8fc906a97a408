use std::borrow::Cow;
use std::collections::HashSet;
use std::time::Duration;

use bevy::app::App;
use bevy::ecs::change_detection::Mut;
use bevy::ecs::entity::Entity;
use bevy::ecs::system::Command;
use bevy::ecs::world::World;

use crate::config::{Config, SimRng};
use crate::sim::aircraft::{Aircraft, FlightPlan, Status};
use crate::sim::clock::{self, Clock};
use crate::sim::generate::{Generator, VfrPool};
use crate::sim::mistake::{MistakeKind, MistakeLog};
use crate::sim::parking::Spots;
use crate::sim::radio::{Class, Log};
use crate::sim::reference::Reference;
use crate::sim::request::{RequestKind, Requests};
use crate::sim::schedule::complete_request;
use crate::sim::strip::{Annotate, Annotation, Bay, Bays, MoveStrip, StripKind};
use crate::sim::taxi::Navigation;
use crate::speech::interpret::interpret;
use crate::{Plug, load};

fn loaded_app() -> App {
    let mut app = App::new();
    app.insert_resource(Config { seed: Some(11), ..Config::default() });
    app.add_plugins(Plug);

    let mut bytes = Vec::new();
    ciborium::into_writer(&maps::portland::file(), &mut bytes).expect("serialize");
    load::Command {
        source:   load::Source::Raw(Cow::Owned(bytes)),
        routes:   Vec::new(),
        on_error: Box::new(|_, err| panic!("load failed: {err}")),
    }
    .apply(app.world_mut());
    app
}

#[test]
fn session_spawns_aircraft_that_call_ground() {
    let mut app = loaded_app();
    for _ in 0..300 {
        clock::tick(app.world_mut());
    }

    let world = app.world_mut();
    assert!(world.query::<&Aircraft>().iter(world).count() > 0);
    assert!(world.resource::<Log>().entries().iter().any(|entry| entry.class == Class::Radio));
}

#[test]
fn manual_completion_answers_open_request() {
    let mut app = loaded_app();
    let mut calling = None;
    for _ in 0..600 {
        clock::tick(app.world_mut());
        let world = app.world_mut();
        calling = world
            .query::<(&Aircraft, &Requests)>()
            .iter(world)
            .find(|(_, requests)| requests.open.is_some())
            .map(|(aircraft, requests)| (aircraft.callsign.clone(), requests.opened));
        if calling.is_some() {
            break;
        }
    }
    let (callsign, opened) = calling.expect("some aircraft calls within ten minutes");

    assert!(complete_request(app.world_mut(), &callsign, false));

    let world = app.world_mut();
    let requests = world
        .query::<(&Aircraft, &Requests)>()
        .iter(world)
        .find(|(aircraft, _)| aircraft.callsign == callsign)
        .map(|(_, requests)| (requests.open.is_some(), requests.opened));
    assert!(matches!(requests, Some((false, _))) || matches!(requests, Some((true, seq)) if seq != opened));
    assert!(!complete_request(app.world_mut(), "NOBODY", false));
}

/// Checks the request limits that hold at every point of a session.
fn assert_request_limits(world: &mut World) {
    let limit = world.resource::<Config>().max_open_requests();
    let calling: Vec<String> = world
        .query::<(&Aircraft, &Requests)>()
        .iter(world)
        .filter(|(_, requests)| requests.is_open())
        .map(|(aircraft, _)| aircraft.callsign.clone())
        .collect();
    assert!(calling.len() <= limit, "{} open requests exceed {limit}: {calling:?}", calling.len());
    let unique: HashSet<&String> = calling.iter().collect();
    assert_eq!(unique.len(), calling.len(), "an aircraft has two open requests: {calling:?}");
}

fn tick_until(app: &mut App, what: &str, mut done: impl FnMut(&World) -> bool) {
    for _ in 0..900 {
        clock::tick(app.world_mut());
        assert_request_limits(app.world_mut());
        if done(app.world()) {
            return;
        }
    }
    panic!("{what} did not happen within fifteen minutes");
}

fn say(app: &mut App, transcript: &str) {
    interpret(app.world_mut(), transcript);
    assert_request_limits(app.world_mut());
}

/// Parks a generated airline departure at `spot` and takes every other spot,
/// so that no other aircraft spawns while it is at the gate.
fn park_departure(app: &mut App, spot: &str) -> (Entity, String) {
    let world = app.world_mut();
    let flight = world.resource_scope(|world, mut rng: Mut<SimRng>| {
        let spot = world.resource::<Spots>().get(spot).cloned().expect("spot exists");
        let taken = HashSet::new();
        let mut generator = Generator {
            reference: world.resource::<Reference>(),
            now:       world.resource::<Clock>().now,
            taken:     &taken,
            rng:       &mut rng.0,
        };
        generator.make_flight(&spot, &mut VfrPool::default()).expect("airline spot has routes")
    });
    world.resource_scope(|world, mut rng: Mut<SimRng>| {
        let mut spots = world.resource_mut::<Spots>();
        while spots.reserve_random(&mut rng.0).is_some() {}
    });

    world.resource_mut::<Bays>().print_flight_plan(&flight.plan);
    let callsign = flight.aircraft.callsign.clone();
    let entity = world
        .spawn((flight.aircraft, flight.placement, flight.plan, flight.requests, Navigation::default()))
        .id();
    (entity, callsign)
}

fn open_kind(world: &World, entity: Entity) -> Option<RequestKind> {
    world.get::<Requests>(entity).and_then(|requests| requests.open.as_ref()).map(|open| open.kind)
}

fn status(world: &World, entity: Entity) -> Option<Status> {
    world.get::<Aircraft>(entity).map(|aircraft| aircraft.status)
}

fn mistakes_of(world: &World, callsign: &str) -> Vec<MistakeKind> {
    world
        .resource::<MistakeLog>()
        .procedural()
        .iter()
        .filter(|mistake| mistake.details.as_deref() == Some(callsign))
        .map(|mistake| mistake.kind)
        .collect()
}

#[test]
fn voice_session_from_gate_to_departure() {
    let mut app = loaded_app();
    let (entity, callsign) = park_departure(&mut app, "G3");
    let squawk = app.world().get::<FlightPlan>(entity).expect("plan").squawk.clone();

    tick_until(&mut app, "clearance request", |world| {
        open_kind(world, entity) == Some(RequestKind::ClearanceIfr)
    });
    say(
        &mut app,
        &format!(
            "{callsign} portland ground cleared to the destination airport as filed \
             maintain 5000 departure 119.75 squawk {squawk}"
        ),
    );
    assert_eq!(status(app.world(), entity), Some(Status::ClearedIfr));
    assert_eq!(open_kind(app.world(), entity), Some(RequestKind::ReadbackIfr));
    let cleared_at = app.world().resource::<Clock>().now;

    tick_until(&mut app, "readback reminder", |world| {
        mistakes_of(world, &callsign).contains(&MistakeKind::ReadbackIfr)
    });
    assert!(app.world().resource::<Clock>().now - cleared_at >= Duration::from_secs(20));
    assert_eq!(
        app.world().resource::<Log>().last().map(|entry| entry.content.as_str()),
        Some("Ground, did you copy our readback?"),
    );
    say(&mut app, &format!("{callsign} readback correct"));
    assert_eq!(open_kind(app.world(), entity), None);

    tick_until(&mut app, "pushback request", |world| {
        open_kind(world, entity) == Some(RequestKind::Pushback)
    });
    say(&mut app, &format!("{callsign} pushback at your discretion"));
    assert_eq!(status(app.world(), entity), Some(Status::Pushback));

    tick_until(&mut app, "taxi request", |world| open_kind(world, entity) == Some(RequestKind::Taxi));
    say(&mut app, &format!("{callsign} runway 29 taxi via a cross runway 36"));
    assert_eq!(status(app.world(), entity), Some(Status::Taxi));
    assert_eq!(open_kind(app.world(), entity), Some(RequestKind::Handoff));

    tick_until(&mut app, "arrival at the runway", |world| {
        status(world, entity) == Some(Status::AwaitingHandoff)
    });
    assert!(mistakes_of(app.world(), &callsign).contains(&MistakeKind::AircraftHandoff));
    say(&mut app, &format!("{callsign} contact tower 120.9"));
    assert_eq!(status(app.world(), entity), Some(Status::HandedOff));
    assert!(app.world().resource::<Spots>().is_available("G3"));

    tick_until(&mut app, "strip reminder", |world| {
        status(world, entity) == Some(Status::HandedOffReminded)
    });
    assert!(mistakes_of(app.world(), &callsign).contains(&MistakeKind::StripHandoff));
    let reminder = format!("Can you pass me the strip for {callsign}?");
    assert!(app.world().resource::<Log>().entries().iter().any(|entry| entry.content == reminder));

    let strip = app
        .world()
        .resource::<Bays>()
        .iter()
        .find(|strip| matches!(&strip.kind, StripKind::Flight(flight) if flight.plan.callsign == callsign))
        .map(|strip| strip.id)
        .expect("strip was printed");
    Annotate { id: strip, annotation: Annotation::Box12, text: "C".into() }.apply(app.world_mut());
    MoveStrip { id: strip, bay: Bay::Local }.apply(app.world_mut());

    tick_until(&mut app, "departure", |world| world.get_entity(entity).is_err());
    let mistakes = mistakes_of(app.world(), &callsign);
    assert_eq!(mistakes.iter().filter(|&&kind| kind == MistakeKind::StripBox).count(), 1);
    assert_eq!(mistakes.iter().filter(|&&kind| kind == MistakeKind::ReadbackIfr).count(), 1);
}
