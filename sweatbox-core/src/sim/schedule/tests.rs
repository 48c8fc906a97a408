use std::time::Duration;

use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::ecs::system::Command;
use bevy::math::Vec2;

use super::{DiscardRequest, complete_request};
use crate::config::{self, Config};
use crate::phonetic;
use crate::sim::aircraft::{Aircraft, FlightPlan, Placement, RouteType, Status, Voice};
use crate::sim::clock::{self, Clock};
use crate::sim::mistake::{MistakeKind, MistakeLog};
use crate::sim::parking::Spots;
use crate::sim::radio::{Class, Frequency, Log};
use crate::sim::reference::Reference;
use crate::sim::request::{AircraftRequest, Reminder, RequestKind, Requests, Utterance};
use crate::sim::strip::{Annotation, Bay, Bays};
use crate::sim::taxi::{Navigation, Network};

const VOICE: Voice = Voice { slot: 0, pitch: 1.0 };

fn app(now: u64) -> App {
    let file = maps::portland::file();
    let mut app = App::new();
    app.add_plugins((config::Plug, super::super::Plug));
    app.insert_resource(Config { difficulty: 1, seed: Some(7), ..Config::default() });
    app.insert_resource(Reference::from_file(&file));
    app.insert_resource(Network::from_store(&file.taxiway).expect("valid taxiway"));
    app.insert_resource(Spots::new(file.parking_spots));
    app.world_mut().resource_mut::<Clock>().now = Duration::from_secs(now);
    app
}

fn spawn(app: &mut App, callsign: &str, status: Status, position: Vec2, requests: Requests) -> Entity {
    let mut aircraft = Aircraft::new(callsign, "B738", "G1", VOICE, Duration::ZERO);
    aircraft.status = status;
    let plan = FlightPlan {
        destination: "KJFK".into(),
        route: "ENE J573 TOLDO RBV".into(),
        original_route: "ENE J573 TOLDO RBV".into(),
        squawk: "4321".into(),
        ..FlightPlan::blank(callsign, RouteType::High)
    };
    app.world_mut()
        .spawn((
            aircraft,
            Placement { position, rotation: 0.0 },
            plan,
            requests,
            Navigation::default(),
        ))
        .id()
}

fn spoken(kind: RequestKind, priority: u8, text: &str) -> AircraftRequest {
    AircraftRequest {
        request: Some(Utterance::new(text, text)),
        ..AircraftRequest::new(kind, priority)
    }
}

fn parked() -> Vec2 { Vec2::new(14.0, 18.0) }

fn contents(app: &App) -> Vec<&str> {
    app.world().resource::<Log>().entries().iter().map(|entry| entry.content.as_str()).collect()
}

fn mistakes(app: &App) -> Vec<MistakeKind> {
    app.world().resource::<MistakeLog>().procedural().iter().map(|record| record.kind).collect()
}

fn aircraft(app: &App, entity: Entity) -> &Aircraft {
    app.world().get::<Aircraft>(entity).expect("aircraft exists")
}

#[test]
fn highest_priority_request_is_emitted_after_silence() {
    let mut app = app(101);
    let low = spawn(&mut app, "DAL1", Status::Ramp, parked(), Requests::new([spoken(
        RequestKind::ClearanceIfr,
        1,
        "Request clearance",
    )]));
    let high = spawn(&mut app, "DAL2", Status::ClearedIfr, parked(), Requests::new([spoken(
        RequestKind::Taxi,
        2,
        "Ready to taxi",
    )]));

    clock::tick(app.world_mut());

    assert_eq!(contents(&app), ["Ready to taxi"]);
    assert!(app.world().get::<Requests>(high).is_some_and(Requests::is_open));
    assert!(!app.world().get::<Requests>(low).is_some_and(Requests::is_open));
    assert_eq!(app.world().resource::<Frequency>().last_transmission, Duration::from_secs(101));
}

#[test]
fn nothing_is_emitted_while_controller_transmits() {
    let mut app = app(101);
    spawn(&mut app, "DAL1", Status::Ramp, parked(), Requests::new([spoken(
        RequestKind::ClearanceIfr,
        1,
        "Request clearance",
    )]));
    app.world_mut().resource_mut::<Frequency>().transmitting = true;

    clock::tick(app.world_mut());

    assert!(contents(&app).is_empty());
}

#[test]
fn open_requests_are_capped_by_difficulty() {
    let mut app = app(101);
    for callsign in ["DAL1", "DAL2"] {
        let mut requests = Requests::default();
        requests.open = Some(AircraftRequest::new(RequestKind::Pushback, 1));
        spawn(&mut app, callsign, Status::ClearedIfr, parked(), requests);
    }
    let waiting = spawn(&mut app, "DAL3", Status::Ramp, parked(), Requests::new([spoken(
        RequestKind::ClearanceIfr,
        1,
        "Request clearance",
    )]));

    clock::tick(app.world_mut());

    assert!(contents(&app).is_empty());
    assert!(!app.world().get::<Requests>(waiting).is_some_and(Requests::is_open));
}

#[test]
fn due_reminder_fires_once() {
    let mut app = app(101);
    let mut request = AircraftRequest::new(RequestKind::ReadbackIfr, 1);
    request.reminder = Some(Reminder {
        message: Utterance::new("Ground, did you get our readback?", "ground did you get our readback"),
        delay:   Duration::from_secs(20),
        kind:    MistakeKind::ReadbackIfr,
        send_at: Some(Duration::from_secs(90)),
    });
    let mut requests = Requests::default();
    requests.open = Some(request);
    let entity = spawn(&mut app, "DAL1", Status::Ramp, parked(), requests);

    clock::tick(app.world_mut());

    assert_eq!(contents(&app), ["Ground, did you get our readback?"]);
    assert_eq!(mistakes(&app), [MistakeKind::ReadbackIfr]);
    let requests = app.world().get::<Requests>(entity).expect("requests exist");
    assert!(requests.open.as_ref().is_some_and(|open| open.reminder.is_none()));

    app.world_mut().resource_mut::<Frequency>().last_transmission = Duration::ZERO;
    clock::tick(app.world_mut());
    assert_eq!(mistakes(&app).len(), 1);
}

#[test]
fn completion_opens_subsequent_request() {
    let mut app = app(101);
    let mut clearance = AircraftRequest::new(RequestKind::ClearanceIfr, 1);
    clearance.atc_message = Some("Cleared DAL1".into());
    clearance.response = Some(Utterance::new("Cleared to Kennedy, squawk 4321", "cleared"));
    clearance.next_request_delay = Duration::from_secs(30);
    clearance.subsequent = Some(Box::new(AircraftRequest {
        request: Some(Utterance::new("Readback correct?", "readback correct")),
        next_status: Some(Status::ClearedIfr),
        ..AircraftRequest::new(RequestKind::ReadbackIfr, 1)
    }));
    let mut requests = Requests::default();
    requests.open = Some(clearance);
    let entity = spawn(&mut app, "DAL1", Status::Ramp, parked(), requests);

    assert!(complete_request(app.world_mut(), "DAL1", false));

    assert_eq!(contents(&app), ["Cleared DAL1", "Cleared to Kennedy, squawk 4321", "Readback correct?"]);
    assert_eq!(app.world().resource::<Log>().entries()[0].class, Class::Controller);
    let requests = app.world().get::<Requests>(entity).expect("requests exist");
    assert_eq!(requests.open.as_ref().map(|open| open.kind), Some(RequestKind::ReadbackIfr));
    assert_eq!(aircraft(&app, entity).can_send_at, Duration::from_secs(131));
    assert_eq!(aircraft(&app, entity).status, Status::Ramp);

    assert!(complete_request(app.world_mut(), "DAL1", true));
    assert_eq!(aircraft(&app, entity).status, Status::ClearedIfr);
    assert!(!complete_request(app.world_mut(), "DAL1", true));
}

#[test]
fn amended_route_is_read_back() {
    let mut app = app(101);
    let mut clearance = AircraftRequest::new(RequestKind::ClearanceIfr, 1);
    clearance.response = Some(Utterance::new("Cleared as filed", "cleared as filed"));
    let mut requests = Requests::default();
    requests.open = Some(clearance);
    let entity = spawn(&mut app, "DAL1", Status::Ramp, parked(), requests);
    app.world_mut().get_mut::<FlightPlan>(entity).expect("plan exists").route = "DIRECT".into();

    assert!(complete_request(app.world_mut(), "DAL1", true));

    let name = phonetic::destination_name("KJFK", &app.world().resource::<Reference>().tables);
    assert_eq!(contents(&app), [format!("Cleared to {name} via DIRECT, squawk 4321")]);
}

#[test]
fn handoff_releases_parking_spot() {
    let mut app = app(101);
    let spot = app
        .world_mut()
        .resource_mut::<Spots>()
        .reserve_random(&mut rand::rng())
        .map(|spot| spot.id.clone())
        .expect("spots are free");
    let mut handoff = AircraftRequest::new(RequestKind::Handoff, 1);
    handoff.next_status = Some(Status::HandedOff);
    let mut requests = Requests::default();
    requests.open = Some(handoff);
    let entity = spawn(&mut app, "DAL1", Status::AwaitingHandoff, parked(), requests);
    {
        let mut aircraft = app.world_mut().get_mut::<Aircraft>(entity).expect("aircraft exists");
        aircraft.parking_spot.clone_from(&spot);
        aircraft.holding = true;
    }

    assert!(complete_request(app.world_mut(), "DAL1", true));

    assert!(app.world().resource::<Spots>().is_available(&spot));
    assert!(!aircraft(&app, entity).holding);
    assert_eq!(aircraft(&app, entity).status, Status::HandedOff);
    assert_eq!(aircraft(&app, entity).status_changed, Duration::from_secs(101));
}

#[test]
fn discarded_request_resets_silence() {
    let mut app = app(101);
    let mut requests = Requests::default();
    requests.open = Some(AircraftRequest::new(RequestKind::Pushback, 1));
    let entity = spawn(&mut app, "DAL1", Status::ClearedIfr, parked(), requests);

    DiscardRequest { callsign: "DAL1".into() }.apply(app.world_mut());

    assert!(!app.world().get::<Requests>(entity).is_some_and(Requests::is_open));
    assert_eq!(app.world().resource::<Frequency>().last_transmission, Duration::from_secs(101));
    assert_eq!(aircraft(&app, entity).status, Status::ClearedIfr);
}

#[test]
fn pushback_discretion_starts_when_due() {
    let mut app = app(101);
    let entity = spawn(&mut app, "DAL1", Status::PushbackDiscretion, parked(), Requests::default());
    app.world_mut().get_mut::<Aircraft>(entity).expect("aircraft exists").can_send_at =
        Duration::from_secs(101);

    clock::tick(app.world_mut());

    assert_eq!(aircraft(&app, entity).status, Status::Pushback);
    assert_eq!(aircraft(&app, entity).can_send_at, Duration::from_secs(221));
}

#[test]
fn aircraft_at_runway_asks_for_handoff() {
    let mut app = app(101);
    let runway = app.world().resource::<Network>().terminal_position();
    let entity = spawn(&mut app, "DAL1", Status::Taxi, runway, Requests::default());

    clock::tick(app.world_mut());

    assert_eq!(aircraft(&app, entity).status, Status::AwaitingHandoff);
    assert_eq!(mistakes(&app), [MistakeKind::AircraftHandoff]);
    assert_eq!(contents(&app), ["Ground, should we switch to tower?"]);
}

#[test]
fn tower_asks_for_missing_strip_then_aircraft_departs() {
    let mut app = app(101);
    let runway = app.world().resource::<Network>().terminal_position();
    let entity = spawn(&mut app, "DAL1", Status::HandedOff, runway, Requests::default());

    clock::tick(app.world_mut());

    assert_eq!(aircraft(&app, entity).status, Status::HandedOffReminded);
    assert_eq!(contents(&app), ["Can you pass me the strip for DAL1?"]);
    assert_eq!(app.world().resource::<Log>().entries()[0].class, Class::Atc);
    assert_eq!(mistakes(&app), [MistakeKind::StripHandoff]);

    let plan = app.world().get::<FlightPlan>(entity).expect("plan exists").clone();
    {
        let mut bays = app.world_mut().resource_mut::<Bays>();
        let strip = bays.print_flight_plan(&plan);
        assert!(bays.annotate(strip, Annotation::Box10, "X"));
        assert!(bays.move_to(strip, Bay::Local));
    }

    clock::tick(app.world_mut());

    assert!(app.world().get_entity(entity).is_err());
    assert_eq!(mistakes(&app), [MistakeKind::StripHandoff, MistakeKind::StripBox]);
}

#[test]
fn aircraft_spawn_on_period() {
    let mut app = app(0);
    let total = app.world().resource::<Spots>().available_count();

    clock::tick(app.world_mut());

    let count = app.world_mut().query::<&Aircraft>().iter(app.world()).count();
    assert!(count <= 1);
    assert_eq!(count + app.world().resource::<Spots>().available_count(), total);
    assert!(contents(&app).is_empty());
    assert_eq!(app.world().resource::<Clock>().now, Duration::from_secs(1));

    clock::tick(app.world_mut());
    let count_after = app.world_mut().query::<&Aircraft>().iter(app.world()).count();
    assert_eq!(count_after, count);
}
