use std::time::Duration;

use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::math::Vec2;

use super::interpret;
use crate::config;
use crate::sim::aircraft::{Aircraft, FlightPlan, Placement, RouteType, Status, Voice};
use crate::sim::clock::Clock;
use crate::sim::mistake::{MistakeLog, PhraseologyKind};
use crate::sim::parking::Spots;
use crate::sim::radio::{Class, Log};
use crate::sim::reference::Reference;
use crate::sim::request::{AircraftRequest, RequestKind, Requests, Utterance};
use crate::sim::schedule;
use crate::sim::taxi::{Navigation, Network};

fn app() -> App {
    let file = maps::portland::file();
    let mut app = App::new();
    app.add_plugins((config::Plug, crate::sim::Plug));
    app.insert_resource(Reference::from_file(&file));
    app.insert_resource(Network::from_store(&file.taxiway).expect("valid taxiway"));
    app.insert_resource(Spots::new(file.parking_spots));
    app.world_mut().resource_mut::<Clock>().now = Duration::from_secs(101);
    app
}

fn spawn(app: &mut App, spot: &str, status: Status, open: Option<AircraftRequest>) -> Entity {
    let mut aircraft = Aircraft::new("DAL1", "B738", spot, Voice { slot: 0, pitch: 1.0 }, Duration::ZERO);
    aircraft.status = status;
    let mut requests = Requests::default();
    requests.open = open;
    app.world_mut()
        .spawn((
            aircraft,
            Placement { position: Vec2::new(14.0, 18.0), rotation: 270.0 },
            FlightPlan::blank("DAL1", RouteType::High),
            requests,
            Navigation::default(),
        ))
        .id()
}

fn taxi_request() -> AircraftRequest {
    AircraftRequest {
        response: Some(Utterance::new("Runway 29, taxi via A", "runway two niner taxi via alpha")),
        next_status: Some(Status::Taxi),
        ..AircraftRequest::new(RequestKind::Taxi, 2)
    }
}

fn say(app: &mut App, transcript: &str) { interpret(app.world_mut(), transcript); }

fn last_reply(app: &App) -> Option<String> {
    app.world()
        .resource::<Log>()
        .entries()
        .iter()
        .rev()
        .find(|entry| entry.class != Class::Controller)
        .map(|entry| entry.content.clone())
}

fn phraseology(app: &App) -> Vec<PhraseologyKind> {
    app.world().resource::<MistakeLog>().phraseology().iter().map(|record| record.kind).collect()
}

fn requests(app: &App, entity: Entity) -> &Requests {
    app.world().get::<Requests>(entity).expect("aircraft has requests")
}

fn status(app: &App, entity: Entity) -> Status {
    app.world().get::<Aircraft>(entity).expect("aircraft exists").status
}

#[test]
fn single_transmission_completes_request() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::ClearedIfr, Some(taxi_request()));

    say(&mut app, "DAL1 portland ground runway 29 taxi via a");

    assert_eq!(status(&app, entity), Status::Taxi);
    assert!(!requests(&app, entity).is_open());
    assert_eq!(last_reply(&app).as_deref(), Some("Runway 29, taxi via A"));
    assert!(phraseology(&app).is_empty());
}

#[test]
fn required_phrases_accumulate_across_transmissions() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::ClearedIfr, Some(taxi_request()));

    say(&mut app, "DAL1 portland ground taxi via a");

    assert_eq!(last_reply(&app).as_deref(), Some("I didn't catch the departure runway"));
    let open = requests(&app, entity).open.as_ref().expect("request stays open");
    assert_eq!(open.matched_keywords, ["taxi"]);
    assert_eq!(open.previous_instructions, ["DAL1 portland ground taxi via a"]);

    say(&mut app, "DAL1 runway 29");

    assert_eq!(status(&app, entity), Status::Taxi);
    assert!(!requests(&app, entity).is_open());
}

#[test]
fn at_least_one_of_is_checked_on_current_transmission_only() {
    let mut app = app();
    let pushback = AircraftRequest {
        next_status: Some(Status::Pushback),
        ..AircraftRequest::new(RequestKind::Pushback, 1)
    };
    let entity = spawn(&mut app, "G1", Status::ClearedIfr, Some(pushback));

    say(&mut app, "DAL1 portland ground approved");
    assert_eq!(last_reply(&app).as_deref(), Some("I didn't understand that"));

    say(&mut app, "DAL1 pushback");
    assert_eq!(last_reply(&app).as_deref(), Some("I didn't understand that"));
    let open = requests(&app, entity).open.as_ref().expect("request stays open");
    assert_eq!(open.matched_keywords, ["push"]);
    assert_eq!(status(&app, entity), Status::ClearedIfr);
}

#[test]
fn missing_elements_are_listed() {
    let mut app = app();
    spawn(&mut app, "G1", Status::Ramp, Some(AircraftRequest::new(RequestKind::ClearanceIfr, 1)));

    say(&mut app, "DAL1 portland ground cleared to the boston airport");

    assert_eq!(
        last_reply(&app).as_deref(),
        Some("I didn't catch the altitude, departure frequency, or squawk"),
    );
}

#[test]
fn unknown_callsign_is_reported() {
    let mut app = app();
    say(&mut app, "DAL1 portland ground taxi via a");
    assert_eq!(last_reply(&app).as_deref(), Some("Could not identify callsign DAL1"));

    spawn(&mut app, "G1", Status::ClearedIfr, Some(taxi_request()));
    say(&mut app, "UAL9 portland ground taxi via a");

    let entry = app.world().resource::<Log>().last().cloned().expect("reply logged");
    assert_eq!(entry.content, "Could not identify callsign UAL9");
    assert_eq!(entry.class, Class::System);
    assert!(entry.error_cue);
}

#[test]
fn handed_off_aircraft_is_not_on_frequency() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::HandedOff, Some(taxi_request()));

    say(&mut app, "DAL1 runway 29 taxi via a");

    assert_eq!(last_reply(&app).as_deref(), Some("Aircraft DAL1 is no longer on your frequency"));
    assert!(requests(&app, entity).is_open());
    assert!(phraseology(&app).is_empty());
}

#[test]
fn first_contact_must_identify_ground() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::ClearedIfr, Some(taxi_request()));

    say(&mut app, "DAL1 radio check");
    say(&mut app, "DAL1 runway 29 taxi via a");

    assert_eq!(phraseology(&app), [PhraseologyKind::ForgotToIdentify]);
    assert!(app.world().get::<Aircraft>(entity).is_some_and(|aircraft| aircraft.spoken_to));
}

#[test]
fn global_questions_leave_request_open() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::ClearedIfr, Some(taxi_request()));

    say(&mut app, "DAL1 portland ground radio check");

    assert_eq!(last_reply(&app).as_deref(), Some("I read you loud and clear"));
    assert!(requests(&app, entity).is_open());
}

#[test]
fn hold_and_continue_toggle_movement() {
    let mut app = app();
    let entity = spawn(&mut app, "G1", Status::Taxi, None);
    let holding = |app: &App| app.world().get::<Aircraft>(entity).is_some_and(|aircraft| aircraft.holding);

    say(&mut app, "DAL1 portland ground hold position");
    assert!(holding(&app));
    assert_eq!(last_reply(&app).as_deref(), Some("Holding position"));

    say(&mut app, "DAL1 continue taxi");
    assert!(!holding(&app));
    assert_eq!(status(&app, entity), Status::Taxi);
}

fn readback_with_pushback_queued(app: &mut App, spot: &str) -> Entity {
    let readback = AircraftRequest {
        next_request_delay: Duration::from_secs(100),
        next_status: Some(Status::ClearedIfr),
        ..AircraftRequest::new(RequestKind::ReadbackIfr, 1)
    };
    let entity = spawn(app, spot, Status::Ramp, Some(readback));
    let mut requests = app.world_mut().get_mut::<Requests>(entity).expect("aircraft has requests");
    requests.queue.push_back(AircraftRequest::new(RequestKind::Pushback, 1));
    requests.queue.push_back(taxi_request());
    entity
}

#[test]
fn discretion_with_readback_skips_pushback_request() {
    let mut app = app();
    let entity = readback_with_pushback_queued(&mut app, "G3");

    say(&mut app, "DAL1 portland ground readback correct pushback at your discretion");

    assert_eq!(status(&app, entity), Status::PushbackDiscretion);
    let requests = requests(&app, entity);
    assert!(!requests.is_open());
    assert_eq!(requests.queue.front().map(|next| next.kind), Some(RequestKind::Taxi));
    let aircraft = app.world().get::<Aircraft>(entity).expect("aircraft exists");
    assert_eq!(aircraft.can_send_at, Duration::from_secs(201));
    assert_eq!(last_reply(&app).as_deref(), Some("Pushback our discretion, will call for taxi"));
}

#[test]
fn discretion_onto_taxiway_is_a_mistake() {
    let mut app = app();
    let entity = readback_with_pushback_queued(&mut app, "G1");

    say(&mut app, "DAL1 portland ground readback correct pushback at your discretion");

    assert_eq!(phraseology(&app), [PhraseologyKind::PushbackKeyword]);
    assert_eq!(status(&app, entity), Status::ClearedIfr);
    assert_eq!(requests(&app, entity).queue.front().map(|next| next.kind), Some(RequestKind::Pushback));
}

#[test]
fn discretion_readback_does_not_review_clearance_again() {
    let mut app = app();
    let clearance = AircraftRequest {
        next_status: Some(Status::ClearedIfr),
        subsequent: Some(Box::new(AircraftRequest {
            next_request_delay: Duration::from_secs(100),
            ..AircraftRequest::new(RequestKind::ReadbackIfr, 1)
        })),
        ..AircraftRequest::new(RequestKind::ClearanceIfr, 1)
    };
    let entity = spawn(&mut app, "G3", Status::Ramp, Some(clearance));
    app.world_mut()
        .get_mut::<Requests>(entity)
        .expect("aircraft has requests")
        .queue
        .push_back(AircraftRequest::new(RequestKind::Pushback, 1));

    assert!(schedule::complete_request(app.world_mut(), "DAL1", true));
    let reviewed = app.world().resource::<MistakeLog>().procedural().len();
    assert!(reviewed > 0, "blank flight plan has clearance mistakes");
    assert_eq!(requests(&app, entity).open.as_ref().map(|open| open.kind), Some(RequestKind::ReadbackIfr));

    say(&mut app, "DAL1 portland ground readback correct pushback at your discretion");

    assert_eq!(status(&app, entity), Status::PushbackDiscretion);
    assert_eq!(app.world().resource::<MistakeLog>().procedural().len(), reviewed);
}
