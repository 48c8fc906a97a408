use bevy::app::App;
use bevy::ecs::system::Command;

use super::{Annotation, Bay, Bays, RequestStrip, StripKind};
use std::time::Duration;

use crate::sim::aircraft::{Aircraft, FlightPlan, RouteType, Voice};

fn plan(callsign: &str) -> FlightPlan {
    FlightPlan { print_count: 1, created: true, ..FlightPlan::blank(callsign, RouteType::High) }
}

#[test]
fn moved_strip_goes_to_end_of_bay() {
    let mut bays = Bays::default();
    let first = bays.print_flight_plan(&plan("DAL1"));
    let second = bays.print_flight_plan(&plan("DAL2"));
    let blank = bays.print_blank();

    assert!(bays.move_to(first, Bay::Ground));
    assert!(bays.move_to(second, Bay::Ground));
    assert!(bays.move_to(first, Bay::Ground));

    let ground: Vec<_> = bays.in_bay(Bay::Ground).map(|strip| strip.id).collect();
    assert_eq!(ground, [second, first]);
    let printer: Vec<_> = bays.in_bay(Bay::Printer).map(|strip| strip.id).collect();
    assert_eq!(printer, [blank]);
}

#[test]
fn only_flight_strips_are_annotated() {
    let mut bays = Bays::default();
    let flight = bays.print_flight_plan(&plan("DAL1"));
    let blank = bays.print_blank();

    assert!(bays.annotate(flight, Annotation::Box10, "B"));
    assert!(bays.annotate(flight, Annotation::Box12, "C"));
    assert!(!bays.annotate(blank, Annotation::Box10, "B"));

    assert!(bays.move_to(flight, Bay::Local));
    let strip = bays.find_flight(Bay::Local, "DAL1").expect("strip moved to local bay");
    assert_eq!((strip.box10.as_str(), strip.box12.as_str()), ("B", "C"));
    assert!(bays.find_flight(Bay::Printer, "DAL1").is_none());
}

#[test]
fn removed_strip_is_gone() {
    let mut bays = Bays::default();
    let id = bays.add_divider(Bay::Ground, "Departures", false);
    assert!(bays.toggle_offset(id));
    assert!(bays.get(id).is_some_and(|strip| strip.offset));

    let removed = bays.remove(id).expect("strip exists");
    assert!(matches!(removed.kind, StripKind::Divider(name) if name == "Departures"));
    assert!(bays.remove(id).is_none());
}

#[test]
fn requested_strip_counts_reprint() {
    let mut app = App::new();
    app.init_resource::<Bays>();
    let voice = Voice { slot: 0, pitch: 1.0 };
    app.world_mut().spawn((Aircraft::new("DAL1", "B738", "G1", voice, Duration::ZERO), plan("DAL1")));

    RequestStrip { callsign: "DAL1".into() }.apply(app.world_mut());

    let mut query = app.world_mut().query::<&FlightPlan>();
    let printed = query.single(app.world()).expect("one aircraft").print_count;
    assert_eq!(printed, 2);

    let bays = app.world().resource::<Bays>();
    let strip = bays.find_flight(Bay::Printer, "DAL1").expect("strip printed");
    assert_eq!(strip.plan.print_count, 2);
}
