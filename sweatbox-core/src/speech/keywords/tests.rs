use std::time::Duration;

use super::{for_request, frequency_marker, global_alternatives};
use crate::sim::aircraft::{Aircraft, FlightPlan, RouteType, Status, Voice};
use crate::sim::request::RequestKind;

fn facility() -> store::Facility { maps::portland::file().facility }

#[test]
fn clearance_requires_every_craft_element() {
    let template = for_request(RequestKind::ClearanceIfr, &facility());
    let full = "DAL1 cleared to the boston airport as filed maintain 5000 departure 119.75 squawk 4321";
    assert!(template.matches(full, Status::Ramp));
    assert!(!template.matches("DAL1 cleared to the boston airport as filed squawk 4321", Status::Ramp));

    let ready = template.matching_alternative("DAL1 advise ready to copy", Status::Ramp);
    assert_eq!(
        ready.and_then(|alternative| alternative.response.as_ref()).map(|response| response.text.as_str()),
        Some("Ready to copy"),
    );
    let silent = template.matching_alternative("DAL1 request received", Status::Ramp);
    assert!(silent.is_some_and(|alternative| alternative.response.is_none()));
}

#[test]
fn pushback_needs_one_approval_word() {
    let template = for_request(RequestKind::Pushback, &facility());
    assert!(template.matches("DAL1 pushback approved", Status::ClearedIfr));
    assert!(template.matches("DAL1 pushback at your discretion", Status::ClearedIfr));
    assert!(!template.matches("DAL1 pushback", Status::ClearedIfr));
}

#[test]
fn handoff_accepts_monitor_as_alternative() {
    let template = for_request(RequestKind::Handoff, &facility());
    assert!(template.matches("DAL1 contact tower 120.9", Status::AwaitingHandoff));

    let monitor = template
        .matching_alternative("DAL1 monitor tower 120.9", Status::AwaitingHandoff)
        .and_then(|alternative| alternative.response.clone())
        .expect("monitor is answered");
    assert_eq!(monitor.text, "Monitor tower 120.9");
    assert_eq!(monitor.phonetic.as_deref(), Some("Monitor tower one two zero point niner"));
}

#[test]
fn missing_prompts_name_the_element() {
    let template = for_request(RequestKind::Taxi, &facility());
    let prompts: Vec<_> = template.required.iter().filter_map(|phrase| phrase.missing.as_deref()).collect();
    assert_eq!(prompts, ["departure runway"]);
    assert_eq!(template.required[1].phrase, "runway 29");
    assert_eq!(frequency_marker("119.75"), "119");
}

#[test]
fn global_alternatives_depend_on_flight() {
    let aircraft = Aircraft::new("N19K", "C172", "E2", Voice { slot: 0, pitch: 1.0 }, Duration::ZERO);
    let plan = FlightPlan {
        direction: Some("northwest".into()),
        requested_altitude: Some("4500".into()),
        ..FlightPlan::blank("N19K", RouteType::VfrFollowing)
    };
    let templates = global_alternatives(&aircraft, &plan, &facility());

    let answer = |transcript: &str, status: Status| {
        templates
            .iter()
            .find(|template| template.matches(transcript, status))
            .and_then(|template| template.response.as_ref())
            .map(|response| response.text.clone())
    };
    assert_eq!(answer("N19K say altitude", Status::Ramp).as_deref(), Some("We are planning 4500 feet"));
    assert_eq!(
        answer("N19K say direction", Status::Ramp).as_deref(),
        Some("We are departing to the northwest with flight following"),
    );
    assert_eq!(answer("N19K aircraft type", Status::Ramp).as_deref(), Some("Our aircraft is type C172"));
    assert_eq!(answer("N19K verify information c", Status::Ramp).as_deref(), Some("We have information Charlie"));
    assert_eq!(answer("N19K advise ready", Status::Ramp), None);
    assert_eq!(
        answer("N19K advise ready", Status::Pushback).as_deref(),
        Some("We'll call for taxi in a minute or two"),
    );
}
