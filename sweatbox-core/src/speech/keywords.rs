//! Phrase templates that controller transmissions are matched against.

use store::Facility;

use crate::phonetic;
use crate::sim::aircraft::{Aircraft, FlightPlan, RouteType, Status};
use crate::sim::request::RequestKind;

#[cfg(test)]
mod tests;

/// A phrase that must appear in a transmission.
#[derive(Debug, Clone)]
pub struct Phrase {
    pub phrase:  String,
    /// Names the missing element when asking the controller to repeat.
    pub missing: Option<String>,
}

impl Phrase {
    fn new(phrase: impl Into<String>) -> Self { Self { phrase: phrase.into(), missing: None } }

    fn missing(phrase: impl Into<String>, missing: impl Into<String>) -> Self {
        Self { phrase: phrase.into(), missing: Some(missing.into()) }
    }
}

/// What the aircraft says when an alternative template matches.
#[derive(Debug, Clone)]
pub struct Response {
    pub text:     String,
    /// Spoken form, if it differs from the text.
    pub phonetic: Option<String>,
}

/// A matching contract for a transmission.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// Every phrase must be present.
    pub required:        Vec<Phrase>,
    /// If not empty, at least one of these must be present.
    pub at_least_one_of: Vec<String>,
    /// Templates tried when this one does not match,
    /// answered without completing the request.
    pub alternatives:    Vec<Template>,
    /// `None` acknowledges silently.
    pub response:        Option<Response>,
    /// The template only applies to aircraft in this status.
    pub required_status: Option<Status>,
}

impl Template {
    fn new(required: impl IntoIterator<Item = Phrase>) -> Self {
        Self { required: required.into_iter().collect(), ..Self::default() }
    }

    fn any_of<'a>(mut self, phrases: impl IntoIterator<Item = &'a str>) -> Self {
        self.at_least_one_of = phrases.into_iter().map(String::from).collect();
        self
    }

    fn respond(mut self, text: impl Into<String>) -> Self {
        self.response = Some(Response { text: text.into(), phonetic: None });
        self
    }

    fn respond_spoken(mut self, text: impl Into<String>, phonetic: impl Into<String>) -> Self {
        self.response = Some(Response { text: text.into(), phonetic: Some(phonetic.into()) });
        self
    }

    fn alternative(mut self, alternative: Template) -> Self {
        self.alternatives.push(alternative);
        self
    }

    /// Whether the at-least-one-of group is satisfied by `transcript`.
    #[must_use]
    pub fn any_of_matches(&self, transcript: &str) -> bool {
        self.at_least_one_of.is_empty()
            || self.at_least_one_of.iter().any(|phrase| transcript.contains(phrase.as_str()))
    }

    /// Whether a single transmission satisfies the whole template.
    #[must_use]
    pub fn matches(&self, transcript: &str, status: Status) -> bool {
        self.required_status.is_none_or(|required| required == status)
            && self.required.iter().all(|phrase| transcript.contains(phrase.phrase.as_str()))
            && self.any_of_matches(transcript)
    }

    /// The first alternative that matches `transcript`.
    #[must_use]
    pub fn matching_alternative(&self, transcript: &str, status: Status) -> Option<&Template> {
        self.alternatives.iter().find(|alternative| alternative.matches(transcript, status))
    }
}

/// The spoken prefix of a frequency, e.g. `119` for `119.75`.
#[must_use]
pub fn frequency_marker(frequency: &str) -> &str {
    frequency.split('.').next().unwrap_or(frequency)
}

fn ready(response: &str) -> Template { Template::default().any_of(["advise", "ready"]).respond(response) }

/// The template a transmission must satisfy to complete a request of `kind`.
#[must_use]
pub fn for_request(kind: RequestKind, facility: &Facility) -> Template {
    let runway = || Phrase::missing(format!("runway {}", facility.departure_runway), "departure runway");
    let departure = || {
        Phrase::missing(frequency_marker(&facility.departure_frequency), "departure frequency")
    };
    let squawk = || Phrase::missing("squawk", "squawk");

    match kind {
        RequestKind::ClearanceIfr => Template::new([
            Phrase::missing("clear", "clearance limit"),
            Phrase::missing("maintain", "altitude"),
            departure(),
            squawk(),
        ])
        .alternative(Template::default().any_of(["request"]))
        .alternative(Template::default().any_of(["advise", "ready", "copy"]).respond("Ready to copy")),
        RequestKind::ReadbackIfr => Template::new([
            Phrase::missing("readback", "was our readback correct?"),
            Phrase::missing("correct", "was our readback correct?"),
        ]),
        RequestKind::ClearanceVfr => {
            Template::new([Phrase::missing("maintain", "altitude"), departure(), squawk()])
        }
        RequestKind::ReadbackVfr | RequestKind::Taxi => {
            Template::new([Phrase::new("taxi"), runway()]).alternative(ready("Ready to taxi"))
        }
        RequestKind::Pattern => Template::new([Phrase::new("taxi"), runway(), squawk()])
            .alternative(ready("Ready to taxi")),
        RequestKind::Pushback => Template::new([Phrase::new("push")])
            .any_of(["approved", "discretion", "risk"])
            .alternative(ready("Ready for pushback"))
            .alternative(Template::new([Phrase::new("hold")]).respond("Holding position")),
        RequestKind::Handoff => {
            let tower = frequency_marker(&facility.tower_frequency);
            Template::new([
                Phrase::new("contact"),
                Phrase::new("tower"),
                Phrase::missing(tower, "tower frequency"),
            ])
            .alternative(
                Template::new([
                    Phrase::new("monitor"),
                    Phrase::new("tower"),
                    Phrase::missing(tower, "tower frequency"),
                ])
                .respond_spoken(
                    format!("Monitor tower {}", facility.tower_frequency),
                    format!("Monitor tower {}", phonetic::frequency(&facility.tower_frequency)),
                ),
            )
        }
    }
}

/// Questions any aircraft on frequency answers, regardless of its open request.
#[must_use]
pub fn global_alternatives(aircraft: &Aircraft, plan: &FlightPlan, facility: &Facility) -> Vec<Template> {
    let information = format!("We have information {}", phonetic::atis(facility.atis));
    let mut templates = vec![
        Template::new([Phrase::new("radio"), Phrase::new("check")]).respond("I read you loud and clear"),
        Template::new([Phrase::new("aircraft type")])
            .respond(format!("Our aircraft is type {}", aircraft.actual_type)),
    ];
    for verb in ["verify", "confirm", "say"] {
        templates.push(
            Template::new([Phrase::new(verb)]).any_of(["atis", "information"]).respond(&information),
        );
    }
    templates.push(Template::new([Phrase::new("standby")]));

    let direction = plan.direction.as_deref().unwrap_or_default();
    let altitude = plan.requested_altitude.as_deref().unwrap_or_default();
    match plan.route_type {
        RouteType::Vfr | RouteType::VfrFollowing => {
            let following =
                if plan.route_type == RouteType::VfrFollowing { " with flight following" } else { "" };
            let departing = format!("We are departing to the {direction}{following}");
            let planning = format!("We are planning {altitude} feet");
            for (topics, response) in
                [(&["direction", "destination"][..], &departing), (&["altitude"][..], &planning)]
            {
                for verb in ["say", "repeat"] {
                    templates.push(
                        Template::new([Phrase::new(verb)]).any_of(topics.iter().copied()).respond(response),
                    );
                }
            }
            templates.push(Template::new([Phrase::new("intentions")]).respond(format!(
                "Requesting VFR departure to the {direction} at {altitude}{following}"
            )));
            templates.push(Template::new([Phrase::new("flight following")]).respond(
                if following.is_empty() {
                    "Negative flight following"
                } else {
                    "Affirmative, request flight following"
                },
            ));
        }
        RouteType::Pattern => templates.push(
            Template::new([Phrase::new("intentions")]).respond("Requesting taxi for pattern work"),
        ),
        RouteType::Tec | RouteType::High => {}
    }

    templates.push(Template {
        required_status: Some(Status::Pushback),
        ..Template::default()
            .any_of(["advise", "ready"])
            .respond("We'll call for taxi in a minute or two")
    });
    templates
}
