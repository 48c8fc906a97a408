//! Procedural and phraseology review.
//!
//! Rules are plain functions that append to a [`MistakeLog`].
//! Mistakes are feedback only: they never block the workflow,
//! and recorded entries are never modified, merged or removed.

use bevy::app::{App, Plugin};
use bevy::ecs::resource::Resource;
use enum_map::EnumMap;
use itertools::Itertools;

use super::aircraft::{FlightPlan, RouteType};
use super::reference::{PrefRoutes, Reference};
use super::request::{AircraftRequest, RequestKind};
use super::strip::FlightStrip;


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.init_resource::<MistakeLog>(); }
}

/// Violations of facility procedures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_map::Enum, strum::EnumIter)]
pub enum MistakeKind {
    /// Departure strip box 10 or box 12 not filled correctly.
    StripBox,
    /// Filed route does not match any preferred route.
    BadRoute,
    /// IFR altitude not written as three digits in hundreds of feet.
    IfrAltFormat,
    /// IFR altitude not valid for the direction of flight.
    BadIfrAlt,
    /// Equipment suffix impossible for the aircraft type.
    BadEquipment,
    /// Strip not passed to tower after handoff.
    StripHandoff,
    /// Aircraft reached the runway before being handed to tower.
    AircraftHandoff,
    /// IFR readback not confirmed in time.
    ReadbackIfr,
    /// VFR aircraft not given taxi in time after its readback.
    TaxiVfr,
    /// VFR altitude not written as `VFR/` and three digits ending in 5.
    VfrAltFormat,
    /// VFR altitude differs from the requested altitude.
    BadVfrAlt,
    /// VFR flight plan filed with a different aircraft type.
    BadVfrAircraft,
    /// Flight following remark missing or extraneous.
    BadVfrFf,
}

impl MistakeKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::StripBox => "Strip Boxes",
            Self::BadRoute => "Incorrect Route",
            Self::IfrAltFormat => "IFR Altitude Format",
            Self::BadIfrAlt => "Incorrect IFR Altitude",
            Self::BadEquipment => "Incorrect Equipment Suffix",
            Self::StripHandoff => "vStrips Coordination",
            Self::AircraftHandoff => "Aircraft Handoff",
            Self::ReadbackIfr => "IFR Readback",
            Self::TaxiVfr => "VFR Taxi",
            Self::VfrAltFormat => "VFR Altitude Format",
            Self::BadVfrAlt => "Incorrect VFR Altitude",
            Self::BadVfrAircraft => "Incorrect VFR Aircraft Type",
            Self::BadVfrFf => "VFR Flight Following Remarks",
        }
    }

    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::StripBox => {
                "Departure strips must show the departure mark in box 10 and the current ATIS in \
                 box 12."
            }
            Self::BadRoute => "IFR routes must match a preferred route to the destination.",
            Self::IfrAltFormat => {
                "IFR altitudes are three digits in hundreds of feet, e.g. 240 or 080."
            }
            Self::BadIfrAlt => {
                "Westbound flights cruise at even altitudes, eastbound flights at odd altitudes."
            }
            Self::BadEquipment => {
                "Jets must file /L, turboprops on TEC routes must file an RNAV-capable suffix."
            }
            Self::StripHandoff => "Pass the strip to the local bay when handing off to tower.",
            Self::AircraftHandoff => {
                "Hand aircraft to tower before they reach the runway hold short line."
            }
            Self::ReadbackIfr => "Confirm IFR readbacks promptly.",
            Self::TaxiVfr => "Issue taxi promptly after a VFR readback.",
            Self::VfrAltFormat => "VFR altitudes are written as VFR/ and three digits, e.g. VFR/045.",
            Self::BadVfrAlt => "The VFR altitude must match the altitude the pilot requested.",
            Self::BadVfrAircraft => "The filed type must match the aircraft type the pilot reported.",
            Self::BadVfrFf => "Write FF in the remarks if and only if flight following was requested.",
        }
    }

    #[must_use]
    pub fn reference(self) -> &'static str {
        match self {
            Self::StripBox => "General SOP 5.16",
            Self::BadRoute => "General SOP 7.6",
            Self::IfrAltFormat => "General SOP 5.15.8",
            Self::BadIfrAlt => "ATC Handbook 3.7",
            Self::BadEquipment => "General SOP 5.13.4",
            Self::StripHandoff => "General SOP 5.16.7",
            Self::AircraftHandoff => "ATC Handbook 4.3",
            Self::ReadbackIfr => "ATC Handbook 3.8.2",
            Self::TaxiVfr => "ATC Handbook 3.12.3",
            Self::VfrAltFormat | Self::BadVfrAlt => "General SOP 5.15.7.3",
            Self::BadVfrAircraft => "General SOP 5.15.7.1",
            Self::BadVfrFf => "General SOP 5.15.7.4",
        }
    }
}

/// Violations of radio phraseology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, enum_map::Enum, strum::EnumIter)]
pub enum PhraseologyKind {
    /// First transmission to an aircraft did not identify the ground position.
    ForgotToIdentify,
    /// Said "decimal" instead of "point".
    UsedDecimal,
    /// Taxi instruction omitted the runway crossing.
    ForgotCrossing,
    /// Said "taxi to runway".
    TaxiToRunway,
    /// Used "approved" for a pushback into the ramp or "discretion" onto a taxiway.
    PushbackKeyword,
    /// VFR readback not confirmed.
    VfrForgotReadback,
    /// Clearance limit not stated as an airport.
    ClearanceLimitAirport,
    /// Clearance elements not in CRAFT order.
    CraftOrder,
}

impl PhraseologyKind {
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::ForgotToIdentify => "Identify Position",
            Self::UsedDecimal => "Decimal",
            Self::ForgotCrossing => "Runway Crossing",
            Self::TaxiToRunway => "Taxi To Runway",
            Self::PushbackKeyword => "Pushback Phraseology",
            Self::VfrForgotReadback => "VFR Readback",
            Self::ClearanceLimitAirport => "Clearance Limit",
            Self::CraftOrder => "CRAFT Order",
        }
    }

    #[must_use]
    pub fn summary(self) -> &'static str {
        match self {
            Self::ForgotToIdentify => "Identify your position on first contact with an aircraft.",
            Self::UsedDecimal => "Say \"point\", not \"decimal\", in frequencies.",
            Self::ForgotCrossing => "Taxi instructions must include every runway crossing.",
            Self::TaxiToRunway => "Say \"runway 29, taxi via\", not \"taxi to runway\".",
            Self::PushbackKeyword => {
                "Pushback into the ramp is at pilot discretion, pushback onto a taxiway is approved."
            }
            Self::VfrForgotReadback => "Confirm a VFR readback with \"readback correct\".",
            Self::ClearanceLimitAirport => "State the clearance limit as \"<name> airport\".",
            Self::CraftOrder => {
                "Issue clearance limit, route, altitude, frequency and transponder in that order."
            }
        }
    }

    #[must_use]
    pub fn reference(self) -> &'static str {
        match self {
            Self::ForgotToIdentify => "FAA JO 7110.65 2-4-8",
            Self::UsedDecimal => "FAA JO 7110.65 2-4-17.k",
            Self::ForgotCrossing => "ATC Handbook 4.9.2",
            Self::TaxiToRunway => "ATC Handbook 4.7.2",
            Self::PushbackKeyword => "ATC Handbook 4.6",
            Self::VfrForgotReadback => "ATC Handbook 3.12.2",
            Self::ClearanceLimitAirport => "FAA JO 7110.65 4-3-2.b(1)",
            Self::CraftOrder => "ATC Handbook 3.3.1",
        }
    }
}

/// A recorded mistake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<K> {
    pub kind:      K,
    pub details:   Option<String>,
    pub secondary: Option<String>,
}

pub type Mistake = Record<MistakeKind>;
pub type PhraseologyMistake = Record<PhraseologyKind>;

/// Append-only log of all mistakes in the session.
#[derive(Debug, Default, Resource)]
pub struct MistakeLog {
    procedural:         Vec<Mistake>,
    phraseology:        Vec<PhraseologyMistake>,
    unseen_procedural:  EnumMap<MistakeKind, u32>,
    unseen_phraseology: EnumMap<PhraseologyKind, u32>,
}

impl MistakeLog {
    pub fn add(&mut self, kind: MistakeKind, details: Option<String>, secondary: Option<String>) {
        bevy::log::info!("Mistake {kind:?}: {details:?} {secondary:?}");
        self.unseen_procedural[kind] += 1;
        self.procedural.push(Record { kind, details, secondary });
    }

    pub fn add_phraseology(
        &mut self,
        kind: PhraseologyKind,
        details: Option<String>,
        secondary: Option<String>,
    ) {
        bevy::log::info!("Phraseology mistake {kind:?}: {details:?} {secondary:?}");
        self.unseen_phraseology[kind] += 1;
        self.phraseology.push(Record { kind, details, secondary });
    }

    #[must_use]
    pub fn procedural(&self) -> &[Mistake] { &self.procedural }

    #[must_use]
    pub fn phraseology(&self) -> &[PhraseologyMistake] { &self.phraseology }

    /// Kinds recorded since the last call, with their counts.
    pub fn take_unseen(
        &mut self,
    ) -> (Vec<(MistakeKind, u32)>, Vec<(PhraseologyKind, u32)>) {
        let procedural = self.unseen_procedural.iter().filter(|&(_, &n)| n > 0).map(|(k, &n)| (k, n)).collect();
        let phraseology = self.unseen_phraseology.iter().filter(|&(_, &n)| n > 0).map(|(k, &n)| (k, n)).collect();
        self.unseen_procedural = EnumMap::default();
        self.unseen_phraseology = EnumMap::default();
        (procedural, phraseology)
    }
}

/// Checks run when an IFR clearance is read back correctly.
pub fn review_clearance(
    log: &mut MistakeLog,
    plan: &FlightPlan,
    actual_type: &str,
    reference: &Reference,
) {
    validate_altitude(log, plan, reference);
    validate_equipment(log, plan, actual_type, reference);
    validate_route(log, plan, &reference.routes);
}

pub fn validate_altitude(log: &mut MistakeLog, plan: &FlightPlan, reference: &Reference) {
    let altitude = plan.altitude.as_str();
    let well_formed = altitude.len() == 3
        && altitude.bytes().all(|byte| byte.is_ascii_digit())
        && altitude.parse::<u32>().is_ok_and(|value| value % 10 == 0);
    if !well_formed {
        log.add(MistakeKind::IfrAltFormat, Some(altitude.into()), None);
        return;
    }

    let Some(destination) = reference.tables.destinations.get(&plan.destination) else { return };
    let altitudes = &reference.tables.altitudes;
    let (valid, secondary) = match plan.route_type {
        RouteType::High => (altitudes.high.get(destination.direction), plan.destination.clone()),
        RouteType::Tec => {
            (altitudes.tec.get(destination.direction), format!("{}(TEC Route)", plan.destination))
        }
        _ => return,
    };
    if !valid.iter().any(|valid| valid == altitude) {
        log.add(MistakeKind::BadIfrAlt, Some(altitude.into()), Some(secondary));
    }
}

pub fn validate_equipment(
    log: &mut MistakeLog,
    plan: &FlightPlan,
    actual_type: &str,
    reference: &Reference,
) {
    let tables = &reference.tables;
    let is_jet = tables.jet.types.iter().any(|ty| ty == actual_type);
    if is_jet && plan.equipment != tables.jet_required_equipment {
        log.add(MistakeKind::BadEquipment, Some(plan.equipment.clone()), Some(actual_type.into()));
    }

    let is_tec = tables.tec.types.iter().any(|ty| ty == actual_type);
    if is_tec && tables.tec_restricted_equipment.contains(&plan.equipment) {
        log.add(MistakeKind::BadEquipment, Some(plan.equipment.clone()), Some(actual_type.into()));
    }
}

/// The filed route must equal the filed form of some preferred route to the destination.
/// Destinations without any preferred route are not checked.
pub fn validate_route(log: &mut MistakeLog, plan: &FlightPlan, routes: &PrefRoutes) {
    let mut candidates = routes.to_destination(&plan.destination).peekable();
    if candidates.peek().is_none() {
        return;
    }

    let filed = plan.route.trim();
    if !candidates.any(|route| route.filed_route() == filed) {
        log.add(MistakeKind::BadRoute, Some(plan.route.clone()), Some(plan.destination.clone()));
    }
}

/// Checks run when a VFR departure is handed to tower.
pub fn review_vfr_departure(log: &mut MistakeLog, plan: &FlightPlan, actual_type: &str) {
    if plan.aircraft_type != actual_type {
        log.add(
            MistakeKind::BadVfrAircraft,
            Some(plan.aircraft_type.clone()),
            Some(format!("{}({actual_type})", plan.callsign)),
        );
    }

    review_vfr_altitude(log, plan);

    let remarks_ff = plan.remarks.to_uppercase().contains("FF");
    let bad_remarks = match plan.route_type {
        RouteType::VfrFollowing => !remarks_ff,
        RouteType::Vfr => remarks_ff,
        _ => false,
    };
    if bad_remarks {
        log.add(MistakeKind::BadVfrFf, Some(plan.remarks.clone()), Some(plan.callsign.clone()));
    }
}

fn review_vfr_altitude(log: &mut MistakeLog, plan: &FlightPlan) {
    let altitude = plan.altitude.as_str();
    let well_formed = altitude.len() == 7
        && altitude.strip_prefix("VFR/").is_some_and(|digits| {
            digits.bytes().all(|byte| byte.is_ascii_digit()) && digits.ends_with('5')
        });
    if !well_formed {
        log.add(MistakeKind::VfrAltFormat, Some(altitude.into()), None);
        return;
    }

    let Some(requested) = &plan.requested_altitude else { return };
    let expected = requested.parse::<u32>().ok().map(|feet| format!("VFR/{:03}", feet / 100));
    if expected.as_deref() != Some(altitude) {
        log.add(
            MistakeKind::BadVfrAlt,
            Some(altitude.into()),
            Some(format!("{}(requested {requested})", plan.callsign)),
        );
    }
}

/// Checks applied to every interpreted transmission.
pub fn review_general_phraseology(log: &mut MistakeLog, transcript: &str) {
    if transcript.contains("decimal") {
        log.add_phraseology(PhraseologyKind::UsedDecimal, Some(transcript.into()), None);
    }
}

/// Facts about the aircraft needed to review a completed request.
pub struct RequestContext<'a> {
    pub callsign:           &'a str,
    /// Pushback geometry of the aircraft's parking spot, if known.
    pub pushback_into_ramp: Option<bool>,
    /// The spoken prefix of the departure frequency, e.g. `119`.
    pub frequency_marker:   &'a str,
}

/// Checks applied when a transmission completes a request.
///
/// All transmissions that contributed to the request are reviewed together.
pub fn review_request_phraseology(
    log: &mut MistakeLog,
    request: &AircraftRequest,
    transcript: &str,
    context: &RequestContext,
) {
    let phrases: Vec<&str> = request
        .previous_instructions
        .iter()
        .map(String::as_str)
        .chain([transcript])
        .collect();
    let joined = || phrases.join(", ");
    let any_contains = |needle: &str| phrases.iter().any(|phrase| phrase.contains(needle));
    let callsign = Some(context.callsign.to_string());

    if matches!(request.kind, RequestKind::Taxi | RequestKind::ReadbackVfr | RequestKind::Pattern) {
        let crossing_required =
            request.response.as_ref().is_some_and(|response| response.text.contains("cross"));
        if crossing_required && !any_contains("cross") {
            log.add_phraseology(PhraseologyKind::ForgotCrossing, Some(joined()), callsign.clone());
        }

        if let Some(phrase) = phrases.iter().find(|phrase| phrase.contains("taxi to runway")) {
            log.add_phraseology(PhraseologyKind::TaxiToRunway, Some((*phrase).into()), None);
        }
    }

    if request.kind == RequestKind::ReadbackVfr && !any_contains("readback") {
        log.add_phraseology(PhraseologyKind::VfrForgotReadback, Some(joined()), callsign.clone());
    }

    if request.kind == RequestKind::Pushback {
        match context.pushback_into_ramp {
            Some(true) if !any_contains("discretion") => log.add_phraseology(
                PhraseologyKind::PushbackKeyword,
                Some(joined()),
                Some(format!("{} (into ramp)", context.callsign)),
            ),
            Some(false) if !any_contains("approved") => log.add_phraseology(
                PhraseologyKind::PushbackKeyword,
                Some(joined()),
                Some(format!("{} (onto taxiway)", context.callsign)),
            ),
            _ => {}
        }
    }

    if request.kind == RequestKind::ClearanceIfr {
        if !any_contains("airport") {
            log.add_phraseology(
                PhraseologyKind::ClearanceLimitAirport,
                Some(joined()),
                callsign.clone(),
            );
        }

        if !is_craft_ordered(&phrases, context.frequency_marker) {
            log.add_phraseology(PhraseologyKind::CraftOrder, Some(joined()), callsign);
        }
    }
}

/// Whether the clearance elements appear in CRAFT order
/// in the transmission containing the most of them.
#[must_use]
pub fn is_craft_ordered(phrases: &[&str], frequency_marker: &str) -> bool {
    let markers = ["clear", "maintain", frequency_marker, "squawk"];

    let mut best = phrases.first().copied().unwrap_or_default();
    let mut best_count = 0;
    for &phrase in phrases {
        let count = markers.iter().filter(|&&marker| phrase.contains(marker)).count();
        if count > best_count {
            best_count = count;
            best = phrase;
        }
    }

    markers
        .iter()
        .filter_map(|marker| best.find(marker))
        .tuple_windows()
        .all(|(before, after)| before <= after)
}

/// Checks the strip of a departed aircraft in the local bay.
pub fn review_departure_strip(
    log: &mut MistakeLog,
    callsign: &str,
    strip: Option<&FlightStrip>,
    reference: &Reference,
) {
    let Some(strip) = strip else { return };
    let facility = &reference.facility;
    if strip.box10 != facility.departure_strip_box || strip.box12 != facility.atis.to_string() {
        log.add(MistakeKind::StripBox, Some(callsign.into()), None);
    }
}
