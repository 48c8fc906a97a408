//! Portland International Jetport (KPWM) ground.

use std::collections::HashMap;

use store::{
    Facility, Meta, ParkingSpot, Point, PrefRoute, PrefRouteType, SpotKind, Tables,
    TaxiInstruction, Taxiway, TaxiwayNode,
};

use crate::common_types;

#[must_use]
pub fn file() -> store::File {
    store::File {
        meta:          Meta {
            id:          "sweatbox.kpwm".into(),
            title:       "Portland ground".into(),
            description: "Departure flow on runway 29 at Portland International Jetport".into(),
            authors:     vec!["sweatbox contributors".into()],
            tags:        HashMap::from([("airport".into(), "KPWM".into())]),
        },
        facility:      facility(),
        taxiway:       taxiway(),
        parking_spots: parking_spots(),
        tables:        Tables {
            destinations:             common_types::destinations(),
            altitudes:                common_types::altitudes(),
            jet:                      common_types::jet_category(),
            tec:                      common_types::tec_category(),
            ga:                       common_types::ga_category(),
            tec_restricted_equipment: common_types::restricted_tec_equipment(),
            jet_required_equipment:   "L".into(),
            airlines:                 common_types::airlines(),
            vfr_destinations:         ["KAUG", "KBGR", "KIZG", "KLEW", "KPSM", "KRKD", "KSFM"]
                .into_iter()
                .map(String::from)
                .collect(),
            departure_directions:     ["north", "northeast", "northwest", "west", "southwest"]
                .into_iter()
                .map(String::from)
                .collect(),
        },
        pref_routes:   pref_routes(),
    }
}

fn facility() -> Facility {
    Facility {
        airport:             "KPWM".into(),
        ground_name:         "Portland ground".into(),
        ground_station:      "PWM_GND".into(),
        tower_station:       "PWM_TWR".into(),
        atis:                'C',
        departure_runway:    "29".into(),
        departure_frequency: "119.75".into(),
        tower_frequency:     "120.9".into(),
        vfr_apron:           "north apron".into(),
        vfr_altitude_limit:  2500,
        departure_strip_box: "B".into(),
        default_taxi:        TaxiInstruction {
            text:     "Runway 29, taxi via A, cross runway 36".into(),
            phonetic: "runway two niner, taxi via alpha, cross runway three six".into(),
        },
        vfr_taxi:            TaxiInstruction {
            text:     "Runway 29, taxi via C, A, cross runway 36".into(),
            phonetic: "runway two niner, taxi via charlie, alpha, cross runway three six".into(),
        },
    }
}

/// Taxiway A runs west along the terminal to the runway 29 hold short line,
/// crossing runway 36 between A3 and A2.
/// Taxiway C connects the north apron, taxiway B connects the east ramp.
fn taxiway() -> Taxiway {
    let node = |id: &str, x: f32, y: f32, edges: &[&str]| TaxiwayNode {
        id:       id.into(),
        position: Point::new(x, y),
        edges:    edges.iter().map(|&edge| edge.into()).collect(),
    };

    Taxiway {
        nodes:    vec![
            node("END", 2.0, 12.0, &[]),
            node("A1", 6.0, 12.0, &["END"]),
            node("A2", 12.0, 12.0, &["A1"]),
            node("A3", 18.0, 12.0, &["A2"]),
            node("A4", 24.0, 12.0, &["A3"]),
            node("A5", 30.0, 12.0, &["A4"]),
            node("C1", 34.0, 18.0, &["A5"]),
            node("C2", 34.0, 24.0, &["C1"]),
            node("B1", 38.0, 12.0, &["A5"]),
            node("B2", 42.0, 10.0, &["B1"]),
        ],
        terminal: "END".into(),
    }
}

fn parking_spots() -> Vec<ParkingSpot> {
    let gate = |number: u32, x: f32, airline: &str, into_ramp: bool| ParkingSpot {
        id:                 format!("G{number}"),
        kind:               SpotKind::Airline,
        position:           Point::new(x, 18.0),
        rotation:           270.0,
        location:           number.to_string(),
        pushback_into_ramp: into_ramp,
        pushback_location:  Point::new(x, if into_ramp { 16.5 } else { 15.0 }),
        airline:            Some(airline.into()),
        taxi_instruction:   None,
    };
    let tec = |id: &str, x: f32, airline: Option<&str>| ParkingSpot {
        id:                 id.into(),
        kind:               SpotKind::Tec,
        position:           Point::new(x, 8.0),
        rotation:           180.0,
        location:           "the east ramp".into(),
        pushback_into_ramp: false,
        pushback_location:  Point::new(x, 8.0),
        airline:            airline.map(String::from),
        taxi_instruction:   Some(TaxiInstruction {
            text:     "Runway 29, taxi via B, A, cross runway 36".into(),
            phonetic: "runway two niner, taxi via bravo, alpha, cross runway three six".into(),
        }),
    };
    let apron = |number: u32, y: f32| ParkingSpot {
        id:                 format!("N{number}"),
        kind:               SpotKind::Ga,
        position:           Point::new(37.0, y),
        rotation:           180.0,
        location:           "the north apron".into(),
        pushback_into_ramp: false,
        pushback_location:  Point::new(37.0, y),
        airline:            None,
        taxi_instruction:   None,
    };

    vec![
        gate(1, 14.0, "DAL", false),
        gate(2, 17.0, "UAL", false),
        gate(3, 20.0, "AAL", true),
        gate(4, 23.0, "JBU", false),
        gate(5, 26.0, "SWA", true),
        gate(6, 29.0, "EDV", false),
        tec("E1", 40.0, Some("KAP")),
        tec("E2", 43.0, None),
        apron(1, 22.0),
        apron(2, 25.0),
        apron(3, 28.0),
    ]
}

/// A small snapshot of the preferred-route database for offline use.
fn pref_routes() -> Vec<PrefRoute> {
    let route = |destination: &str, kind: PrefRouteType, seq: u32, route: &str| PrefRoute {
        origin: "PWM".into(),
        destination: destination.into(),
        kind,
        route: route.into(),
        seq,
        altitude: None,
        aircraft: None,
        area: None,
        d_artcc: Some("ZBW".into()),
        a_artcc: None,
        flow: None,
        hours1: None,
        hours2: None,
        hours3: None,
    };

    vec![
        route("BOS", PrefRouteType::Tec, 1, "PWM PSM V106 BOS"),
        route("BED", PrefRouteType::Tec, 1, "PWM PSM V106 LWM BED"),
        route("MHT", PrefRouteType::Tec, 1, "PWM ENE V106 MHT"),
        route("PVD", PrefRouteType::Tec, 1, "PWM PSM V106 LWM V16 PVD"),
        route("BGR", PrefRouteType::Tec, 1, "PWM V3 AUG V3 BGR"),
        route("JFK", PrefRouteType::H, 1, "PWM ENE J573 TOLDO RBV JFK"),
        route("LGA", PrefRouteType::H, 1, "PWM ENE J573 TOLDO J55 BDR LGA"),
        route("EWR", PrefRouteType::H, 1, "PWM ENE J573 TOLDO PARCH EWR"),
        route("PHL", PrefRouteType::H, 1, "PWM ENE J573 TOLDO J55 ARD PHL"),
        route("DCA", PrefRouteType::H, 1, "PWM ENE J573 TOLDO J55 SIE J209 DCA"),
        route("ORD", PrefRouteType::H, 1, "PWM BML Q822 GONZZ Q29 DORET ORD"),
        route("ATL", PrefRouteType::H, 1, "PWM ENE J573 TOLDO J209 SBY ATL"),
        route("ATL", PrefRouteType::H, 2, "PWM ENE J573 TOLDO J121 SIE ATL"),
        route("PQI", PrefRouteType::H, 1, "PWM BGR J55 PQI"),
    ]
}
