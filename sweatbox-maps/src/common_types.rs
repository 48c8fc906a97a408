//! Tables shared by all built-in facilities in the northeast.

use std::collections::BTreeMap;

use store::{
    AircraftCategory, Airline, Altitudes, Destination, Direction, DirectionalAltitudes,
    SpeedRange, WeightedList,
};

#[must_use]
pub fn jet_category() -> AircraftCategory {
    AircraftCategory {
        types:     strings(["A319", "A320", "A321", "B712", "B738", "B739", "BCS3", "CRJ9", "E75L"]),
        speed:     SpeedRange { min: 390, max: 540 },
        equipment: WeightedList::usually(
            "L".into(),
            0.75,
            strings(["X", "G", "W", "P", "A", "D", "B", "T", "U"]),
        ),
        size:      1.2,
    }
}

#[must_use]
pub fn tec_category() -> AircraftCategory {
    AircraftCategory {
        types:     strings(["BE20", "C208", "C402", "PC12", "SW4"]),
        speed:     SpeedRange { min: 150, max: 200 },
        equipment: WeightedList::usually(
            "G".into(),
            0.75,
            strings(["X", "L", "W", "P", "A", "D", "B", "T", "U"]),
        ),
        size:      0.8,
    }
}

#[must_use]
pub fn ga_category() -> AircraftCategory {
    AircraftCategory {
        types:     strings(["BE36", "C152", "C172", "C182", "PA28", "PA32", "SR22"]),
        speed:     SpeedRange { min: 95, max: 160 },
        equipment: WeightedList::usually("G".into(), 0.6, strings(["U", "A"])),
        size:      0.8,
    }
}

#[must_use]
pub fn restricted_tec_equipment() -> Vec<String> {
    strings(["X", "W", "P", "A", "D", "B", "T", "U"])
}

#[must_use]
pub fn airlines() -> Vec<Airline> {
    [
        ("AAL", "American", &["american"][..]),
        ("DAL", "Delta", &["delta"]),
        ("UAL", "United", &["united"]),
        ("JBU", "JetBlue", &["jetblue", "jet blue"]),
        ("SWA", "Southwest", &["southwest", "south west"]),
        ("EDV", "Endeavor", &["endeavor", "endeavour"]),
        ("SKW", "SkyWest", &["skywest", "sky west"]),
        ("RPA", "Brickyard", &["brickyard", "brick yard"]),
        ("KAP", "Cair", &["care", "cair"]),
        ("FDX", "FedEx", &["fedex", "fed ex"]),
        ("UPS", "UPS", &["ups"]),
    ]
    .into_iter()
    .map(|(icao, telephony, spoken)| Airline {
        icao:      icao.into(),
        telephony: telephony.into(),
        spoken:    strings(spoken.iter().copied()),
    })
    .collect()
}

/// Cruise altitudes by flight level parity.
///
/// Westbound flights use even thousands, eastbound flights use odd thousands.
#[must_use]
pub fn altitudes() -> Altitudes {
    Altitudes {
        high:           DirectionalAltitudes {
            west: levels((200..=400).step_by(20)),
            east: levels((190..=410).step_by(20)),
        },
        tec:            DirectionalAltitudes {
            west: levels((40..=100).step_by(20)),
            east: levels((30..=90).step_by(20)),
        },
        spawnable_high: DirectionalAltitudes {
            west: levels([240, 280, 320, 340, 360, 380]),
            east: levels([230, 270, 310, 330, 350, 370]),
        },
        spawnable_tec:  DirectionalAltitudes {
            west: levels([40, 60, 80, 100]),
            east: levels([50, 70, 90]),
        },
    }
}

#[must_use]
pub fn destinations() -> BTreeMap<String, Destination> {
    [
        ("KATL", "Atlanta", Direction::West),
        ("KAUG", "Augusta", Direction::East),
        ("KBED", "Hanscom", Direction::West),
        ("KBGR", "Bangor", Direction::East),
        ("KBHB", "Bar Harbor", Direction::East),
        ("KBOS", "Boston", Direction::West),
        ("KBWI", "Baltimore", Direction::West),
        ("KCLT", "Charlotte", Direction::West),
        ("KDCA", "Reagan National", Direction::West),
        ("KDTW", "Detroit", Direction::West),
        ("KEWR", "Newark", Direction::West),
        ("KIAD", "Dulles", Direction::West),
        ("KIZG", "Fryeburg", Direction::West),
        ("KJFK", "Kennedy", Direction::West),
        ("KLEW", "Lewiston", Direction::East),
        ("KLGA", "LaGuardia", Direction::West),
        ("KMHT", "Manchester", Direction::West),
        ("KORD", "O'Hare", Direction::West),
        ("KPHL", "Philadelphia", Direction::West),
        ("KPQI", "Presque Isle", Direction::East),
        ("KPSM", "Portsmouth", Direction::West),
        ("KPVD", "Providence", Direction::West),
        ("KRKD", "Rockland", Direction::East),
        ("KSFM", "Sanford", Direction::West),
    ]
    .into_iter()
    .map(|(code, name, direction)| (code.into(), Destination { name: name.into(), direction }))
    .collect()
}

fn levels(values: impl IntoIterator<Item = u32>) -> Vec<String> {
    values.into_iter().map(|value| format!("{value:03}")).collect()
}

fn strings<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    values.into_iter().map(String::from).collect()
}
