use bevy::math::Vec2;

use super::{Navigation, Network, NodeId, Traffic, navigate, pushback_step, SEPARATION};
use crate::sim::aircraft::Placement;

fn network() -> Network {
    Network::from_store(&maps::portland::file().taxiway).expect("valid taxiway")
}

fn node_named(network: &Network, name: &str) -> NodeId {
    (0..)
        .map(NodeId)
        .find(|&id| network.node(id).is_some_and(|node| node.name == name))
        .expect("node exists")
}

fn placement(x: f32, y: f32) -> Placement { Placement { position: Vec2::new(x, y), rotation: 0.0 } }

const NO_TRAFFIC: Traffic<'static> = Traffic { others: &[] };

#[test]
fn untargeted_aircraft_heads_for_nearest_node() {
    let network = network();
    let mut placement = placement(14.0, 15.0);
    let mut navigation = Navigation::default();

    let remaining = navigate(&network, &mut placement, &mut navigation, false, &NO_TRAFFIC);

    assert_eq!(navigation.target, Some(node_named(&network, "A2")));
    assert_eq!(placement.position, Vec2::new(14.0, 15.0));
    assert!((remaining.expect("not holding") - Vec2::new(12.0, 3.0).length()).abs() < 1e-4);
}

#[test]
fn reached_node_follows_first_edge() {
    let network = network();
    let mut placement = placement(12.1, 12.0);
    let mut navigation = Navigation { target: Some(node_named(&network, "A2")) };

    navigate(&network, &mut placement, &mut navigation, false, &NO_TRAFFIC);

    assert_eq!(navigation.target, Some(node_named(&network, "A1")));
    assert!((placement.position - Vec2::new(12.0, 12.0)).length() < 1e-4, "step is clamped");
}

#[test]
fn step_is_bounded() {
    let network = network();
    let mut placement = placement(12.0, 12.0);
    let mut navigation = Navigation { target: Some(node_named(&network, "A1")) };

    navigate(&network, &mut placement, &mut navigation, false, &NO_TRAFFIC);

    assert!((placement.position - Vec2::new(11.65, 12.0)).length() < 1e-4);
    assert!((placement.rotation.abs() - 180.0).abs() < 1e-3);
    assert_eq!(navigation.target, Some(node_named(&network, "A1")));
}

#[test]
fn holding_aircraft_does_not_move() {
    let network = network();
    let mut placement = placement(12.0, 12.0);
    let mut navigation = Navigation { target: Some(node_named(&network, "A1")) };

    assert_eq!(navigate(&network, &mut placement, &mut navigation, true, &NO_TRAFFIC), None);
    assert_eq!(placement.position, Vec2::new(12.0, 12.0));
}

#[test]
fn yields_to_aircraft_ahead() {
    let network = network();
    let mut navigation = Navigation { target: Some(node_named(&network, "A1")) };

    let mut behind = placement(12.0, 12.0);
    let ahead = [Vec2::new(11.0, 12.0)];
    navigate(&network, &mut behind, &mut navigation, false, &Traffic { others: &ahead });
    assert_eq!(behind.position, Vec2::new(12.0, 12.0));

    let mut leader = placement(11.0, 12.0);
    let following = [Vec2::new(12.0, 12.0)];
    navigate(&network, &mut leader, &mut navigation, false, &Traffic { others: &following });
    assert!(leader.position.x < 11.0);
}

#[test]
fn gate_departure_reaches_terminal() {
    let network = network();
    let mut placement = placement(14.0, 15.0);
    let mut navigation = Navigation::default();

    let arrived = (0..200).any(|_| {
        navigate(&network, &mut placement, &mut navigation, false, &NO_TRAFFIC)
            .is_some_and(|remaining| remaining < SEPARATION)
    });
    assert!(arrived);
    assert_eq!(navigation.target, Some(network.terminal()));
}

#[test]
fn pushback_backs_away_from_gate() {
    let mut placement = Placement { position: Vec2::new(14.0, 18.0), rotation: 270.0 };
    let location = Vec2::new(14.0, 15.0);

    pushback_step(&mut placement, location);
    assert!((placement.position - Vec2::new(14.0, 17.95)).length() < 1e-4);

    for _ in 0..100 {
        pushback_step(&mut placement, location);
    }
    assert!((placement.position - location).length() < 1e-3);
}

#[test]
fn unresolved_edge_is_rejected() {
    let mut taxiway = maps::portland::file().taxiway;
    taxiway.nodes[1].edges.push("Z9".into());
    assert!(matches!(
        Network::from_store(&taxiway),
        Err(crate::load::Error::UnresolvedEdge { edge, .. }) if edge == "Z9"
    ));
}
