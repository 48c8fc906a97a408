//! Taxiway graph and aircraft movement along it.
//!
//! Aircraft do not plan paths. They head for the nearest node,
//! then follow the first edge of every node they reach
//! until they arrive at the terminal node.

use std::collections::HashMap;

use bevy::ecs::component::Component;
use bevy::ecs::resource::Resource;
use bevy::math::Vec2;
use ordered_float::OrderedFloat;
use smallvec::SmallVec;

use super::aircraft::Placement;
use crate::load;

#[cfg(test)]
mod tests;

/// An aircraft within this distance of its target node has reached it.
pub const NODE_THRESHOLD: f32 = 0.5;
/// Minimum distance kept between taxiing aircraft.
/// Also the distance to the terminal node that counts as arrival.
pub const SEPARATION: f32 = 2.2;
/// Maximum taxi movement per tick.
pub const TAXI_STEP: f32 = 0.35;
/// Maximum pushback movement per tick along each axis.
pub const PUSHBACK_STEP: f32 = 0.05;
/// Nodes farther than this are never selected as the nearest node.
pub const SEARCH_RADIUS: f32 = 100.0;

/// The taxiway graph of the facility.
#[derive(Debug, Resource)]
pub struct Network {
    nodes:    Vec<Node>,
    terminal: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug)]
pub struct Node {
    pub name:     String,
    pub position: Vec2,
    /// Neighbors in declaration order. Only the first is followed.
    pub edges:    SmallVec<[NodeId; 2]>,
}

impl Network {
    pub fn from_store(taxiway: &store::Taxiway) -> load::Result<Self> {
        let mut indices = HashMap::new();
        for (index, node) in taxiway.nodes.iter().enumerate() {
            if !node.position.x.is_finite() || !node.position.y.is_finite() {
                return Err(load::Error::NonFiniteFloat("taxiway node position"));
            }
            if indices.insert(node.id.as_str(), NodeId(index)).is_some() {
                return Err(load::Error::DuplicateNode(node.id.clone()));
            }
        }

        let nodes = taxiway
            .nodes
            .iter()
            .map(|node| {
                let edges = node
                    .edges
                    .iter()
                    .map(|edge| {
                        indices.get(edge.as_str()).copied().ok_or_else(|| {
                            load::Error::UnresolvedEdge { node: node.id.clone(), edge: edge.clone() }
                        })
                    })
                    .collect::<load::Result<_>>()?;
                Ok(Node {
                    name: node.id.clone(),
                    position: Vec2::new(node.position.x, node.position.y),
                    edges,
                })
            })
            .collect::<load::Result<_>>()?;

        let terminal = *indices
            .get(taxiway.terminal.as_str())
            .ok_or_else(|| load::Error::UnresolvedTerminal(taxiway.terminal.clone()))?;

        Ok(Self { nodes, terminal })
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> { self.nodes.get(id.0) }

    #[must_use]
    pub fn terminal(&self) -> NodeId { self.terminal }

    #[must_use]
    pub fn terminal_position(&self) -> Vec2 { self.nodes[self.terminal.0].position }

    #[must_use]
    pub fn distance_to_terminal(&self, position: Vec2) -> f32 {
        position.distance(self.terminal_position())
    }

    /// The node closest to `position` within [`SEARCH_RADIUS`], with its distance.
    #[must_use]
    pub fn nearest(&self, position: Vec2) -> Option<(NodeId, f32)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (NodeId(index), node.position.distance(position)))
            .filter(|&(_, distance)| distance < SEARCH_RADIUS)
            .min_by_key(|&(_, distance)| OrderedFloat(distance))
    }
}

/// Current navigation target of an aircraft.
#[derive(Debug, Default, Component)]
pub struct Navigation {
    pub target: Option<NodeId>,
}

/// Positions of all moving aircraft at the start of a tick.
pub struct Traffic<'a> {
    pub others: &'a [Vec2],
}

/// Advances an aircraft one tick along the taxiway graph.
///
/// Returns the distance to the terminal node before moving,
/// or `None` if the aircraft is holding position.
pub fn navigate(
    network: &Network,
    placement: &mut Placement,
    navigation: &mut Navigation,
    holding: bool,
    traffic: &Traffic,
) -> Option<f32> {
    if holding {
        return None;
    }

    let start = placement.position;
    let distance = match navigation.target.and_then(|target| network.node(target)) {
        Some(node) => move_to_node(network, placement, node.position, traffic),
        None => 0.0,
    };

    if distance < NODE_THRESHOLD
        && navigation.target != Some(network.terminal())
        && let Some((nearest, nearest_distance)) = network.nearest(start)
    {
        if nearest_distance >= NODE_THRESHOLD {
            navigation.target = Some(nearest);
        } else if let Some(&next) = network.node(nearest).and_then(|node| node.edges.first()) {
            navigation.target = Some(next);
        }
    }

    Some(network.distance_to_terminal(start))
}

/// Moves toward `target` by at most [`TAXI_STEP`],
/// unless another aircraft within [`SEPARATION`] is closer to the terminal node.
///
/// Returns the distance to `target` before moving.
fn move_to_node(network: &Network, placement: &mut Placement, target: Vec2, traffic: &Traffic) -> f32 {
    let position = placement.position;
    let offset = target - position;
    let distance = offset.length();

    let my_remaining = network.distance_to_terminal(position);
    let blocked = traffic.others.iter().any(|&other| {
        other.distance(position) < SEPARATION && my_remaining > network.distance_to_terminal(other)
    });
    if blocked {
        return distance;
    }

    if distance > 0.0 {
        let step = offset / distance * distance.min(TAXI_STEP);
        placement.position = position + step;
        placement.rotation = -offset.y.atan2(offset.x).to_degrees();
    }
    distance
}

/// Advances a pushback one tick toward the pushback location,
/// backing away from the current heading.
pub fn pushback_step(placement: &mut Placement, location: Vec2) {
    let heading = placement.rotation.to_radians();
    let remaining = (placement.position - location).abs();
    placement.position += Vec2::new(
        -heading.cos() * remaining.x.min(PUSHBACK_STEP),
        heading.sin() * remaining.y.min(PUSHBACK_STEP),
    );
}
