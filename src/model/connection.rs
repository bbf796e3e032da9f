// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::geometry::{Direction, Point};
use super::ids::{ConnectionId, NodeId, PortId, WaypointId};

/// Addresses one port on one node.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct PortRef {
    pub node_id: NodeId,
    pub port_id: PortId,
}

impl PortRef {
    pub fn new(node_id: NodeId, port_id: PortId) -> Self {
        Self { node_id, port_id }
    }
}

/// Where a port sits on the canvas and which way it faces.
///
/// Supplied by the host per batch through a lookup closure; the router never
/// derives port geometry itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PortAnchor {
    pub position: Point,
    pub direction: Direction,
}

impl PortAnchor {
    pub fn new(position: Point, direction: Direction) -> Self {
        Self { position, direction }
    }
}

/// A single-cell blocker placed in front of a port so other routes do not
/// run across its stub.
pub type PortStub = PortAnchor;

/// Host-owned waypoint record. Routed through when `is_user_waypoint` is set,
/// otherwise only echoed back in the route result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Waypoint {
    pub id: WaypointId,
    pub position: Point,
    #[serde(default)]
    pub is_user_waypoint: bool,
}

impl Waypoint {
    pub fn user(id: WaypointId, position: Point) -> Self {
        Self { id, position, is_user_waypoint: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: PortRef,
    pub target: PortRef,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl Connection {
    pub fn new(id: ConnectionId, source: PortRef, target: PortRef) -> Self {
        Self { id, source, target, waypoints: Vec::new() }
    }

    pub fn with_waypoints(mut self, waypoints: Vec<Waypoint>) -> Self {
        self.waypoints = waypoints;
        self
    }

    pub fn touches_node(&self, node_id: &NodeId) -> bool {
        &self.source.node_id == node_id || &self.target.node_id == node_id
    }
}
