// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic canvas fixtures (no RNG).

use std::collections::BTreeMap;

use nereid_route::model::{
    Connection, ConnectionId, Direction, NodeId, Point, PortAnchor, PortId, PortRef, WorldRect,
};
use nereid_route::Router;

pub const NODE_WIDTH: f64 = 80.0;
pub const NODE_HEIGHT: f64 = 40.0;
pub const COLUMN_PITCH: f64 = 200.0;
pub const ROW_PITCH: f64 = 90.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasParams {
    pub columns: usize,
    pub rows: usize,
    pub fanout: usize,
    /// Row offset between consecutive fan-out targets.
    pub stride: usize,
}

impl CanvasParams {
    pub const fn new(columns: usize, rows: usize, fanout: usize, stride: usize) -> Self {
        Self { columns, rows, fanout, stride }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    Dense,
}

impl Case {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Dense => "dense",
        }
    }

    pub const fn params(self) -> CanvasParams {
        match self {
            Self::Small => CanvasParams::new(4, 6, 1, 1),
            Self::Medium => CanvasParams::new(8, 12, 2, 3),
            Self::Dense => CanvasParams::new(12, 20, 3, 5),
        }
    }
}

pub struct Canvas {
    pub router: Router,
    pub connections: Vec<Connection>,
    pub ports: BTreeMap<PortRef, PortAnchor>,
}

impl Canvas {
    pub fn lookup(&self) -> impl FnMut(&PortRef) -> Option<PortAnchor> + '_ {
        |port| self.ports.get(port).copied()
    }

    /// The longest connection, by port-to-port Manhattan distance.
    pub fn longest(&self) -> (PortAnchor, PortAnchor) {
        self.connections
            .iter()
            .filter_map(|c| Some((*self.ports.get(&c.source)?, *self.ports.get(&c.target)?)))
            .max_by(|a, b| {
                let da = a.0.position.manhattan_distance(&a.1.position);
                let db = b.0.position.manhattan_distance(&b.1.position);
                da.total_cmp(&db)
            })
            .expect("canvas has connections")
    }
}

fn node_id(column: usize, row: usize) -> NodeId {
    NodeId::new(format!("c{column:02}r{row:03}")).expect("valid node id")
}

fn port(node: &NodeId, name: &str) -> PortRef {
    PortRef::new(node.clone(), PortId::new(name).expect("valid port id"))
}

/// Column-major grid of equal nodes. Every node has an `in` port on its left
/// edge and an `out` port on its right edge; connections run from each node
/// to `fanout` nodes of the next column.
pub fn canvas(params: CanvasParams) -> Canvas {
    assert!(params.columns >= 2, "columns must be >= 2");
    assert!(params.rows >= 1, "rows must be >= 1");

    let mut router = Router::default();
    let mut ports = BTreeMap::new();
    let mut connections = Vec::new();

    for column in 0..params.columns {
        for row in 0..params.rows {
            let id = node_id(column, row);
            let x = column as f64 * COLUMN_PITCH;
            let y = row as f64 * ROW_PITCH;
            router.upsert_node_obstacle(
                &id,
                &WorldRect::from_origin_size(x, y, NODE_WIDTH, NODE_HEIGHT),
            );
            let mid = y + NODE_HEIGHT / 2.0;
            ports.insert(port(&id, "in"), PortAnchor::new(Point::new(x, mid), Direction::Left));
            ports.insert(
                port(&id, "out"),
                PortAnchor::new(Point::new(x + NODE_WIDTH, mid), Direction::Right),
            );
        }
    }

    for column in 0..params.columns - 1 {
        for row in 0..params.rows {
            let source = node_id(column, row);
            for k in 0..params.fanout {
                let target = node_id(column + 1, (row + k * params.stride) % params.rows);
                let id = ConnectionId::new(format!("e{:05}", connections.len()))
                    .expect("valid connection id");
                connections.push(Connection::new(id, port(&source, "out"), port(&target, "in")));
            }
        }
    }

    let lookup = |port: &PortRef| ports.get(port).copied();
    router.sync_port_stubs(&connections, lookup);

    Canvas { router, connections, ports }
}

pub fn fixture(case: Case) -> Canvas {
    canvas(case.params())
}
