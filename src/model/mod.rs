// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Host-facing data model: identifiers, world geometry, and connections.
//!
//! Everything here is plain data that the embedding editor owns and hands in.

pub mod connection;
pub mod geometry;
pub mod ids;

pub use connection::{Connection, PortAnchor, PortRef, PortStub, Waypoint};
pub use geometry::{Direction, GridCell, Point, WorldRect, EPSILON};
pub use ids::{ConnectionId, Id, IdError, NodeId, PortId, WaypointId};
