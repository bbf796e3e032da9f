// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Orthogonal connection routing.
//!
//! Layers, bottom up: the sparse [`ObstacleGrid`], the A* [`PathSearch`] over
//! it, path simplification, and the [`Router`] that turns port anchors into
//! finished routes, alone or as a batch over a whole connection set.

pub mod grid;
pub mod metrics;
mod open_set;
pub mod optimize;
pub mod router;
pub mod search;
pub mod used_cells;

pub use grid::{BucketKey, CellRect, GridOffset, ObstacleGrid};
pub use metrics::RouteMetrics;
pub use optimize::{simplify, snap_to_grid};
pub use router::{BatchContext, BatchOutcome, RouteCache, RouteResult, Router};
pub use search::{l_path, PathSearch, SearchOutcome};
pub use used_cells::{CellUse, DirectionSet, UsedCells};
