// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Nereid routing engine: orthogonal connection routing for node-based canvases.
//!
//! The host editor registers node bounds as obstacles, supplies port anchors
//! through a lookup closure, and gets back axis-aligned routes that avoid
//! nodes, keep turns few, and spread out across a batch.

pub mod config;
pub mod model;
pub mod routing;

pub use config::{ConfigError, RoutingConfig};
pub use routing::{BatchContext, RouteResult, Router};
