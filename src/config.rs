// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Routing engine tunables.
//!
//! The defaults match the grid resolution shared with the embedding canvas.
//! Hosts that persist settings can load a partial JSON object; missing fields
//! keep their defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_GRID_SIZE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RoutingConfig {
    /// World units per grid cell.
    pub grid_size: f64,
    /// World units added around every node before it becomes an obstacle.
    pub routing_margin: f64,
    /// Distance from a port to the start of free routing.
    pub port_clearance: f64,
    /// Cells in front of the start that are always walkable.
    pub exit_corridor_cells: u32,
    /// Expanded search states before giving up with a fallback path.
    pub max_iterations: u32,
    pub turn_penalty: u32,
    /// Cost for entering a cell another route travels along the same axis.
    pub overlap_penalty: u32,
    /// Cost for entering a cell another route travels across.
    pub crossing_penalty: u32,
    /// Spatial hash bucket edge length, in cells.
    pub bucket_cells: u32,
    /// Cells next to a shared source port that are not recorded as used.
    pub shared_start_skip: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            routing_margin: 10.0,
            port_clearance: 20.0,
            exit_corridor_cells: 3,
            max_iterations: 20_000,
            turn_penalty: 5,
            overlap_penalty: 30,
            crossing_penalty: 8,
            bucket_cells: 8,
            shared_start_skip: 3,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("grid_size must be a positive finite number, got {0}")]
    InvalidGridSize(f64),

    #[error("{field} must be a non-negative finite number, got {value}")]
    InvalidDistance { field: &'static str, value: f64 },

    #[error("bucket_cells must be at least 1")]
    EmptyBucket,

    #[error("max_iterations must be at least 1")]
    NoIterationBudget,

    #[error(
        "crossing_penalty ({crossing}) must be smaller than overlap_penalty ({overlap}); \
         parallel overlap has to cost more than a crossing"
    )]
    PenaltyOrder { crossing: u32, overlap: u32 },

    #[error("invalid routing config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RoutingConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.grid_size.is_finite() && self.grid_size > 0.0) {
            return Err(ConfigError::InvalidGridSize(self.grid_size));
        }
        for (field, value) in
            [("routing_margin", self.routing_margin), ("port_clearance", self.port_clearance)]
        {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::InvalidDistance { field, value });
            }
        }
        if self.bucket_cells == 0 {
            return Err(ConfigError::EmptyBucket);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterationBudget);
        }
        if self.crossing_penalty >= self.overlap_penalty {
            return Err(ConfigError::PenaltyOrder {
                crossing: self.crossing_penalty,
                overlap: self.overlap_penalty,
            });
        }
        Ok(())
    }
}
