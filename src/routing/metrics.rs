// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Quality measures for a set of routed paths.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::optimize::simplify;
use crate::model::geometry::EPSILON;
use crate::model::Point;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteMetrics {
    pub total_length: f64,
    /// Interior corners after simplification.
    pub bends: usize,
    /// Perpendicular segment pairs from different paths that cross strictly
    /// inside both segments. Touching at an end does not count.
    pub crossings: usize,
    /// Summed length shared by collinear segments of different paths.
    pub parallel_overlap: f64,
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    path: usize,
    horizontal: bool,
    /// y for horizontal segments, x for vertical ones.
    fixed: f64,
    lo: f64,
    hi: f64,
}

impl Segment {
    fn from_points(path: usize, a: Point, b: Point) -> Option<Self> {
        if (a.y - b.y).abs() < EPSILON && (a.x - b.x).abs() >= EPSILON {
            Some(Self { path, horizontal: true, fixed: a.y, lo: a.x.min(b.x), hi: a.x.max(b.x) })
        } else if (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() >= EPSILON {
            Some(Self { path, horizontal: false, fixed: a.x, lo: a.y.min(b.y), hi: a.y.max(b.y) })
        } else {
            None
        }
    }

    fn strictly_contains(&self, value: f64) -> bool {
        value > self.lo + EPSILON && value < self.hi - EPSILON
    }

    fn crosses(&self, other: &Segment) -> bool {
        self.horizontal != other.horizontal
            && self.strictly_contains(other.fixed)
            && other.strictly_contains(self.fixed)
    }

    fn collinear_overlap(&self, other: &Segment) -> f64 {
        if self.horizontal != other.horizontal || (self.fixed - other.fixed).abs() >= EPSILON {
            return 0.0;
        }
        (self.hi.min(other.hi) - self.lo.max(other.lo)).max(0.0)
    }
}

impl RouteMetrics {
    pub fn measure<'a, I>(paths: I) -> Self
    where
        I: IntoIterator<Item = &'a [Point]>,
    {
        let mut metrics = Self::default();
        let mut segments = Vec::<Segment>::new();

        for (path_idx, path) in paths.into_iter().enumerate() {
            metrics.total_length += path.windows(2).map(|w| w[0].distance(&w[1])).sum::<f64>();
            metrics.bends += simplify(path).len().saturating_sub(2);
            segments.extend(
                path.windows(2).filter_map(|w| Segment::from_points(path_idx, w[0], w[1])),
            );
        }

        for (idx, a) in segments.iter().enumerate() {
            for b in segments[idx + 1..].iter().filter(|b| b.path != a.path) {
                if a.crosses(b) {
                    metrics.crossings += 1;
                }
                metrics.parallel_overlap += a.collinear_overlap(b);
            }
        }
        metrics
    }
}
