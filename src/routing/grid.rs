// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Sparse obstacle grid.
//!
//! Obstacles are stored as cell rectangles on the absolute lattice
//! (`world / grid_size`), never as a dense occupancy matrix, so memory and
//! update cost scale with the number of nodes rather than canvas area. Node
//! obstacles are indexed by a coarse spatial hash; port stubs are few and are
//! scanned linearly.
//!
//! Public cell coordinates are *grid-local*: relative to the snapped origin
//! held in [`GridOffset`]. Moving the origin only changes that translation.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::RoutingConfig;
use crate::model::{GridCell, NodeId, Point, PortStub, WorldRect};

fn absolute_cell(point: Point, grid_size: f64) -> GridCell {
    GridCell::new((point.x / grid_size).round() as i32, (point.y / grid_size).round() as i32)
}

/// World-to-grid conversion basis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridOffset {
    origin: Point,
    grid_size: f64,
}

impl GridOffset {
    pub fn new(grid_size: f64) -> Self {
        Self { origin: Point::default(), grid_size }
    }

    /// Origin at the bounds' min corner, floored to the grid resolution.
    pub fn from_bounds(bounds: &WorldRect, grid_size: f64) -> Self {
        let origin = Point::new(
            (bounds.min_x / grid_size).floor() * grid_size,
            (bounds.min_y / grid_size).floor() * grid_size,
        );
        Self { origin, grid_size }
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    fn origin_cell(&self) -> GridCell {
        absolute_cell(self.origin, self.grid_size)
    }

    /// Nearest grid-local cell to a world point.
    pub fn to_cell(&self, point: Point) -> GridCell {
        GridCell::new(
            ((point.x - self.origin.x) / self.grid_size).round() as i32,
            ((point.y - self.origin.y) / self.grid_size).round() as i32,
        )
    }

    pub fn to_world(&self, cell: GridCell) -> Point {
        Point::new(
            self.origin.x + f64::from(cell.x) * self.grid_size,
            self.origin.y + f64::from(cell.y) * self.grid_size,
        )
    }

    pub fn local_to_absolute(&self, cell: GridCell) -> GridCell {
        let origin = self.origin_cell();
        GridCell::new(cell.x.saturating_add(origin.x), cell.y.saturating_add(origin.y))
    }
}

/// Inclusive rectangle of absolute grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl CellRect {
    /// Smallest cell rectangle covering `rect`; partially covered cells count.
    pub fn covering(rect: &WorldRect, grid_size: f64) -> Self {
        Self {
            min_x: (rect.min_x / grid_size).floor() as i32,
            min_y: (rect.min_y / grid_size).floor() as i32,
            max_x: (rect.max_x / grid_size).ceil() as i32,
            max_y: (rect.max_y / grid_size).ceil() as i32,
        }
    }

    pub fn contains(&self, cell: GridCell) -> bool {
        cell.x >= self.min_x
            && cell.x <= self.max_x
            && cell.y >= self.min_y
            && cell.y <= self.max_y
    }

    fn buckets(&self, bucket_cells: i32) -> impl Iterator<Item = BucketKey> {
        let min = BucketKey::of(GridCell::new(self.min_x, self.min_y), bucket_cells);
        let max = BucketKey::of(GridCell::new(self.max_x, self.max_y), bucket_cells);
        (min.y..=max.y)
            .flat_map(move |by| (min.x..=max.x).map(move |bx| BucketKey { x: bx, y: by }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BucketKey {
    pub x: i32,
    pub y: i32,
}

impl BucketKey {
    pub fn of(cell: GridCell, bucket_cells: i32) -> Self {
        Self { x: cell.x.div_euclid(bucket_cells), y: cell.y.div_euclid(bucket_cells) }
    }
}

#[derive(Debug, Clone)]
pub struct ObstacleGrid {
    grid_size: f64,
    margin: f64,
    bucket_cells: i32,
    offset: GridOffset,
    nodes: FxHashMap<NodeId, CellRect>,
    buckets: FxHashMap<BucketKey, FxHashSet<NodeId>>,
    stubs: Vec<GridCell>,
}

impl ObstacleGrid {
    pub fn new(config: &RoutingConfig) -> Self {
        Self {
            grid_size: config.grid_size,
            margin: config.routing_margin,
            bucket_cells: config.bucket_cells.max(1) as i32,
            offset: GridOffset::new(config.grid_size),
            nodes: FxHashMap::default(),
            buckets: FxHashMap::default(),
            stubs: Vec::new(),
        }
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn offset(&self) -> GridOffset {
        self.offset
    }

    pub fn to_cell(&self, point: Point) -> GridCell {
        self.offset.to_cell(point)
    }

    pub fn to_world(&self, cell: GridCell) -> Point {
        self.offset.to_world(cell)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn has_node_obstacles(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn stub_count(&self) -> usize {
        self.stubs.len()
    }

    /// The node's obstacle on the absolute lattice.
    pub fn node_obstacle(&self, node_id: &NodeId) -> Option<CellRect> {
        self.nodes.get(node_id).copied()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// Nodes registered in a bucket, sorted for stable comparisons.
    pub fn bucket_members(&self, bucket: BucketKey) -> Vec<NodeId> {
        let mut members = self
            .buckets
            .get(&bucket)
            .map(|set| set.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        members.sort();
        members
    }

    pub fn upsert_node_obstacle(&mut self, node_id: &NodeId, world_bounds: &WorldRect) {
        let rect = CellRect::covering(&world_bounds.expand(self.margin), self.grid_size);
        match self.nodes.insert(node_id.clone(), rect) {
            Some(previous) if previous == rect => return,
            Some(previous) => self.unlink(node_id, previous),
            None => {}
        }
        for bucket in rect.buckets(self.bucket_cells) {
            self.buckets.entry(bucket).or_default().insert(node_id.clone());
        }
    }

    /// Returns `false` when the node had no obstacle.
    pub fn remove_node_obstacle(&mut self, node_id: &NodeId) -> bool {
        let Some(previous) = self.nodes.remove(node_id) else {
            return false;
        };
        self.unlink(node_id, previous);
        true
    }

    fn unlink(&mut self, node_id: &NodeId, rect: CellRect) {
        for bucket in rect.buckets(self.bucket_cells) {
            if let Some(members) = self.buckets.get_mut(&bucket) {
                members.remove(node_id);
                if members.is_empty() {
                    self.buckets.remove(&bucket);
                }
            }
        }
    }

    /// Replaces all port-stub blockers. Each occupies the cell one grid unit
    /// in front of its port.
    pub fn set_port_stub_obstacles(&mut self, stubs: &[PortStub]) {
        self.stubs.clear();
        let grid_size = self.grid_size;
        self.stubs.extend(
            stubs.iter().map(|stub| absolute_cell(stub.position, grid_size).step(stub.direction)),
        );
    }

    pub fn set_origin(&mut self, world_bounds: &WorldRect) {
        self.offset = GridOffset::from_bounds(world_bounds, self.grid_size);
    }

    /// Walkability of a grid-local cell.
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.is_cell_walkable(GridCell::new(x, y))
    }

    pub fn is_cell_walkable(&self, cell: GridCell) -> bool {
        let cell = self.offset.local_to_absolute(cell);
        if self.stubs.contains(&cell) {
            return false;
        }
        let Some(members) = self.buckets.get(&BucketKey::of(cell, self.bucket_cells)) else {
            return true;
        };
        !members
            .iter()
            .any(|node_id| self.nodes.get(node_id).is_some_and(|rect| rect.contains(cell)))
    }
}

#[cfg(test)]
mod tests {
    use super::{BucketKey, CellRect, GridOffset, ObstacleGrid};
    use crate::config::RoutingConfig;
    use crate::model::{Direction, GridCell, NodeId, Point, PortStub, WorldRect};

    fn nid(value: &str) -> NodeId {
        NodeId::new(value).expect("node id")
    }

    fn grid() -> ObstacleGrid {
        ObstacleGrid::new(&RoutingConfig::default())
    }

    fn cells_of(rect: CellRect) -> impl Iterator<Item = GridCell> {
        (rect.min_y..=rect.max_y)
            .flat_map(move |y| (rect.min_x..=rect.max_x).map(move |x| GridCell::new(x, y)))
    }

    #[test]
    fn node_obstacle_is_margin_expanded_and_cell_aligned() {
        let mut grid = grid();
        let bounds = WorldRect::from_origin_size(100.0, 100.0, 100.0, 50.0);
        grid.upsert_node_obstacle(&nid("a"), &bounds);

        assert_eq!(
            grid.node_obstacle(&nid("a")),
            Some(CellRect { min_x: 9, min_y: 9, max_x: 21, max_y: 16 })
        );
        assert!(!grid.is_walkable(9, 9));
        assert!(!grid.is_walkable(21, 16));
        assert!(grid.is_walkable(8, 12));
        assert!(grid.is_walkable(15, 17));
    }

    #[test]
    fn cells_far_outside_all_obstacles_are_walkable() {
        let mut grid = grid();
        grid.upsert_node_obstacle(&nid("a"), &WorldRect::from_origin_size(0.0, 0.0, 40.0, 40.0));
        assert!(grid.is_walkable(100_000, -100_000));
        assert!(grid.is_walkable(-3, 2));
    }

    #[test]
    fn upsert_replaces_previous_bounds_without_residue() {
        let mut grid = grid();
        let id = nid("moving");
        let first = WorldRect::from_origin_size(0.0, 0.0, 60.0, 40.0);
        let second = WorldRect::from_origin_size(400.0, 300.0, 80.0, 60.0);

        grid.upsert_node_obstacle(&id, &first);
        let b1 = grid.node_obstacle(&id).unwrap();
        grid.upsert_node_obstacle(&id, &second);
        let b2 = grid.node_obstacle(&id).unwrap();

        for cell in cells_of(b1).filter(|c| !b2.contains(*c)) {
            assert!(grid.is_cell_walkable(cell), "stale blocking at {cell:?}");
        }
        for cell in cells_of(b2) {
            assert!(!grid.is_cell_walkable(cell), "missing blocking at {cell:?}");
        }
        assert_eq!(grid.node_count(), 1);
    }

    #[test]
    fn spatial_hash_tracks_exact_bucket_membership() {
        let mut grid = grid();
        let a = nid("a");
        let b = nid("b");

        // 8-cell buckets: a spans buckets (0,0)..(1,0); b stays in (0,0).
        grid.upsert_node_obstacle(&a, &WorldRect::from_origin_size(20.0, 20.0, 100.0, 20.0));
        grid.upsert_node_obstacle(&b, &WorldRect::from_origin_size(20.0, 20.0, 10.0, 10.0));
        assert_eq!(grid.bucket_members(BucketKey { x: 0, y: 0 }), vec![a.clone(), b.clone()]);
        assert_eq!(grid.bucket_members(BucketKey { x: 1, y: 0 }), vec![a.clone()]);

        grid.upsert_node_obstacle(&a, &WorldRect::from_origin_size(2000.0, 2000.0, 10.0, 10.0));
        assert_eq!(grid.bucket_members(BucketKey { x: 0, y: 0 }), vec![b.clone()]);
        assert!(grid.bucket_members(BucketKey { x: 1, y: 0 }).is_empty());
        assert_eq!(grid.bucket_members(BucketKey { x: 25, y: 25 }), vec![a.clone()]);

        assert!(grid.remove_node_obstacle(&a));
        assert!(grid.remove_node_obstacle(&b));
        assert_eq!(grid.bucket_count(), 0);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut grid = grid();
        let id = nid("gone");
        grid.upsert_node_obstacle(&id, &WorldRect::from_origin_size(0.0, 0.0, 20.0, 20.0));

        assert!(grid.remove_node_obstacle(&id));
        assert!(!grid.remove_node_obstacle(&id));
        assert!(!grid.remove_node_obstacle(&nid("never-added")));
        assert!(grid.is_walkable(1, 1));
        assert!(!grid.has_node_obstacles());
    }

    #[test]
    fn port_stubs_block_the_cell_in_front_of_the_port() {
        let mut grid = grid();
        grid.set_port_stub_obstacles(&[
            PortStub::new(Point::new(50.0, 50.0), Direction::Right),
            PortStub::new(Point::new(0.0, 0.0), Direction::Up),
        ]);
        assert_eq!(grid.stub_count(), 2);
        assert!(!grid.is_walkable(6, 5));
        assert!(grid.is_walkable(5, 5));
        assert!(!grid.is_walkable(0, -1));

        grid.set_port_stub_obstacles(&[]);
        assert!(grid.is_walkable(6, 5));
        assert!(grid.is_walkable(0, -1));
    }

    #[test]
    fn origin_shift_translates_local_cells_without_touching_obstacles() {
        let mut grid = grid();
        let id = nid("a");
        grid.upsert_node_obstacle(&id, &WorldRect::from_origin_size(100.0, 100.0, 20.0, 20.0));
        let stored = grid.node_obstacle(&id);

        grid.set_origin(&WorldRect::new(-47.0, 33.0, 500.0, 500.0));
        assert_eq!(grid.offset().origin(), Point::new(-50.0, 30.0));
        assert_eq!(grid.node_obstacle(&id), stored);

        // Absolute cell (10, 10) is local (15, 7) once the origin sits at (-5, 3) cells.
        assert!(!grid.is_walkable(15, 7));
        assert!(grid.is_walkable(10, 10));

        let world = Point::new(100.0, 100.0);
        assert_eq!(grid.to_world(grid.to_cell(world)), world);
    }

    #[test]
    fn offset_converts_between_local_and_absolute_cells() {
        let offset = GridOffset::from_bounds(&WorldRect::new(25.0, -15.0, 90.0, 90.0), 10.0);
        let local = GridCell::new(4, 4);
        let absolute = offset.local_to_absolute(local);
        assert_eq!(absolute, GridCell::new(6, 2));
        assert_eq!(offset.to_world(local), Point::new(60.0, 20.0));
    }

    #[test]
    fn far_away_points_stay_walkable_without_overflow() {
        let mut grid = grid();
        let bounds = WorldRect::from_origin_size(500.0, 500.0, 40.0, 40.0);
        grid.upsert_node_obstacle(&nid("a"), &bounds);
        grid.set_origin(&WorldRect::new(-1.0e12, -1.0e12, 0.0, 0.0));

        let cell = grid.to_cell(Point::new(1.0e12, 1.0e12));
        assert!(grid.is_cell_walkable(cell));
        assert!(grid.is_cell_walkable(cell.step(Direction::Right)));
    }
}
