// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Public routing entry points.
//!
//! A [`Router`] owns the obstacle grid and a per-connection route cache. Single
//! routes go through [`Router::calculate_route`]; a full pass over a
//! connection set goes through [`Router::recalculate_all_routes`], which runs
//! inside a [`BatchContext`] so that later routes see the congestion left by
//! earlier ones.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::grid::ObstacleGrid;
use super::optimize::{simplify, snap_to_grid};
use super::search::{l_path, PathSearch, SearchOutcome};
use super::used_cells::UsedCells;
use crate::config::{ConfigError, RoutingConfig};
use crate::model::geometry::EPSILON;
use crate::model::{
    Connection, ConnectionId, Direction, NodeId, Point, PortAnchor, PortRef, PortStub, Waypoint,
    WorldRect,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RouteResult {
    /// Orthogonal corner points from the source stub end to the target stub end.
    pub path: Vec<Point>,
    /// The connection's waypoint records, unchanged.
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
    pub is_fallback: bool,
}

#[derive(Debug, Clone)]
struct CachedRoute {
    connection: Connection,
    result: RouteResult,
}

#[derive(Debug, Clone, Default)]
pub struct RouteCache {
    entries: FxHashMap<ConnectionId, CachedRoute>,
}

impl RouteCache {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, connection_id: &ConnectionId) -> Option<&RouteResult> {
        self.entries.get(connection_id).map(|entry| &entry.result)
    }

    pub fn insert(&mut self, connection: &Connection, result: RouteResult) {
        self.entries
            .insert(connection.id.clone(), CachedRoute { connection: connection.clone(), result });
    }

    pub fn remove(&mut self, connection_id: &ConnectionId) -> bool {
        self.entries.remove(connection_id).is_some()
    }

    /// Drops every route that starts or ends on one of `node_ids`. Returns the
    /// number of dropped routes.
    pub fn remove_touching(&mut self, node_ids: &[NodeId]) -> usize {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| !node_ids.iter().any(|id| entry.connection.touches_node(id)));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Grid and tunables for one routing call.
#[derive(Debug, Clone, Copy)]
struct Planner<'a> {
    grid: &'a ObstacleGrid,
    config: &'a RoutingConfig,
}

impl Planner<'_> {
    fn stub_end(&self, anchor: &PortAnchor) -> Point {
        let clear = anchor.position.offset(anchor.direction, self.config.port_clearance);
        snap_to_grid(clear, self.config.grid_size)
    }

    fn segment(
        &self,
        from: Point,
        to: Point,
        exit: Direction,
        used: Option<&UsedCells>,
    ) -> SearchOutcome {
        if !self.grid.has_node_obstacles() {
            return SearchOutcome { path: self.direct(from, to, exit), is_fallback: false };
        }
        PathSearch::new(self.grid, self.config).find_path(from, to, exit, used)
    }

    /// Obstacle-free route from `from` to `to` whose first step never runs
    /// against `exit`.
    fn direct(&self, from: Point, to: Point, exit: Direction) -> Vec<Point> {
        let back = Some(exit.opposite());
        let along = l_path(from, to, exit);
        if first_step(&along) != back {
            return along;
        }
        let side = exit.rotated_cw(1);
        let across = l_path(from, to, side);
        if first_step(&across) != back {
            return across;
        }
        // `to` lies straight behind `from`: step aside one cell and come back.
        let offset = self.config.grid_size;
        vec![from, from.offset(side, offset), to.offset(side, offset), to]
    }

    fn route(
        &self,
        source: &PortAnchor,
        target: &PortAnchor,
        waypoints: &[Waypoint],
        used: Option<&UsedCells>,
    ) -> RouteResult {
        let mut stops = ordered_user_waypoints(source.position, target.position, waypoints)
            .into_iter()
            .map(|position| snap_to_grid(position, self.config.grid_size))
            .collect::<Vec<_>>();
        stops.push(self.stub_end(target));

        let mut path = Vec::<Point>::new();
        let mut is_fallback = false;
        let mut from = self.stub_end(source);
        let mut exit = source.direction;
        for to in stops {
            let outcome = self.segment(from, to, exit, used);
            is_fallback |= outcome.is_fallback;
            if let Some(direction) = last_step(&outcome.path) {
                exit = direction;
            }
            let shared = match (path.last(), outcome.path.first()) {
                (Some(last), Some(first)) => last.approx_eq(first),
                _ => false,
            };
            path.extend(outcome.path.into_iter().skip(usize::from(shared)));
            from = to;
        }

        RouteResult { path: simplify(&path), waypoints: waypoints.to_vec(), is_fallback }
    }
}

fn first_step(path: &[Point]) -> Option<Direction> {
    let [a, b, ..] = path else {
        return None;
    };
    Direction::from_step(b.x - a.x, b.y - a.y)
}

fn last_step(path: &[Point]) -> Option<Direction> {
    let [.., a, b] = path else {
        return None;
    };
    Direction::from_step(b.x - a.x, b.y - a.y)
}

/// User waypoints in the order they appear along the source→target vector.
/// The sort is stable; a zero-length vector leaves the given order alone.
fn ordered_user_waypoints(source: Point, target: Point, waypoints: &[Waypoint]) -> Vec<Point> {
    let mut points =
        waypoints.iter().filter(|wp| wp.is_user_waypoint).map(|wp| wp.position).collect::<Vec<_>>();
    let (vx, vy) = (target.x - source.x, target.y - source.y);
    if vx.abs() < EPSILON && vy.abs() < EPSILON {
        return points;
    }
    let projection = |p: &Point| (p.x - source.x) * vx + (p.y - source.y) * vy;
    points.sort_by(|a, b| projection(a).total_cmp(&projection(b)));
    points
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub routes: BTreeMap<ConnectionId, RouteResult>,
    /// Connections left out because a port could not be resolved.
    pub skipped: Vec<ConnectionId>,
}

struct ResolvedConnection<'c> {
    connection: &'c Connection,
    source: PortAnchor,
    target: PortAnchor,
}

impl ResolvedConnection<'_> {
    fn span(&self) -> f64 {
        self.source.position.manhattan_distance(&self.target.position)
    }
}

/// State of one "route everything" pass: a read-only view of the grid plus
/// the cells claimed by routes committed so far.
///
/// The grid stays borrowed for the lifetime of the context, so it cannot
/// change mid-batch. Dropping the context discards the used-cell map.
#[derive(Debug)]
pub struct BatchContext<'a> {
    planner: Planner<'a>,
    used: UsedCells,
}

impl<'a> BatchContext<'a> {
    fn new(grid: &'a ObstacleGrid, config: &'a RoutingConfig) -> Self {
        Self { planner: Planner { grid, config }, used: UsedCells::new() }
    }

    pub fn grid(&self) -> &'a ObstacleGrid {
        self.planner.grid
    }

    pub fn used_cells(&self) -> &UsedCells {
        &self.used
    }

    /// Routes against the batch's used cells without committing the result.
    pub fn route(
        &self,
        source: &PortAnchor,
        target: &PortAnchor,
        waypoints: &[Waypoint],
    ) -> RouteResult {
        self.planner.route(source, target, waypoints, Some(&self.used))
    }

    /// Records a route's cells so later routes in the batch avoid them. The
    /// first `skip` cells from the path start are left free.
    pub fn commit(&mut self, path: &[Point], skip: usize) {
        self.used.mark_polyline(path, &self.planner.grid.offset(), skip);
    }

    /// Routes every resolvable connection, longest first, grouping
    /// connections that leave from the same port.
    pub fn route_all<F>(&mut self, connections: &[Connection], mut port_lookup: F) -> BatchOutcome
    where
        F: FnMut(&PortRef) -> Option<PortAnchor>,
    {
        let _span = tracing::debug_span!("route_batch", connections = connections.len()).entered();
        let mut outcome = BatchOutcome::default();

        let mut resolved = Vec::<ResolvedConnection<'_>>::with_capacity(connections.len());
        for connection in connections {
            match (port_lookup(&connection.source), port_lookup(&connection.target)) {
                (Some(source), Some(target)) => {
                    resolved.push(ResolvedConnection { connection, source, target });
                }
                _ => {
                    tracing::warn!(
                        connection = %connection.id,
                        "skipping connection with an unresolved port"
                    );
                    outcome.skipped.push(connection.id.clone());
                }
            }
        }
        resolved.sort_by(|a, b| {
            b.span().total_cmp(&a.span()).then_with(|| a.connection.id.cmp(&b.connection.id))
        });

        let mut group_index = FxHashMap::<&PortRef, usize>::default();
        let mut groups = Vec::<Vec<ResolvedConnection<'_>>>::new();
        for item in resolved {
            let idx = *group_index.entry(&item.connection.source).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[idx].push(item);
        }

        let skip = self.planner.config.shared_start_skip;
        let offset = self.planner.grid.offset();
        let mut fallbacks = 0usize;
        for group in &groups {
            // Siblings see each other beyond the shared start; the batch map
            // only learns about the group once it is complete.
            let mut overlay: Option<UsedCells> = None;
            let mut group_cells = UsedCells::new();
            for member in group {
                let used = overlay.as_ref().unwrap_or(&self.used);
                let result = self.planner.route(
                    &member.source,
                    &member.target,
                    &member.connection.waypoints,
                    Some(used),
                );
                if group.len() > 1 {
                    overlay
                        .get_or_insert_with(|| self.used.clone())
                        .mark_polyline(&result.path, &offset, skip);
                }
                group_cells.mark_polyline(&result.path, &offset, skip);
                if result.is_fallback {
                    fallbacks += 1;
                }
                outcome.routes.insert(member.connection.id.clone(), result);
            }
            self.used.merge(&group_cells);
        }

        tracing::debug!(
            routed = outcome.routes.len(),
            fallback = fallbacks,
            skipped = outcome.skipped.len(),
            groups = groups.len(),
            "batch routed"
        );
        outcome
    }
}

#[derive(Debug, Clone)]
pub struct Router {
    config: RoutingConfig,
    grid: ObstacleGrid,
    cache: RouteCache,
}

impl Default for Router {
    fn default() -> Self {
        let config = RoutingConfig::default();
        Self { grid: ObstacleGrid::new(&config), config, cache: RouteCache::default() }
    }
}

impl Router {
    pub fn new(config: RoutingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { grid: ObstacleGrid::new(&config), config, cache: RouteCache::default() })
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn grid(&self) -> &ObstacleGrid {
        &self.grid
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    fn planner(&self) -> Planner<'_> {
        Planner { grid: &self.grid, config: &self.config }
    }

    pub fn upsert_node_obstacle(&mut self, node_id: &NodeId, world_bounds: &WorldRect) {
        self.grid.upsert_node_obstacle(node_id, world_bounds);
    }

    pub fn remove_node_obstacle(&mut self, node_id: &NodeId) -> bool {
        self.grid.remove_node_obstacle(node_id)
    }

    pub fn set_port_stub_obstacles(&mut self, stubs: &[PortStub]) {
        self.grid.set_port_stub_obstacles(stubs);
    }

    pub fn set_origin(&mut self, world_bounds: &WorldRect) {
        self.grid.set_origin(world_bounds);
    }

    /// Rebuilds the port-stub blockers from both ends of every connection.
    /// Ports the lookup cannot resolve get no stub. Returns the stub count.
    pub fn sync_port_stubs<F>(&mut self, connections: &[Connection], mut port_lookup: F) -> usize
    where
        F: FnMut(&PortRef) -> Option<PortAnchor>,
    {
        let mut stubs = Vec::<PortStub>::with_capacity(connections.len() * 2);
        for connection in connections {
            for port in [&connection.source, &connection.target] {
                if let Some(anchor) = port_lookup(port) {
                    if !stubs.contains(&anchor) {
                        stubs.push(anchor);
                    }
                }
            }
        }
        self.grid.set_port_stub_obstacles(&stubs);
        stubs.len()
    }

    /// Routes between two ports.
    ///
    /// With a `context`, the route is searched on the batch's grid and, unless
    /// `used_cells` overrides it, against the batch's used cells. When the grid
    /// holds no node obstacles the result is the direct L-route.
    pub fn calculate_route(
        &self,
        source: &PortAnchor,
        target: &PortAnchor,
        context: Option<&BatchContext<'_>>,
        used_cells: Option<&UsedCells>,
    ) -> RouteResult {
        self.calculate_route_with_waypoints(source, target, context, used_cells, &[])
    }

    /// Like [`Router::calculate_route`], chained through the user waypoints
    /// in `waypoints`. Other waypoint records are only echoed back.
    pub fn calculate_route_with_waypoints(
        &self,
        source: &PortAnchor,
        target: &PortAnchor,
        context: Option<&BatchContext<'_>>,
        used_cells: Option<&UsedCells>,
        waypoints: &[Waypoint],
    ) -> RouteResult {
        let (planner, batch_used) = match context {
            Some(ctx) => (ctx.planner, Some(&ctx.used)),
            None => (self.planner(), None),
        };
        planner.route(source, target, waypoints, used_cells.or(batch_used))
    }

    pub fn prepare_routing_grid(&self) -> BatchContext<'_> {
        BatchContext::new(&self.grid, &self.config)
    }

    /// Routes a whole connection set in one batch and refreshes the cache.
    ///
    /// Skipped connections lose their cache entry. Fallback routes are
    /// returned but never cached.
    pub fn recalculate_all_routes<F>(
        &mut self,
        connections: &[Connection],
        port_lookup: F,
    ) -> BTreeMap<ConnectionId, RouteResult>
    where
        F: FnMut(&PortRef) -> Option<PortAnchor>,
    {
        let outcome = self.prepare_routing_grid().route_all(connections, port_lookup);

        for id in &outcome.skipped {
            self.cache.remove(id);
        }
        for connection in connections {
            match outcome.routes.get(&connection.id) {
                Some(result) if !result.is_fallback => {
                    self.cache.insert(connection, result.clone());
                }
                Some(_) => {
                    self.cache.remove(&connection.id);
                }
                None => {}
            }
        }
        outcome.routes
    }

    pub fn cached_route(&self, connection_id: &ConnectionId) -> Option<&RouteResult> {
        self.cache.get(connection_id)
    }

    /// Returns the cached route, or routes the connection on its own and
    /// caches a non-fallback result. `None` when a port cannot be resolved.
    pub fn route_connection<F>(
        &mut self,
        connection: &Connection,
        mut port_lookup: F,
    ) -> Option<RouteResult>
    where
        F: FnMut(&PortRef) -> Option<PortAnchor>,
    {
        if let Some(hit) = self.cache.get(&connection.id) {
            return Some(hit.clone());
        }
        let (Some(source), Some(target)) =
            (port_lookup(&connection.source), port_lookup(&connection.target))
        else {
            tracing::warn!(connection = %connection.id, "cannot route, port unresolved");
            return None;
        };

        let result = self.planner().route(&source, &target, &connection.waypoints, None);
        if !result.is_fallback {
            self.cache.insert(connection, result.clone());
        }
        Some(result)
    }

    pub fn invalidate_route(&mut self, connection_id: &ConnectionId) -> bool {
        self.cache.remove(connection_id)
    }

    pub fn invalidate_routes_for_nodes(&mut self, node_ids: &[NodeId]) -> usize {
        self.cache.remove_touching(node_ids)
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
