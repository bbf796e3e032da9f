// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! A* search over `(cell, arrival direction)` states.
//!
//! Direction is part of the state because a 180° reversal is illegal: the
//! same cell reached heading left or heading up has different successors.
//! The heuristic is the Manhattan distance in cells. It ignores turn and
//! used-cell penalties, so it only bounds the base step cost; the search
//! optimizes for readable routes, not provably shortest ones.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use super::grid::ObstacleGrid;
use super::open_set::OpenSet;
use super::used_cells::{CellUse, UsedCells};
use crate::config::RoutingConfig;
use crate::model::{Direction, GridCell, Point};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub path: Vec<Point>,
    /// Set when the search gave up and `path` is the deterministic L-shape.
    pub is_fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StateKey {
    cell: GridCell,
    arrival: Direction,
}

/// One search against a fixed grid and configuration.
#[derive(Debug, Clone, Copy)]
pub struct PathSearch<'a> {
    grid: &'a ObstacleGrid,
    config: &'a RoutingConfig,
}

impl<'a> PathSearch<'a> {
    pub fn new(grid: &'a ObstacleGrid, config: &'a RoutingConfig) -> Self {
        Self { grid, config }
    }

    /// Finds a cell-by-cell route from `start` to `end`, both snapped to the
    /// grid. The first step always goes along `initial_direction`.
    ///
    /// Never fails: when the goal is unreachable within the iteration budget
    /// the result is the L-shaped fallback with `is_fallback` set.
    pub fn find_path(
        &self,
        start: Point,
        end: Point,
        initial_direction: Direction,
        used_cells: Option<&UsedCells>,
    ) -> SearchOutcome {
        let start_cell = self.grid.to_cell(start);
        let goal_cell = self.grid.to_cell(end);

        if start_cell == goal_cell {
            let path = vec![self.grid.to_world(start_cell)];
            return SearchOutcome { path, is_fallback: false };
        }

        match self.search_cells(start_cell, goal_cell, initial_direction, used_cells) {
            Some(cells) => SearchOutcome {
                path: cells.into_iter().map(|cell| self.grid.to_world(cell)).collect(),
                is_fallback: false,
            },
            None => {
                tracing::debug!(
                    start = ?start_cell,
                    goal = ?goal_cell,
                    "route search failed, using L-shaped fallback"
                );
                SearchOutcome {
                    path: l_path(
                        self.grid.to_world(start_cell),
                        self.grid.to_world(goal_cell),
                        initial_direction,
                    ),
                    is_fallback: true,
                }
            }
        }
    }

    fn forced_walkable(
        &self,
        start: GridCell,
        goal: GridCell,
        exit: Direction,
    ) -> SmallVec<[GridCell; 8]> {
        let mut cells = SmallVec::<[GridCell; 8]>::new();
        cells.push(start);
        cells.push(goal);
        let mut cursor = start;
        for _ in 0..self.config.exit_corridor_cells {
            cursor = cursor.step(exit);
            cells.push(cursor);
        }
        cells
    }

    fn step_cost(
        &self,
        from: Direction,
        to: Direction,
        cell: GridCell,
        used: Option<&UsedCells>,
    ) -> u32 {
        let mut cost = 1;
        if from != to {
            cost += self.config.turn_penalty;
        }
        if let Some(used) = used {
            cost += match used.classify(cell, to) {
                CellUse::Free => 0,
                CellUse::Crossing => self.config.crossing_penalty,
                CellUse::Parallel => self.config.overlap_penalty,
            };
        }
        cost
    }

    fn search_cells(
        &self,
        start: GridCell,
        goal: GridCell,
        initial_direction: Direction,
        used_cells: Option<&UsedCells>,
    ) -> Option<Vec<GridCell>> {
        let forced = self.forced_walkable(start, goal, initial_direction);
        let walkable =
            |cell: GridCell| forced.contains(&cell) || self.grid.is_cell_walkable(cell);

        let start_key = StateKey { cell: start, arrival: initial_direction };
        let mut open = OpenSet::<StateKey>::new();
        let mut closed = FxHashSet::<StateKey>::default();
        let mut came_from = FxHashMap::<StateKey, StateKey>::default();
        open.push_or_improve(start_key, 0, start.manhattan_distance(&goal));

        let mut expanded = 0u32;
        while let Some(current) = open.pop() {
            if !closed.insert(current.key) {
                continue;
            }
            if current.key.cell == goal {
                return Some(reconstruct(&came_from, current.key, start_key));
            }

            expanded += 1;
            if expanded > self.config.max_iterations {
                tracing::trace!(expanded, open = open.len(), "route search exhausted its budget");
                return None;
            }

            let successors: SmallVec<[Direction; 4]> = if current.key == start_key {
                SmallVec::from_slice(&[initial_direction])
            } else {
                let arrival = current.key.arrival;
                Direction::ALL.into_iter().filter(|dir| *dir != arrival.opposite()).collect()
            };

            for direction in successors {
                let cell = current.key.cell.step(direction);
                let key = StateKey { cell, arrival: direction };
                if closed.contains(&key) || !walkable(cell) {
                    continue;
                }
                let step = self.step_cost(current.key.arrival, direction, cell, used_cells);
                let g = current.g.saturating_add(step);
                let f = g.saturating_add(cell.manhattan_distance(&goal));
                if open.push_or_improve(key, g, f) {
                    came_from.insert(key, current.key);
                }
            }
        }

        None
    }
}

fn reconstruct(
    came_from: &FxHashMap<StateKey, StateKey>,
    goal: StateKey,
    start: StateKey,
) -> Vec<GridCell> {
    let mut cells = vec![goal.cell];
    let mut cursor = goal;
    while cursor != start {
        let Some(prev) = came_from.get(&cursor) else {
            break;
        };
        cells.push(prev.cell);
        cursor = *prev;
    }
    cells.reverse();
    cells
}

/// Two-segment route that runs along `first`'s axis, turns once, and ends
/// at `end`. Collapses to fewer points when the corner coincides with an end.
pub fn l_path(start: Point, end: Point, first: Direction) -> Vec<Point> {
    if start.approx_eq(&end) {
        return vec![start];
    }
    let corner = if first.is_horizontal() {
        Point::new(end.x, start.y)
    } else {
        Point::new(start.x, end.y)
    };
    if corner.approx_eq(&start) || corner.approx_eq(&end) {
        return vec![start, end];
    }
    vec![start, corner, end]
}
