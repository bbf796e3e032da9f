// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rustc_hash::FxHashMap;

use super::grid::GridOffset;
use crate::model::{Direction, GridCell, Point};

/// Set of travel directions, one bit per [`Direction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DirectionSet(u8);

impl DirectionSet {
    fn bit(direction: Direction) -> u8 {
        match direction {
            Direction::Right => 0b0001,
            Direction::Down => 0b0010,
            Direction::Left => 0b0100,
            Direction::Up => 0b1000,
        }
    }

    pub fn insert(&mut self, direction: Direction) {
        self.0 |= Self::bit(direction);
    }

    pub fn contains(&self, direction: Direction) -> bool {
        self.0 & Self::bit(direction) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn union(self, other: DirectionSet) -> Self {
        Self(self.0 | other.0)
    }

    /// True if some member travels along the same axis as `direction`.
    pub fn shares_axis(&self, direction: Direction) -> bool {
        self.contains(direction) || self.contains(direction.opposite())
    }

    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL.into_iter().filter(move |dir| self.contains(*dir))
    }
}

impl FromIterator<Direction> for DirectionSet {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Self {
        let mut set = Self::default();
        for dir in iter {
            set.insert(dir);
        }
        set
    }
}

/// How entering a cell relates to routes committed earlier in the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellUse {
    Free,
    Crossing,
    Parallel,
}

/// Cells occupied by committed routes of the current batch, keyed in
/// grid-local coordinates of the batch's offset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsedCells {
    cells: FxHashMap<GridCell, DirectionSet>,
}

impl UsedCells {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn get(&self, cell: GridCell) -> DirectionSet {
        self.cells.get(&cell).copied().unwrap_or_default()
    }

    pub fn mark(&mut self, cell: GridCell, direction: Direction) {
        self.cells.entry(cell).or_default().insert(direction);
    }

    pub fn classify(&self, cell: GridCell, direction: Direction) -> CellUse {
        let used = self.get(cell);
        if used.is_empty() {
            CellUse::Free
        } else if used.shares_axis(direction) {
            CellUse::Parallel
        } else {
            CellUse::Crossing
        }
    }

    pub fn merge(&mut self, other: &UsedCells) {
        for (cell, dirs) in &other.cells {
            let entry = self.cells.entry(*cell).or_default();
            *entry = entry.union(*dirs);
        }
    }

    /// Records a contiguous cell path. Both ends of every step carry the step
    /// direction, so corners hold two directions. The first `skip` cells are
    /// left unrecorded.
    pub fn mark_cells(&mut self, cells: &[GridCell], skip: usize) {
        for (idx, pair) in cells.windows(2).enumerate() {
            let Some(direction) = pair[0].direction_to(&pair[1]) else {
                continue;
            };
            if idx >= skip {
                self.mark(pair[0], direction);
            }
            if idx + 1 >= skip {
                self.mark(pair[1], direction);
            }
        }
    }

    /// Records a world-space orthogonal polyline. Non-axis-aligned segments
    /// are ignored.
    pub fn mark_polyline(&mut self, path: &[Point], offset: &GridOffset, skip: usize) {
        self.mark_cells(&rasterize(path, offset), skip);
    }
}

/// Expands corner points into the full cell-by-cell walk.
pub(crate) fn rasterize(path: &[Point], offset: &GridOffset) -> Vec<GridCell> {
    let mut cells = Vec::<GridCell>::new();
    let Some(first) = path.first() else {
        return cells;
    };
    cells.push(offset.to_cell(*first));

    for window in path.windows(2) {
        let a = offset.to_cell(window[0]);
        let b = offset.to_cell(window[1]);
        let dx = (b.x - a.x).signum();
        let dy = (b.y - a.y).signum();
        if dx != 0 && dy != 0 {
            continue;
        }
        let steps = (b.x - a.x).abs() + (b.y - a.y).abs();
        for step in 1..=steps {
            cells.push(GridCell::new(a.x + dx * step, a.y + dy * step));
        }
    }
    cells
}
