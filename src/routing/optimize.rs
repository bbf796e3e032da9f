// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{Direction, Point};

/// Reduces a path to its corner points.
///
/// Paths shorter than three points come back unchanged. Otherwise repeated
/// points are dropped and every interior point whose incoming and outgoing
/// unit steps agree is removed.
pub fn simplify(path: &[Point]) -> Vec<Point> {
    if path.len() < 3 {
        return path.to_vec();
    }

    let mut deduped = Vec::<Point>::with_capacity(path.len());
    for point in path {
        if deduped.last().is_some_and(|last: &Point| last.approx_eq(point)) {
            continue;
        }
        deduped.push(*point);
    }
    if deduped.len() < 3 {
        return deduped;
    }

    let step = |a: &Point, b: &Point| Direction::from_step(b.x - a.x, b.y - a.y);

    let mut points = Vec::<Point>::with_capacity(deduped.len());
    points.push(deduped[0]);
    let mut prev_dir = step(&deduped[0], &deduped[1]);
    for idx in 1..deduped.len() - 1 {
        let dir = step(&deduped[idx], &deduped[idx + 1]);
        if dir != prev_dir || dir.is_none() {
            points.push(deduped[idx]);
        }
        prev_dir = dir;
    }
    if let Some(last) = deduped.last() {
        points.push(*last);
    }
    points
}

pub fn snap_to_grid(point: Point, grid_size: f64) -> Point {
    Point::new(
        (point.x / grid_size).round() * grid_size,
        (point.y / grid_size).round() * grid_size,
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{simplify, snap_to_grid};
    use crate::model::Point;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn drops_collinear_interior_points() {
        let path = vec![
            p(0.0, 0.0),
            p(10.0, 0.0),
            p(20.0, 0.0),
            p(30.0, 0.0),
            p(30.0, 10.0),
            p(30.0, 20.0),
            p(30.0, 30.0),
        ];
        assert_eq!(simplify(&path), vec![p(0.0, 0.0), p(30.0, 0.0), p(30.0, 30.0)]);
    }

    #[test]
    fn short_paths_are_returned_unchanged() {
        assert_eq!(simplify(&[]), Vec::<Point>::new());
        assert_eq!(simplify(&[p(1.0, 1.0)]), vec![p(1.0, 1.0)]);
        assert_eq!(simplify(&[p(1.0, 1.0), p(1.0, 1.0)]), vec![p(1.0, 1.0), p(1.0, 1.0)]);
    }

    #[test]
    fn tolerates_zero_length_segments() {
        let path = vec![p(0.0, 0.0), p(0.0, 0.0), p(10.0, 0.0), p(10.0, 0.0), p(20.0, 0.0)];
        assert_eq!(simplify(&path), vec![p(0.0, 0.0), p(20.0, 0.0)]);

        let collapsed = simplify(&[p(5.0, 5.0), p(5.0, 5.0), p(5.0, 5.0)]);
        assert_eq!(collapsed, vec![p(5.0, 5.0)]);
    }

    #[test]
    fn keeps_reversals_as_corners() {
        let path = vec![p(0.0, 0.0), p(20.0, 0.0), p(10.0, 0.0)];
        assert_eq!(simplify(&path), path);
    }

    #[rstest]
    #[case(vec![p(0.0, 0.0), p(0.0, 10.0), p(0.0, 20.0), p(10.0, 20.0), p(20.0, 20.0)])]
    #[case(vec![p(0.0, 0.0), p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(10.0, 10.0)])]
    #[case(vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0), p(0.0, 20.0)])]
    #[case(vec![p(3.0, 3.0), p(3.0, 3.0), p(3.0, 3.0), p(3.0, 3.0)])]
    fn simplify_is_idempotent(#[case] path: Vec<Point>) {
        let once = simplify(&path);
        assert_eq!(simplify(&once), once);
    }

    #[rstest]
    #[case(p(14.0, 16.0), p(10.0, 20.0))]
    #[case(p(-14.0, -16.0), p(-10.0, -20.0))]
    #[case(p(25.0, 0.1), p(30.0, 0.0))]
    fn snaps_each_axis_to_nearest_multiple(#[case] input: Point, #[case] expected: Point) {
        assert_eq!(snap_to_grid(input, 10.0), expected);
    }
}
