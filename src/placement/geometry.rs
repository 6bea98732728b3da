// Pure geometry used by the spatial indexes and the placement search.
// No state; every function works on plain coordinates.

use super::{BoundingBox, LabelRect, PlacementError};
use crate::ir::{Point, Route};

pub fn bounding_box(points: &[Point]) -> Result<BoundingBox, PlacementError> {
    let (first, rest) = points.split_first().ok_or(PlacementError::EmptyPointSet)?;
    let init = BoundingBox {
        min_x: first.0,
        min_y: first.1,
        max_x: first.0,
        max_y: first.1,
    };
    Ok(rest.iter().fold(init, |bbox, &(x, y)| BoundingBox {
        min_x: bbox.min_x.min(x),
        min_y: bbox.min_y.min(y),
        max_x: bbox.max_x.max(x),
        max_y: bbox.max_y.max(y),
    }))
}

/// Componentwise union of every route's bounding box.
pub fn union_bounding_box(routes: &[Route]) -> Result<BoundingBox, PlacementError> {
    let (first, rest) = routes.split_first().ok_or(PlacementError::NoRoutes)?;
    rest.iter().try_fold(bounding_box(first.points())?, |acc, route| {
        Ok(acc.union(&bounding_box(route.points())?))
    })
}

/// Index of the vertex nearest to `target`; the first one wins ties.
pub fn closest_point_index(points: &[Point], target: Point) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, point) in points.iter().enumerate() {
        let dx = point.0 - target.0;
        let dy = point.1 - target.1;
        let dist2 = dx * dx + dy * dy;
        if best.is_none_or(|(_, d)| dist2 < d) {
            best = Some((idx, dist2));
        }
    }
    best.map(|(idx, _)| idx)
}

/// Does the segment cross the open interior of `rect`?
///
/// Touching the border (running along an edge, ending on it, grazing a corner)
/// is not an intersection. Segments whose x or y extent is within `eps` are
/// treated as vertical or horizontal; shorter than `eps` overall, as a point.
pub fn segment_intersects_rect(p1: Point, p2: Point, rect: &LabelRect, eps: f64) -> bool {
    let (x1, y1) = p1;
    let (x2, y2) = p2;
    let dx = x2 - x1;
    let dy = y2 - y1;

    if dx.abs() <= eps && dy.abs() <= eps {
        return rect.contains_strict(p1);
    }
    if rect.contains_strict(p1) || rect.contains_strict(p2) {
        return true;
    }

    let (left, top, right, bottom) = (rect.left, rect.top, rect.right(), rect.bottom());
    let (min_x, max_x) = (x1.min(x2), x1.max(x2));
    let (min_y, max_y) = (y1.min(y2), y1.max(y2));

    if dx.abs() <= eps {
        let x = 0.5 * (x1 + x2);
        return x > left && x < right && min_y < bottom && max_y > top;
    }
    if dy.abs() <= eps {
        let y = 0.5 * (y1 + y2);
        return y > top && y < bottom && min_x < right && max_x > left;
    }

    let slope = dy / dx;
    let intercept = y1 - slope * x1;
    let y_at = |x: f64| slope * x + intercept;
    let x_at = |y: f64| (y - intercept) / slope;

    for edge_x in [left, right] {
        if edge_x >= min_x && edge_x <= max_x {
            let y = y_at(edge_x);
            if y > top && y < bottom {
                return true;
            }
        }
    }
    for edge_y in [top, bottom] {
        if edge_y >= min_y && edge_y <= max_y {
            let x = x_at(edge_y);
            if x > left && x < right {
                return true;
            }
        }
    }

    // Every edge crossing sits exactly on a corner: the segment may still run
    // through the interior, e.g. along the rectangle's diagonal.
    let span_lo = min_x.max(left);
    let span_hi = max_x.min(right);
    if span_hi - span_lo > eps {
        let mid_x = 0.5 * (span_lo + span_hi);
        return rect.contains_strict((mid_x, y_at(mid_x)));
    }
    false
}

pub fn polyline_intersects_rect(points: &[Point], rect: &LabelRect, eps: f64) -> bool {
    points
        .windows(2)
        .any(|seg| segment_intersects_rect(seg[0], seg[1], rect, eps))
}

/// Axis-aligned overlap; rectangles that only share an edge do not overlap.
pub fn rects_overlap(a: &LabelRect, b: &LabelRect) -> bool {
    !(a.right() <= b.left || a.left >= b.right() || a.bottom() <= b.top || a.top >= b.bottom())
}

pub fn point_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let vx = b.0 - a.0;
    let vy = b.1 - a.1;
    let len2 = vx * vx + vy * vy;
    if len2 <= 1e-12 {
        let dx = point.0 - a.0;
        let dy = point.1 - a.1;
        return (dx * dx + dy * dy).sqrt();
    }
    let t = ((point.0 - a.0) * vx + (point.1 - a.1) * vy) / len2;
    let t = t.clamp(0.0, 1.0);
    let proj_x = a.0 + vx * t;
    let proj_y = a.1 + vy * t;
    let dx = point.0 - proj_x;
    let dy = point.1 - proj_y;
    (dx * dx + dy * dy).sqrt()
}

pub fn point_polyline_distance(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => point_segment_distance(point, *only, *only),
        _ => points
            .windows(2)
            .map(|seg| point_segment_distance(point, seg[0], seg[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

pub fn point_rect_distance(point: Point, rect: &LabelRect) -> f64 {
    let dx = if point.0 < rect.left {
        rect.left - point.0
    } else if point.0 > rect.right() {
        point.0 - rect.right()
    } else {
        0.0
    };
    let dy = if point.1 < rect.top {
        rect.top - point.1
    } else if point.1 > rect.bottom() {
        point.1 - rect.bottom()
    } else {
        0.0
    };
    (dx * dx + dy * dy).sqrt()
}

fn segment_rect_distance(a: Point, b: Point, rect: &LabelRect, eps: f64) -> f64 {
    if segment_intersects_rect(a, b, rect, eps) {
        return 0.0;
    }
    let mut best = point_rect_distance(a, rect).min(point_rect_distance(b, rect));
    for corner in rect.corners() {
        best = best.min(point_segment_distance(corner, a, b));
    }
    best
}

/// Gap between a polyline and a rectangle; 0 when the polyline crosses it.
pub fn polyline_rect_distance(points: &[Point], rect: &LabelRect, eps: f64) -> f64 {
    let mut best = f64::INFINITY;
    for seg in points.windows(2) {
        best = best.min(segment_rect_distance(seg[0], seg[1], rect, eps));
        if best <= 0.0 {
            break;
        }
    }
    best
}
