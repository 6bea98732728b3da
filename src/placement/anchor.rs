use super::geometry::closest_point_index;
use super::{FallbackStrategy, SpatialIndex};
use crate::ir::{Point, Route};

/// Outward walk over vertex indices: `+1, -1, +2, -2, ...` around `primary`.
///
/// Indices past either end of the route are skipped rather than clamped, so no
/// vertex is yielded twice and the walk ends once both directions run out.
#[derive(Debug, Clone)]
pub struct VertexWalk {
    primary: usize,
    len: usize,
    offset: usize,
    forward: bool,
}

impl VertexWalk {
    pub fn new(primary: usize, len: usize) -> Self {
        Self {
            primary,
            len,
            offset: 1,
            forward: true,
        }
    }
}

impl Iterator for VertexWalk {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        while self.offset < self.len {
            let forward = self.forward;
            let offset = self.offset;
            if !forward {
                self.offset += 1;
            }
            self.forward = !forward;
            let candidate = if forward {
                self.primary.checked_add(offset).filter(|idx| *idx < self.len)
            } else {
                self.primary.checked_sub(offset)
            };
            if candidate.is_some() {
                return candidate;
            }
        }
        None
    }
}

/// Primary anchor of a route: the vertex nearest to the map centre.
pub fn primary_anchor(route: &Route, center: Point) -> usize {
    closest_point_index(route.points(), center).unwrap_or(0)
}

/// Fallback anchors to try, in order, once the primary anchor is exhausted.
/// Never contains `primary` and never repeats an index.
pub fn fallback_anchors(
    route: &Route,
    primary: usize,
    strategy: FallbackStrategy,
    index: &dyn SpatialIndex,
) -> Vec<usize> {
    let walk = VertexWalk::new(primary, route.len());
    match strategy {
        FallbackStrategy::VertexWalk => walk.collect(),
        FallbackStrategy::NearestFreeCell => {
            let mut seen = vec![false; route.len()];
            seen[primary] = true;
            let mut order = Vec::new();
            let anchor = route.vertex(primary).unwrap_or_default();
            for target in index.free_points_near(anchor) {
                if order.len() + 1 == route.len() {
                    break;
                }
                if let Some(idx) = closest_point_index(route.points(), target) {
                    if !seen[idx] {
                        seen[idx] = true;
                        order.push(idx);
                    }
                }
            }
            order.extend(walk.filter(|idx| !seen[*idx]));
            order
        }
    }
}
