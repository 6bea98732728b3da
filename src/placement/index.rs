use super::geometry::{polyline_intersects_rect, rects_overlap};
use super::{IndexStrategy, LabelRect};
use crate::config::PlacementConfig;
use crate::ir::{Point, Route};

/// Occupancy state threaded through one placement run.
///
/// `commit` must only be called with a rectangle that `is_free` just accepted
/// for the same owner; it does not re-check.
pub trait SpatialIndex {
    fn strategy(&self) -> IndexStrategy;

    /// Can route `owner` put its label at `rect`?
    fn is_free(&self, rect: &LabelRect, owner: usize) -> bool;

    fn commit(&mut self, rect: LabelRect, owner: usize);

    /// Free positions ordered from nearest to `point`. Only indexes that track
    /// free space return anything.
    fn free_points_near(&self, _point: Point) -> Vec<Point> {
        Vec::new()
    }
}

/// Exact strategy: every candidate is tested against all route polylines and
/// every placed label.
pub struct RectIndex<'a> {
    routes: &'a [Route],
    placed: Vec<(usize, LabelRect)>,
    tolerance: (f64, f64),
    eps: f64,
    avoid_own_route: bool,
}

impl<'a> RectIndex<'a> {
    pub fn new(routes: &'a [Route], config: &PlacementConfig) -> Self {
        Self {
            routes,
            placed: Vec::with_capacity(routes.len()),
            tolerance: (config.tolerance_x, config.tolerance_y),
            eps: config.epsilon,
            avoid_own_route: config.avoid_own_route,
        }
    }

    pub fn placed(&self) -> &[(usize, LabelRect)] {
        &self.placed
    }
}

impl SpatialIndex for RectIndex<'_> {
    fn strategy(&self) -> IndexStrategy {
        IndexStrategy::Exact
    }

    fn is_free(&self, rect: &LabelRect, owner: usize) -> bool {
        let padded = rect.inflate(self.tolerance.0, self.tolerance.1);
        if self.placed.iter().any(|(_, other)| rects_overlap(&padded, other)) {
            return false;
        }
        !self
            .routes
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.avoid_own_route || *idx != owner)
            .any(|(_, route)| polyline_intersects_rect(route.points(), rect, self.eps))
    }

    fn commit(&mut self, rect: LabelRect, owner: usize) {
        self.placed.push((owner, rect));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routes() -> Vec<Route> {
        vec![
            Route::new(0, vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap(),
            Route::new(1, vec![(0.0, 200.0), (1000.0, 200.0)]).unwrap(),
        ]
    }

    #[test]
    fn rect_crossing_a_route_is_not_free() {
        let routes = routes();
        let index = RectIndex::new(&routes, &PlacementConfig::default());
        assert!(!index.is_free(&LabelRect::new(10.0, -20.0, 100.0, 50.0), 1));
        assert!(index.is_free(&LabelRect::new(10.0, 0.0, 100.0, 50.0), 1));
    }

    #[test]
    fn committed_labels_block_overlapping_candidates() {
        let routes = routes();
        let mut index = RectIndex::new(&routes, &PlacementConfig::default());
        let first = LabelRect::new(0.0, 50.0, 100.0, 50.0);
        assert!(index.is_free(&first, 0));
        index.commit(first, 0);
        assert!(!index.is_free(&LabelRect::new(50.0, 60.0, 100.0, 50.0), 1));
        assert!(index.is_free(&LabelRect::new(100.0, 50.0, 100.0, 50.0), 1));
        assert_eq!(index.placed().len(), 1);
    }

    #[test]
    fn tolerance_keeps_labels_apart() {
        let routes = routes();
        let config = PlacementConfig {
            tolerance_x: 10.0,
            tolerance_y: 10.0,
            ..PlacementConfig::default()
        };
        let mut index = RectIndex::new(&routes, &config);
        index.commit(LabelRect::new(0.0, 50.0, 100.0, 50.0), 0);
        assert!(!index.is_free(&LabelRect::new(105.0, 50.0, 100.0, 50.0), 1));
        assert!(index.is_free(&LabelRect::new(110.0, 50.0, 100.0, 50.0), 1));
    }

    #[test]
    fn own_route_can_be_ignored() {
        let routes = routes();
        let candidate = LabelRect::new(10.0, -20.0, 100.0, 50.0);
        let strict = RectIndex::new(&routes, &PlacementConfig::default());
        assert!(!strict.is_free(&candidate, 0));
        let relaxed = RectIndex::new(
            &routes,
            &PlacementConfig {
                avoid_own_route: false,
                ..PlacementConfig::default()
            },
        );
        assert!(relaxed.is_free(&candidate, 0));
        assert!(!relaxed.is_free(&candidate, 1));
    }
}
