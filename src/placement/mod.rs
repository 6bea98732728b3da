// Greedy label placement for route polylines.
//
// Routes are handled one at a time in input order; every committed label is
// visible to the routes after it, so the result depends on the input order.

mod anchor;
mod error;
pub mod geometry;
mod grid;
mod index;
mod record;
mod types;

pub use anchor::{VertexWalk, fallback_anchors, primary_anchor};
pub use error::{PlacementError, PlacementFailure};
pub use grid::{CellState, GridIndex, refine_polyline};
pub use index::{RectIndex, SpatialIndex};
pub use record::{LabelRecord, label_clearance};
pub use types::*;

use crate::config::PlacementConfig;
use crate::ir::{Point, Route};
use crate::log::{debug, warn};

/// Place one label per route.
///
/// With [`FailurePolicy::Skip`] an unplaceable route is reported in the
/// returned layout; with [`FailurePolicy::Abort`] it ends the run with
/// [`PlacementError::Placement`].
pub fn place_labels(routes: &[Route], config: &PlacementConfig) -> Result<LabelLayout, PlacementError> {
    config.validate()?;
    let bounds = geometry::union_bounding_box(routes)?;
    let mut index: Box<dyn SpatialIndex + '_> = match config.strategy {
        IndexStrategy::Exact => Box::new(RectIndex::new(routes, config)),
        IndexStrategy::Grid => Box::new(GridIndex::new(routes, &bounds, config)?),
    };
    let outcomes = place_with_index(routes, bounds.center(), config, index.as_mut())?;
    Ok(LabelLayout {
        bounds,
        strategy: config.strategy,
        outcomes,
    })
}

/// Run the search against a caller-supplied index. `center` is the point the
/// primary anchors gravitate to.
pub fn place_with_index(
    routes: &[Route],
    center: Point,
    config: &PlacementConfig,
    index: &mut dyn SpatialIndex,
) -> Result<Vec<Result<LabelAssignment, PlacementFailure>>, PlacementError> {
    let mut outcomes = Vec::with_capacity(routes.len());
    for (idx, route) in routes.iter().enumerate() {
        match place_route(idx, route, center, config, index) {
            Ok(assignment) => {
                debug!(
                    route = idx,
                    anchor_index = assignment.anchor_index,
                    orientation = %assignment.orientation,
                    phase = ?assignment.phase,
                    "placed label"
                );
                outcomes.push(Ok(assignment));
            }
            Err(failure) => {
                warn!(route = idx, strategy = ?index.strategy(), "label could not be placed");
                if config.on_failure == FailurePolicy::Abort {
                    return Err(failure.into());
                }
                outcomes.push(Err(failure));
            }
        }
    }
    Ok(outcomes)
}

/// Search one route: the primary anchor first, then its fallback sequence.
/// Commits the first free rectangle.
fn place_route(
    idx: usize,
    route: &Route,
    center: Point,
    config: &PlacementConfig,
    index: &mut dyn SpatialIndex,
) -> Result<LabelAssignment, PlacementFailure> {
    let primary = primary_anchor(route, center);
    if let Some(found) = try_anchor(idx, route, primary, SearchPhase::Primary, config, index) {
        index.commit(found.rect, idx);
        return Ok(found);
    }

    let fallbacks = fallback_anchors(route, primary, config.fallback, index);
    for (step, anchor_index) in fallbacks.into_iter().enumerate() {
        let phase = SearchPhase::Fallback { step: step + 1 };
        if let Some(found) = try_anchor(idx, route, anchor_index, phase, config, index) {
            index.commit(found.rect, idx);
            return Ok(found);
        }
    }
    Err(PlacementFailure { route: idx })
}

fn try_anchor(
    idx: usize,
    route: &Route,
    anchor_index: usize,
    phase: SearchPhase,
    config: &PlacementConfig,
    index: &dyn SpatialIndex,
) -> Option<LabelAssignment> {
    let anchor = route.vertex(anchor_index)?;
    Orientation::PRECEDENCE.into_iter().find_map(|orientation| {
        let rect = orientation.rect_at(anchor, config.label_width, config.label_height);
        index.is_free(&rect, idx).then_some(LabelAssignment {
            route: idx,
            anchor,
            anchor_index,
            orientation,
            rect,
            phase,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::routes_from_points;

    fn routes(raw: Vec<Vec<Point>>) -> Vec<Route> {
        routes_from_points(raw).unwrap()
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = place_labels(&[], &PlacementConfig::default()).unwrap_err();
        assert_eq!(err, PlacementError::NoRoutes);
    }

    #[test]
    fn invalid_config_is_rejected_before_search() {
        let config = PlacementConfig {
            label_width: 0.0,
            ..PlacementConfig::default()
        };
        let routes = routes(vec![vec![(0.0, 0.0), (1.0, 1.0)]]);
        assert!(matches!(
            place_labels(&routes, &config),
            Err(PlacementError::InvalidConfig(_))
        ));
    }

    #[test]
    fn route_leaving_into_bottom_right_gets_bottom_left() {
        let routes = routes(vec![vec![(0.0, 0.0), (10.0, 10.0)]]);
        let layout = place_labels(&routes, &PlacementConfig::default()).unwrap();
        let label = layout.get(0).unwrap();
        assert_eq!(label.anchor, (0.0, 0.0));
        assert_eq!(label.orientation, Orientation::BottomLeft);
        assert_eq!(label.phase, SearchPhase::Primary);
    }

    #[test]
    fn fully_blocked_route_is_skipped_or_aborts() {
        // The second route is enclosed by a tight box drawn by the first.
        let raw = vec![
            vec![
                (-5.0, -5.0),
                (5.0, -5.0),
                (5.0, 5.0),
                (-5.0, 5.0),
                (-5.0, -5.0),
            ],
            vec![(-1.0, 0.0), (1.0, 0.0)],
        ];
        let routes = routes(raw);
        let config = PlacementConfig {
            label_width: 20.0,
            label_height: 20.0,
            ..PlacementConfig::default()
        };
        let layout = place_labels(&routes, &config).unwrap();
        assert!(layout.outcomes[0].is_ok());
        assert_eq!(layout.outcomes[1], Err(PlacementFailure { route: 1 }));
        assert!(!layout.is_complete());

        let abort = PlacementConfig {
            on_failure: FailurePolicy::Abort,
            ..config
        };
        assert_eq!(
            place_labels(&routes, &abort).unwrap_err(),
            PlacementError::Placement(PlacementFailure { route: 1 })
        );
    }

    #[test]
    fn later_routes_avoid_earlier_labels() {
        let routes = routes(vec![
            vec![(0.0, 0.0), (0.0, -300.0)],
            vec![(0.0, 0.0), (0.0, -300.0)],
        ]);
        let layout = place_labels(&routes, &PlacementConfig::default()).unwrap();
        let first = layout.get(0).unwrap();
        let second = layout.get(1).unwrap();
        assert_eq!(first.orientation, Orientation::BottomRight);
        assert_eq!(second.orientation, Orientation::BottomLeft);
        assert!(!geometry::rects_overlap(&first.rect, &second.rect));
    }

    #[test]
    fn custom_index_is_threaded_through_the_search() {
        struct Stingy {
            commits: usize,
        }
        impl SpatialIndex for Stingy {
            fn strategy(&self) -> IndexStrategy {
                IndexStrategy::Exact
            }
            fn is_free(&self, rect: &LabelRect, _owner: usize) -> bool {
                rect.left < 0.0 && rect.top < 0.0
            }
            fn commit(&mut self, _rect: LabelRect, _owner: usize) {
                self.commits += 1;
            }
        }

        let routes = routes(vec![vec![(0.0, 0.0), (5.0, 0.0)]]);
        let mut index = Stingy { commits: 0 };
        let outcomes =
            place_with_index(&routes, (0.0, 0.0), &PlacementConfig::default(), &mut index).unwrap();
        assert_eq!(index.commits, 1);
        assert_eq!(outcomes[0].unwrap().orientation, Orientation::TopLeft);
    }
}
