use serde::{Deserialize, Serialize};

use crate::placement::PlacementError;

/// A 2D map coordinate; y grows downward.
pub type Point = (f64, f64);

/// An immutable polyline to be labelled. Its position in the input sequence is
/// its identifier for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct Route {
    points: Vec<Point>,
}

impl Route {
    /// Build a route, rejecting fewer than two vertices or non-finite
    /// coordinates. `index` is only used to label the error.
    pub fn new(index: usize, points: Vec<Point>) -> Result<Self, PlacementError> {
        if points.len() < 2 {
            return Err(PlacementError::TooFewPoints {
                route: index,
                points: points.len(),
            });
        }
        if let Some(vertex) = points
            .iter()
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(PlacementError::NonFiniteCoordinate {
                route: index,
                vertex,
            });
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn vertex(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }
}

impl TryFrom<Vec<Point>> for Route {
    type Error = PlacementError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Route::new(0, points)
    }
}

impl From<Route> for Vec<Point> {
    fn from(route: Route) -> Self {
        route.points
    }
}

/// Build routes from raw coordinate lists, numbering errors by input position.
pub fn routes_from_points(raw: Vec<Vec<Point>>) -> Result<Vec<Route>, PlacementError> {
    raw.into_iter()
        .enumerate()
        .map(|(idx, points)| Route::new(idx, points))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_single_point_route() {
        let err = Route::new(3, vec![(1.0, 1.0)]).unwrap_err();
        assert!(matches!(
            err,
            PlacementError::TooFewPoints {
                route: 3,
                points: 1
            }
        ));
    }

    #[test]
    fn rejects_non_finite_vertex() {
        let err = Route::new(0, vec![(0.0, 0.0), (f64::NAN, 2.0)]).unwrap_err();
        assert!(matches!(
            err,
            PlacementError::NonFiniteCoordinate {
                route: 0,
                vertex: 1
            }
        ));
    }

    #[test]
    fn coincident_points_are_allowed() {
        let route = Route::new(0, vec![(5.0, 5.0), (5.0, 5.0)]).unwrap();
        assert_eq!(route.len(), 2);
        assert_eq!(route.vertex(0), route.vertex(1));
    }

    #[test]
    fn routes_from_points_reports_offending_index() {
        let err = routes_from_points(vec![vec![(0.0, 0.0), (1.0, 0.0)], vec![]]).unwrap_err();
        assert!(matches!(
            err,
            PlacementError::TooFewPoints {
                route: 1,
                points: 0
            }
        ));
    }

    #[test]
    fn route_deserializes_from_coordinate_pairs() {
        let route: Route = serde_json::from_str("[[0, 0], [10, 5]]").unwrap();
        assert_eq!(route.points(), &[(0.0, 0.0), (10.0, 5.0)]);
        assert!(serde_json::from_str::<Route>("[[0, 0]]").is_err());
    }
}
