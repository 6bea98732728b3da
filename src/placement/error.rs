use thiserror::Error;

/// No anchor/orientation combination of a route produced a collision-free
/// label rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no collision-free label position for route {route}")]
pub struct PlacementFailure {
    pub route: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlacementError {
    #[error("no routes to label")]
    NoRoutes,
    #[error("cannot compute the bounding box of an empty point set")]
    EmptyPointSet,
    #[error("route {route} has {points} point(s), at least 2 are required")]
    TooFewPoints { route: usize, points: usize },
    #[error("route {route} has a non-finite coordinate at vertex {vertex}")]
    NonFiniteCoordinate { route: usize, vertex: usize },
    #[error("invalid placement config: {0}")]
    InvalidConfig(String),
    #[error("occupancy grid needs {cells} cells, the limit is {limit}; use larger labels or the exact strategy")]
    GridTooLarge { cells: f64, limit: usize },
    #[error(transparent)]
    Placement(#[from] PlacementFailure),
}
