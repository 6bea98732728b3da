use serde::{Deserialize, Serialize};

use super::geometry::polyline_rect_distance;
use super::{LabelAssignment, LabelRect, Orientation};
use crate::ir::Route;

/// Serializable label descriptor: the anchor point and the quadrant the label
/// box occupies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRecord {
    pub x: f64,
    pub y: f64,
    pub orientation: Orientation,
}

impl LabelRecord {
    /// Label box for this record at the given size.
    pub fn rect(&self, width: f64, height: f64) -> LabelRect {
        self.orientation.rect_at((self.x, self.y), width, height)
    }
}

impl From<&LabelAssignment> for LabelRecord {
    fn from(assignment: &LabelAssignment) -> Self {
        Self {
            x: assignment.anchor.0,
            y: assignment.anchor.1,
            orientation: assignment.orientation,
        }
    }
}

/// Smallest gap between a committed label and any route other than its own.
/// Infinite when there is no other route.
pub fn label_clearance(assignment: &LabelAssignment, routes: &[Route], eps: f64) -> f64 {
    routes
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != assignment.route)
        .map(|(_, route)| polyline_rect_distance(route.points(), &assignment.rect, eps))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::SearchPhase;

    fn assignment() -> LabelAssignment {
        LabelAssignment {
            route: 0,
            anchor: (0.0, 0.0),
            anchor_index: 0,
            orientation: Orientation::BottomRight,
            rect: LabelRect::new(0.0, 0.0, 100.0, 50.0),
            phase: SearchPhase::Primary,
        }
    }

    #[test]
    fn record_keeps_anchor_and_orientation() {
        let record = LabelRecord::from(&assignment());
        assert_eq!((record.x, record.y), (0.0, 0.0));
        assert_eq!(record.orientation, Orientation::BottomRight);
        assert_eq!(record.rect(100.0, 50.0), assignment().rect);
    }

    #[test]
    fn record_serializes_orientation_token() {
        let json = serde_json::to_string(&LabelRecord::from(&assignment())).unwrap();
        assert_eq!(json, r#"{"x":0.0,"y":0.0,"orientation":"bottom-right"}"#);
    }

    #[test]
    fn clearance_ignores_own_route() {
        let routes = vec![
            Route::new(0, vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap(),
            Route::new(1, vec![(0.0, 200.0), (1000.0, 200.0)]).unwrap(),
        ];
        let clearance = label_clearance(&assignment(), &routes, 1e-9);
        assert!((clearance - 150.0).abs() < 1e-9, "got {clearance}");
        assert!(label_clearance(&assignment(), &routes[..1], 1e-9).is_infinite());
    }
}
