use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::PlacementFailure;
use crate::ir::Point;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        (
            0.5 * (self.min_x + self.max_x),
            0.5 * (self.min_y + self.max_y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.0 >= self.min_x && point.0 <= self.max_x && point.1 >= self.min_y && point.1 <= self.max_y
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Grow by `dx` horizontally and `dy` vertically on every side.
    pub fn expand(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }
}

/// Axis-aligned label rectangle; `top` is the smaller y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl LabelRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        (self.left + self.width * 0.5, self.top + self.height * 0.5)
    }

    /// Tolerance margin added on all sides.
    pub fn inflate(&self, dx: f64, dy: f64) -> LabelRect {
        LabelRect {
            left: self.left - dx,
            top: self.top - dy,
            width: self.width + 2.0 * dx,
            height: self.height + 2.0 * dy,
        }
    }

    /// Open-interval containment: points on the border are outside.
    pub fn contains_strict(&self, point: Point) -> bool {
        point.0 > self.left && point.0 < self.right() && point.1 > self.top && point.1 < self.bottom()
    }

    pub fn corners(&self) -> [Point; 4] {
        let (x0, y0, x1, y1) = (self.left, self.top, self.right(), self.bottom());
        [(x0, y0), (x1, y0), (x1, y1), (x0, y1)]
    }
}

/// Quadrant of the anchor point occupied by the label rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Orientation {
    BottomRight,
    BottomLeft,
    TopLeft,
    TopRight,
}

impl Orientation {
    /// Order in which orientations are tried at every anchor.
    pub const PRECEDENCE: [Orientation; 4] = [
        Orientation::BottomRight,
        Orientation::BottomLeft,
        Orientation::TopRight,
        Orientation::TopLeft,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::BottomRight => "bottom-right",
            Orientation::BottomLeft => "bottom-left",
            Orientation::TopLeft => "top-left",
            Orientation::TopRight => "top-right",
        }
    }

    /// The `width` x `height` rectangle this orientation places at `anchor`.
    pub fn rect_at(&self, anchor: Point, width: f64, height: f64) -> LabelRect {
        let (x, y) = anchor;
        match self {
            Orientation::BottomRight => LabelRect::new(x, y, width, height),
            Orientation::BottomLeft => LabelRect::new(x - width, y, width, height),
            Orientation::TopLeft => LabelRect::new(x - width, y - height, width, height),
            Orientation::TopRight => LabelRect::new(x, y - height, width, height),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Orientation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bottom-right" => Ok(Orientation::BottomRight),
            "bottom-left" => Ok(Orientation::BottomLeft),
            "top-left" => Ok(Orientation::TopLeft),
            "top-right" => Ok(Orientation::TopRight),
            other => Err(format!("invalid label orientation: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IndexStrategy {
    /// Exact polyline/rectangle tests against every route and placed label.
    #[default]
    Exact,
    /// Uniform occupancy grid with label-sized cells.
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackStrategy {
    /// Walk outward along the route: +1, -1, +2, -2, ...
    #[default]
    VertexWalk,
    /// Route vertices closest to the nearest free grid cells first.
    NearestFreeCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Report the route as unplaced and keep going.
    #[default]
    Skip,
    /// Stop the run at the first route that cannot be placed.
    Abort,
}

/// Where in the per-route search a label was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchPhase {
    Primary,
    Fallback { step: usize },
}

/// A committed label for one route. Never revised once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelAssignment {
    pub route: usize,
    pub anchor: Point,
    pub anchor_index: usize,
    pub orientation: Orientation,
    pub rect: LabelRect,
    pub phase: SearchPhase,
}

/// Result of a full placement run: one outcome per input route, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelLayout {
    pub bounds: BoundingBox,
    pub strategy: IndexStrategy,
    pub outcomes: Vec<Result<LabelAssignment, PlacementFailure>>,
}

impl LabelLayout {
    pub fn assignments(&self) -> impl Iterator<Item = &LabelAssignment> + '_ {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &PlacementFailure> + '_ {
        self.outcomes.iter().filter_map(|outcome| outcome.as_ref().err())
    }

    pub fn get(&self, route: usize) -> Option<&LabelAssignment> {
        self.outcomes.get(route).and_then(|outcome| outcome.as_ref().ok())
    }

    pub fn is_complete(&self) -> bool {
        self.outcomes.iter().all(|outcome| outcome.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn orientation_quadrants_touch_anchor() {
        let anchor = (10.0, 20.0);
        for orientation in Orientation::PRECEDENCE {
            let rect = orientation.rect_at(anchor, 100.0, 50.0);
            let touches = rect
                .corners()
                .iter()
                .any(|corner| *corner == anchor);
            assert!(touches, "{orientation} rect should have the anchor as a corner");
        }
        assert_eq!(
            Orientation::BottomRight.rect_at(anchor, 100.0, 50.0),
            LabelRect::new(10.0, 20.0, 100.0, 50.0)
        );
        assert_eq!(
            Orientation::TopLeft.rect_at(anchor, 100.0, 50.0),
            LabelRect::new(-90.0, -30.0, 100.0, 50.0)
        );
    }

    #[test]
    fn orientation_tokens_round_trip() {
        for orientation in Orientation::PRECEDENCE {
            assert_eq!(orientation.as_str().parse::<Orientation>(), Ok(orientation));
        }
        assert!("middle".parse::<Orientation>().is_err());
        assert_eq!(
            serde_json::to_string(&Orientation::TopRight).unwrap(),
            "\"top-right\""
        );
    }

    #[test]
    fn inflate_adds_margin_on_all_sides() {
        let rect = LabelRect::new(0.0, 0.0, 10.0, 4.0).inflate(2.0, 1.0);
        assert_eq!(rect, LabelRect::new(-2.0, -1.0, 14.0, 6.0));
    }

    #[test]
    fn strict_containment_excludes_border() {
        let rect = LabelRect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_strict((5.0, 5.0)));
        assert!(!rect.contains_strict((0.0, 5.0)));
        assert!(!rect.contains_strict((10.0, 10.0)));
    }
}
