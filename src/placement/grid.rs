// Coarse occupancy grid with label-sized cells.
//
// Routes are sampled into points and every sampled point claims the cell it
// falls in. A candidate label claims the cell holding its centre: that cell
// must be free of routes (its own route too, unless `avoid_own_route` is off).
// Every other cell it covers may hold only its own route, and no covered cell
// of the tolerance-inflated candidate may hold a label.

use std::ops::RangeInclusive;

use super::{BoundingBox, IndexStrategy, LabelRect, PlacementError, SpatialIndex};
use crate::config::PlacementConfig;
use crate::ir::{Point, Route};

/// Upper bound on the number of cells one grid may allocate.
pub const MAX_GRID_CELLS: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    Free,
    /// Crossed by exactly one route.
    Route(usize),
    /// Crossed by several routes.
    Routes,
    Label,
}

#[derive(Debug, Clone)]
pub struct GridIndex {
    origin: Point,
    cell_w: f64,
    cell_h: f64,
    cols: usize,
    rows: usize,
    cells: Vec<CellState>,
    tolerance: (f64, f64),
    eps: f64,
    avoid_own_route: bool,
}

impl GridIndex {
    /// Cover `bounds` grown by one cell on every side and mark every cell
    /// touched by a sampled route point.
    ///
    /// Fails with [`PlacementError::GridTooLarge`] when the extent divided by
    /// the label size needs more than [`MAX_GRID_CELLS`] cells.
    pub fn new(routes: &[Route], bounds: &BoundingBox, config: &PlacementConfig) -> Result<Self, PlacementError> {
        let cell_w = config.label_width;
        let cell_h = config.label_height;
        let covered = bounds.expand(cell_w, cell_h);
        let cols_f = (covered.width() / cell_w).ceil().max(1.0);
        let rows_f = (covered.height() / cell_h).ceil().max(1.0);
        let too_large = || PlacementError::GridTooLarge {
            cells: cols_f * rows_f,
            limit: MAX_GRID_CELLS,
        };
        if !cols_f.is_finite() || !rows_f.is_finite() || cols_f * rows_f > MAX_GRID_CELLS as f64 {
            return Err(too_large());
        }
        let (cols, rows) = (cols_f as usize, rows_f as usize);
        let count = cols
            .checked_mul(rows)
            .filter(|count| *count <= MAX_GRID_CELLS)
            .ok_or_else(too_large)?;
        let mut grid = Self {
            origin: (covered.min_x, covered.min_y),
            cell_w,
            cell_h,
            cols,
            rows,
            cells: vec![CellState::Free; count],
            tolerance: (config.tolerance_x, config.tolerance_y),
            eps: config.epsilon,
            avoid_own_route: config.avoid_own_route,
        };
        for (idx, route) in routes.iter().enumerate() {
            for point in refine_polyline(route.points(), config.grid_resolution) {
                let (col, row) = grid.cell_of(point);
                grid.claim_for_route(col, row, idx);
            }
        }
        Ok(grid)
    }

    pub fn dims(&self) -> (usize, usize) {
        (self.cols, self.rows)
    }

    pub fn origin(&self) -> Point {
        self.origin
    }

    /// State of a cell, `None` outside the grid.
    pub fn cell(&self, col: usize, row: usize) -> Option<CellState> {
        (col < self.cols && row < self.rows).then(|| self.at(col, row))
    }

    /// Cell holding `point`, clamped to the grid. Points on a grid line belong
    /// to the lower-indexed cell.
    pub fn cell_of(&self, point: Point) -> (usize, usize) {
        let col = ((point.0 - self.origin.0) / self.cell_w).floor();
        let row = ((point.1 - self.origin.1) / self.cell_h).floor();
        (clamp_index(col, self.cols), clamp_index(row, self.rows))
    }

    pub fn cell_center(&self, col: usize, row: usize) -> Point {
        (
            self.origin.0 + (col as f64 + 0.5) * self.cell_w,
            self.origin.1 + (row as f64 + 0.5) * self.cell_h,
        )
    }

    /// The cell a label at `rect` claims: the one holding its centre.
    pub fn claimed_cell(&self, rect: &LabelRect) -> (usize, usize) {
        self.cell_of(rect.center())
    }

    /// Every cell whose interior overlaps `rect`, row by row.
    pub fn cells_under(&self, rect: &LabelRect) -> Vec<(usize, usize)> {
        let (cols, rows) = self.covered_cells(rect);
        rows.flat_map(|row| cols.clone().map(move |col| (col, row)))
            .collect()
    }

    /// Free cells sorted by squared grid distance from `from`, ties in
    /// row-major order.
    pub fn free_cells_by_distance(&self, from: (usize, usize)) -> Vec<(usize, usize)> {
        let mut free: Vec<(usize, usize, usize)> = Vec::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if self.at(col, row) == CellState::Free {
                    let dc = col.abs_diff(from.0);
                    let dr = row.abs_diff(from.1);
                    free.push((dc * dc + dr * dr, col, row));
                }
            }
        }
        // Stable sort keeps the row-major scan order among equal distances.
        free.sort_by_key(|&(dist2, _, _)| dist2);
        free.into_iter().map(|(_, col, row)| (col, row)).collect()
    }

    /// Callers keep `col < cols` and `row < rows`.
    fn at(&self, col: usize, row: usize) -> CellState {
        self.cells[row * self.cols + col]
    }

    fn claim_for_route(&mut self, col: usize, row: usize, route: usize) {
        let slot = &mut self.cells[row * self.cols + col];
        *slot = match *slot {
            CellState::Free => CellState::Route(route),
            CellState::Route(other) if other == route => CellState::Route(route),
            CellState::Route(_) | CellState::Routes => CellState::Routes,
            CellState::Label => CellState::Label,
        };
    }

    /// Can `owner` claim a cell in this state?
    fn blocks_claim(&self, state: CellState, owner: usize) -> bool {
        match state {
            CellState::Free => false,
            CellState::Route(route) => self.avoid_own_route || route != owner,
            CellState::Routes | CellState::Label => true,
        }
    }

    /// Can `owner`'s label overlap a cell in this state without claiming it?
    /// The anchor sits on the owner's route, so its cells are always allowed.
    fn blocks_cover(state: CellState, owner: usize) -> bool {
        match state {
            CellState::Free => false,
            CellState::Route(route) => route != owner,
            CellState::Routes | CellState::Label => true,
        }
    }

    /// Column and row ranges of the cells whose interior overlaps `rect`.
    fn covered_cells(&self, rect: &LabelRect) -> (RangeInclusive<usize>, RangeInclusive<usize>) {
        let span = |lo: f64, hi: f64, origin: f64, size: f64, count: usize| {
            let first = clamp_index(((lo - origin) / size + self.eps).floor(), count);
            let last = clamp_index(((hi - origin) / size - self.eps).ceil() - 1.0, count);
            first..=last.max(first)
        };
        (
            span(rect.left, rect.right(), self.origin.0, self.cell_w, self.cols),
            span(rect.top, rect.bottom(), self.origin.1, self.cell_h, self.rows),
        )
    }
}

impl SpatialIndex for GridIndex {
    fn strategy(&self) -> IndexStrategy {
        IndexStrategy::Grid
    }

    fn is_free(&self, rect: &LabelRect, owner: usize) -> bool {
        let claimed = self.claimed_cell(rect);
        if self.blocks_claim(self.at(claimed.0, claimed.1), owner) {
            return false;
        }
        let (cols, rows) = self.covered_cells(rect);
        let crosses_route = rows
            .flat_map(|row| cols.clone().map(move |col| (col, row)))
            .filter(|cell| *cell != claimed)
            .any(|(col, row)| Self::blocks_cover(self.at(col, row), owner));
        if crosses_route {
            return false;
        }
        let padded = rect.inflate(self.tolerance.0, self.tolerance.1);
        let (cols, rows) = self.covered_cells(&padded);
        !rows
            .flat_map(|row| cols.clone().map(move |col| (col, row)))
            .any(|(col, row)| self.at(col, row) == CellState::Label)
    }

    fn commit(&mut self, rect: LabelRect, _owner: usize) {
        let (cols, rows) = self.covered_cells(&rect);
        for row in rows {
            for col in cols.clone() {
                self.cells[row * self.cols + col] = CellState::Label;
            }
        }
    }

    fn free_points_near(&self, point: Point) -> Vec<Point> {
        self.free_cells_by_distance(self.cell_of(point))
            .into_iter()
            .map(|(col, row)| self.cell_center(col, row))
            .collect()
    }
}

fn clamp_index(value: f64, count: usize) -> usize {
    if value <= 0.0 {
        0
    } else {
        (value as usize).min(count - 1)
    }
}

/// Sample every segment into `n` evenly spaced points, endpoints included.
pub fn refine_polyline(points: &[Point], n: usize) -> Vec<Point> {
    let n = n.max(2);
    let mut refined = Vec::with_capacity(points.len().saturating_sub(1) * n);
    for seg in points.windows(2) {
        let (a, b) = (seg[0], seg[1]);
        for k in 0..n {
            let t = k as f64 / (n - 1) as f64;
            refined.push((a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t));
        }
    }
    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::geometry::union_bounding_box;

    fn grid_for(routes: &[Route], config: &PlacementConfig) -> GridIndex {
        let bounds = union_bounding_box(routes).unwrap();
        GridIndex::new(routes, &bounds, config).unwrap()
    }

    fn parallel_routes() -> Vec<Route> {
        vec![
            Route::new(0, vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap(),
            Route::new(1, vec![(0.0, 200.0), (1000.0, 200.0)]).unwrap(),
        ]
    }

    #[test]
    fn grid_covers_bounds_with_one_cell_margin() {
        let grid = grid_for(&parallel_routes(), &PlacementConfig::default());
        assert_eq!(grid.origin(), (-100.0, -50.0));
        assert_eq!(grid.dims(), (12, 6));
    }

    #[test]
    fn points_on_grid_lines_use_lower_cell() {
        let grid = grid_for(&parallel_routes(), &PlacementConfig::default());
        assert_eq!(grid.cell_of((0.0, 0.0)), (1, 1));
        assert_eq!(grid.cell_of((-0.001, -0.001)), (0, 0));
        assert_eq!(grid.cell_of((1e9, -1e9)), (11, 0));
    }

    #[test]
    fn sampled_route_points_claim_cells() {
        let grid = grid_for(&parallel_routes(), &PlacementConfig::default());
        assert_eq!(grid.cell(1, 1), Some(CellState::Route(0)));
        assert_eq!(grid.cell(11, 5), Some(CellState::Route(1)));
        assert_eq!(grid.cell(0, 0), Some(CellState::Free));
    }

    #[test]
    fn shared_cells_are_marked_for_several_routes() {
        let routes = vec![
            Route::new(0, vec![(0.0, 0.0), (100.0, 0.0)]).unwrap(),
            Route::new(1, vec![(0.0, 10.0), (100.0, 10.0)]).unwrap(),
        ];
        let grid = grid_for(&routes, &PlacementConfig::default());
        assert_eq!(grid.cell(1, 1), Some(CellState::Routes));
    }

    #[test]
    fn committed_label_blocks_every_covered_cell() {
        let routes = parallel_routes();
        let mut grid = grid_for(&routes, &PlacementConfig::default());
        let label = LabelRect::new(250.0, 75.0, 100.0, 50.0);
        assert!(grid.is_free(&label, 0));
        grid.commit(label, 0);
        for (col, row) in [(3, 2), (4, 2), (3, 3), (4, 3)] {
            assert_eq!(grid.cell(col, row), Some(CellState::Label), "cell ({col}, {row})");
        }
        assert!(!grid.is_free(&LabelRect::new(320.0, 100.0, 100.0, 50.0), 1));
        assert!(grid.is_free(&LabelRect::new(500.0, 75.0, 100.0, 50.0), 1));
    }

    #[test]
    fn aligned_label_covers_single_cell() {
        let routes = parallel_routes();
        let mut grid = grid_for(&routes, &PlacementConfig::default());
        grid.commit(LabelRect::new(200.0, 50.0, 100.0, 50.0), 0);
        assert_eq!(grid.cell(3, 2), Some(CellState::Label));
        assert_eq!(grid.cell(2, 2), Some(CellState::Free));
        assert_eq!(grid.cell(4, 2), Some(CellState::Free));
        assert_eq!(grid.cell(3, 3), Some(CellState::Free));
    }

    #[test]
    fn own_route_cell_is_usable_when_allowed() {
        let routes = parallel_routes();
        let label = LabelRect::new(-100.0, -50.0, 100.0, 50.0);
        let on_route = LabelRect::new(-40.0, -20.0, 100.0, 50.0);
        let strict = grid_for(&routes, &PlacementConfig::default());
        assert!(strict.is_free(&label, 0));
        assert!(!strict.is_free(&on_route, 0));
        let relaxed = grid_for(
            &routes,
            &PlacementConfig {
                avoid_own_route: false,
                ..PlacementConfig::default()
            },
        );
        assert!(relaxed.is_free(&on_route, 0));
        assert!(!relaxed.is_free(&on_route, 1));
    }

    #[test]
    fn cell_lookup_outside_grid_is_none() {
        let grid = grid_for(&parallel_routes(), &PlacementConfig::default());
        assert_eq!(grid.cell(12, 0), None);
        assert_eq!(grid.cell(0, 6), None);
        assert_eq!(grid.cell(11, 5), Some(CellState::Route(1)));
    }

    #[test]
    fn label_may_not_cover_another_routes_cell() {
        // Route 1 is a short stub inside route 0's bottom-left quadrant.
        let routes = vec![
            Route::new(0, vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap(),
            Route::new(1, vec![(-40.0, 30.0), (-40.0, 40.0)]).unwrap(),
        ];
        let grid = grid_for(&routes, &PlacementConfig::default());
        assert_eq!(grid.cell(1, 1), Some(CellState::Routes));

        let bottom_left = LabelRect::new(-100.0, 0.0, 100.0, 50.0);
        assert_eq!(grid.claimed_cell(&bottom_left), (0, 1));
        assert_eq!(grid.cells_under(&bottom_left), vec![(0, 1), (1, 1)]);
        assert!(!grid.is_free(&bottom_left, 0));

        let top_right = LabelRect::new(0.0, -50.0, 100.0, 50.0);
        assert!(grid.is_free(&top_right, 0));
    }

    #[test]
    fn own_route_may_pass_under_unclaimed_cells() {
        let routes = parallel_routes();
        let grid = grid_for(&routes, &PlacementConfig::default());
        // Centre cell (2, 0) is free; covered cell (1, 1) carries route 0.
        let rect = LabelRect::new(90.0, -40.0, 100.0, 50.0);
        assert_eq!(grid.claimed_cell(&rect), (2, 0));
        assert!(grid.cells_under(&rect).contains(&(1, 1)));
        assert!(grid.is_free(&rect, 0));
        assert!(!grid.is_free(&rect, 1));
    }

    #[test]
    fn oversized_grid_is_rejected() {
        let routes = vec![Route::new(0, vec![(0.0, 0.0), (1e10, 1e10)]).unwrap()];
        let bounds = union_bounding_box(&routes).unwrap();
        let config = PlacementConfig {
            label_width: 1.0,
            label_height: 1.0,
            ..PlacementConfig::default()
        };
        let err = GridIndex::new(&routes, &bounds, &config).unwrap_err();
        assert!(
            matches!(err, PlacementError::GridTooLarge { limit, .. } if limit == MAX_GRID_CELLS),
            "{err:?}"
        );
    }

    #[test]
    fn free_cells_sorted_by_distance_then_row_major() {
        let routes = parallel_routes();
        let grid = grid_for(&routes, &PlacementConfig::default());
        let cells = grid.free_cells_by_distance((1, 1));
        assert_eq!(&cells[..4], &[(1, 0), (0, 1), (2, 1), (1, 2)]);
    }

    #[test]
    fn refine_includes_segment_endpoints() {
        let refined = refine_polyline(&[(0.0, 0.0), (30.0, 0.0)], 4);
        assert_eq!(refined.len(), 4);
        assert_eq!(refined[0], (0.0, 0.0));
        assert_eq!(refined[3], (30.0, 0.0));
        assert!((refined[1].0 - 10.0).abs() < 1e-9);
        assert!((refined[2].0 - 20.0).abs() < 1e-9);
    }
}
