use crate::ir::{Point, Route};
use crate::placement::{LabelLayout, LabelRecord, Orientation};
use anyhow::{Context, Result, anyhow};
use std::fmt::Write as _;

/// Token written in place of a label for a route that could not be placed.
pub const UNPLACED_TOKEN: &str = "unplaced";

/// Parse routes: one polyline per line as `x1 y1 x2 y2 ...`.
///
/// Blank lines and lines starting with `#` are skipped; every other line is
/// one route, numbered in order of appearance.
pub fn parse_routes(input: &str) -> Result<Vec<Route>> {
    let mut routes = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let coords = parse_numbers(trimmed)
            .with_context(|| format!("line {}: invalid route coordinates", line_no + 1))?;
        if coords.len() % 2 != 0 {
            return Err(anyhow!(
                "line {}: odd number of coordinates ({})",
                line_no + 1,
                coords.len()
            ));
        }
        let points: Vec<Point> = coords.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
        let route = Route::new(routes.len(), points).with_context(|| format!("line {}", line_no + 1))?;
        routes.push(route);
    }
    if routes.is_empty() {
        return Err(anyhow!("No routes found in input"));
    }
    Ok(routes)
}

/// Parse label lines `x y orientation`, one per route. An `unplaced` line
/// yields `None` for that route.
pub fn parse_labels(input: &str) -> Result<Vec<Option<LabelRecord>>> {
    let mut labels = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if trimmed == UNPLACED_TOKEN {
            labels.push(None);
            continue;
        }
        let parts: Vec<&str> = trimmed.split_whitespace().collect();
        let [x, y, orientation] = parts.as_slice() else {
            return Err(anyhow!(
                "line {}: expected `x y orientation`, got {} field(s)",
                line_no + 1,
                parts.len()
            ));
        };
        let x: f64 = x
            .parse()
            .with_context(|| format!("line {}: invalid x coordinate {x:?}", line_no + 1))?;
        let y: f64 = y
            .parse()
            .with_context(|| format!("line {}: invalid y coordinate {y:?}", line_no + 1))?;
        let orientation: Orientation = orientation
            .parse()
            .map_err(|err: String| anyhow!("line {}: {err}", line_no + 1))?;
        labels.push(Some(LabelRecord { x, y, orientation }));
    }
    Ok(labels)
}

/// Write one `x y orientation` line per route, in route order.
pub fn format_labels(layout: &LabelLayout) -> String {
    let mut out = String::new();
    for outcome in &layout.outcomes {
        match outcome {
            Ok(assignment) => {
                let record = LabelRecord::from(assignment);
                let _ = writeln!(
                    out,
                    "{} {} {}",
                    format_coord(record.x),
                    format_coord(record.y),
                    record.orientation
                );
            }
            Err(_) => {
                out.push_str(UNPLACED_TOKEN);
                out.push('\n');
            }
        }
    }
    out
}

fn parse_numbers(line: &str) -> Result<Vec<f64>> {
    line.split_whitespace()
        .map(|token| {
            token
                .parse::<f64>()
                .map_err(|_| anyhow!("not a number: {token:?}"))
                .and_then(|value| {
                    if value.is_finite() {
                        Ok(value)
                    } else {
                        Err(anyhow!("not a finite number: {token:?}"))
                    }
                })
        })
        .collect()
}

/// Integral coordinates are written without a fractional part.
fn format_coord(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}
