use route_labeler::{
    Config, FailurePolicy, FallbackStrategy, IndexStrategy, LabelRecord, Point, Theme,
    label_dump_json, place_labels, render_svg, routes_from_points,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelOptions {
    theme: Option<String>,
    label_width: Option<f64>,
    label_height: Option<f64>,
    tolerance: Option<f64>,
    strategy: Option<IndexStrategy>,
    fallback: Option<FallbackStrategy>,
    on_failure: Option<FailurePolicy>,
    zoom: Option<f64>,
}

fn build_config(options: &LabelOptions) -> Result<Config, String> {
    let mut config = Config::default();
    if options.theme.as_deref() == Some("dark") {
        config.theme = Theme::dark();
    }

    let placement = &mut config.placement;
    if let Some(width) = options.label_width {
        placement.label_width = width;
    }
    if let Some(height) = options.label_height {
        placement.label_height = height;
    }
    if let Some(tolerance) = options.tolerance {
        placement.tolerance_x = tolerance;
        placement.tolerance_y = tolerance;
    }
    if let Some(strategy) = options.strategy {
        placement.strategy = strategy;
    }
    if let Some(fallback) = options.fallback {
        placement.fallback = fallback;
    }
    if let Some(policy) = options.on_failure {
        placement.on_failure = policy;
    }
    placement.validate().map_err(|error| error.to_string())?;
    Ok(config)
}

fn parse_options(options_json: Option<String>) -> Result<LabelOptions, String> {
    match options_json {
        Some(raw_options) => serde_json::from_str(&raw_options).map_err(|error| error.to_string()),
        None => Ok(LabelOptions::default()),
    }
}

fn place_json(routes_json: &str, options: &LabelOptions) -> Result<String, String> {
    let raw: Vec<Vec<Point>> = serde_json::from_str(routes_json).map_err(|error| error.to_string())?;
    let routes = routes_from_points(raw).map_err(|error| error.to_string())?;
    let config = build_config(options)?;
    let layout = place_labels(&routes, &config.placement).map_err(|error| error.to_string())?;
    label_dump_json(&layout, &routes, &config.placement).map_err(|error| error.to_string())
}

fn preview_svg(routes_json: &str, options: &LabelOptions) -> Result<String, String> {
    let raw: Vec<Vec<Point>> = serde_json::from_str(routes_json).map_err(|error| error.to_string())?;
    let routes = routes_from_points(raw).map_err(|error| error.to_string())?;
    let config = build_config(options)?;
    let layout = place_labels(&routes, &config.placement).map_err(|error| error.to_string())?;
    let labels: Vec<Option<LabelRecord>> = layout
        .outcomes
        .iter()
        .map(|outcome| outcome.as_ref().ok().map(LabelRecord::from))
        .collect();
    render_svg(&routes, &labels, &config, options.zoom.unwrap_or(1.0)).map_err(|error| error.to_string())
}

/// Place labels for `routes_json` (an array of `[[x, y], ...]` polylines) and
/// return the JSON label dump.
#[wasm_bindgen]
pub fn place_labels_json(routes_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    place_json(routes_json, &options).map_err(|error| JsValue::from_str(&error))
}

#[wasm_bindgen]
pub fn render_preview_svg(routes_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = parse_options(options_json).map_err(|error| JsValue::from_str(&error))?;
    preview_svg(routes_json, &options).map_err(|error| JsValue::from_str(&error))
}
