use crate::placement::{FailurePolicy, FallbackStrategy, IndexStrategy, PlacementError};
use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEFAULT_ZOOM_LEVELS: [f64; 3] = [1.0, 2.0, 4.0];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    pub label_width: f64,
    pub label_height: f64,
    /// Margin added around a candidate label when testing it against placed
    /// labels. Routes are tested without it.
    pub tolerance_x: f64,
    pub tolerance_y: f64,
    /// Below this, a segment's x or y extent counts as zero.
    pub epsilon: f64,
    /// Sample points per segment when rasterizing routes into the grid.
    pub grid_resolution: usize,
    pub strategy: IndexStrategy,
    pub fallback: FallbackStrategy,
    pub on_failure: FailurePolicy,
    pub avoid_own_route: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            label_width: 100.0,
            label_height: 50.0,
            tolerance_x: 0.0,
            tolerance_y: 0.0,
            epsilon: 1e-9,
            grid_resolution: 4,
            strategy: IndexStrategy::Exact,
            fallback: FallbackStrategy::VertexWalk,
            on_failure: FailurePolicy::Skip,
            avoid_own_route: true,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), PlacementError> {
        let positive = |value: f64| value.is_finite() && value > 0.0;
        let non_negative = |value: f64| value.is_finite() && value >= 0.0;
        if !positive(self.label_width) || !positive(self.label_height) {
            return Err(PlacementError::InvalidConfig(format!(
                "label size must be positive, got {}x{}",
                self.label_width, self.label_height
            )));
        }
        if !non_negative(self.tolerance_x) || !non_negative(self.tolerance_y) {
            return Err(PlacementError::InvalidConfig(format!(
                "tolerance must be non-negative, got ({}, {})",
                self.tolerance_x, self.tolerance_y
            )));
        }
        if !non_negative(self.epsilon) {
            return Err(PlacementError::InvalidConfig(format!(
                "epsilon must be non-negative, got {}",
                self.epsilon
            )));
        }
        if self.grid_resolution < 2 {
            return Err(PlacementError::InvalidConfig(format!(
                "grid resolution must be at least 2, got {}",
                self.grid_resolution
            )));
        }
        Ok(())
    }

    /// Same tolerance on both axes.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance_x = tolerance;
        self.tolerance_y = tolerance;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    pub width: f32,
    pub height: f32,
    pub zoom_levels: Vec<f64>,
    pub route_stroke_width: f32,
    pub label_stroke_width: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            zoom_levels: DEFAULT_ZOOM_LEVELS.to_vec(),
            route_stroke_width: 2.0,
            label_stroke_width: 1.2,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub theme: Theme,
    pub placement: PlacementConfig,
    pub render: RenderConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlacementConfigFile {
    label_width: Option<f64>,
    label_height: Option<f64>,
    tolerance: Option<f64>,
    tolerance_x: Option<f64>,
    tolerance_y: Option<f64>,
    epsilon: Option<f64>,
    grid_resolution: Option<usize>,
    strategy: Option<IndexStrategy>,
    fallback: Option<FallbackStrategy>,
    on_failure: Option<FailurePolicy>,
    avoid_own_route: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    width: Option<f32>,
    height: Option<f32>,
    zoom_levels: Option<Vec<f64>>,
    route_stroke_width: Option<f32>,
    label_stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    background: Option<String>,
    route_colors: Option<Vec<String>>,
    label_fill: Option<String>,
    label_stroke: Option<String>,
    unplaced_color: Option<String>,
    font_family: Option<String>,
    font_size: Option<f32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    placement: Option<PlacementConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Overlay a JSON config document on the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let parsed: ConfigFile = serde_json::from_str(contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        config.theme = match theme_name {
            "dark" => Theme::dark(),
            "light" | "default" => Theme::light(),
            other => return Err(anyhow::anyhow!("Unknown theme: {other}")),
        };
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.route_colors {
            if !v.is_empty() {
                config.theme.route_colors = v;
            }
        }
        if let Some(v) = vars.label_fill {
            config.theme.label_fill = v;
        }
        if let Some(v) = vars.label_stroke {
            config.theme.label_stroke = v;
        }
        if let Some(v) = vars.unplaced_color {
            config.theme.unplaced_color = v;
        }
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
    }

    if let Some(p) = parsed.placement {
        let target = &mut config.placement;
        if let Some(v) = p.label_width {
            target.label_width = v;
        }
        if let Some(v) = p.label_height {
            target.label_height = v;
        }
        if let Some(v) = p.tolerance {
            target.tolerance_x = v;
            target.tolerance_y = v;
        }
        if let Some(v) = p.tolerance_x {
            target.tolerance_x = v;
        }
        if let Some(v) = p.tolerance_y {
            target.tolerance_y = v;
        }
        if let Some(v) = p.epsilon {
            target.epsilon = v;
        }
        if let Some(v) = p.grid_resolution {
            target.grid_resolution = v;
        }
        if let Some(v) = p.strategy {
            target.strategy = v;
        }
        if let Some(v) = p.fallback {
            target.fallback = v;
        }
        if let Some(v) = p.on_failure {
            target.on_failure = v;
        }
        if let Some(v) = p.avoid_own_route {
            target.avoid_own_route = v;
        }
    }

    if let Some(r) = parsed.render {
        if let Some(v) = r.width {
            config.render.width = v;
        }
        if let Some(v) = r.height {
            config.render.height = v;
        }
        if let Some(v) = r.zoom_levels {
            config.render.zoom_levels = v;
        }
        if let Some(v) = r.route_stroke_width {
            config.render.route_stroke_width = v;
        }
        if let Some(v) = r.label_stroke_width {
            config.render.label_stroke_width = v;
        }
    }

    config.placement.validate()?;
    Ok(config)
}
