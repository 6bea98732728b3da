use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    /// Route strokes, cycled by route index.
    pub route_colors: Vec<String>,
    pub label_fill: String,
    pub label_stroke: String,
    pub label_text_color: String,
    pub unplaced_color: String,
}

impl Theme {
    pub fn light() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            route_colors: [
                "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B", "#E377C2",
                "#7F7F7F", "#BCBD22", "#17BECF",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
            label_fill: "rgba(255,255,255,0.85)".to_string(),
            label_stroke: "#000000".to_string(),
            label_text_color: "#1C2430".to_string(),
            unplaced_color: "#D62728".to_string(),
        }
    }

    pub fn dark() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 12.0,
            background: "#1C2430".to_string(),
            route_colors: [
                "#7AA2F7", "#E0AF68", "#9ECE6A", "#F7768E", "#BB9AF7", "#2AC3DE", "#FF9E64",
            ]
            .iter()
            .map(|value| value.to_string())
            .collect(),
            label_fill: "rgba(28,36,48,0.85)".to_string(),
            label_stroke: "#C0CAF5".to_string(),
            label_text_color: "#C0CAF5".to_string(),
            unplaced_color: "#F7768E".to_string(),
        }
    }

    pub fn route_color(&self, route: usize) -> &str {
        if self.route_colors.is_empty() {
            return "#333333";
        }
        &self.route_colors[route % self.route_colors.len()]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}
