#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod ir;
pub mod label_dump;
pub mod log;
pub mod parser;
pub mod placement;
pub mod render;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{Config, PlacementConfig, RenderConfig, load_config, parse_config};
pub use ir::{Point, Route, routes_from_points};
pub use label_dump::{LabelDump, label_dump_json};
pub use parser::{format_labels, parse_labels, parse_routes};
pub use placement::{
    FailurePolicy, FallbackStrategy, IndexStrategy, LabelAssignment, LabelLayout, LabelRecord,
    Orientation, PlacementError, PlacementFailure, place_labels,
};
pub use render::render_svg;
pub use theme::Theme;
