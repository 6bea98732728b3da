use crate::config::{Config, RenderConfig};
use crate::ir::{Point, Route};
use crate::placement::LabelRecord;
use crate::placement::geometry::union_bounding_box;
use anyhow::Result;
use std::path::Path;

/// Render routes and their label boxes at `zoom`. Label boxes grow with the
/// zoom level while the routes keep their map coordinates.
pub fn render_svg(routes: &[Route], labels: &[Option<LabelRecord>], config: &Config, zoom: f64) -> Result<String> {
    let theme = &config.theme;
    let render = &config.render;
    let label_w = config.placement.label_width * zoom;
    let label_h = config.placement.label_height * zoom;

    let bounds = union_bounding_box(routes)?;
    let margin = (0.05f64).max((zoom - 1.0) / 2.0);
    let extent_w = bounds.width().max(label_w);
    let extent_h = bounds.height().max(label_h);
    let view_x = bounds.min_x - extent_w * margin;
    let view_y = bounds.min_y - extent_h * margin;
    let view_w = extent_w * (1.0 + 2.0 * margin);
    let view_h = extent_h * (1.0 + 2.0 * margin);
    // Strokes are given in output pixels; scale them into map units.
    let px = (view_w / render.width.max(1.0) as f64).max(view_h / render.height.max(1.0) as f64);

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{view_x:.2} {view_y:.2} {view_w:.2} {view_h:.2}\">",
        render.width, render.height
    ));
    svg.push_str(&format!(
        "<rect x=\"{view_x:.2}\" y=\"{view_y:.2}\" width=\"{view_w:.2}\" height=\"{view_h:.2}\" fill=\"{}\"/>",
        theme.background
    ));
    svg.push_str(&format!(
        "<title>Results at zoom level {}</title>",
        escape_xml(&zoom.to_string())
    ));

    for (idx, route) in routes.iter().enumerate() {
        let unplaced = labels.get(idx).is_none_or(|label| label.is_none());
        let (color, dash) = if unplaced {
            (theme.unplaced_color.as_str(), format!(" stroke-dasharray=\"{:.2} {:.2}\"", 6.0 * px, 4.0 * px))
        } else {
            (theme.route_color(idx), String::new())
        };
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"{} data-route=\"{}\"/>",
            points_to_path(route.points()),
            color,
            render.route_stroke_width as f64 * px,
            dash,
            idx
        ));
    }

    for (idx, label) in labels.iter().enumerate() {
        let Some(label) = label else {
            continue;
        };
        let rect = label.rect(label_w, label_h);
        svg.push_str(&format!(
            "<rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{:.2}\" data-route=\"{}\"/>",
            rect.left,
            rect.top,
            rect.width,
            rect.height,
            theme.label_fill,
            theme.label_stroke,
            render.label_stroke_width as f64 * px,
            idx
        ));
        let (cx, cy) = rect.center();
        svg.push_str(&format!(
            "<text x=\"{cx:.2}\" y=\"{cy:.2}\" text-anchor=\"middle\" dominant-baseline=\"central\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\">{}</text>",
            escape_xml(&theme.font_family),
            theme.font_size as f64 * px,
            theme.label_text_color,
            escape_xml(&format!("Route {}", idx + 1))
        ));
    }

    svg.push_str("</svg>");
    Ok(svg)
}

fn points_to_path(points: &[Point]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    for point in rest {
        d.push_str(&format!(" L {:.2} {:.2}", point.0, point.1));
    }
    d
}

pub fn write_output_svg(svg: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, svg)?;
        }
        None => {
            print!("{}", svg);
        }
    }
    Ok(())
}

#[cfg(feature = "png")]
pub fn write_output_png(svg: &str, output: &Path, render_cfg: &RenderConfig) -> Result<()> {
    let mut opt = usvg::Options::default();
    opt.font_family = "Inter".to_string();
    opt.default_size = usvg::Size::from_wh(render_cfg.width, render_cfg.height)
        .ok_or_else(|| anyhow::anyhow!("Invalid render size"))?;

    let tree = usvg::Tree::from_str(svg, &opt)?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| anyhow::anyhow!("Failed to allocate pixmap"))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap.save_png(output)?;
    Ok(())
}

#[cfg(not(feature = "png"))]
pub fn write_output_png(_svg: &str, _output: &Path, _render_cfg: &RenderConfig) -> Result<()> {
    Err(anyhow::anyhow!("PNG output requires the `png` feature"))
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::Orientation;

    fn routes() -> Vec<Route> {
        vec![
            Route::new(0, vec![(0.0, 0.0), (1000.0, 0.0)]).unwrap(),
            Route::new(1, vec![(0.0, 200.0), (1000.0, 200.0)]).unwrap(),
        ]
    }

    #[test]
    fn render_svg_draws_routes_and_labels() {
        let labels = vec![
            Some(LabelRecord {
                x: 0.0,
                y: 0.0,
                orientation: Orientation::BottomRight,
            }),
            None,
        ];
        let svg = render_svg(&routes(), &labels, &Config::default(), 1.0).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert_eq!(svg.matches("<path").count(), 2);
        assert!(svg.contains("x=\"0.00\" y=\"0.00\" width=\"100.00\" height=\"50.00\""));
        assert!(svg.contains("stroke-dasharray"), "unplaced route should be dashed");
        assert!(svg.contains("Route 1"));
    }

    #[test]
    fn label_boxes_scale_with_zoom() {
        let labels = vec![
            Some(LabelRecord {
                x: 0.0,
                y: 0.0,
                orientation: Orientation::TopLeft,
            }),
            None,
        ];
        let svg = render_svg(&routes(), &labels, &Config::default(), 2.0).unwrap();
        assert!(svg.contains("x=\"-200.00\" y=\"-100.00\" width=\"200.00\" height=\"100.00\""));
    }

    #[test]
    fn points_to_path_builds_move_and_lines() {
        assert_eq!(points_to_path(&[(0.0, 0.0), (1.5, 2.0)]), "M 0.00 0.00 L 1.50 2.00");
        assert_eq!(points_to_path(&[]), "");
    }
}
