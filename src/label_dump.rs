use crate::config::PlacementConfig;
use crate::ir::Route;
use crate::placement::{BoundingBox, IndexStrategy, LabelLayout, LabelRect, Orientation, SearchPhase, label_clearance};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelDump {
    pub strategy: IndexStrategy,
    pub label_width: f64,
    pub label_height: f64,
    pub bounds: BoundingBox,
    pub placed: usize,
    pub unplaced: usize,
    pub labels: Vec<LabelEntryDump>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", untagged)]
pub enum LabelEntryDump {
    Placed(PlacedDump),
    Unplaced(UnplacedDump),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedDump {
    pub route: usize,
    pub x: f64,
    pub y: f64,
    pub orientation: Orientation,
    pub anchor_index: usize,
    /// 0 for the primary anchor, otherwise the fallback step that succeeded.
    pub fallback: usize,
    pub rect: LabelRect,
    /// Gap to the nearest other route; absent when there is none.
    pub clearance: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnplacedDump {
    pub route: usize,
    pub unplaced: bool,
}

impl LabelDump {
    pub fn from_layout(layout: &LabelLayout, routes: &[Route], config: &PlacementConfig) -> Self {
        let labels: Vec<LabelEntryDump> = layout
            .outcomes
            .iter()
            .map(|outcome| match outcome {
                Ok(assignment) => {
                    let clearance = label_clearance(assignment, routes, config.epsilon);
                    LabelEntryDump::Placed(PlacedDump {
                        route: assignment.route,
                        x: assignment.anchor.0,
                        y: assignment.anchor.1,
                        orientation: assignment.orientation,
                        anchor_index: assignment.anchor_index,
                        fallback: match assignment.phase {
                            SearchPhase::Primary => 0,
                            SearchPhase::Fallback { step } => step,
                        },
                        rect: assignment.rect,
                        clearance: clearance.is_finite().then_some(clearance),
                    })
                }
                Err(failure) => LabelEntryDump::Unplaced(UnplacedDump {
                    route: failure.route,
                    unplaced: true,
                }),
            })
            .collect();

        let placed = layout.assignments().count();
        LabelDump {
            strategy: layout.strategy,
            label_width: config.label_width,
            label_height: config.label_height,
            bounds: layout.bounds,
            placed,
            unplaced: labels.len() - placed,
            labels,
        }
    }
}

pub fn label_dump_json(layout: &LabelLayout, routes: &[Route], config: &PlacementConfig) -> anyhow::Result<String> {
    let dump = LabelDump::from_layout(layout, routes, config);
    Ok(serde_json::to_string_pretty(&dump)?)
}

pub fn write_label_dump(
    path: &Path,
    layout: &LabelLayout,
    routes: &[Route],
    config: &PlacementConfig,
) -> anyhow::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let dump = LabelDump::from_layout(layout, routes, config);
    serde_json::to_writer_pretty(&mut writer, &dump)?;
    writer.write_all(b"\n")?;
    Ok(())
}
