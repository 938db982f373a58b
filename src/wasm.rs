//! WASM bindings.
//!
//! Steps cross the boundary as JSON arrays of step objects; results come
//! back as strings (JSON where structured).

use wasm_bindgen::prelude::*;

use crate::config::{RenderConfig, TimelineConfig};
use crate::model::{Step, StepRegistry};
use crate::parsers::parse;
use crate::renderers::charset::CharSet;
use crate::renderers::{SvgGenerator, render_timeline};
use crate::repair::Repairer;
use crate::structured::to_structured;

fn steps_from_json(steps_json: &str) -> Result<Vec<Step>, JsError> {
    serde_json::from_str(steps_json).map_err(|e| JsError::new(&format!("invalid steps: {e}")))
}

/// Repair the node ids of `diagram` against the steps. Returns the new text.
#[wasm_bindgen(js_name = "repairDiagram")]
pub fn repair_diagram(diagram: &str, steps_json: &str) -> Result<String, JsError> {
    let steps = steps_from_json(steps_json)?;
    let ids: Vec<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    Ok(Repairer::default().repair(diagram, &ids).text)
}

/// Structured node/edge graph of `diagram`, as JSON.
#[wasm_bindgen(js_name = "structuredGraph")]
pub fn structured_graph(diagram: &str, steps_json: &str) -> Result<String, JsError> {
    let steps = steps_from_json(steps_json)?;
    let graph = to_structured(&parse(diagram), StepRegistry::new(&steps));
    serde_json::to_string(&graph).map_err(|e| JsError::new(&e.to_string()))
}

/// SVG markup for `diagram`; node groups are `flowchart-{id}-{n}`.
#[wasm_bindgen(js_name = "renderSvg")]
pub fn render_svg(render_id: &str, diagram: &str) -> Result<String, JsError> {
    SvgGenerator::new(RenderConfig::default())
        .render(render_id, diagram)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Text timeline of `diagram`.
#[wasm_bindgen(js_name = "renderTimeline")]
pub fn timeline(diagram: &str, steps_json: &str, unicode: bool) -> Result<String, JsError> {
    let steps = steps_from_json(steps_json)?;
    let config = TimelineConfig {
        charset: if unicode { CharSet::Unicode } else { CharSet::Ascii },
        ..TimelineConfig::default()
    };
    let graph = to_structured(&parse(diagram), StepRegistry::new(&steps));
    let tl = crate::layout::layout_graph(&graph, &config)
        .map_err(|e| JsError::new(&e.to_string()))?;
    Ok(render_timeline(&tl, &config))
}
