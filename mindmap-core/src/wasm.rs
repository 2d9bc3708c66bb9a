//! WASM bindings for the mindmap-core library.
//!
//! All functions and classes exposed to JavaScript via wasm-bindgen are defined here.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::layout::{layout_tree_opt, ConnectorStyle, ExpansionSet, LayoutConfig};
use crate::output::{build_output, MindMapOutput, TransformOutput};
use crate::session::{MindMapSession, SessionConfig};
use crate::stream::{assemble, decode_line, decode_records, StreamDecoder};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    pub fn console_log(s: &str);

    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        console_error(&format!("Error serializing output: {}", e));
        "{\"error\": {\"message\": \"Serialization error\", \"line\": 0}}".to_string()
    })
}

/// Lay out a complete record list in one call.
///
/// `records_json` is a JSON array of node records. `expanded_json` is a JSON
/// array of expanded ids; pass an empty string to expand everything.
#[wasm_bindgen]
pub fn layout_mind_map(records_json: &str, expanded_json: &str, connector_style: &str) -> String {
    let records = match decode_records(records_json) {
        Ok(records) => records,
        Err(e) => {
            console_error(&format!("Error reading records: {}", e));
            return to_json(&MindMapOutput::from_error(e.msg, e.line));
        }
    };
    let tree = assemble(&records);

    let expanded = if expanded_json.trim().is_empty() {
        let mut all = ExpansionSet::new();
        if let Some(tree) = &tree {
            all.reset_to_all(tree);
        }
        all
    } else {
        match serde_json::from_str::<ExpansionSet>(expanded_json) {
            Ok(set) => set,
            Err(e) => {
                console_error(&format!("Error reading expanded ids: {:?}", e));
                return to_json(&MindMapOutput::from_error(e.to_string(), e.line()));
            }
        }
    };

    let cfg = LayoutConfig::default();
    let layout = layout_tree_opt(tree.as_ref(), &expanded, &cfg);
    let style = ConnectorStyle::from_name(connector_style);
    to_json(&build_output(tree.as_ref(), &layout, style, &cfg, None))
}

/// Decode one line of model output. Returns the sanitized item as JSON, or
/// `null` when the line carries nothing usable.
#[wasm_bindgen]
pub fn decode_stream_line(line: &str) -> String {
    match decode_line(line) {
        Ok(Some(item)) => to_json(&item),
        Ok(None) => "null".to_string(),
        Err(e) => {
            console_error(&format!("Skipping streamed line: {}", e));
            "null".to_string()
        }
    }
}

/// Stateful mind map view: stream in records, then drive it with pointer,
/// wheel, resize and expand/collapse input.
#[wasm_bindgen]
pub struct MindMapView {
    session: MindMapSession,
    decoder: StreamDecoder,
    style: ConnectorStyle,
}

#[wasm_bindgen]
impl MindMapView {
    /// `config_json` may be empty; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str) -> MindMapView {
        let cfg = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_json::from_str(config_json).unwrap_or_else(|e| {
                console_error(&format!("Error reading config, using defaults: {:?}", e));
                SessionConfig::default()
            })
        };
        MindMapView {
            session: MindMapSession::new(cfg),
            decoder: StreamDecoder::new(),
            style: ConnectorStyle::default(),
        }
    }

    #[wasm_bindgen(js_name = beginGeneration)]
    pub fn begin_generation(&mut self) {
        self.decoder = StreamDecoder::new();
        self.session.begin_generation();
    }

    /// Feed raw streamed text. Returns how many items were applied.
    #[wasm_bindgen(js_name = feedChunk)]
    pub fn feed_chunk(&mut self, chunk: &str) -> usize {
        let items = self.decoder.feed(chunk);
        let n = items.len();
        for item in items {
            self.session.apply_item(item);
        }
        n
    }

    /// Flush the decoder and mark loading complete; the view fits itself on a
    /// later `tick`.
    #[wasm_bindgen(js_name = finishGeneration)]
    pub fn finish_generation(&mut self, now_ms: f64) {
        for item in self.decoder.finish() {
            self.session.apply_item(item);
        }
        if self.decoder.rejected() > 0 {
            console_log(&format!("{} streamed lines were skipped", self.decoder.rejected()));
        }
        self.session.finish_generation(now_ms);
    }

    /// Replace the map with a JSON array of records.
    #[wasm_bindgen(js_name = loadRecords)]
    pub fn load_records(&mut self, records_json: &str) -> bool {
        match decode_records(records_json) {
            Ok(records) => {
                self.session.load_records(records);
                true
            }
            Err(e) => {
                console_error(&format!("Error reading records: {}", e));
                false
            }
        }
    }

    /// Call from the animation loop; runs a pending fit once due.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.session.tick(now_ms)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.session.resize(width, height)
    }

    /// Refit to the element's current bounding box, e.g. from a ResizeObserver.
    #[wasm_bindgen(js_name = observeElement)]
    pub fn observe_element(&mut self, element: &web_sys::Element) -> bool {
        let rect = element.get_bounding_client_rect();
        self.session.resize(rect.width(), rect.height())
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        self.session.toggle_expansion(id)
    }

    /// Select a node, or clear the selection with `undefined`.
    pub fn select(&mut self, id: Option<String>) -> bool {
        self.session.select_node(id.as_deref()).is_some()
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.session.pan(dx, dy);
    }

    pub fn wheel(&mut self, pointer_x: f64, pointer_y: f64, delta_y: f64) {
        self.session.wheel(pointer_x, pointer_y, delta_y);
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.session.pointer_down(x, y);
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.session.pointer_move(x, y);
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) {
        self.session.pointer_up();
    }

    #[wasm_bindgen(js_name = fitView)]
    pub fn fit_view(&mut self) -> bool {
        self.session.fit_view()
    }

    #[wasm_bindgen(js_name = setConnectorStyle)]
    pub fn set_connector_style(&mut self, name: &str) {
        self.style = ConnectorStyle::from_name(name);
    }

    #[wasm_bindgen(js_name = isLoading)]
    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    /// Everything the frontend needs to draw the current frame, as JSON.
    pub fn render(&self) -> String {
        let s = &self.session;
        let mut output = build_output(
            s.tree(),
            s.layout(),
            self.style,
            &s.config().layout,
            s.selected_id(),
        );
        output.transform = Some(TransformOutput::from(s.transform()));
        output.transcript = s.transcript().map(str::to_string);
        to_json(&output)
    }

    /// Current transform as JSON.
    pub fn transform(&self) -> String {
        to_json(&TransformOutput::from(self.session.transform()))
    }
}
