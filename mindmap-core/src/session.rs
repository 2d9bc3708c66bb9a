//! Single controller for one mind map view.
//!
//! Owns everything mutable: the accumulated records, the expansion set, the
//! viewport and the loading state. Every structural change reassembles the
//! tree from the full record list and reruns layout synchronously; pointer
//! and wheel input only touch the viewport.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::{layout_tree_opt, ExpansionSet, LayoutConfig, LayoutResult, SizeF};
use crate::stream::{assemble, MindMapTree, NodeRecord, StreamItem, TreeNode};
use crate::viewport::{ViewTransform, ViewportConfig, ViewportController};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub layout: LayoutConfig,
    pub viewport: ViewportConfig,
}

#[derive(Debug, Clone)]
pub struct MindMapSession {
    cfg: SessionConfig,
    records: Vec<NodeRecord>,
    tree: Option<MindMapTree>,
    expansion: ExpansionSet,
    /// Ids that have been admitted to `expansion` at least once.
    known_ids: HashSet<String>,
    layout: LayoutResult,
    viewport: ViewportController,
    viewport_size: Option<SizeF>,
    loading: bool,
    /// Time (ms) at which the post-load fit should run.
    pending_fit_at: Option<f64>,
    selected: Option<String>,
    transcript: Option<String>,
}

impl Default for MindMapSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl MindMapSession {
    pub fn new(cfg: SessionConfig) -> Self {
        let viewport = ViewportController::new(cfg.viewport.clone());
        Self {
            cfg,
            records: Vec::new(),
            tree: None,
            expansion: ExpansionSet::new(),
            known_ids: HashSet::new(),
            layout: LayoutResult::default(),
            viewport,
            viewport_size: None,
            loading: false,
            pending_fit_at: None,
            selected: None,
            transcript: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.cfg
    }

    pub fn records(&self) -> &[NodeRecord] {
        &self.records
    }

    pub fn tree(&self) -> Option<&MindMapTree> {
        self.tree.as_ref()
    }

    pub fn expansion(&self) -> &ExpansionSet {
        &self.expansion
    }

    pub fn layout(&self) -> &LayoutResult {
        &self.layout
    }

    pub fn transform(&self) -> ViewTransform {
        self.viewport.transform()
    }

    pub fn viewport(&self) -> &ViewportController {
        &self.viewport
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        let id = self.selected.as_deref()?;
        self.tree.as_ref()?.find(id)
    }

    // ------------------------------------------------------------------
    // Data lifecycle
    // ------------------------------------------------------------------

    /// Start a new generation: drop the previous map and enter loading.
    pub fn begin_generation(&mut self) {
        self.records.clear();
        self.tree = None;
        self.expansion.clear();
        self.known_ids.clear();
        self.layout = LayoutResult::default();
        self.selected = None;
        self.transcript = None;
        self.pending_fit_at = None;
        self.loading = true;
    }

    /// Append one streamed record and recompute.
    pub fn append_record(&mut self, record: NodeRecord) {
        self.records.push(record);
        self.rebuild();
    }

    /// Apply one decoded stream item.
    pub fn apply_item(&mut self, item: StreamItem) {
        match item {
            StreamItem::Node(record) => self.append_record(record),
            StreamItem::Transcript(t) => self.transcript = Some(t.content),
        }
    }

    /// Replace the records wholesale. The expansion set is reset to every node.
    pub fn load_records(&mut self, records: Vec<NodeRecord>) {
        self.records = records;
        self.tree = assemble(&self.records);
        match &self.tree {
            Some(tree) => {
                self.expansion.reset_to_all(tree);
                self.known_ids = tree.ids().map(str::to_string).collect();
            }
            None => {
                self.expansion.clear();
                self.known_ids.clear();
            }
        }
        self.drop_stale_selection();
        self.relayout();
    }

    /// Mark loading complete. Schedules a fit `fit_delay_ms` after `now_ms`
    /// when this ends a load in progress.
    pub fn finish_generation(&mut self, now_ms: f64) {
        if self.loading {
            self.pending_fit_at = Some(now_ms + self.cfg.viewport.fit_delay_ms);
        }
        self.loading = false;
    }

    /// Run the deferred fit once it is due. Returns whether the transform changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        match self.pending_fit_at {
            Some(at) if now_ms >= at => {
                self.pending_fit_at = None;
                self.fit_view()
            }
            _ => false,
        }
    }

    pub fn has_pending_fit(&self) -> bool {
        self.pending_fit_at.is_some()
    }

    fn rebuild(&mut self) {
        self.tree = assemble(&self.records);
        if let Some(tree) = &self.tree {
            self.expansion.expand_new(tree, &mut self.known_ids);
        }
        self.drop_stale_selection();
        self.relayout();
    }

    fn relayout(&mut self) {
        self.layout = layout_tree_opt(self.tree.as_ref(), &self.expansion, &self.cfg.layout);
    }

    fn drop_stale_selection(&mut self) {
        if self.selected.is_some() && self.selected_node().is_none() {
            self.selected = None;
        }
    }

    // ------------------------------------------------------------------
    // User input
    // ------------------------------------------------------------------

    /// Flip a node's expansion and recompute. Unknown ids are ignored.
    pub fn toggle_expansion(&mut self, id: &str) -> bool {
        let Some(tree) = &self.tree else {
            return false;
        };
        if tree.find(id).is_none() {
            return false;
        }
        let now_expanded = self.expansion.toggle(id);
        debug!(id, now_expanded, "expansion toggled");
        self.relayout();
        true
    }

    /// Select a node by id, or clear the selection with `None`.
    pub fn select_node(&mut self, id: Option<&str>) -> Option<&TreeNode> {
        self.selected = id.map(str::to_string);
        self.drop_stale_selection();
        self.selected_node()
    }

    /// Record the container size and refit to the latest content.
    pub fn resize(&mut self, width: f64, height: f64) -> bool {
        self.viewport_size = Some(SizeF { w: width, h: height });
        self.fit_view()
    }

    /// Fit the current content into the current viewport.
    pub fn fit_view(&mut self) -> bool {
        match self.viewport_size {
            Some(size) => self.viewport.fit(size, self.layout.content_size()),
            None => false,
        }
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_at(&mut self, pointer_x: f64, pointer_y: f64, delta: f64) {
        self.viewport.zoom_at(pointer_x, pointer_y, delta);
    }

    pub fn wheel(&mut self, pointer_x: f64, pointer_y: f64, delta_y: f64) {
        self.viewport.zoom_wheel(pointer_x, pointer_y, delta_y);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        self.viewport.begin_drag(x, y);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.viewport.drag_to(x, y);
    }

    pub fn pointer_up(&mut self) {
        self.viewport.end_drag();
    }
}
