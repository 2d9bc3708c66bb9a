// Tree layouter for MindMapTree.
//
// Goals:
// - Deterministic: same tree + same expansion set => same output, children in arrival order
// - Layered: depth decides y, siblings are spread left to right
// - Collapsed nodes are laid out as leaves, whatever their real child count
// - Parents are centered over their children; a subtree that would crowd its
//   previous sibling is pushed right and drags its descendants along
// - Output is normalized so the top-left of the content is (0,0)
//
// Submodules:
// - tidy: the two-pass positioning algorithm
// - expansion: which nodes show their children
// - connector: SVG path data for parent->child edges
//
// Output:
// - LayoutResult with positioned nodes (pre-order), connectors and content size.

use serde::{Deserialize, Serialize};

use crate::stream::{MindMapTree, NodeId};

mod connector;
mod expansion;
mod tidy;

pub use connector::{connector_path, ConnectorStyle};
pub use expansion::ExpansionSet;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointF {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeF {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RectF {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl RectF {
    pub fn right(&self) -> f64 { self.x + self.w }
    pub fn bottom(&self) -> f64 { self.y + self.h }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Size of every node card.
    pub node_size: SizeF,
    /// Gap between neighbouring siblings.
    pub horizontal_spacing: f64,
    /// Gap between depth levels.
    pub vertical_spacing: f64,
    /// How far an elbow connector runs right before turning.
    pub elbow_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_size: SizeF { w: 200.0, h: 80.0 },
            horizontal_spacing: 90.0,
            vertical_spacing: 30.0,
            elbow_offset: 30.0,
        }
    }
}

impl LayoutConfig {
    /// Horizontal distance between the left edges of adjacent siblings.
    pub fn sibling_step(&self) -> f64 {
        self.node_size.w + self.horizontal_spacing
    }

    /// Vertical distance between the top edges of adjacent levels.
    pub fn level_step(&self) -> f64 {
        self.node_size.h + self.vertical_spacing
    }
}

/// A visible node with its final top-left position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub nid: NodeId,
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Distance from the previous sibling, added to every descendant. Zero for
    /// first children. Only meaningful within one layout run.
    pub modifier: f64,
    pub depth: usize,
    /// Children in the tree, visible or not.
    pub child_count: usize,
    pub expanded: bool,
}

impl PositionedNode {
    pub fn bounds(&self) -> RectF {
        RectF { x: self.x, y: self.y, w: self.width, h: self.height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Anchor {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// Edge from a parent's right-center to a child's left-center.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connector {
    pub source: Anchor,
    pub target: Anchor,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct LayoutResult {
    /// Visible nodes, pre-order.
    pub positioned_nodes: Vec<PositionedNode>,
    /// One per visible parent->child pair, in the order the children were visited.
    pub connectors: Vec<Connector>,
    pub content_width: f64,
    pub content_height: f64,
}

impl LayoutResult {
    pub fn is_empty(&self) -> bool {
        self.positioned_nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&PositionedNode> {
        self.positioned_nodes.iter().find(|n| n.id == id)
    }

    pub fn content_size(&self) -> SizeF {
        SizeF { w: self.content_width, h: self.content_height }
    }
}

pub fn layout_tree(tree: &MindMapTree, expanded: &ExpansionSet, cfg: &LayoutConfig) -> LayoutResult {
    tidy::layout_tidy(tree, expanded, cfg)
}

/// Same as `layout_tree`, but an absent tree lays out to nothing.
pub fn layout_tree_opt(tree: Option<&MindMapTree>, expanded: &ExpansionSet, cfg: &LayoutConfig) -> LayoutResult {
    match tree {
        Some(tree) => layout_tree(tree, expanded, cfg),
        None => LayoutResult::default(),
    }
}
