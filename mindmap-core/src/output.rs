//! Output types for the web frontend.
//!
//! These structs are serialized to JSON and handed to the presentation layer,
//! which draws nodes at their bounds and connectors as SVG paths.

use serde::Serialize;

use crate::layout::{connector_path, ConnectorStyle, LayoutConfig, LayoutResult, PointF, RectF};
use crate::stream::MindMapTree;
use crate::viewport::ViewTransform;

/// A positioned node ready for display
#[derive(Debug, Clone, Serialize)]
pub struct NodeOutput {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub confidence_score: f64,
    /// Wire name of the node type ("Topic", "Sub-Topic", ...)
    pub node_type: &'static str,
    pub bounds: RectF,
    pub depth: usize,
    /// Total children, so the frontend knows whether to draw an expand toggle
    pub child_count: usize,
    pub expanded: bool,
    pub selected: bool,
}

/// A parent -> child edge with precomputed SVG path data
#[derive(Debug, Clone, Serialize)]
pub struct ConnectorOutput {
    pub from: String,
    pub to: String,
    pub source: PointF,
    pub target: PointF,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformOutput {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
    /// Ready-made CSS `transform` value (origin top-left)
    pub css: String,
}

impl From<ViewTransform> for TransformOutput {
    fn from(t: ViewTransform) -> Self {
        Self {
            offset_x: t.offset_x,
            offset_y: t.offset_y,
            scale: t.scale,
            css: t.css_transform(),
        }
    }
}

/// Error information for the frontend's status area
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub message: String,
    pub line: usize, // 1-based, 0 when not tied to a stream line
}

/// The combined output sent to the frontend
#[derive(Debug, Clone, Default, Serialize)]
pub struct MindMapOutput {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub connectors: Vec<ConnectorOutput>,
    pub content_width: f64,
    pub content_height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

impl MindMapOutput {
    pub fn from_error(message: impl Into<String>, line: usize) -> Self {
        Self {
            error: Some(ErrorInfo { message: message.into(), line }),
            ..Self::default()
        }
    }
}

/// Join layout positions with node content.
pub fn build_output(
    tree: Option<&MindMapTree>,
    layout: &LayoutResult,
    style: ConnectorStyle,
    cfg: &LayoutConfig,
    selected: Option<&str>,
) -> MindMapOutput {
    let Some(tree) = tree else {
        return MindMapOutput::default();
    };

    let nodes = layout
        .positioned_nodes
        .iter()
        .map(|p| {
            let n = tree.node(p.nid);
            NodeOutput {
                id: n.id.clone(),
                title: n.title.clone(),
                summary: n.summary.clone(),
                key_points: n.key_points.clone(),
                confidence_score: n.confidence_score,
                node_type: n.node_type.as_wire(),
                bounds: p.bounds(),
                depth: p.depth,
                child_count: p.child_count,
                expanded: p.expanded,
                selected: selected == Some(n.id.as_str()),
            }
        })
        .collect();

    let connectors = layout
        .connectors
        .iter()
        .map(|c| ConnectorOutput {
            from: c.source.id.clone(),
            to: c.target.id.clone(),
            source: PointF { x: c.source.x, y: c.source.y },
            target: PointF { x: c.target.x, y: c.target.y },
            path: connector_path(c, style, cfg),
        })
        .collect();

    MindMapOutput {
        nodes,
        connectors,
        content_width: layout.content_width,
        content_height: layout.content_height,
        ..MindMapOutput::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_tree, ExpansionSet};
    use crate::stream::{assemble, NodeRecord, NodeType};

    #[test]
    fn test_build_output_joins_content() {
        let mut root = NodeRecord::new("a", None, "Root");
        root.node_type = NodeType::Topic;
        let tree = assemble(&[root, NodeRecord::new("b", Some("a"), "Child")]).unwrap();
        let expanded: ExpansionSet = ["a"].into_iter().collect();
        let cfg = LayoutConfig::default();
        let layout = layout_tree(&tree, &expanded, &cfg);

        let out = build_output(Some(&tree), &layout, ConnectorStyle::Straight, &cfg, Some("b"));
        assert_eq!(out.nodes.len(), 2);
        assert_eq!(out.nodes[0].node_type, "Topic");
        assert!(out.nodes[0].expanded);
        assert!(out.nodes[1].selected);
        assert_eq!(out.connectors[0].from, "a");
        assert_eq!(out.connectors[0].path, "M 200,40 L 0,150");
    }

    #[test]
    fn test_error_output_shape() {
        let json = serde_json::to_string(&MindMapOutput::from_error("bad", 3)).unwrap();
        assert_eq!(
            json,
            r#"{"content_width":0.0,"content_height":0.0,"error":{"message":"bad","line":3}}"#
        );
    }
}
