use serde::{Deserialize, Serialize};

/// Kind of a mind map node, as named on the wire.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeType {
    Topic,
    #[serde(rename = "Sub-Topic")]
    SubTopic,
    Fact,
    Quote,
    Insight,
    Question,
    #[default]
    #[serde(other)]
    Detail,
}

// ============================================================================
// Node type registry - single source of truth for wire names
// ============================================================================

/// Node type registry: (wire_name, variant)
pub const NODE_TYPE_REGISTRY: &[(&str, NodeType)] = &[
    ("Topic", NodeType::Topic),
    ("Sub-Topic", NodeType::SubTopic),
    ("Detail", NodeType::Detail),
    ("Fact", NodeType::Fact),
    ("Quote", NodeType::Quote),
    ("Insight", NodeType::Insight),
    ("Question", NodeType::Question),
];

impl NodeType {
    /// Look up a node type by wire name. Unknown names are `None`.
    pub fn from_wire(name: &str) -> Option<NodeType> {
        NODE_TYPE_REGISTRY
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|(_, ty)| *ty)
    }

    pub fn as_wire(&self) -> &'static str {
        NODE_TYPE_REGISTRY
            .iter()
            .find(|(_, ty)| ty == self)
            .map(|(wire, _)| *wire)
            .unwrap_or("Detail")
    }
}

/// One streamed unit of mind map data.
///
/// Records arrive already sanitized; `parent_id == None` marks the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default = "default_confidence")]
    pub confidence_score: f64,
    #[serde(default)]
    pub node_type: NodeType,
}

/// Confidence assumed when the stream omits one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

fn default_confidence() -> f64 {
    DEFAULT_CONFIDENCE
}

impl NodeRecord {
    /// Bare record with only the structural fields set.
    pub fn new(id: impl Into<String>, parent_id: Option<&str>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: parent_id.map(str::to_string),
            title: title.into(),
            summary: String::new(),
            key_points: Vec::new(),
            confidence_score: DEFAULT_CONFIDENCE,
            node_type: NodeType::Detail,
        }
    }
}

/// Transcript text extracted from a video source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub content: String,
}

/// Everything the stream can carry, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamItem {
    Node(NodeRecord),
    Transcript(Transcript),
}
