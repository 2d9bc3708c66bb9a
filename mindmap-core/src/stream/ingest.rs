// Stream ingestion: model output text -> sanitized StreamItems
//
// The generator emits one JSON object per line, but it is a language model, so:
// - lines may be wrapped in ```json ... ``` fences
// - objects may carry a trailing comma (it thinks it is writing an array)
// - `[` / `]` lines and blank lines appear between objects
// - chunks split lines at arbitrary byte positions
//
// Sanitizing happens here, at the boundary. Everything past this module works
// with validated records and never has to second-guess a field.

use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

use crate::stream::types::*;

#[derive(Debug, Clone)]
pub struct IngestError {
    pub line: usize, // 1-based line or array entry, 0 when decoded standalone
    pub msg: String,
}

impl fmt::Display for IngestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ingest error at line {}: {}", self.line, self.msg)
    }
}
impl std::error::Error for IngestError {}

/// Strip fences, whitespace and one trailing comma from a raw line.
fn clean_line(raw: &str) -> &str {
    let mut line = raw.trim();
    if let Some(rest) = line.strip_prefix("```json") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix("```") {
        line = rest;
    }
    line = line.trim();
    line.strip_suffix(',').unwrap_or(line)
}

/// Decode a single line of model output.
///
/// `Ok(None)` means the line carried nothing (separators, prose, unknown item types).
pub fn decode_line(raw: &str) -> Result<Option<StreamItem>, IngestError> {
    let line = clean_line(raw);
    if line.is_empty() || line == "[" || line == "]" {
        return Ok(None);
    }
    if !(line.starts_with('{') && line.ends_with('}')) {
        return Ok(None);
    }

    let value: Value = serde_json::from_str(line).map_err(|e| IngestError {
        line: 0,
        msg: format!("invalid JSON: {}", e),
    })?;
    let Value::Object(obj) = value else {
        return Ok(None);
    };

    match obj.get("type").and_then(Value::as_str) {
        Some("node") => sanitize_node(&obj).map(|n| Some(StreamItem::Node(n))),
        Some("transcript") => sanitize_transcript(&obj).map(|t| Some(StreamItem::Transcript(t))),
        _ => Ok(None),
    }
}

fn required_str(obj: &Map<String, Value>, key: &str) -> Result<String, IngestError> {
    obj.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| IngestError {
            line: 0,
            msg: format!("node is missing string field '{}'", key),
        })
}

/// Validate a raw node object and coerce its optional fields.
pub fn sanitize_node(obj: &Map<String, Value>) -> Result<NodeRecord, IngestError> {
    let id = required_str(obj, "id")?;
    let title = required_str(obj, "title")?;

    let parent_id = match obj.get("parentId") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            return Err(IngestError {
                line: 0,
                msg: format!("node '{}' has non-string parentId {}", id, other),
            });
        }
    };

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let key_points = match obj.get("keyPoints") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let confidence_score = obj
        .get("confidenceScore")
        .and_then(Value::as_f64)
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 1.0))
        .unwrap_or(DEFAULT_CONFIDENCE);

    let node_type = obj
        .get("nodeType")
        .and_then(Value::as_str)
        .and_then(NodeType::from_wire)
        .unwrap_or(NodeType::Detail);

    Ok(NodeRecord {
        id,
        parent_id,
        title,
        summary,
        key_points,
        confidence_score,
        node_type,
    })
}

pub fn sanitize_transcript(obj: &Map<String, Value>) -> Result<Transcript, IngestError> {
    match obj.get("content") {
        Some(Value::String(content)) => Ok(Transcript { content: content.clone() }),
        _ => Err(IngestError {
            line: 0,
            msg: "transcript is missing string field 'content'".to_string(),
        }),
    }
}

/// Decode a stored JSON array of node records.
///
/// Each entry goes through `sanitize_node`, so a saved map gets the same
/// coercions as a streamed one. Entries that fail are skipped and logged. Only
/// a document that is not a JSON array is an error.
pub fn decode_records(json: &str) -> Result<Vec<NodeRecord>, IngestError> {
    let value: Value = serde_json::from_str(json).map_err(|e| IngestError {
        line: e.line(),
        msg: format!("invalid JSON: {}", e),
    })?;
    let Value::Array(entries) = value else {
        return Err(IngestError {
            line: 0,
            msg: "expected an array of node records".to_string(),
        });
    };

    let mut records = Vec::with_capacity(entries.len());
    for (i, entry) in entries.iter().enumerate() {
        let sanitized = match entry {
            Value::Object(obj) => sanitize_node(obj),
            other => Err(IngestError {
                line: 0,
                msg: format!("record is not an object: {}", other),
            }),
        };
        match sanitized {
            Ok(record) => records.push(record),
            Err(mut e) => {
                e.line = i + 1;
                warn!(error = %e, "skipping stored record");
            }
        }
    }
    Ok(records)
}

/// Incremental decoder over raw text chunks.
///
/// Feed chunks as they arrive; complete lines are decoded immediately and the
/// trailing partial line waits for the next chunk or `finish`.
#[derive(Debug, Default)]
pub struct StreamDecoder {
    buffer: String,
    line_no: usize,
    rejected: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of lines rejected so far.
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn feed(&mut self, chunk: &str) -> Vec<StreamItem> {
        self.buffer.push_str(chunk);
        let mut out = Vec::new();
        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            self.line_no += 1;
            self.decode_into(&line, &mut out);
        }
        out
    }

    /// Decode whatever is left in the buffer. The decoder is reusable afterwards.
    pub fn finish(&mut self) -> Vec<StreamItem> {
        let mut out = Vec::new();
        let rest = std::mem::take(&mut self.buffer);
        if !rest.trim().is_empty() {
            self.line_no += 1;
            self.decode_into(&rest, &mut out);
        }
        self.line_no = 0;
        out
    }

    fn decode_into(&mut self, line: &str, out: &mut Vec<StreamItem>) {
        match decode_line(line) {
            Ok(Some(item)) => out.push(item),
            Ok(None) => {}
            Err(mut e) => {
                e.line = self.line_no;
                self.rejected += 1;
                warn!(error = %e, "skipping streamed line");
            }
        }
    }
}
