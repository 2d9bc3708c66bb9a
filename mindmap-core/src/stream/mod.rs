mod assemble;
mod ingest;
mod types;

pub use assemble::{assemble, assemble_with_report, AssemblyReport, MindMapTree, NodeId, TreeNode};
pub use ingest::{decode_line, decode_records, sanitize_node, sanitize_transcript, IngestError, StreamDecoder};
pub use types::*;
