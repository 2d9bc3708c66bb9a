//! Mind map core: turns streamed node records into a laid-out, navigable tree.
//!
//! Data flows one way:
//! records -> [`stream::assemble`] -> tree -> [`layout::layout_tree`] -> positions
//! and connectors -> [`viewport`] transform -> frontend.
//!
//! [`session::MindMapSession`] ties the pieces together for one view, and
//! `wasm` exposes it to JavaScript.
//!
//! Diagnostics such as rejected stream lines, orphaned records and dropped
//! roots are emitted with `tracing`. The library installs no subscriber. Native
//! hosts install their own, and in the browser these events are dropped unless
//! the embedder sets one up. The wasm bindings report load failures and skipped
//! line counts through `console` directly.

pub mod layout;
pub mod output;
pub mod session;
pub mod stream;
pub mod viewport;
mod wasm;

pub use layout::{layout_tree, ExpansionSet, LayoutConfig, LayoutResult};
pub use session::{MindMapSession, SessionConfig};
pub use stream::{assemble, MindMapTree, NodeRecord};
pub use viewport::{ViewTransform, ViewportConfig, ViewportController};
pub use wasm::{decode_stream_line, layout_mind_map, MindMapView};
