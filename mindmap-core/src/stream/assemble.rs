//
// Assemble step: flat NodeRecord sequence (arrival order) -> MindMapTree (layout-friendly IR)
//
// What this does:
// - Wraps every record once, keyed by id (a repeated id replaces the fields but
//   keeps the slot of its first arrival)
// - Links each node into its parent's children, preserving arrival order
// - Picks the first null-parent record as the root; later root candidates are dropped
// - Flattens the nodes reachable from the root into a pre-order arena
//
// Records whose parent never arrives stay unattached and are left out of the tree.
// The stream is still growing while we assemble, so that is not an error: the
// node shows up as soon as its parent does.

use std::collections::HashMap;

use serde::Serialize;
use tracing::warn;

use crate::stream::types::{NodeRecord, NodeType};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub usize);

/// An assembled node. Same fields as the record, plus its place in the tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeNode {
    pub nid: NodeId,
    pub id: String,
    pub parent_id: Option<String>,
    pub title: String,
    pub summary: String,
    pub key_points: Vec<String>,
    pub confidence_score: f64,
    pub node_type: NodeType,
    pub parent: Option<NodeId>,
    /// Ordered by arrival among siblings.
    pub children: Vec<NodeId>,
    pub depth: usize,
    /// Arrival index of the record that introduced this id.
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MindMapTree {
    pub root: NodeId,
    /// Pre-order; `nodes[i].nid == NodeId(i)`.
    pub nodes: Vec<TreeNode>,
}

impl MindMapTree {
    pub fn node(&self, nid: NodeId) -> &TreeNode {
        &self.nodes[nid.0]
    }

    pub fn root_node(&self) -> &TreeNode {
        self.node(self.root)
    }

    pub fn find(&self, id: &str) -> Option<&TreeNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every id in the tree, pre-order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.id.as_str())
    }
}

/// What the assembler left out.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AssemblyReport {
    /// Ids not reachable from the chosen root, in arrival order.
    pub orphans: Vec<String>,
    /// Null-parent ids after the first one, in arrival order.
    pub dropped_roots: Vec<String>,
}

impl AssemblyReport {
    pub fn is_clean(&self) -> bool {
        self.orphans.is_empty() && self.dropped_roots.is_empty()
    }
}

pub fn assemble(records: &[NodeRecord]) -> Option<MindMapTree> {
    assemble_with_report(records).0
}

pub fn assemble_with_report(records: &[NodeRecord]) -> (Option<MindMapTree>, AssemblyReport) {
    let mut ctx = AssembleCtx::new(records.len());

    // First pass: one wrapper per id
    for (order, rec) in records.iter().enumerate() {
        ctx.wrap(rec, order);
    }

    // Second pass: link children and collect root candidates
    let roots = ctx.link();

    let mut report = AssemblyReport::default();
    let Some((&root, rest)) = roots.split_first() else {
        report.orphans = ctx.slots.iter().map(|s| s.rec.id.clone()).collect();
        log_report(&report);
        return (None, report);
    };
    report.dropped_roots = rest.iter().map(|&s| ctx.slots[s].rec.id.clone()).collect();

    let tree = ctx.finish(root, &mut report);
    log_report(&report);
    (Some(tree), report)
}

fn log_report(report: &AssemblyReport) {
    if !report.dropped_roots.is_empty() {
        warn!(dropped = ?report.dropped_roots, "multiple root candidates; keeping the first");
    }
    if !report.orphans.is_empty() {
        warn!(count = report.orphans.len(), orphans = ?report.orphans, "nodes not attached to the root");
    }
}

struct Slot<'a> {
    rec: &'a NodeRecord,
    order: usize,
    children: Vec<usize>,
}

struct AssembleCtx<'a> {
    slots: Vec<Slot<'a>>,
    slot_by_id: HashMap<&'a str, usize>,
}

impl<'a> AssembleCtx<'a> {
    fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            slot_by_id: HashMap::with_capacity(capacity),
        }
    }

    fn wrap(&mut self, rec: &'a NodeRecord, order: usize) {
        match self.slot_by_id.get(rec.id.as_str()) {
            Some(&s) => self.slots[s].rec = rec,
            None => {
                self.slot_by_id.insert(rec.id.as_str(), self.slots.len());
                self.slots.push(Slot { rec, order, children: Vec::new() });
            }
        }
    }

    /// Attach every slot to its parent. Returns root candidates in arrival order.
    fn link(&mut self) -> Vec<usize> {
        let mut roots = Vec::new();
        for s in 0..self.slots.len() {
            match self.slots[s].rec.parent_id.as_deref() {
                None => roots.push(s),
                // An empty parent id names nothing.
                Some("") => {}
                Some(pid) => {
                    if let Some(&p) = self.slot_by_id.get(pid) {
                        self.slots[p].children.push(s);
                    }
                }
            }
        }
        roots
    }

    /// Flatten the subtree under `root` into a pre-order arena.
    fn finish(self, root: usize, report: &mut AssemblyReport) -> MindMapTree {
        let mut nodes: Vec<TreeNode> = Vec::new();
        let mut reached = vec![false; self.slots.len()];

        // (slot, parent index in `nodes`, depth)
        let mut stack: Vec<(usize, Option<NodeId>, usize)> = vec![(root, None, 0)];
        while let Some((s, parent, depth)) = stack.pop() {
            // Each slot has at most one parent and the root has none, so the
            // reachable part is a tree. The guard keeps a bad input from looping.
            if reached[s] {
                continue;
            }
            reached[s] = true;

            let nid = NodeId(nodes.len());
            let slot = &self.slots[s];
            let rec = slot.rec;
            nodes.push(TreeNode {
                nid,
                id: rec.id.clone(),
                parent_id: rec.parent_id.clone(),
                title: rec.title.clone(),
                summary: rec.summary.clone(),
                key_points: rec.key_points.clone(),
                confidence_score: rec.confidence_score,
                node_type: rec.node_type,
                parent,
                children: Vec::with_capacity(slot.children.len()),
                depth,
                order: slot.order,
            });
            if let Some(p) = parent {
                nodes[p.0].children.push(nid);
            }
            for &c in slot.children.iter().rev() {
                stack.push((c, Some(nid), depth + 1));
            }
        }

        report.orphans = self
            .slots
            .iter()
            .enumerate()
            .filter(|(s, _)| !reached[*s])
            .map(|(_, slot)| slot.rec.id.clone())
            .filter(|id| !report.dropped_roots.contains(id))
            .collect();

        MindMapTree { root: NodeId(0), nodes }
    }
}
