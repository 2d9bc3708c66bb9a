//! Two-pass layered tree layout (a reduced Buchheim-Walker).
//!
//! First pass, children before parents:
//! - `y` comes straight from depth.
//! - A leaf sits one sibling step right of its previous sibling, or at 0.
//! - A branch is centered over the span of its first and last child.
//! - A node with a previous sibling is clamped to at least one sibling step
//!   right of it. Its `modifier` is then its distance from that sibling,
//!   whether or not the clamp moved it.
//!
//! Second pass, parents before children: every node receives the sum of its
//! ancestors' modifiers. Children of a later sibling are therefore pushed right
//! by the sibling distance, not by the clamp's own displacement.
//!
//! Only adjacent siblings are separated. Cousins in deep unbalanced trees can
//! still end up close; parents are not re-centered after a shift.
//!
//! Both passes walk with explicit stacks, so depth is bounded by memory and
//! not by the call stack.

use tracing::debug;

use crate::layout::{Anchor, Connector, ExpansionSet, LayoutConfig, LayoutResult, PositionedNode};
use crate::stream::{MindMapTree, NodeId};

/// Working state for one visible node.
#[derive(Debug, Clone)]
struct LayoutNode {
    nid: NodeId,
    depth: usize,
    /// Visible children, indices into the working arena.
    children: Vec<usize>,
    prev_sibling: Option<usize>,
    expanded: bool,
    x: f64,
    y: f64,
    modifier: f64,
}

/// Collect the visible part of the tree. Index 0 is the root.
fn visible_nodes(tree: &MindMapTree, expanded: &ExpansionSet) -> Vec<LayoutNode> {
    let root = tree.root_node();
    let mut nodes = vec![LayoutNode {
        nid: root.nid,
        depth: 0,
        children: Vec::new(),
        prev_sibling: None,
        expanded: expanded.contains(&root.id),
        x: 0.0,
        y: 0.0,
        modifier: 0.0,
    }];

    let mut i = 0;
    while i < nodes.len() {
        if nodes[i].expanded {
            let parent = tree.node(nodes[i].nid);
            let depth = nodes[i].depth + 1;
            let mut prev = None;
            for &cid in &parent.children {
                let child = tree.node(cid);
                let idx = nodes.len();
                nodes.push(LayoutNode {
                    nid: cid,
                    depth,
                    children: Vec::new(),
                    prev_sibling: prev,
                    expanded: expanded.contains(&child.id),
                    x: 0.0,
                    y: 0.0,
                    modifier: 0.0,
                });
                nodes[i].children.push(idx);
                prev = Some(idx);
            }
        }
        i += 1;
    }
    nodes
}

/// Left-to-right post-order: every node after its children and after its
/// previous sibling's whole subtree.
fn post_order(nodes: &[LayoutNode]) -> Vec<usize> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut stack = vec![0];
    while let Some(i) = stack.pop() {
        out.push(i);
        stack.extend(nodes[i].children.iter().copied());
    }
    // root, right-to-left pre-order, reversed
    out.reverse();
    out
}

fn first_pass(nodes: &mut [LayoutNode], cfg: &LayoutConfig) {
    let w = cfg.node_size.w;
    let step = cfg.sibling_step();

    for i in post_order(nodes) {
        nodes[i].y = nodes[i].depth as f64 * cfg.level_step();

        let x = match (nodes[i].children.first(), nodes[i].children.last()) {
            (Some(&first), Some(&last)) => {
                let first_x = nodes[first].x;
                let span = nodes[last].x + w - first_x;
                first_x + span / 2.0 - w / 2.0
            }
            _ => match nodes[i].prev_sibling {
                Some(prev) => nodes[prev].x + step,
                None => 0.0,
            },
        };

        match nodes[i].prev_sibling {
            Some(prev) => {
                let clamped = x.max(nodes[prev].x + step);
                nodes[i].modifier = clamped - nodes[prev].x;
                nodes[i].x = clamped;
            }
            None => nodes[i].x = x,
        }
    }
}

fn second_pass(
    nodes: &[LayoutNode],
    tree: &MindMapTree,
    cfg: &LayoutConfig,
) -> (Vec<PositionedNode>, Vec<Connector>) {
    let w = cfg.node_size.w;
    let h = cfg.node_size.h;

    let mut positioned = Vec::with_capacity(nodes.len());
    let mut connectors = Vec::with_capacity(nodes.len().saturating_sub(1));

    // (working index, accumulated ancestor modifier, parent's final position)
    let mut stack: Vec<(usize, f64, Option<(usize, f64, f64)>)> = vec![(0, 0.0, None)];
    while let Some((i, applied, parent)) = stack.pop() {
        let n = &nodes[i];
        let tn = tree.node(n.nid);
        let x = n.x + applied;
        let y = n.y;

        if let Some((p, px, py)) = parent {
            let source_id = tree.node(nodes[p].nid).id.clone();
            connectors.push(Connector {
                source: Anchor { id: source_id, x: px + w, y: py + h / 2.0 },
                target: Anchor { id: tn.id.clone(), x, y: y + h / 2.0 },
            });
        }

        positioned.push(PositionedNode {
            nid: n.nid,
            id: tn.id.clone(),
            x,
            y,
            width: w,
            height: h,
            modifier: n.modifier,
            depth: n.depth,
            child_count: tn.children.len(),
            expanded: n.expanded,
        });

        let child_applied = applied + n.modifier;
        for &c in n.children.iter().rev() {
            stack.push((c, child_applied, Some((i, x, y))));
        }
    }
    (positioned, connectors)
}

/// Shift everything so the smallest x and y become 0. Returns the content size.
fn normalize(nodes: &mut [PositionedNode], connectors: &mut [Connector]) -> (f64, f64) {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for n in nodes.iter() {
        let b = n.bounds();
        min_x = min_x.min(b.x);
        min_y = min_y.min(b.y);
        max_x = max_x.max(b.right());
        max_y = max_y.max(b.bottom());
    }
    if nodes.is_empty() {
        return (0.0, 0.0);
    }

    for n in nodes.iter_mut() {
        n.x -= min_x;
        n.y -= min_y;
    }
    for c in connectors.iter_mut() {
        c.source.x -= min_x;
        c.source.y -= min_y;
        c.target.x -= min_x;
        c.target.y -= min_y;
    }
    (max_x - min_x, max_y - min_y)
}

pub fn layout_tidy(tree: &MindMapTree, expanded: &ExpansionSet, cfg: &LayoutConfig) -> LayoutResult {
    if tree.is_empty() {
        return LayoutResult::default();
    }

    let mut nodes = visible_nodes(tree, expanded);
    first_pass(&mut nodes, cfg);
    let (mut positioned_nodes, mut connectors) = second_pass(&nodes, tree, cfg);
    let (content_width, content_height) = normalize(&mut positioned_nodes, &mut connectors);

    debug!(
        visible = positioned_nodes.len(),
        total = tree.len(),
        content_width,
        content_height,
        "layout recomputed"
    );

    LayoutResult { positioned_nodes, connectors, content_width, content_height }
}
