// Expansion state: the ids whose children are currently shown.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::stream::MindMapTree;

/// Set of expanded node ids. Ordered, so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpansionSet {
    ids: BTreeSet<String>,
}

impl ExpansionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Insert if absent, remove if present. Returns whether `id` is now expanded.
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    /// Replace the whole set with every id in `tree`.
    pub fn reset_to_all(&mut self, tree: &MindMapTree) {
        self.ids = tree.ids().map(str::to_string).collect();
    }

    /// Expand ids of `tree` that are not in `known`, and record them as known.
    ///
    /// Used while streaming: nodes arriving after the last reset start expanded,
    /// and ids the user already collapsed stay collapsed.
    pub fn expand_new(&mut self, tree: &MindMapTree, known: &mut HashSet<String>) -> usize {
        let mut added = 0;
        for id in tree.ids() {
            if !known.contains(id) {
                known.insert(id.to_string());
                self.ids.insert(id.to_string());
                added += 1;
            }
        }
        added
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExpansionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self { ids: iter.into_iter().map(Into::into).collect() }
    }
}
