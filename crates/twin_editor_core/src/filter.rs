// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hierarchy search and filtering.
//!
//! Filters keep the ancestors of every match so the tree stays navigable. A
//! name match keeps its whole subtree. Live text input goes through a
//! [`Debouncer`] so the filter is recomputed only once typing settles.

use crate::mirror::{NodeType, SceneNode};
use std::time::{Duration, Instant};

/// Default quiet period before a typed search term is applied
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Filter applied to the mirrored tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeFilter {
    /// Case-insensitive substring of the node name (stored lowercase)
    Name(String),
    /// Exact node type
    Type(NodeType),
    /// Visibility flag
    Visibility(bool),
}

impl TreeFilter {
    /// Name filter; `None` for an empty term
    pub fn name(term: &str) -> Option<Self> {
        let term = term.trim();
        (!term.is_empty()).then(|| Self::Name(term.to_lowercase()))
    }

    /// Whether a single node matches, ignoring its relatives
    pub fn matches(&self, node: &SceneNode) -> bool {
        match self {
            Self::Name(needle) => node.name.to_lowercase().contains(needle.as_str()),
            Self::Type(node_type) => node.node_type == *node_type,
            Self::Visibility(visible) => node.visible == *visible,
        }
    }
}

/// Filter a mirrored forest
pub fn filter_tree(roots: &[SceneNode], filter: &TreeFilter) -> Vec<SceneNode> {
    roots
        .iter()
        .filter_map(|node| filter_node(node, filter))
        .collect()
}

fn filter_node(node: &SceneNode, filter: &TreeFilter) -> Option<SceneNode> {
    let matched = filter.matches(node);
    if matched && matches!(filter, TreeFilter::Name(_)) {
        return Some(node.clone());
    }

    let children: Vec<SceneNode> = node
        .children
        .iter()
        .filter_map(|child| filter_node(child, filter))
        .collect();

    if !matched && children.is_empty() {
        return None;
    }

    Some(SceneNode {
        id: node.id,
        name: node.name.clone(),
        node_type: node.node_type,
        visible: node.visible,
        renderable: node.renderable,
        has_modifiers: node.has_modifiers,
        children,
    })
}

/// Delays live text input until it has been stable for a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(String, Instant)>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet period
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Record new input, restarting the quiet period
    pub fn input(&mut self, text: impl Into<String>, now: Instant) {
        self.pending = Some((text.into(), now));
    }

    /// Settled input, returned once the quiet period has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        let (_, at) = self.pending.as_ref()?;
        if now.saturating_duration_since(*at) < self.delay {
            return None;
        }
        self.pending.take().map(|(text, _)| text)
    }

    /// Return pending input immediately
    pub fn flush(&mut self) -> Option<String> {
        self.pending.take().map(|(text, _)| text)
    }

    /// Whether input is waiting for the quiet period
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

/// Search box state of the hierarchy panel
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    debouncer: Debouncer,
    term: String,
    active: Option<TreeFilter>,
}

impl FilterState {
    /// Create filter state with the given debounce delay
    pub fn new(delay: Duration) -> Self {
        Self {
            debouncer: Debouncer::new(delay),
            term: String::new(),
            active: None,
        }
    }

    /// Record a keystroke in the search box
    pub fn set_text(&mut self, text: impl Into<String>, now: Instant) {
        let text = text.into();
        self.term.clone_from(&text);
        self.debouncer.input(text, now);
    }

    /// Apply a filter immediately (type and visibility pickers)
    pub fn set_filter(&mut self, filter: Option<TreeFilter>) {
        self.active = filter;
        self.debouncer.flush();
    }

    /// Promote settled text input to the active filter; true if it changed
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(term) = self.debouncer.poll(now) else {
            return false;
        };
        let filter = TreeFilter::name(&term);
        if filter == self.active {
            return false;
        }
        tracing::debug!("Hierarchy filter set to {term:?}");
        self.active = filter;
        true
    }

    /// Latest raw text in the search box
    pub fn text(&self) -> &str {
        &self.term
    }

    /// Filter currently applied
    pub fn active(&self) -> Option<&TreeFilter> {
        self.active.as_ref()
    }

    /// Apply the active filter to a mirrored forest
    pub fn apply(&self, roots: &[SceneNode]) -> Vec<SceneNode> {
        match &self.active {
            Some(filter) => filter_tree(roots, filter),
            None => roots.to_vec(),
        }
    }
}
