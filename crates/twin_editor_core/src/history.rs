// SPDX-License-Identifier: MIT OR Apache-2.0
//! Undo/redo history of node transforms.
//!
//! The log is linear: entry 0 is the `Initial` snapshot of every transformable
//! node taken at model load, and each later entry is one committed transform
//! edit. The cursor marks the entry whose state is currently applied.
//!
//! Undo applies the `before_state` of the entry being undone and moves the
//! cursor back; redo moves the cursor forward and applies that entry's
//! `after_state`. Replay looks nodes up by id in the live scene and skips any
//! that are missing.

use crate::live::{NodeId, SceneGraph};
use crate::mirror::find_by_id;
use crate::transform::TransformSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default maximum number of entries
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One recorded state change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HistoryEntry {
    /// Transforms of every transformable node at model load
    Initial {
        /// Per-node snapshots in traversal order
        states: Vec<(NodeId, TransformSnapshot)>,
    },
    /// One committed edit of a single node
    Transform {
        /// Edited node
        node_id: NodeId,
        /// Transform before the edit
        before_state: TransformSnapshot,
        /// Transform after the edit
        after_state: TransformSnapshot,
        /// Milliseconds since the Unix epoch
        timestamp: u64,
    },
}

impl HistoryEntry {
    /// Create a transform entry stamped with the current time
    pub fn transform(
        node_id: NodeId,
        before_state: TransformSnapshot,
        after_state: TransformSnapshot,
    ) -> Self {
        Self::Transform {
            node_id,
            before_state,
            after_state,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .as_millis() as u64,
        }
    }

    /// Whether this is the load-time snapshot
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Initial { .. })
    }

    /// Human-readable description
    pub fn description(&self) -> String {
        match self {
            Self::Initial { states } => format!("Initial state ({} nodes)", states.len()),
            Self::Transform { node_id, .. } => format!("Transform {node_id}"),
        }
    }
}

/// Cursor/length pair used to enable the undo and redo buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryStatus {
    /// Index of the applied entry, `None` when empty
    pub cursor: Option<usize>,
    /// Number of entries
    pub len: usize,
    /// Undo is available
    pub can_undo: bool,
    /// Redo is available
    pub can_redo: bool,
}

/// Bounded linear undo/redo log
#[derive(Debug, Clone)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
    cursor: Option<usize>,
    limit: usize,
}

impl History {
    /// Create a history with the default limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create a history keeping at most `limit` entries (at least one)
    pub fn with_limit(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            limit: limit.max(1),
        }
    }

    /// Reset the log to a single `Initial` entry describing the live scene.
    ///
    /// Returns the number of nodes captured.
    pub fn record_initial<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> usize {
        let states = capture_all(scene);
        let count = states.len();
        self.clear();
        self.append(HistoryEntry::Initial { states });
        tracing::info!("Recorded initial state of {count} nodes");
        count
    }

    /// Append an entry, discarding any redo tail and evicting the oldest
    /// entries beyond the limit
    pub fn append(&mut self, entry: HistoryEntry) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        if keep < self.entries.len() {
            tracing::debug!("Discarding {} redo entries", self.entries.len() - keep);
            self.entries.truncate(keep);
        }

        tracing::debug!("History append: {}", entry.description());
        self.entries.push_back(entry);

        let mut evicted = 0;
        while self.entries.len() > self.limit {
            self.entries.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            tracing::debug!("Evicted {evicted} oldest history entries");
        }

        self.cursor = Some(self.entries.len() - 1);
    }

    /// Step back one entry; false (and nothing touched) at the floor
    pub fn undo<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> bool {
        let Some(cursor) = self.cursor.filter(|cursor| *cursor > 0) else {
            tracing::debug!("Nothing to undo");
            return false;
        };

        if let Some(entry) = self.entries.get(cursor) {
            match entry {
                HistoryEntry::Transform {
                    node_id,
                    before_state,
                    ..
                } => {
                    apply_snapshot(scene, *node_id, before_state);
                }
                HistoryEntry::Initial { .. } => {
                    tracing::trace!("Undo past an initial entry has no prior state");
                }
            }
        }

        let target = cursor - 1;
        if let Some(HistoryEntry::Initial { states }) = self.entries.get(target) {
            replay_initial(scene, states);
        }

        self.cursor = Some(target);
        tracing::debug!("Undo -> cursor {target}");
        true
    }

    /// Step forward one entry; false (and nothing touched) at the newest entry
    pub fn redo<S: SceneGraph + ?Sized>(&mut self, scene: &mut S) -> bool {
        let Some(next) = self.cursor.map(|cursor| cursor + 1) else {
            tracing::debug!("Nothing to redo");
            return false;
        };
        let Some(entry) = self.entries.get(next) else {
            tracing::debug!("Nothing to redo");
            return false;
        };

        match entry {
            HistoryEntry::Transform {
                node_id,
                after_state,
                ..
            } => {
                apply_snapshot(scene, *node_id, after_state);
            }
            HistoryEntry::Initial { states } => {
                replay_initial(scene, states);
            }
        }

        self.cursor = Some(next);
        tracing::debug!("Redo -> cursor {next}");
        true
    }

    /// Drop every entry without touching the live scene
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|cursor| cursor > 0)
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(cursor) => cursor + 1 < self.entries.len(),
            None => false,
        }
    }

    /// Index of the applied entry
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries kept
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// All entries, oldest first
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Cursor/length summary for the UI
    pub fn status(&self) -> HistoryStatus {
        HistoryStatus {
            cursor: self.cursor,
            len: self.entries.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Get description of next undo operation
    pub fn undo_description(&self) -> Option<String> {
        self.cursor
            .filter(|cursor| *cursor > 0)
            .and_then(|cursor| self.entries.get(cursor))
            .map(HistoryEntry::description)
    }

    /// Get description of next redo operation
    pub fn redo_description(&self) -> Option<String> {
        self.cursor
            .and_then(|cursor| self.entries.get(cursor + 1))
            .map(HistoryEntry::description)
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn capture_all<S: SceneGraph + ?Sized>(scene: &S) -> Vec<(NodeId, TransformSnapshot)> {
    let mut states = Vec::new();
    let Some(root) = scene.root() else {
        return states;
    };

    let mut visited = HashSet::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(transform) = scene.transform(id) {
            states.push((id, transform));
        }
        stack.extend(scene.children(id).iter().rev().copied());
    }
    states
}

fn apply_snapshot<S: SceneGraph + ?Sized>(
    scene: &mut S,
    id: NodeId,
    snapshot: &TransformSnapshot,
) -> bool {
    match find_by_id(scene, id) {
        Some(live) => scene.set_transform(live, snapshot),
        None => {
            tracing::debug!("Replay skipped, node {id} not found");
            false
        }
    }
}

fn replay_initial<S: SceneGraph + ?Sized>(
    scene: &mut S,
    states: &[(NodeId, TransformSnapshot)],
) -> usize {
    states
        .iter()
        .filter(|(id, snapshot)| apply_snapshot(scene, *id, snapshot))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryScene, NodeKind};
    use crate::transform::Vector3;

    fn at(x: f32) -> TransformSnapshot {
        TransformSnapshot::at(Vector3::new(x, 0.0, 0.0))
    }

    fn two_node_scene() -> (MemoryScene, NodeId, NodeId) {
        let mut scene = MemoryScene::new();
        let root = scene.add(None, "Root", NodeKind::Scene).unwrap();
        let child = scene.add(Some(root), "ChildA", NodeKind::Object).unwrap();
        scene.set_transform(child, &at(1.0));
        (scene, root, child)
    }

    #[test]
    fn test_record_initial() {
        let (mut scene, root, child) = two_node_scene();
        let marker = scene.add(Some(root), "Marker", NodeKind::Unknown).unwrap();
        let mut history = History::new();

        assert_eq!(history.record_initial(&scene), 2);
        assert_eq!(history.cursor(), Some(0));
        assert!(!history.can_undo());
        assert!(!history.can_redo());

        let Some(HistoryEntry::Initial { states }) = history.get(0) else {
            panic!("expected initial entry");
        };
        assert_eq!(states, &vec![(root, at(0.0)), (child, at(1.0))]);
        assert!(states.iter().all(|(id, _)| *id != marker));
    }

    #[test]
    fn test_history_bound_keeps_cursor_on_newest() {
        let (scene, _, child) = two_node_scene();
        let mut history = History::new();
        history.record_initial(&scene);

        for i in 0..25 {
            history.append(HistoryEntry::transform(child, at(i as f32), at(i as f32 + 1.0)));
            assert!(history.len() <= DEFAULT_HISTORY_LIMIT);
            assert_eq!(history.cursor(), Some(history.len() - 1));
            let last = history.get(history.len() - 1);
            let Some(HistoryEntry::Transform { after_state, .. }) = last else {
                panic!("expected transform entry");
            };
            assert_eq!(*after_state, at(i as f32 + 1.0));
        }
    }

    #[test]
    fn test_undo_redo_inverse() {
        let (mut scene, _, child) = two_node_scene();
        let mut history = History::new();
        history.record_initial(&scene);

        let before = at(1.0);
        let after = TransformSnapshot::new(
            Vector3::new(5.0, 0.5, -2.0),
            Vector3::new(0.0, 1.25, 0.0),
            Vector3::new(2.0, 2.0, 2.0),
        );
        scene.set_transform(child, &after);
        history.append(HistoryEntry::transform(child, before, after));

        assert!(history.undo(&mut scene));
        assert_eq!(scene.transform(child), Some(before));
        assert!(history.redo(&mut scene));
        assert_eq!(scene.transform(child), Some(after));
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_out_of_range_navigation_is_noop() {
        let (mut scene, _, child) = two_node_scene();
        let mut history = History::new();

        assert!(!history.undo(&mut scene));
        assert!(!history.redo(&mut scene));
        assert_eq!(history.cursor(), None);

        history.record_initial(&scene);
        scene.set_transform(child, &at(3.0));
        assert!(!history.undo(&mut scene));
        assert!(!history.redo(&mut scene));
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(scene.transform(child), Some(at(3.0)));
    }

    #[test]
    fn test_append_after_undo_discards_redo_tail() {
        let (mut scene, _, child) = two_node_scene();
        let mut history = History::new();
        history.record_initial(&scene);
        history.append(HistoryEntry::transform(child, at(1.0), at(2.0)));
        history.append(HistoryEntry::transform(child, at(2.0), at(3.0)));

        assert!(history.undo(&mut scene));
        assert!(history.can_redo());
        history.append(HistoryEntry::transform(child, at(2.0), at(9.0)));

        assert_eq!(history.len(), 3);
        assert_eq!(history.cursor(), Some(2));
        assert!(!history.can_redo());
        assert!(history.undo(&mut scene));
        assert_eq!(scene.transform(child), Some(at(2.0)));
    }

    #[test]
    fn test_replay_skips_missing_nodes() {
        let (mut scene, root, child) = two_node_scene();
        let ghost = NodeId::new();
        let mut history = History::new();
        history.append(HistoryEntry::Initial {
            states: vec![(ghost, at(7.0)), (root, at(4.0)), (child, at(8.0))],
        });
        history.append(HistoryEntry::transform(ghost, at(0.0), at(1.0)));
        history.append(HistoryEntry::transform(child, at(8.0), at(6.0)));

        assert!(history.undo(&mut scene));
        assert_eq!(scene.transform(child), Some(at(8.0)));
        assert!(history.undo(&mut scene));
        assert_eq!(history.cursor(), Some(0));
        assert_eq!(scene.transform(root), Some(at(4.0)));
        assert_eq!(scene.transform(child), Some(at(8.0)));
    }

    #[test]
    fn test_clear_leaves_scene_untouched() {
        let (mut scene, _, child) = two_node_scene();
        let mut history = History::new();
        history.record_initial(&scene);
        scene.set_transform(child, &at(5.0));
        history.append(HistoryEntry::transform(child, at(1.0), at(5.0)));

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.cursor(), None);
        assert_eq!(history.status(), HistoryStatus::default());
        assert_eq!(scene.transform(child), Some(at(5.0)));
    }

    #[test]
    fn test_descriptions() {
        let (scene, _, child) = two_node_scene();
        let mut history = History::new();
        history.record_initial(&scene);
        assert_eq!(history.undo_description(), None);

        history.append(HistoryEntry::transform(child, at(1.0), at(2.0)));
        assert_eq!(history.undo_description(), Some(format!("Transform {child}")));
        assert_eq!(history.redo_description(), None);
    }
}
