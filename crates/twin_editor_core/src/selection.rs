// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection and transform controller.
//!
//! Owns which node is selected and which gizmo mode is active, and turns
//! drag gestures and numeric field edits into committed history entries.
//!
//! ```text
//! Idle --select--> Selected --drag start--> Dragging --drag end--> Selected
//! ```

use crate::history::{History, HistoryEntry};
use crate::live::{NodeId, Picker, SceneGraph};
use crate::mirror::find_by_id;
use crate::tools::{EditorCamera, TransformMode};
use crate::transform::{Axis, TransformField, TransformSnapshot};
use serde::{Deserialize, Serialize};

/// What is selected and how it is being manipulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionState {
    /// Selected node, if any
    pub selected_node_id: Option<NodeId>,
    /// Active gizmo mode
    pub transform_mode: TransformMode,
}

/// Controller state machine phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    /// Nothing selected
    Idle,
    /// A node is selected, gizmo at rest
    Selected,
    /// Gizmo grabbed
    Dragging,
}

/// Numeric transform values shown by the inspector
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TransformFields {
    /// Node the values belong to
    pub node_id: NodeId,
    /// Current values
    pub transform: TransformSnapshot,
    /// Bumped on every refresh
    pub revision: u64,
}

#[derive(Debug, Clone, Copy)]
struct ActiveDrag {
    node_id: NodeId,
    before: TransformSnapshot,
}

/// Selection and transform controller
#[derive(Debug, Clone, Default)]
pub struct TransformController {
    selection: SelectionState,
    drag: Option<ActiveDrag>,
    fields: Option<TransformFields>,
}

impl TransformController {
    /// Create a controller with nothing selected
    pub fn new() -> Self {
        Self::default()
    }

    /// Selection and mode
    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Selected node, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.selection.selected_node_id
    }

    /// Active gizmo mode
    pub fn transform_mode(&self) -> TransformMode {
        self.selection.transform_mode
    }

    /// Current state machine phase
    pub fn phase(&self) -> ControllerPhase {
        if self.drag.is_some() {
            ControllerPhase::Dragging
        } else if self.selection.selected_node_id.is_some() {
            ControllerPhase::Selected
        } else {
            ControllerPhase::Idle
        }
    }

    /// Inspector values, refreshed on selection, drag and edits
    pub fn fields(&self) -> Option<&TransformFields> {
        self.fields.as_ref()
    }

    /// Select a node (or clear the selection).
    ///
    /// The id is not validated; a stale id simply resolves to nothing. An
    /// in-progress drag keeps its original target.
    pub fn select(&mut self, node_id: Option<NodeId>) {
        if self.selection.selected_node_id == node_id {
            return;
        }
        self.selection.selected_node_id = node_id;
        if self.fields.is_some_and(|fields| Some(fields.node_id) != node_id) {
            self.fields = None;
        }
        match node_id {
            Some(id) => tracing::debug!("Selected {id}"),
            None => tracing::debug!("Selection cleared"),
        }
    }

    /// Select the topmost node under the pointer, clearing on a miss
    pub fn select_at<P: Picker + ?Sized>(
        &mut self,
        picker: &P,
        pointer: [f32; 2],
    ) -> Option<NodeId> {
        let hit = picker.pick(pointer);
        self.select(hit);
        hit
    }

    /// Change gizmo mode
    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        if self.selection.transform_mode != mode {
            tracing::debug!("Transform mode set to {}", mode.name());
        }
        self.selection.transform_mode = mode;
    }

    /// Re-read inspector values for the selected node
    pub fn refresh_fields<S: SceneGraph + ?Sized>(&mut self, scene: &S) {
        let node_id = match self.drag {
            Some(drag) => Some(drag.node_id),
            None => self.selection.selected_node_id,
        };
        let current = node_id.and_then(|id| {
            let live = find_by_id(scene, id)?;
            scene.transform(live).map(|transform| (id, transform))
        });

        let revision = self.fields.map_or(0, |fields| fields.revision + 1);
        self.fields = current.map(|(node_id, transform)| TransformFields {
            node_id,
            transform,
            revision,
        });
    }

    /// Gizmo grabbed: remember the "before" transform and take pointer input
    /// away from the camera. False when nothing resolves.
    pub fn on_drag_start<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &S,
        camera: &mut EditorCamera,
    ) -> bool {
        if self.drag.is_some() {
            tracing::warn!("Drag start while already dragging, keeping original state");
            return false;
        }
        let Some((node_id, before)) = self.resolve_selected(scene) else {
            return false;
        };

        self.drag = Some(ActiveDrag { node_id, before });
        camera.set_input_enabled(false);
        self.refresh_fields(scene);
        tracing::debug!("Drag started on {node_id}");
        true
    }

    /// Gizmo moved the node; mirror the live transform into the inspector.
    /// Never touches history.
    pub fn on_drag_change<S: SceneGraph + ?Sized>(&mut self, scene: &S) -> bool {
        if self.drag.is_none() {
            return false;
        }
        self.refresh_fields(scene);
        true
    }

    /// Write a gizmo-computed transform to the dragged node, then behave as
    /// [`Self::on_drag_change`]
    pub fn drag_to<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        transform: TransformSnapshot,
    ) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        if !transform.is_finite() {
            tracing::debug!("Non-finite drag transform for {} ignored", drag.node_id);
            return false;
        }
        let Some(live) = find_by_id(scene, drag.node_id) else {
            return false;
        };
        if !scene.set_transform(live, &transform) {
            tracing::debug!("Live scene refused drag transform for {}", drag.node_id);
            return false;
        }
        self.on_drag_change(scene)
    }

    /// Gizmo released: give input back to the camera and commit a history
    /// entry if any of the nine scalars changed. Returns whether one was
    /// recorded.
    pub fn on_drag_end<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &S,
        camera: &mut EditorCamera,
        history: &mut History,
    ) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        camera.set_input_enabled(true);
        self.refresh_fields(scene);

        let after = find_by_id(scene, drag.node_id).and_then(|live| scene.transform(live));
        let Some(after) = after else {
            tracing::debug!("Dragged node {} vanished, nothing recorded", drag.node_id);
            return false;
        };
        if !after.differs_from(&drag.before) {
            tracing::debug!("Drag on {} ended without change", drag.node_id);
            return false;
        }

        history.append(HistoryEntry::transform(drag.node_id, drag.before, after));
        tracing::info!("Committed drag on {}", drag.node_id);
        true
    }

    /// Type a value into one numeric field of the selected node.
    ///
    /// Uses the same diff-and-commit path as gizmo drags. Ignored while a
    /// drag is in progress, for non-finite values, and when the live scene
    /// refuses the write.
    pub fn set_field<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        history: &mut History,
        field: TransformField,
        axis: Axis,
        value: f32,
    ) -> bool {
        if self.drag.is_some() {
            tracing::debug!("Numeric edit ignored during drag");
            return false;
        }
        if !value.is_finite() {
            tracing::debug!("Non-finite numeric edit {value} ignored");
            return false;
        }
        let Some((node_id, before)) = self.resolve_selected(scene) else {
            return false;
        };

        let after = before.with_component(field, axis, value);
        if !after.differs_from(&before) {
            return false;
        }

        let Some(live) = find_by_id(scene, node_id) else {
            return false;
        };
        if !scene.set_transform(live, &after) {
            tracing::debug!("Live scene refused numeric edit on {node_id}");
            return false;
        }
        history.append(HistoryEntry::transform(node_id, before, after));
        self.refresh_fields(scene);
        tracing::debug!("Set {}.{} of {node_id} to {value}", field.name(), axis.name());
        true
    }

    /// Drop selection, drag and inspector state (model reload)
    pub fn reset(&mut self, camera: &mut EditorCamera) {
        let mode = self.selection.transform_mode;
        *self = Self::default();
        self.selection.transform_mode = mode;
        camera.set_input_enabled(true);
    }

    fn resolve_selected<S: SceneGraph + ?Sized>(
        &self,
        scene: &S,
    ) -> Option<(NodeId, TransformSnapshot)> {
        let id = self.selection.selected_node_id?;
        let Some(live) = find_by_id(scene, id) else {
            tracing::debug!("Selected node {id} not found in live scene");
            return None;
        };
        scene.transform(live).map(|transform| (id, transform))
    }
}
