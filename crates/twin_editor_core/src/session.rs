// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor session.
//!
//! One [`EditorSession`] exists per mounted editor. It owns the live scene
//! once a model has loaded, the mirror, the selection controller, the
//! history and the viewport tools, and is the only path through which UI
//! panels mutate anything. Every interaction before a model has loaded is a
//! no-op.

use crate::config::EditorConfig;
use crate::filter::{FilterState, TreeFilter};
use crate::history::{History, HistoryStatus};
use crate::live::{NodeId, Picker, SceneGraph};
use crate::material::{self, Color};
use crate::mirror::{find_by_id, SceneMirror, SceneNode};
use crate::selection::{ControllerPhase, SelectionState, TransformController, TransformFields};
use crate::shortcuts::{EditorAction, Key, Modifiers, ShortcutRegistry};
use crate::tools::{EditorCamera, GizmoAnimator, TransformMode};
use crate::transform::{Axis, TransformField, TransformSnapshot};
use std::time::Instant;

/// Editing state of one editor instance
pub struct EditorSession<S: SceneGraph> {
    config: EditorConfig,
    scene: Option<S>,
    mirror: SceneMirror,
    controller: TransformController,
    history: History,
    camera: EditorCamera,
    gizmo: GizmoAnimator,
    filter: FilterState,
    filtered: Vec<SceneNode>,
    shortcuts: ShortcutRegistry,
}

impl<S: SceneGraph> EditorSession<S> {
    /// Create a session with no model loaded
    pub fn new(config: EditorConfig) -> Self {
        Self {
            mirror: SceneMirror::new(),
            controller: TransformController::new(),
            history: History::with_limit(config.history_limit),
            camera: EditorCamera::new(config.camera.clone()),
            gizmo: GizmoAnimator::new(config.gizmo.clone()),
            filter: FilterState::new(config.filter_debounce()),
            filtered: Vec::new(),
            shortcuts: ShortcutRegistry::new(),
            scene: None,
            config,
        }
    }

    /// Model finished loading: build the mirror and record the initial state
    pub fn load_model(&mut self, scene: S) {
        self.controller.reset(&mut self.camera);
        self.gizmo.set_dragging(false);
        self.mirror.rebuild(&scene);
        self.history = History::with_limit(self.config.history_limit);
        self.history.record_initial(&scene);
        self.scene = Some(scene);
        self.refresh_filtered();
        tracing::info!("Model loaded ({} mirrored nodes)", self.mirror.len());
    }

    /// Tear down the loaded model, returning the live scene
    pub fn unload(&mut self) -> Option<S> {
        self.controller.reset(&mut self.camera);
        self.gizmo.set_dragging(false);
        self.mirror.clear();
        self.history.clear();
        self.filtered.clear();
        let scene = self.scene.take();
        if scene.is_some() {
            tracing::info!("Model unloaded");
        }
        scene
    }

    /// Whether a model is loaded
    pub fn is_loaded(&self) -> bool {
        self.scene.is_some()
    }

    /// Session configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Live scene (read-only)
    pub fn scene(&self) -> Option<&S> {
        self.scene.as_ref()
    }

    /// Mirrored tree
    pub fn mirror(&self) -> &SceneMirror {
        &self.mirror
    }

    /// Mirrored tree with the hierarchy filter applied
    pub fn filtered_tree(&self) -> &[SceneNode] {
        &self.filtered
    }

    /// Selection and transform mode
    pub fn selection(&self) -> &SelectionState {
        self.controller.selection()
    }

    /// Selected node, if any
    pub fn selected(&self) -> Option<NodeId> {
        self.controller.selected()
    }

    /// Active gizmo mode
    pub fn transform_mode(&self) -> TransformMode {
        self.controller.transform_mode()
    }

    /// Controller phase
    pub fn phase(&self) -> ControllerPhase {
        self.controller.phase()
    }

    /// Inspector values of the selected node
    pub fn fields(&self) -> Option<&TransformFields> {
        self.controller.fields()
    }

    /// Undo/redo history
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Cursor/length pair for the undo/redo buttons
    pub fn history_status(&self) -> HistoryStatus {
        self.history.status()
    }

    /// Viewport camera
    pub fn camera(&self) -> &EditorCamera {
        &self.camera
    }

    /// Viewport camera, for orbit/pan/zoom input
    pub fn camera_mut(&mut self) -> &mut EditorCamera {
        &mut self.camera
    }

    /// Gizmo animation state
    pub fn gizmo(&self) -> &GizmoAnimator {
        &self.gizmo
    }

    /// Keyboard shortcut bindings
    pub fn shortcuts_mut(&mut self) -> &mut ShortcutRegistry {
        &mut self.shortcuts
    }

    /// Current transform of a live node
    pub fn transform_of(&self, id: NodeId) -> Option<TransformSnapshot> {
        let scene = self.scene.as_ref()?;
        scene.transform(find_by_id(scene, id)?)
    }

    /// Select a node (or clear the selection)
    pub fn select(&mut self, id: Option<NodeId>) {
        let Some(scene) = self.scene.as_ref() else {
            return;
        };
        self.controller.select(id);
        self.controller.refresh_fields(scene);
    }

    /// Select the topmost node under the pointer
    pub fn select_at<P: Picker + ?Sized>(
        &mut self,
        picker: &P,
        pointer: [f32; 2],
    ) -> Option<NodeId> {
        let scene = self.scene.as_ref()?;
        let hit = self.controller.select_at(picker, pointer);
        self.controller.refresh_fields(scene);
        hit
    }

    /// Change the gizmo mode
    pub fn set_transform_mode(&mut self, mode: TransformMode) {
        if self.scene.is_none() {
            return;
        }
        self.controller.set_transform_mode(mode);
    }

    /// Show or hide a node in both the live scene and the mirror
    pub fn set_visibility(&mut self, id: NodeId, visible: bool) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let changed = self.mirror.set_visibility(scene, id, visible);
        if changed {
            self.refresh_filtered();
        }
        changed
    }

    /// Pointer is over the gizmo
    pub fn set_gizmo_hovered(&mut self, hovered: bool) {
        self.gizmo.set_hovered(hovered);
    }

    /// Gizmo grabbed
    pub fn drag_start(&mut self) -> bool {
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };
        let started = self.controller.on_drag_start(scene, &mut self.camera);
        self.gizmo.set_dragging(started);
        started
    }

    /// Gizmo moved the selected node in place
    pub fn drag_change(&mut self) -> bool {
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };
        self.controller.on_drag_change(scene)
    }

    /// Gizmo computed a new transform for the dragged node
    pub fn drag_to(&mut self, transform: TransformSnapshot) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        self.controller.drag_to(scene, transform)
    }

    /// Gizmo released; true if a history entry was recorded
    pub fn drag_end(&mut self) -> bool {
        let Some(scene) = self.scene.as_ref() else {
            return false;
        };
        self.gizmo.set_dragging(false);
        self.controller
            .on_drag_end(scene, &mut self.camera, &mut self.history)
    }

    /// Type a value into a numeric transform field of the selection
    pub fn set_field(&mut self, field: TransformField, axis: Axis, value: f32) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        self.controller
            .set_field(scene, &mut self.history, field, axis, value)
    }

    /// Set the material colour of a node
    pub fn set_color(&mut self, id: NodeId, color: Color) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        material::set_color(scene, id, color)
    }

    /// Set the material opacity of a node
    pub fn set_opacity(&mut self, id: NodeId, opacity: f32) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        material::set_opacity(scene, id, opacity)
    }

    /// Undo the last edit
    pub fn undo(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let moved = self.history.undo(scene);
        if moved {
            self.controller.refresh_fields(scene);
        }
        moved
    }

    /// Redo the last undone edit
    pub fn redo(&mut self) -> bool {
        let Some(scene) = self.scene.as_mut() else {
            return false;
        };
        let moved = self.history.redo(scene);
        if moved {
            self.controller.refresh_fields(scene);
        }
        moved
    }

    /// Empty the history without touching the live scene
    pub fn clear_history(&mut self) {
        self.history.clear();
        tracing::info!("History cleared");
    }

    /// Run the action bound to a key press
    pub fn handle_shortcut(&mut self, key: Key, modifiers: Modifiers) -> Option<EditorAction> {
        if self.scene.is_none() {
            return None;
        }
        let action = self.shortcuts.action_for(key, modifiers)?;
        match action {
            EditorAction::Undo => {
                self.undo();
            }
            EditorAction::Redo => {
                self.redo();
            }
            EditorAction::Translate => self.set_transform_mode(TransformMode::Translate),
            EditorAction::Rotate => self.set_transform_mode(TransformMode::Rotate),
            EditorAction::Scale => self.set_transform_mode(TransformMode::Scale),
            EditorAction::Deselect => self.select(None),
        }
        tracing::debug!("Shortcut triggered {}", action.id());
        Some(action)
    }

    /// Record a keystroke in the hierarchy search box
    pub fn set_filter_text(&mut self, text: &str, now: Instant) {
        self.filter.set_text(text, now);
    }

    /// Apply a type or visibility filter immediately
    pub fn set_filter(&mut self, filter: Option<TreeFilter>) {
        self.filter.set_filter(filter);
        self.refresh_filtered();
    }

    /// Fly the camera to the selected node
    pub fn focus_selected(&mut self) -> bool {
        let Some(transform) = self.selected().and_then(|id| self.transform_of(id)) else {
            return false;
        };
        self.camera.focus_on(transform.position);
        true
    }

    /// Fly the camera back to where it was before focusing
    pub fn return_camera(&mut self) -> bool {
        self.camera.return_home()
    }

    /// Per-frame update: camera flight, gizmo smoothing and settled search
    /// input
    pub fn tick(&mut self, dt: f32, now: Instant) {
        self.camera.tick(dt);
        self.gizmo.tick(dt);
        if self.filter.poll(now) {
            self.refresh_filtered();
        }
    }

    fn refresh_filtered(&mut self) {
        self.filtered = self.filter.apply(self.mirror.roots());
    }
}

impl<S: SceneGraph> Default for EditorSession<S> {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryEntry;
    use crate::live::NodeCapabilities;
    use crate::material::MaterialProps;
    use crate::memory::{MemoryScene, NodeKind};
    use crate::transform::Vector3;
    use std::time::Duration;

    fn at(x: f32) -> TransformSnapshot {
        TransformSnapshot::at(Vector3::new(x, 0.0, 0.0))
    }

    fn loaded_session() -> (EditorSession<MemoryScene>, NodeId, NodeId) {
        let mut scene = MemoryScene::new();
        let root = scene.add(None, "Root", NodeKind::Scene).unwrap();
        let child = scene.add(Some(root), "ChildA", NodeKind::Mesh).unwrap();
        scene.set_transform(child, &at(1.0));

        let mut session = EditorSession::default();
        session.load_model(scene);
        (session, root, child)
    }

    fn drag(session: &mut EditorSession<MemoryScene>, to: TransformSnapshot) -> bool {
        assert!(session.drag_start());
        session.drag_to(to);
        session.drag_end()
    }

    #[test]
    fn test_drag_undo_redo_scenario() {
        let (mut session, root, child) = loaded_session();
        assert_eq!(session.history_status().cursor, Some(0));
        let Some(HistoryEntry::Initial { states }) = session.history().get(0) else {
            panic!("expected initial entry");
        };
        assert_eq!(states, &vec![(root, at(0.0)), (child, at(1.0))]);

        session.select(Some(child));
        assert!(drag(&mut session, at(5.0)));

        let status = session.history_status();
        assert_eq!(status.len, 2);
        assert_eq!(status.cursor, Some(1));
        let Some(HistoryEntry::Transform {
            before_state,
            after_state,
            ..
        }) = session.history().get(1)
        else {
            panic!("expected transform entry");
        };
        assert_eq!(before_state.position, Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(after_state.position, Vector3::new(5.0, 0.0, 0.0));

        assert!(session.undo());
        assert_eq!(session.transform_of(child), Some(at(1.0)));
        assert_eq!(session.history_status().cursor, Some(0));

        assert!(session.redo());
        assert_eq!(session.transform_of(child), Some(at(5.0)));
        assert_eq!(session.history_status().cursor, Some(1));
    }

    #[test]
    fn test_eleven_edits_evict_initial_and_first_edit() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));

        for i in 1..=11 {
            assert!(drag(&mut session, at(1.0 + i as f32)));
        }

        let history = session.history();
        assert_eq!(history.len(), 10);
        assert_eq!(history.cursor(), Some(9));
        assert!(history.entries().all(|entry| !entry.is_initial()));
        let Some(HistoryEntry::Transform { before_state, .. }) = history.get(0) else {
            panic!("expected transform entry");
        };
        // the first edit (1 -> 2) is gone; the oldest kept is 2 -> 3
        assert_eq!(*before_state, at(2.0));
    }

    #[test]
    fn test_repeated_undo_floors_at_initial() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        drag(&mut session, at(4.0));
        assert_eq!(session.history_status().cursor, Some(1));

        let moved: Vec<bool> = (0..5).map(|_| session.undo()).collect();
        assert_eq!(moved, vec![true, false, false, false, false]);
        assert_eq!(session.history_status().cursor, Some(0));
        assert_eq!(session.transform_of(child), Some(at(1.0)));
    }

    #[test]
    fn test_click_without_move_records_nothing() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        assert!(session.drag_start());
        assert!(session.drag_change());
        assert!(!session.drag_end());
        assert_eq!(session.history_status().len, 1);
    }

    #[test]
    fn test_camera_input_suppressed_during_drag() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        session.drag_start();
        assert!(!session.camera_mut().orbit(10.0, 0.0));
        session.drag_to(at(2.0));
        session.drag_end();
        assert!(session.camera_mut().orbit(10.0, 0.0));
    }

    #[test]
    fn test_visibility_updates_mirror_and_live() {
        let (mut session, _, child) = loaded_session();
        assert!(session.set_visibility(child, false));

        let scene = session.scene().unwrap();
        let live = find_by_id(scene, child).unwrap();
        assert_eq!(scene.is_visible(live), Some(false));
        assert!(!session.mirror().get(child).unwrap().visible);

        assert!(!session.set_visibility(NodeId::new(), false));
    }

    /// Live scene that reads normally but refuses every write
    struct LockedScene(MemoryScene);

    impl SceneGraph for LockedScene {
        fn root(&self) -> Option<NodeId> {
            self.0.root()
        }

        fn name(&self, id: NodeId) -> Option<&str> {
            self.0.name(id)
        }

        fn children(&self, id: NodeId) -> &[NodeId] {
            self.0.children(id)
        }

        fn capabilities(&self, id: NodeId) -> Option<NodeCapabilities> {
            self.0.capabilities(id)
        }

        fn is_visible(&self, id: NodeId) -> Option<bool> {
            self.0.is_visible(id)
        }

        fn set_visible(&mut self, _id: NodeId, _visible: bool) -> bool {
            false
        }

        fn transform(&self, id: NodeId) -> Option<TransformSnapshot> {
            self.0.transform(id)
        }

        fn set_transform(&mut self, _id: NodeId, _transform: &TransformSnapshot) -> bool {
            false
        }

        fn material(&self, id: NodeId) -> Option<MaterialProps> {
            self.0.material(id)
        }

        fn edit_materials(
            &mut self,
            _id: NodeId,
            _edit: &mut dyn FnMut(&mut MaterialProps),
        ) -> bool {
            false
        }
    }

    #[test]
    fn test_refused_live_writes_change_nothing() {
        let mut scene = MemoryScene::new();
        let root = scene.add(None, "Root", NodeKind::Scene).unwrap();
        let child = scene.add(Some(root), "ChildA", NodeKind::Mesh).unwrap();
        scene.set_transform(child, &at(1.0));

        let mut session = EditorSession::default();
        session.load_model(LockedScene(scene));

        assert!(!session.set_visibility(child, false));
        assert!(session.mirror().get(child).unwrap().visible);
        assert_eq!(session.scene().unwrap().is_visible(child), Some(true));

        session.select(Some(child));
        assert!(!session.set_field(TransformField::Position, Axis::X, 9.0));
        assert_eq!(session.history_status().len, 1);
        assert_eq!(session.transform_of(child), Some(at(1.0)));

        assert!(session.drag_start());
        assert!(!session.drag_to(at(4.0)));
        assert!(!session.drag_end());
        assert_eq!(session.history_status().len, 1);
        assert_eq!(session.transform_of(child), Some(at(1.0)));

        assert!(!session.set_color(child, Color::WHITE));
    }

    #[test]
    fn test_interaction_before_load_is_noop() {
        let mut session: EditorSession<MemoryScene> = EditorSession::default();
        let id = NodeId::new();

        session.select(Some(id));
        assert_eq!(session.selected(), None);
        session.set_transform_mode(TransformMode::Scale);
        assert_eq!(session.transform_mode(), TransformMode::Translate);
        assert!(!session.drag_start());
        assert!(!session.drag_end());
        assert!(!session.undo());
        assert!(!session.redo());
        assert!(!session.set_visibility(id, false));
        assert!(!session.set_field(TransformField::Position, Axis::X, 1.0));
        assert_eq!(session.handle_shortcut(Key::char('z'), Modifiers::CTRL), None);
        assert_eq!(session.history_status(), HistoryStatus::default());
    }

    #[test]
    fn test_shortcuts_drive_session() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        drag(&mut session, at(3.0));

        assert_eq!(
            session.handle_shortcut(Key::char('z'), Modifiers::COMMAND),
            Some(EditorAction::Undo)
        );
        assert_eq!(session.transform_of(child), Some(at(1.0)));
        assert_eq!(
            session.handle_shortcut(Key::char('y'), Modifiers::CTRL),
            Some(EditorAction::Redo)
        );
        assert_eq!(session.transform_of(child), Some(at(3.0)));

        session.handle_shortcut(Key::char('e'), Modifiers::NONE);
        assert_eq!(session.transform_mode(), TransformMode::Rotate);
        session.handle_shortcut(Key::Escape, Modifiers::NONE);
        assert_eq!(session.phase(), ControllerPhase::Idle);
    }

    #[test]
    fn test_clear_history_keeps_scene() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        drag(&mut session, at(6.0));

        session.clear_history();
        assert_eq!(session.history_status(), HistoryStatus::default());
        assert_eq!(session.transform_of(child), Some(at(6.0)));
        assert!(!session.undo());
    }

    #[test]
    fn test_reload_resets_state() {
        let (mut session, _, child) = loaded_session();
        session.select(Some(child));
        drag(&mut session, at(6.0));
        session.drag_start();

        let scene = session.unload().unwrap();
        session.load_model(scene);

        assert_eq!(session.phase(), ControllerPhase::Idle);
        assert_eq!(session.history_status().len, 1);
        assert!(session.camera().input_enabled());
        let Some(HistoryEntry::Initial { states }) = session.history().get(0) else {
            panic!("expected initial entry");
        };
        assert!(states.contains(&(child, at(6.0))));
    }

    #[test]
    fn test_filter_debounced_through_tick() {
        let (mut session, _, _) = loaded_session();
        let start = Instant::now();
        assert_eq!(session.filtered_tree()[0].count(), 2);

        session.set_filter_text("child", start);
        session.tick(1.0 / 60.0, start + Duration::from_millis(100));
        assert_eq!(session.filtered_tree()[0].count(), 2);

        session.set_filter_text("nothing-matches", start + Duration::from_millis(150));
        session.tick(1.0 / 60.0, start + Duration::from_millis(400));
        assert_eq!(session.filtered_tree().len(), 1);
        session.tick(1.0 / 60.0, start + Duration::from_millis(450));
        assert!(session.filtered_tree().is_empty());

        session.set_filter(None);
        assert_eq!(session.filtered_tree()[0].count(), 2);
    }

    #[test]
    fn test_material_edits_not_recorded() {
        let (mut session, root, child) = loaded_session();
        assert!(session.set_color(child, Color::new(0.0, 0.5, 1.0)));
        assert!(session.set_opacity(child, 0.25));
        assert!(!session.set_color(root, Color::WHITE));
        assert_eq!(session.history_status().len, 1);

        let material = session.scene().unwrap().material(child).unwrap();
        assert!(material.transparent);
    }

    #[test]
    fn test_focus_selected() {
        let (mut session, _, child) = loaded_session();
        assert!(!session.focus_selected());
        session.select(Some(child));
        assert!(session.focus_selected());
        for _ in 0..150 {
            session.tick(1.0 / 60.0, Instant::now());
        }
        assert!(!session.camera().is_animating());
        assert_eq!(session.camera().target, Vector3::new(1.0, 0.0, 0.0));
    }
}
