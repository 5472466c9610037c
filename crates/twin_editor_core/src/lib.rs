// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene editing state for the data-center twin editor.
//!
//! This crate owns everything the editor knows about a loaded model apart
//! from rendering:
//! - A serializable mirror of the live scene graph for the hierarchy panel
//! - Selection and the transform gizmo's drag lifecycle
//! - Bounded undo/redo history of transform edits
//! - Material colour and opacity edits
//! - Viewport camera and gizmo animation state
//! - Keyboard shortcuts
//!
//! ## Architecture
//!
//! The 3D engine is reached only through the [`SceneGraph`] and [`Picker`]
//! traits, addressed by [`NodeId`]. [`EditorSession`] ties the pieces
//! together and is the single mutation path for UI code. [`MemoryScene`]
//! implements the engine side for tests and headless use.

pub mod config;
pub mod filter;
pub mod history;
pub mod live;
pub mod material;
pub mod memory;
pub mod mirror;
pub mod selection;
pub mod session;
pub mod shortcuts;
pub mod tools;
pub mod transform;

pub use config::{CameraConfig, ConfigError, EditorConfig, GizmoConfig};
pub use filter::{filter_tree, Debouncer, FilterState, TreeFilter};
pub use history::{History, HistoryEntry, HistoryStatus};
pub use live::{NodeCapabilities, NodeId, Picker, SceneGraph};
pub use material::{Color, ColorParseError, MaterialProps};
pub use memory::{MemoryScene, NodeDescription, NodeKind, SceneDescription, SceneError};
pub use mirror::{NodeType, SceneMirror, SceneNode};
pub use selection::{ControllerPhase, SelectionState, TransformController, TransformFields};
pub use session::EditorSession;
pub use shortcuts::{EditorAction, Key, Modifiers, Shortcut, ShortcutRegistry};
pub use tools::{EditorCamera, GizmoAnimator, TransformMode};
pub use transform::{Axis, TransformField, TransformSnapshot, Vector3};
