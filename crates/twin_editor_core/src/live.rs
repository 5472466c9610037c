// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live scene capability.
//!
//! The 3D engine owns the real scene graph. The editor only sees it through
//! [`SceneGraph`], a handle-based view: every node is addressed by its stable
//! [`NodeId`] and every accessor tolerates unknown ids.

use crate::material::MaterialProps;
use crate::transform::TransformSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stable identifier of a live scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Capability flags the engine exposes for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeCapabilities {
    /// Node is a scene root
    pub scene: bool,
    /// Node is a group / collection
    pub group: bool,
    /// Node is a renderable mesh
    pub mesh: bool,
    /// Node is a light
    pub light: bool,
    /// Node is a camera
    pub camera: bool,
    /// Node carries a position/rotation/scale transform
    pub object3d: bool,
    /// Node has geometry attached
    pub geometry: bool,
    /// Node has a material attached
    pub material: bool,
    /// Node has arbitrary user data attached
    pub user_data: bool,
}

/// Read/write view of the engine's live scene graph.
///
/// Accessors return `None` (or an empty slice) for ids the scene does not
/// contain; setters return `false` in that case.
pub trait SceneGraph {
    /// Root node, `None` until a model has loaded
    fn root(&self) -> Option<NodeId>;

    /// Display name of a node
    fn name(&self, id: NodeId) -> Option<&str>;

    /// Ordered child links of a node
    fn children(&self, id: NodeId) -> &[NodeId];

    /// Capability flags of a node
    fn capabilities(&self, id: NodeId) -> Option<NodeCapabilities>;

    /// Visibility flag of a node
    fn is_visible(&self, id: NodeId) -> Option<bool>;

    /// Set the visibility flag of a node
    fn set_visible(&mut self, id: NodeId, visible: bool) -> bool;

    /// Current transform, `None` for nodes without one
    fn transform(&self, id: NodeId) -> Option<TransformSnapshot>;

    /// Overwrite the transform of a node
    fn set_transform(&mut self, id: NodeId, transform: &TransformSnapshot) -> bool;

    /// Material of the primary slot, `None` for nodes without a material
    fn material(&self, id: NodeId) -> Option<MaterialProps>;

    /// Apply `edit` to every material slot of a node.
    ///
    /// Multi-material meshes hold one slot per sub-mesh; all of them receive
    /// the edit. Returns `false` when the node has no material.
    fn edit_materials(&mut self, id: NodeId, edit: &mut dyn FnMut(&mut MaterialProps)) -> bool;

    /// Whether the scene holds a node with this id
    fn contains(&self, id: NodeId) -> bool {
        self.capabilities(id).is_some()
    }
}

/// Pointer-ray intersection query provided by the renderer
pub trait Picker {
    /// Topmost node under the pointer (viewport coordinates), if any
    fn pick(&self, pointer: [f32; 2]) -> Option<NodeId>;
}

impl<F> Picker for F
where
    F: Fn([f32; 2]) -> Option<NodeId>,
{
    fn pick(&self, pointer: [f32; 2]) -> Option<NodeId> {
        self(pointer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_serializes_as_uuid_string() {
        let id = NodeId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id));
        let back: NodeId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_closure_picker() {
        let target = NodeId::new();
        let picker = move |pointer: [f32; 2]| (pointer[0] > 0.5).then_some(target);
        assert_eq!(picker.pick([0.75, 0.0]), Some(target));
        assert_eq!(picker.pick([0.25, 0.0]), None);
    }
}
