// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory live scene.
//!
//! [`MemoryScene`] stands in for the 3D engine's object model when the editor
//! runs headless: it implements [`SceneGraph`] over an `IndexMap` of nodes and
//! can be built from a nested [`SceneDescription`] (usually RON).

use crate::live::{NodeCapabilities, NodeId, SceneGraph};
use crate::material::MaterialProps;
use crate::transform::TransformSnapshot;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors building an in-memory scene
#[derive(Debug, Error)]
pub enum SceneError {
    /// Two nodes share an explicit id
    #[error("Duplicate node id: {0}")]
    DuplicateId(NodeId),

    /// Parent id does not exist
    #[error("Unknown parent node: {0}")]
    UnknownParent(NodeId),

    /// A second root was added
    #[error("Scene already has a root node")]
    RootAlreadySet,

    /// Description file could not be read
    #[error("File read error: {0}")]
    Io(#[from] std::io::Error),

    /// Description could not be parsed
    #[error("Scene description parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
}

/// Kind of engine object a node represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NodeKind {
    /// Scene root
    Scene,
    /// Group of child objects
    Group,
    /// Renderable mesh with geometry and material
    Mesh,
    /// Light source
    Light,
    /// Camera
    Camera,
    /// Plain transformable object
    #[default]
    Object,
    /// Node without a transform or any known capability
    Unknown,
}

impl NodeKind {
    /// Capability flags an engine node of this kind exposes
    pub fn capabilities(&self) -> NodeCapabilities {
        let transformable = NodeCapabilities {
            object3d: true,
            ..Default::default()
        };
        match self {
            Self::Scene => NodeCapabilities {
                scene: true,
                ..transformable
            },
            Self::Group => NodeCapabilities {
                group: true,
                ..transformable
            },
            Self::Mesh => NodeCapabilities {
                mesh: true,
                geometry: true,
                material: true,
                ..transformable
            },
            Self::Light => NodeCapabilities {
                light: true,
                ..transformable
            },
            Self::Camera => NodeCapabilities {
                camera: true,
                ..transformable
            },
            Self::Object => transformable,
            Self::Unknown => NodeCapabilities::default(),
        }
    }
}

fn default_visible() -> bool {
    true
}

/// Nested description of one node and its subtree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDescription {
    /// Display name
    pub name: String,
    /// Engine object kind
    #[serde(default)]
    pub kind: NodeKind,
    /// Explicit id; a random one is assigned when absent
    #[serde(default)]
    pub id: Option<NodeId>,
    /// Initial transform
    #[serde(default)]
    pub transform: TransformSnapshot,
    /// Initial visibility
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Material slots, one per sub-mesh (meshes get one default slot when empty)
    #[serde(default)]
    pub materials: Vec<MaterialProps>,
    /// Arbitrary user data
    #[serde(default)]
    pub user_data: IndexMap<String, String>,
    /// Child nodes
    #[serde(default)]
    pub children: Vec<NodeDescription>,
}

impl NodeDescription {
    /// Create a description with defaults
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            id: None,
            transform: TransformSnapshot::default(),
            visible: true,
            materials: Vec::new(),
            user_data: IndexMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: set the initial transform
    pub fn with_transform(mut self, transform: TransformSnapshot) -> Self {
        self.transform = transform;
        self
    }

    /// Builder: append a child
    pub fn with_child(mut self, child: NodeDescription) -> Self {
        self.children.push(child);
        self
    }
}

/// Description of a whole scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneDescription {
    /// Root node
    pub root: NodeDescription,
}

impl SceneDescription {
    /// Parse a RON description
    pub fn from_ron(source: &str) -> Result<Self, SceneError> {
        Ok(ron::from_str(source)?)
    }

    /// Read and parse a RON description file
    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }
}

#[derive(Debug, Clone)]
struct LiveNode {
    name: String,
    capabilities: NodeCapabilities,
    visible: bool,
    transform: Option<TransformSnapshot>,
    materials: Vec<MaterialProps>,
    children: Vec<NodeId>,
}

/// `IndexMap`-backed implementation of [`SceneGraph`]
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    nodes: IndexMap<NodeId, LiveNode>,
    root: Option<NodeId>,
}

impl MemoryScene {
    /// Create an empty scene with no root
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from a nested description
    pub fn from_description(description: &SceneDescription) -> Result<Self, SceneError> {
        let mut scene = Self::new();
        scene.insert_description(None, &description.root)?;
        tracing::debug!("Built in-memory scene with {} nodes", scene.len());
        Ok(scene)
    }

    fn insert_description(
        &mut self,
        parent: Option<NodeId>,
        description: &NodeDescription,
    ) -> Result<NodeId, SceneError> {
        let id = description.id.unwrap_or_default();
        let mut capabilities = description.kind.capabilities();
        capabilities.user_data = !description.user_data.is_empty();
        let mut materials = description.materials.clone();
        if materials.is_empty() && capabilities.material {
            materials.push(MaterialProps::default());
        }
        capabilities.material = !materials.is_empty();

        let node = LiveNode {
            name: description.name.clone(),
            capabilities,
            visible: description.visible,
            transform: capabilities.object3d.then_some(description.transform),
            materials,
            children: Vec::new(),
        };
        self.insert(parent, id, node)?;

        for child in &description.children {
            self.insert_description(Some(id), child)?;
        }
        Ok(id)
    }

    fn insert(
        &mut self,
        parent: Option<NodeId>,
        id: NodeId,
        node: LiveNode,
    ) -> Result<(), SceneError> {
        if self.nodes.contains_key(&id) {
            return Err(SceneError::DuplicateId(id));
        }

        match parent {
            Some(parent_id) => {
                let parent = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or(SceneError::UnknownParent(parent_id))?;
                parent.children.push(id);
            }
            None if self.root.is_some() => return Err(SceneError::RootAlreadySet),
            None => self.root = Some(id),
        }

        self.nodes.insert(id, node);
        Ok(())
    }

    /// Add a node with default transform under `parent` (or as the root)
    pub fn add(
        &mut self,
        parent: Option<NodeId>,
        name: impl Into<String>,
        kind: NodeKind,
    ) -> Result<NodeId, SceneError> {
        self.insert_description(parent, &NodeDescription::new(name, kind))
    }

    /// Add an extra child link from `parent` to an existing node.
    ///
    /// Engine graphs may reference one object from several places; traversal
    /// code must cope with that.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        match self.nodes.get_mut(&parent) {
            Some(node) => {
                node.children.push(child);
                true
            }
            None => false,
        }
    }

    /// Mark a node as carrying user data
    pub fn set_user_data(&mut self, id: NodeId, present: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.capabilities.user_data = present;
                true
            }
            None => false,
        }
    }

    /// Every material slot of a node, empty when it has none
    pub fn materials(&self, id: NodeId) -> &[MaterialProps] {
        self.nodes
            .get(&id)
            .map(|node| node.materials.as_slice())
            .unwrap_or_default()
    }

    /// First node (in insertion order) with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, node)| node.name == name)
            .map(|(id, _)| *id)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl SceneGraph for MemoryScene {
    fn root(&self) -> Option<NodeId> {
        self.root
    }

    fn name(&self, id: NodeId) -> Option<&str> {
        self.nodes.get(&id).map(|node| node.name.as_str())
    }

    fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn capabilities(&self, id: NodeId) -> Option<NodeCapabilities> {
        self.nodes.get(&id).map(|node| node.capabilities)
    }

    fn is_visible(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|node| node.visible)
    }

    fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    fn transform(&self, id: NodeId) -> Option<TransformSnapshot> {
        self.nodes.get(&id).and_then(|node| node.transform)
    }

    fn set_transform(&mut self, id: NodeId, transform: &TransformSnapshot) -> bool {
        match self.nodes.get_mut(&id) {
            Some(LiveNode {
                transform: Some(current),
                ..
            }) => {
                *current = *transform;
                true
            }
            _ => false,
        }
    }

    fn material(&self, id: NodeId) -> Option<MaterialProps> {
        self.materials(id).first().copied()
    }

    fn edit_materials(&mut self, id: NodeId, edit: &mut dyn FnMut(&mut MaterialProps)) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if !node.materials.is_empty() => {
                node.materials.iter_mut().for_each(edit);
                true
            }
            _ => false,
        }
    }
}
