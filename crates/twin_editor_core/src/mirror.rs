// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene graph mirror.
//!
//! A serializable tree that shadows the live scene for the hierarchy panel,
//! plus id-based lookup back into the live scene. The mirror is built once
//! per model load and afterwards only patched through [`set_visibility`].

use crate::live::{NodeCapabilities, NodeId, SceneGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Display type of a mirrored node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Scene root
    Scene,
    /// Group of objects
    Collection,
    /// Renderable mesh
    Mesh,
    /// Light source
    Light,
    /// Camera
    Camera,
    /// Generic object with a transform
    Object,
    /// Anything else
    Unknown,
}

impl NodeType {
    /// Classify a node; the first matching capability wins
    pub fn from_capabilities(caps: &NodeCapabilities) -> Self {
        if caps.scene {
            Self::Scene
        } else if caps.group {
            Self::Collection
        } else if caps.mesh {
            Self::Mesh
        } else if caps.light {
            Self::Light
        } else if caps.camera {
            Self::Camera
        } else if caps.object3d {
            Self::Object
        } else {
            Self::Unknown
        }
    }

    /// Lowercase name of this type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Scene => "scene",
            Self::Collection => "collection",
            Self::Mesh => "mesh",
            Self::Light => "light",
            Self::Camera => "camera",
            Self::Object => "object",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a type name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "scene" => Some(Self::Scene),
            "collection" | "group" => Some(Self::Collection),
            "mesh" => Some(Self::Mesh),
            "light" => Some(Self::Light),
            "camera" => Some(Self::Camera),
            "object" => Some(Self::Object),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

/// Serializable mirror of one live node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    /// Stable id of the live node
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Display type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Visibility flag
    pub visible: bool,
    /// Render toggle shown in the tree view
    pub renderable: bool,
    /// Node carries geometry, material or user data
    pub has_modifiers: bool,
    /// Children in live order
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Find a node in this subtree
    pub fn find(&self, id: NodeId) -> Option<&SceneNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Number of nodes in this subtree
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::count).sum::<usize>()
    }
}

/// Build the mirror by depth-first pre-order traversal from the live root.
///
/// Returns an empty list before a model has loaded. Nodes reached a second
/// time and dangling child links are omitted.
pub fn build<S: SceneGraph + ?Sized>(scene: &S) -> Vec<SceneNode> {
    let Some(root) = scene.root() else {
        return Vec::new();
    };

    // Pre-order walk with an explicit stack; each entry remembers the index
    // of its parent in `order`.
    let mut visited = HashSet::new();
    let mut order: Vec<(Option<usize>, SceneNode)> = Vec::new();
    let mut stack = vec![(root, None)];
    while let Some((id, parent)) = stack.pop() {
        if !visited.insert(id) {
            tracing::trace!("Skipping revisited node {id}");
            continue;
        }
        let Some(caps) = scene.capabilities(id) else {
            continue;
        };
        let index = order.len();
        order.push((parent, mirror_node(scene, id, &caps)));
        stack.extend(
            scene
                .children(id)
                .iter()
                .rev()
                .map(|child| (*child, Some(index))),
        );
    }

    // Descendants always follow their parent in pre-order, so folding from
    // the back completes every subtree before it is attached.
    let mut roots = Vec::new();
    while let Some((parent, mut node)) = order.pop() {
        node.children.reverse();
        match parent.and_then(|index| order.get_mut(index)) {
            Some((_, parent_node)) => parent_node.children.push(node),
            None => roots.push(node),
        }
    }
    roots
}

fn mirror_node<S: SceneGraph + ?Sized>(
    scene: &S,
    id: NodeId,
    caps: &NodeCapabilities,
) -> SceneNode {
    let name = match scene.name(id) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => "Unnamed".to_string(),
    };

    SceneNode {
        id,
        name,
        node_type: NodeType::from_capabilities(caps),
        visible: scene.is_visible(id).unwrap_or(true),
        renderable: true,
        has_modifiers: caps.geometry || caps.material || caps.user_data,
        children: Vec::new(),
    }
}

/// Depth-first search of the live scene for `id`.
///
/// Returns `None` before a model has loaded or when the id is absent.
pub fn find_by_id<S: SceneGraph + ?Sized>(scene: &S, id: NodeId) -> Option<NodeId> {
    let root = scene.root()?;
    let mut visited = HashSet::new();
    let mut stack = vec![root];

    while let Some(current) = stack.pop() {
        if !visited.insert(current) {
            continue;
        }
        if current == id && scene.contains(current) {
            return Some(current);
        }
        stack.extend(scene.children(current).iter().rev().copied());
    }
    None
}

/// Set the visibility of `id` in both the live scene and a copy of the mirror.
///
/// Returns the updated mirror, or `None` (with nothing written) when either
/// side does not know the node or the live scene refuses the change.
pub fn set_visibility<S: SceneGraph + ?Sized>(
    mirror: &[SceneNode],
    scene: &mut S,
    id: NodeId,
    visible: bool,
) -> Option<Vec<SceneNode>> {
    if !mirror.iter().any(|node| node.find(id).is_some()) {
        tracing::debug!("Visibility change skipped, {id} is not mirrored");
        return None;
    }
    let Some(live) = find_by_id(scene, id) else {
        tracing::debug!("Visibility change skipped, {id} not in live scene");
        return None;
    };

    if !scene.set_visible(live, visible) {
        tracing::debug!("Visibility change skipped, live scene refused {id}");
        return None;
    }
    let mut updated = mirror.to_vec();
    patch_visibility(&mut updated, id, visible);
    Some(updated)
}

fn patch_visibility(nodes: &mut [SceneNode], id: NodeId, visible: bool) -> bool {
    for node in nodes {
        if node.id == id {
            node.visible = visible;
            return true;
        }
        if patch_visibility(&mut node.children, id, visible) {
            return true;
        }
    }
    false
}

/// Cached mirror owned by the editor session
#[derive(Debug, Clone, Default, Serialize)]
pub struct SceneMirror {
    roots: Vec<SceneNode>,
    #[serde(skip)]
    generation: u64,
}

impl SceneMirror {
    /// Create an empty mirror
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from the live scene (once per model load)
    pub fn rebuild<S: SceneGraph + ?Sized>(&mut self, scene: &S) {
        self.roots = build(scene);
        self.generation += 1;
        tracing::info!(
            "Built scene mirror with {} nodes (generation {})",
            self.len(),
            self.generation
        );
    }

    /// Drop all mirrored nodes
    pub fn clear(&mut self) {
        self.roots.clear();
        self.generation += 1;
    }

    /// Top-level mirrored nodes
    pub fn roots(&self) -> &[SceneNode] {
        &self.roots
    }

    /// Find a mirrored node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.roots.iter().find_map(|node| node.find(id))
    }

    /// Total number of mirrored nodes
    pub fn len(&self) -> usize {
        self.roots.iter().map(SceneNode::count).sum()
    }

    /// Whether nothing is mirrored
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Incremented on every rebuild or visibility patch
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Change visibility in the live scene and the mirror together
    pub fn set_visibility<S: SceneGraph + ?Sized>(
        &mut self,
        scene: &mut S,
        id: NodeId,
        visible: bool,
    ) -> bool {
        match set_visibility(&self.roots, scene, id, visible) {
            Some(updated) => {
                self.roots = updated;
                self.generation += 1;
                tracing::debug!("Set visibility of {id} to {visible}");
                true
            }
            None => false,
        }
    }

    /// Serialize the mirror for UI consumers
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.roots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryScene, NodeKind};

    fn data_hall() -> (MemoryScene, NodeId, NodeId, NodeId) {
        let mut scene = MemoryScene::new();
        let root = scene.add(None, "DataHall", NodeKind::Scene).unwrap();
        let row = scene.add(Some(root), "RackRow", NodeKind::Group).unwrap();
        let rack = scene.add(Some(row), "Rack01", NodeKind::Mesh).unwrap();
        scene.add(Some(root), "Sun", NodeKind::Light).unwrap();
        scene.add(Some(root), "Overview", NodeKind::Camera).unwrap();
        scene.add(Some(root), "", NodeKind::Object).unwrap();
        scene.add(Some(root), "Marker", NodeKind::Unknown).unwrap();
        (scene, root, row, rack)
    }

    #[test]
    fn test_build_types_and_order() {
        let (scene, root, row, rack) = data_hall();
        let mirror = build(&scene);

        assert_eq!(mirror.len(), 1);
        let hall = &mirror[0];
        assert_eq!(hall.id, root);
        assert_eq!(hall.node_type, NodeType::Scene);
        assert_eq!(hall.count(), 7);

        let types: Vec<_> = hall.children.iter().map(|n| n.node_type).collect();
        assert_eq!(
            types,
            vec![
                NodeType::Collection,
                NodeType::Light,
                NodeType::Camera,
                NodeType::Object,
                NodeType::Unknown
            ]
        );
        assert_eq!(hall.children[0].id, row);
        assert_eq!(hall.children[0].children[0].id, rack);
        assert_eq!(hall.children[3].name, "Unnamed");
    }

    #[test]
    fn test_has_modifiers() {
        let (mut scene, root, row, rack) = data_hall();
        scene.set_user_data(row, true);
        let mirror = build(&scene);
        let hall = &mirror[0];

        assert!(!hall.has_modifiers);
        assert!(hall.find(row).unwrap().has_modifiers);
        assert!(hall.find(rack).unwrap().has_modifiers);
        assert_eq!(hall.id, root);
    }

    #[test]
    fn test_build_before_load_is_empty() {
        let scene = MemoryScene::new();
        assert!(build(&scene).is_empty());
        assert_eq!(find_by_id(&scene, NodeId::new()), None);
    }

    #[test]
    fn test_traversal_survives_cycles() {
        let (mut scene, root, row, rack) = data_hall();
        assert!(scene.attach(rack, root));
        assert!(scene.attach(rack, row));
        assert!(scene.attach(row, NodeId::new()));

        let mirror = build(&scene);
        assert_eq!(mirror[0].count(), 7);
        assert_eq!(find_by_id(&scene, rack), Some(rack));
        assert_eq!(find_by_id(&scene, NodeId::new()), None);
    }

    #[test]
    fn test_deep_chain_builds_in_order() {
        let mut scene = MemoryScene::new();
        let mut parent = scene.add(None, "DataHall", NodeKind::Scene).unwrap();
        for depth in 0..2_000 {
            parent = scene
                .add(Some(parent), format!("Level{depth}"), NodeKind::Group)
                .unwrap();
        }
        scene.attach(parent, NodeId::new());

        let mirror = build(&scene);
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror[0].count(), 2_001);
        assert_eq!(mirror[0].children[0].name, "Level0");
        assert!(mirror[0].find(parent).unwrap().children.is_empty());
    }

    #[test]
    fn test_visibility_dual_write() {
        let (mut scene, _, _, rack) = data_hall();
        let mirror = build(&scene);

        let updated = set_visibility(&mirror, &mut scene, rack, false).unwrap();
        let live = find_by_id(&scene, rack).unwrap();
        assert_eq!(scene.is_visible(live), Some(false));
        assert!(!updated[0].find(rack).unwrap().visible);
        // the input mirror is left untouched
        assert!(mirror[0].find(rack).unwrap().visible);
    }

    #[test]
    fn test_visibility_requires_both_sides() {
        let (mut scene, _, _, rack) = data_hall();
        let mirror = build(&scene);

        let mut other = MemoryScene::new();
        other.add(None, "Empty", NodeKind::Scene).unwrap();
        assert!(set_visibility(&mirror, &mut other, rack, false).is_none());

        assert!(set_visibility(&[], &mut scene, rack, false).is_none());
        assert_eq!(scene.is_visible(rack), Some(true));
    }

    #[test]
    fn test_cached_mirror() {
        let (mut scene, _, row, _) = data_hall();
        let mut mirror = SceneMirror::new();
        mirror.rebuild(&scene);
        let generation = mirror.generation();

        assert_eq!(mirror.len(), 7);
        assert!(mirror.set_visibility(&mut scene, row, false));
        assert!(!mirror.get(row).unwrap().visible);
        assert_eq!(mirror.generation(), generation + 1);

        let json = mirror.to_json().unwrap();
        assert!(json.contains("\"type\":\"collection\""));
        assert!(json.contains("\"hasModifiers\""));
    }
}
