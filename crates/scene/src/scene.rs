//! # Scene Collection
//!
//! The scene is the shared container every tracked or spawned entity lives in:
//! joint proxies, environment mesh fragments, interactive volumes and transient
//! effects. Render and physics collaborators read it; the core adds, mutates and
//! removes nodes.
//!
//! ## Key Concepts
//!
//! - **Scene Nodes**: slotmap-keyed nodes forming a parent/child hierarchy under a root
//! - **Kinds**: every node carries a [`NodeKind`], so nothing ever needs to inspect a
//!   node's shape or tags to learn what it is
//! - **Volume registry**: interactive volumes are also indexed in a dedicated registry,
//!   so the touch scan visits only them and never joint proxies or mesh fragments
//! - **Transforms**: each node stores a transform relative to its parent; world
//!   transforms and world bounds are computed by walking up the hierarchy

mod shape;

pub use shape::{Shape, TriangleMesh};

use glam::{Mat4, Vec3};
use handspace_core::{pose, Bounds, Color};
use palette::Srgb;
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::fmt::{self, Display};

slotmap::new_key_type! {
    /// Defines a unique identifier for nodes within the scene.
    pub struct SceneNodeId;
}

impl SceneNodeId {
    /// Converts this scene node id to a [u64]
    pub fn as_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

impl Display for SceneNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u64())
    }
}

/// What a scene node represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Root,
    JointProxy,
    MeshFragment,
    InteractiveVolume,
    EffectsContainer,
    Fireball,
    TrailParticle,
}

/// A single node in the scene hierarchy.
#[derive(Clone, Debug)]
pub struct SceneNode {
    parent: Option<SceneNodeId>,
    children: SmallVec<[SceneNodeId; 8]>,
    kind: NodeKind,
    shape: Option<Shape>,
    /// Transform relative to the parent node.
    transform: Mat4,
    color: Color,
    opacity: f32,
    visible: bool,
    /// World-space velocity handed to the physics collaborator.
    velocity: Vec3,
}

impl SceneNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: SmallVec::new(),
            kind,
            shape: None,
            transform: Mat4::IDENTITY,
            color: Srgb::new(1.0, 1.0, 1.0),
            opacity: 1.0,
            visible: true,
            velocity: Vec3::ZERO,
        }
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_translation(mut self, translation: Vec3) -> Self {
        self.transform = Mat4::from_translation(translation);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn parent(&self) -> Option<SceneNodeId> {
        self.parent
    }

    pub fn children(&self) -> &[SceneNodeId] {
        &self.children
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }
}

/// The shared scene collection.
pub struct SceneGraph {
    root: SceneNodeId,
    nodes: SlotMap<SceneNodeId, SceneNode>,
    /// Insertion-ordered registry of interactive volumes.
    volumes: Vec<SceneNodeId>,
}

impl SceneGraph {
    /// Creates a new, empty scene with a root node
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(SceneNode::new(NodeKind::Root));
        Self {
            root,
            nodes,
            volumes: Vec::new(),
        }
    }

    /// Returns the ID of the root node
    pub fn root(&self) -> SceneNodeId {
        self.root
    }

    /// Inserts `node` directly under the root
    pub fn add(&mut self, node: SceneNode) -> SceneNodeId {
        self.attach(self.root, node)
    }

    /// Inserts `node` as a child of `parent` (the root when `None`)
    ///
    /// Returns `None` if the parent does not exist.
    pub fn insert(&mut self, parent: Option<SceneNodeId>, node: SceneNode) -> Option<SceneNodeId> {
        let parent_id = parent.unwrap_or(self.root);
        if !self.nodes.contains_key(parent_id) {
            return None;
        }
        Some(self.attach(parent_id, node))
    }

    fn attach(&mut self, parent_id: SceneNodeId, mut node: SceneNode) -> SceneNodeId {
        node.parent = Some(parent_id);
        node.children.clear();
        let kind = node.kind;
        let node_id = self.nodes.insert(node);

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(node_id);
        }

        if kind == NodeKind::InteractiveVolume {
            self.volumes.push(node_id);
        }

        node_id
    }

    /// Moves an existing node under another node
    ///
    /// The node's stored transform is kept as-is, so it is reinterpreted relative to
    /// the new parent. Use [`SceneGraph::reparent_keep_world`] to preserve placement.
    pub fn add_child(&mut self, parent_id: SceneNodeId, child_id: SceneNodeId) -> bool {
        if !self.nodes.contains_key(parent_id) || !self.nodes.contains_key(child_id) {
            return false;
        }

        if child_id == self.root || self.is_ancestor(child_id, parent_id) {
            return false;
        }

        if let Some(old_parent_id) = self.nodes.get(child_id).and_then(|node| node.parent) {
            if let Some(old_parent) = self.nodes.get_mut(old_parent_id) {
                old_parent.children.retain(|id| *id != child_id);
            }
        }

        if let Some(child) = self.nodes.get_mut(child_id) {
            child.parent = Some(parent_id);
        }

        if let Some(parent) = self.nodes.get_mut(parent_id) {
            parent.children.push(child_id);
        }

        true
    }

    /// Moves a node under `parent_id` while keeping its world transform unchanged
    pub fn reparent_keep_world(&mut self, parent_id: SceneNodeId, child_id: SceneNodeId) -> bool {
        let (Some(child_world), Some(parent_world)) =
            (self.world_transform(child_id), self.world_transform(parent_id))
        else {
            return false;
        };

        if !self.add_child(parent_id, child_id) {
            return false;
        }

        let local = parent_world.inverse() * child_world;
        self.set_transform(child_id, local)
    }

    /// Removes a node and all its children from the scene
    ///
    /// Returns `false` if the node was already gone or is the root.
    pub fn remove_node(&mut self, node_id: SceneNodeId) -> bool {
        if node_id == self.root || !self.nodes.contains_key(node_id) {
            return false;
        }

        if let Some(parent_id) = self.nodes.get(node_id).and_then(|node| node.parent) {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.retain(|id| *id != node_id);
            }
        }

        self.remove_subtree(node_id);
        true
    }

    fn remove_subtree(&mut self, node_id: SceneNodeId) {
        if let Some(node) = self.nodes.remove(node_id) {
            if node.kind == NodeKind::InteractiveVolume {
                self.volumes.retain(|id| *id != node_id);
            }
            for child_id in node.children {
                self.remove_subtree(child_id);
            }
        }
    }

    /// Get a reference to a node by its ID
    pub fn get_node(&self, node_id: SceneNodeId) -> Option<&SceneNode> {
        self.nodes.get(node_id)
    }

    pub fn contains(&self, node_id: SceneNodeId) -> bool {
        self.nodes.contains_key(node_id)
    }

    /// Number of nodes, excluding the root
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of nodes of the given kind
    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.nodes.values().filter(|node| node.kind == kind).count()
    }

    /// Gets the children of a scene node
    pub fn get_children(&self, node_id: SceneNodeId) -> Vec<SceneNodeId> {
        self.nodes
            .get(node_id)
            .map(|node| node.children.to_vec())
            .unwrap_or_default()
    }

    /// The registered interactive volumes, in insertion order
    pub fn interactive_volumes(&self) -> &[SceneNodeId] {
        &self.volumes
    }

    pub fn set_transform(&mut self, node_id: SceneNodeId, transform: Mat4) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    pub fn set_shape(&mut self, node_id: SceneNodeId, shape: Shape) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.shape = Some(shape);
                true
            }
            None => false,
        }
    }

    pub fn set_color(&mut self, node_id: SceneNodeId, color: Color) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.color = color;
                true
            }
            None => false,
        }
    }

    pub fn set_opacity(&mut self, node_id: SceneNodeId, opacity: f32) -> bool {
        match self.nodes.get_mut(node_id) {
            Some(node) => {
                node.opacity = opacity.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }

    /// World transform of a node, composed from the root down
    pub fn world_transform(&self, node_id: SceneNodeId) -> Option<Mat4> {
        let node = self.nodes.get(node_id)?;
        match node.parent {
            Some(parent_id) => {
                let parent_world = self.world_transform(parent_id).unwrap_or(Mat4::IDENTITY);
                Some(pose::compose(&parent_world, &node.transform))
            }
            None => Some(node.transform),
        }
    }

    pub fn world_position(&self, node_id: SceneNodeId) -> Option<Vec3> {
        self.world_transform(node_id).map(|world| pose::translation(&world))
    }

    /// World-space axis-aligned bounds of a node's shape
    ///
    /// Returns `None` for missing nodes and nodes without a shape.
    pub fn world_bounds(&self, node_id: SceneNodeId) -> Option<Bounds> {
        let local = self.nodes.get(node_id)?.shape.as_ref()?.local_bounds();
        let world = self.world_transform(node_id)?;
        Some(local.transformed(&world))
    }

    /// Determines if a node is an ancestor of another node in the hierarchy
    ///
    /// Walks the parent chain of `descendant_id` iteratively.
    fn is_ancestor(&self, node_id: SceneNodeId, descendant_id: SceneNodeId) -> bool {
        let mut current = Some(descendant_id);
        while let Some(id) = current {
            if id == node_id {
                return true;
            }
            current = self.nodes.get(id).and_then(|node| node.parent);
        }
        false
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_creation() {
        let graph = SceneGraph::new();

        assert!(graph.get_node(graph.root()).is_some());
        assert!(graph.get_node(graph.root()).unwrap().parent.is_none());
        assert!(graph.get_node(graph.root()).unwrap().children.is_empty());
        assert!(graph.is_empty());
    }

    #[test]
    fn test_insert_node() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let node1 = graph.insert(None, SceneNode::new(NodeKind::JointProxy)).unwrap();
        let node2 = graph.insert(Some(node1), SceneNode::new(NodeKind::TrailParticle)).unwrap();

        assert_eq!(graph.get_node(node1).unwrap().parent, Some(root));
        assert_eq!(graph.get_node(node2).unwrap().parent, Some(node1));
        assert!(graph.get_node(root).unwrap().children.contains(&node1));
        assert!(graph.get_node(node1).unwrap().children.contains(&node2));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_insert_under_missing_parent() {
        let mut graph = SceneGraph::new();
        let node = graph.insert(None, SceneNode::new(NodeKind::Fireball)).unwrap();
        graph.remove_node(node);
        assert!(graph.insert(Some(node), SceneNode::new(NodeKind::TrailParticle)).is_none());
    }

    #[test]
    fn test_remove_node_removes_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.root();

        let node1 = graph.insert(None, SceneNode::new(NodeKind::Fireball)).unwrap();
        let node2 = graph.insert(Some(node1), SceneNode::new(NodeKind::TrailParticle)).unwrap();

        assert!(graph.remove_node(node1));

        assert!(!graph.get_node(root).unwrap().children.contains(&node1));
        assert!(graph.get_node(node1).is_none());
        assert!(graph.get_node(node2).is_none());
        assert!(!graph.remove_node(node1));
        assert!(!graph.remove_node(root));
    }

    #[test]
    fn test_cannot_create_cycle() {
        let mut graph = SceneGraph::new();

        let node1 = graph.insert(None, SceneNode::new(NodeKind::Fireball)).unwrap();
        let node2 = graph.insert(Some(node1), SceneNode::new(NodeKind::Fireball)).unwrap();
        let node3 = graph.insert(Some(node2), SceneNode::new(NodeKind::Fireball)).unwrap();

        assert!(!graph.add_child(node3, node1));

        assert_eq!(graph.get_node(node1).unwrap().parent, Some(graph.root()));
        assert_eq!(graph.get_node(node2).unwrap().parent, Some(node1));
        assert_eq!(graph.get_node(node3).unwrap().parent, Some(node2));
    }

    #[test]
    fn test_volume_registry_tracks_only_volumes() {
        let mut graph = SceneGraph::new();
        let proxy = graph
            .insert(None, SceneNode::new(NodeKind::JointProxy).with_shape(Shape::sphere(0.01)))
            .unwrap();
        let cube = graph
            .insert(None, SceneNode::new(NodeKind::InteractiveVolume).with_shape(Shape::cube(0.2)))
            .unwrap();
        let fragment = graph.insert(None, SceneNode::new(NodeKind::MeshFragment)).unwrap();

        assert_eq!(graph.interactive_volumes(), &[cube]);
        assert_eq!(graph.count_of(NodeKind::JointProxy), 1);

        graph.remove_node(cube);
        assert!(graph.interactive_volumes().is_empty());
        assert!(graph.contains(proxy));
        assert!(graph.contains(fragment));
    }

    #[test]
    fn test_world_transform_composes_parents() {
        let mut graph = SceneGraph::new();
        let parent = graph
            .insert(None, SceneNode::new(NodeKind::Fireball).with_translation(Vec3::new(1.0, 0.0, 0.0)))
            .unwrap();
        let child = graph
            .insert(
                Some(parent),
                SceneNode::new(NodeKind::TrailParticle).with_translation(Vec3::new(0.0, 2.0, 0.0)),
            )
            .unwrap();

        assert_eq!(graph.world_position(child), Some(Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_reparent_keep_world() {
        let mut graph = SceneGraph::new();
        let container = graph
            .insert(None, SceneNode::new(NodeKind::EffectsContainer))
            .unwrap();
        let parent = graph
            .insert(
                Some(container),
                SceneNode::new(NodeKind::Fireball).with_translation(Vec3::new(1.0, 1.0, 1.0)),
            )
            .unwrap();
        let child = graph
            .insert(
                Some(parent),
                SceneNode::new(NodeKind::TrailParticle).with_translation(Vec3::new(0.0, 0.0, 0.5)),
            )
            .unwrap();

        assert!(graph.reparent_keep_world(container, child));
        assert_eq!(graph.get_node(child).unwrap().parent(), Some(container));
        let world = graph.world_position(child).unwrap();
        assert!((world - Vec3::new(1.0, 1.0, 1.5)).length() < 1e-6);

        graph.remove_node(parent);
        assert!(graph.contains(child));
    }

    #[test]
    fn test_world_bounds() {
        let mut graph = SceneGraph::new();
        let cube = graph
            .insert(
                None,
                SceneNode::new(NodeKind::InteractiveVolume)
                    .with_shape(Shape::cube(0.2))
                    .with_translation(Vec3::new(0.0, 1.0, -0.5)),
            )
            .unwrap();
        let bare = graph.insert(None, SceneNode::new(NodeKind::Fireball)).unwrap();

        let bounds = graph.world_bounds(cube).unwrap();
        assert!((bounds.min - Vec3::new(-0.1, 0.9, -0.6)).length() < 1e-6);
        assert!((bounds.max - Vec3::new(0.1, 1.1, -0.4)).length() < 1e-6);
        assert!(graph.world_bounds(bare).is_none());
    }

    #[test]
    fn test_setters_on_missing_node() {
        let mut graph = SceneGraph::new();
        let node = graph.insert(None, SceneNode::new(NodeKind::TrailParticle)).unwrap();
        graph.remove_node(node);

        assert!(!graph.set_transform(node, Mat4::IDENTITY));
        assert!(!graph.set_color(node, Srgb::new(0.0, 0.0, 0.0)));
        assert!(!graph.set_opacity(node, 0.5));
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut graph = SceneGraph::new();
        let node = graph.insert(None, SceneNode::new(NodeKind::TrailParticle)).unwrap();
        graph.set_opacity(node, -0.2);
        assert_eq!(graph.get_node(node).unwrap().opacity(), 0.0);
    }

    #[test]
    fn test_node_visibility() {
        let mut graph = SceneGraph::new();
        let shown = graph.insert(None, SceneNode::new(NodeKind::JointProxy)).unwrap();
        let hidden = graph
            .insert(None, SceneNode::new(NodeKind::JointProxy).with_visible(false))
            .unwrap();

        assert!(graph.get_node(shown).unwrap().is_visible());
        assert!(!graph.get_node(hidden).unwrap().is_visible());
    }
}
