//! Mesh anchor store.
//!
//! Reconciles the environment's add/update/remove stream of mesh fragments against a
//! live, id-keyed store whose entries are mirrored as scene nodes. Adding a known id
//! or updating an unknown one means the source has desynchronized and is reported
//! as a fatal [`MeshStoreError`]. Removing an unknown id is a no-op. Geometry that
//! cannot be turned into a shape drops that one event and leaves prior state alone.

mod fragment_id;
mod shape;

pub use fragment_id::FragmentId;
pub use shape::{generate_shape, MeshGeometry, MeshShapeError};

use glam::Mat4;
use scene::{NodeKind, SceneGraph, SceneNode, SceneNodeId, Shape};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeshEventKind {
    Added,
    Updated,
    Removed,
}

/// One reconciliation event from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshEvent {
    pub id: FragmentId,
    pub kind: MeshEventKind,
    /// World transform of the fragment's anchor.
    #[serde(default = "identity")]
    pub transform: Mat4,
    #[serde(default)]
    pub geometry: MeshGeometry,
}

fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Protocol violations: the source and the store disagree about which ids exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshStoreError {
    #[error("mesh fragment {0} added twice")]
    DuplicateFragment(FragmentId),
    #[error("mesh fragment {0} updated before it was added")]
    UnknownFragment(FragmentId),
}

/// What an event did to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshChange {
    Added(SceneNodeId),
    Updated(SceneNodeId),
    Removed(SceneNodeId),
    /// Remove for an id the store never had.
    Ignored,
    /// The geometry could not be turned into a shape; nothing changed.
    Dropped,
}

/// A mesh fragment currently held by the store.
#[derive(Debug, Clone)]
pub struct MeshFragment {
    id: FragmentId,
    node: SceneNodeId,
    transform: Mat4,
    shape: Shape,
}

impl MeshFragment {
    pub fn id(&self) -> FragmentId {
        self.id
    }

    /// The scene node mirroring this fragment; stable across updates.
    pub fn node(&self) -> SceneNodeId {
        self.node
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }
}

#[derive(Debug, Default)]
pub struct MeshAnchorStore {
    fragments: HashMap<FragmentId, MeshFragment>,
}

impl MeshAnchorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one add/update/remove event.
    pub fn on_mesh_event(&mut self, event: &MeshEvent, scene: &mut SceneGraph) -> Result<MeshChange, MeshStoreError> {
        match event.kind {
            MeshEventKind::Added => {
                if self.fragments.contains_key(&event.id) {
                    return Err(MeshStoreError::DuplicateFragment(event.id));
                }
                let Some(shape) = shape_or_drop(event) else {
                    return Ok(MeshChange::Dropped);
                };

                let node = scene.add(
                    SceneNode::new(NodeKind::MeshFragment)
                        .with_transform(event.transform)
                        .with_shape(shape.clone()),
                );
                self.fragments.insert(
                    event.id,
                    MeshFragment {
                        id: event.id,
                        node,
                        transform: event.transform,
                        shape,
                    },
                );
                log::debug!("mesh fragment {} added", event.id);
                Ok(MeshChange::Added(node))
            }
            MeshEventKind::Updated => {
                if !self.fragments.contains_key(&event.id) {
                    return Err(MeshStoreError::UnknownFragment(event.id));
                }
                let Some(shape) = shape_or_drop(event) else {
                    return Ok(MeshChange::Dropped);
                };
                let Some(fragment) = self.fragments.get_mut(&event.id) else {
                    return Err(MeshStoreError::UnknownFragment(event.id));
                };

                fragment.transform = event.transform;
                fragment.shape = shape.clone();
                scene.set_transform(fragment.node, event.transform);
                scene.set_shape(fragment.node, shape);
                log::trace!("mesh fragment {} updated", event.id);
                Ok(MeshChange::Updated(fragment.node))
            }
            MeshEventKind::Removed => match self.fragments.remove(&event.id) {
                Some(fragment) => {
                    scene.remove_node(fragment.node);
                    log::debug!("mesh fragment {} removed", event.id);
                    Ok(MeshChange::Removed(fragment.node))
                }
                None => Ok(MeshChange::Ignored),
            },
        }
    }

    pub fn get(&self, id: FragmentId) -> Option<&MeshFragment> {
        self.fragments.get(&id)
    }

    pub fn contains(&self, id: FragmentId) -> bool {
        self.fragments.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = FragmentId> + '_ {
        self.fragments.keys().copied()
    }
}

fn shape_or_drop(event: &MeshEvent) -> Option<Shape> {
    match generate_shape(&event.geometry) {
        Ok(shape) => Some(shape),
        Err(err) => {
            log::warn!("dropping {:?} event for mesh fragment {}: {err}", event.kind, event.id);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle(scale: f32) -> MeshGeometry {
        MeshGeometry {
            vertices: vec![Vec3::ZERO, Vec3::X * scale, Vec3::Z * scale],
            triangles: vec![[0, 1, 2]],
        }
    }

    fn event(id: u128, kind: MeshEventKind, x: f32, scale: f32) -> MeshEvent {
        MeshEvent {
            id: FragmentId::from_u128(id),
            kind,
            transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
            geometry: triangle(scale),
        }
    }

    #[test]
    fn test_add_registers_fragment() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();

        let change = store
            .on_mesh_event(&event(1, MeshEventKind::Added, 0.0, 1.0), &mut scene)
            .unwrap();
        let MeshChange::Added(node) = change else {
            panic!("expected Added, got {change:?}");
        };
        assert!(store.contains(FragmentId::from_u128(1)));
        assert_eq!(scene.get_node(node).unwrap().kind(), NodeKind::MeshFragment);
        assert_eq!(scene.count_of(NodeKind::MeshFragment), 1);
    }

    #[test]
    fn test_duplicate_add_fails() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();
        let add = event(1, MeshEventKind::Added, 0.0, 1.0);

        store.on_mesh_event(&add, &mut scene).unwrap();
        assert_eq!(
            store.on_mesh_event(&add, &mut scene),
            Err(MeshStoreError::DuplicateFragment(FragmentId::from_u128(1)))
        );
        assert_eq!(store.len(), 1);
        assert_eq!(scene.count_of(NodeKind::MeshFragment), 1);
    }

    #[test]
    fn test_update_before_add_fails() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();

        assert_eq!(
            store.on_mesh_event(&event(2, MeshEventKind::Updated, 0.0, 1.0), &mut scene),
            Err(MeshStoreError::UnknownFragment(FragmentId::from_u128(2)))
        );
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_unknown_is_noop() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();

        assert_eq!(
            store.on_mesh_event(&event(3, MeshEventKind::Removed, 0.0, 1.0), &mut scene),
            Ok(MeshChange::Ignored)
        );
        assert!(scene.is_empty());
    }

    #[test]
    fn test_update_replaces_in_place() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();
        let id = FragmentId::from_u128(4);

        let MeshChange::Added(node) = store
            .on_mesh_event(&event(4, MeshEventKind::Added, 0.0, 1.0), &mut scene)
            .unwrap()
        else {
            panic!("expected Added");
        };
        let updated = store
            .on_mesh_event(&event(4, MeshEventKind::Updated, 2.0, 3.0), &mut scene)
            .unwrap();
        assert_eq!(updated, MeshChange::Updated(node));

        let fragment = store.get(id).unwrap();
        assert_eq!(fragment.node(), node);
        assert_eq!(fragment.transform(), Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert_eq!(fragment.shape().local_bounds().max, Vec3::new(3.0, 0.0, 3.0));

        let scene_node = scene.get_node(node).unwrap();
        assert_eq!(scene_node.transform(), fragment.transform());
        assert_eq!(scene_node.shape(), Some(fragment.shape()));
    }

    #[test]
    fn test_remove_deletes_scene_node() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();

        let MeshChange::Added(node) = store
            .on_mesh_event(&event(5, MeshEventKind::Added, 0.0, 1.0), &mut scene)
            .unwrap()
        else {
            panic!("expected Added");
        };
        assert_eq!(
            store.on_mesh_event(&event(5, MeshEventKind::Removed, 0.0, 1.0), &mut scene),
            Ok(MeshChange::Removed(node))
        );
        assert!(!scene.contains(node));
        assert!(store.is_empty());

        // A second remove is tolerated.
        assert_eq!(
            store.on_mesh_event(&event(5, MeshEventKind::Removed, 0.0, 1.0), &mut scene),
            Ok(MeshChange::Ignored)
        );
    }

    #[test]
    fn test_bad_geometry_drops_event() {
        let mut scene = SceneGraph::new();
        let mut store = MeshAnchorStore::new();
        let id = FragmentId::from_u128(6);

        let mut bad_add = event(6, MeshEventKind::Added, 0.0, 1.0);
        bad_add.geometry = MeshGeometry::default();
        assert_eq!(store.on_mesh_event(&bad_add, &mut scene), Ok(MeshChange::Dropped));
        assert!(!store.contains(id));

        store
            .on_mesh_event(&event(6, MeshEventKind::Added, 0.0, 1.0), &mut scene)
            .unwrap();
        let mut bad_update = event(6, MeshEventKind::Updated, 9.0, 1.0);
        bad_update.geometry.triangles = vec![[0, 0, 0]];
        assert_eq!(store.on_mesh_event(&bad_update, &mut scene), Ok(MeshChange::Dropped));
        assert_eq!(store.get(id).unwrap().transform(), Mat4::IDENTITY);
    }

    #[test]
    fn test_event_deserializes() {
        let json = r#"{
            "id": "00000000-0000-0000-0000-000000000007",
            "kind": "removed"
        }"#;
        let event: MeshEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id, FragmentId::from_u128(7));
        assert_eq!(event.kind, MeshEventKind::Removed);
        assert_eq!(event.transform, Mat4::IDENTITY);
    }
}
