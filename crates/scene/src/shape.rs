use glam::Vec3;
use handspace_core::Bounds;
use std::sync::Arc;

/// The collision/visual shape attached to a scene node.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Sphere { radius: f32 },
    Cuboid { size: Vec3 },
    Mesh(Arc<TriangleMesh>),
}

impl Shape {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cube(edge: f32) -> Self {
        Self::Cuboid {
            size: Vec3::splat(edge),
        }
    }

    /// Bounds in the node's local space.
    pub fn local_bounds(&self) -> Bounds {
        match self {
            Shape::Sphere { radius } => Bounds::from_center_half_size(Vec3::ZERO, Vec3::splat(*radius)),
            Shape::Cuboid { size } => Bounds::from_center_size(Vec3::ZERO, *size),
            Shape::Mesh(mesh) => mesh.bounds(),
        }
    }
}

/// A triangulated surface in its anchor's local space.
///
/// Construction does not validate the geometry; callers build meshes from input
/// they have already checked.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Bounds,
}

impl TriangleMesh {
    pub fn from_parts(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let bounds = Bounds::from_points(vertices.iter().copied()).unwrap_or_default();
        Self {
            vertices,
            triangles,
            bounds,
        }
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}
