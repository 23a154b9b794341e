//! Shape generation from raw mesh samples.

use glam::Vec3;
use scene::{Shape, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// Triangles whose doubled area falls below this are treated as degenerate.
const MIN_DOUBLE_AREA: f32 = 1e-12;

/// Raw triangulated geometry as delivered by the environment, in anchor space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshGeometry {
    pub vertices: Vec<Vec3>,
    /// Vertex indices, three per triangle.
    pub triangles: Vec<[u32; 3]>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshShapeError {
    #[error("mesh has no vertices")]
    NoVertices,
    #[error("mesh has no triangles")]
    NoTriangles,
    #[error("vertex {index} is not finite")]
    NonFiniteVertex { index: usize },
    #[error("triangle {triangle} references vertex {vertex} of {vertex_count}")]
    IndexOutOfRange {
        triangle: usize,
        vertex: u32,
        vertex_count: usize,
    },
    #[error("all {0} triangles are degenerate")]
    Degenerate(usize),
}

/// Builds a collision/visual shape from raw geometry.
///
/// Zero-area triangles are dropped as long as at least one proper triangle remains.
pub fn generate_shape(geometry: &MeshGeometry) -> Result<Shape, MeshShapeError> {
    if geometry.vertices.is_empty() {
        return Err(MeshShapeError::NoVertices);
    }
    if geometry.triangles.is_empty() {
        return Err(MeshShapeError::NoTriangles);
    }
    if let Some(index) = geometry.vertices.iter().position(|v| !v.is_finite()) {
        return Err(MeshShapeError::NonFiniteVertex { index });
    }

    let vertex_count = geometry.vertices.len();
    let mut triangles = Vec::with_capacity(geometry.triangles.len());
    for (triangle, indices) in geometry.triangles.iter().enumerate() {
        if let Some(&vertex) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshShapeError::IndexOutOfRange {
                triangle,
                vertex,
                vertex_count,
            });
        }

        let [a, b, c] = indices.map(|i| geometry.vertices[i as usize]);
        if (b - a).cross(c - a).length_squared() > MIN_DOUBLE_AREA * MIN_DOUBLE_AREA {
            triangles.push(*indices);
        }
    }

    if triangles.is_empty() {
        return Err(MeshShapeError::Degenerate(geometry.triangles.len()));
    }

    let dropped = geometry.triangles.len() - triangles.len();
    if dropped > 0 {
        log::debug!("dropped {dropped} degenerate triangles");
    }

    Ok(Shape::Mesh(Arc::new(TriangleMesh::from_parts(
        geometry.vertices.clone(),
        triangles,
    ))))
}
