//! Axis-aligned bounding box implementation using glam
//!
//! Bounds are kept in the local space of the entity that owns them and moved into
//! world space with [`Bounds::transformed`]. A transformed box is re-fitted around its
//! eight corners, so the result stays axis-aligned even when the transform rotates.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box represented by minimum and maximum points
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// The minimum corner
    pub min: Vec3,
    /// The maximum corner
    pub max: Vec3,
}

impl Bounds {
    /// Creates a new bounds from minimum and maximum points
    ///
    /// Note: This doesn't validate that min is actually less than max.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Creates bounds from center point and half-extents
    pub fn from_center_half_size(center: Vec3, half_size: Vec3) -> Self {
        Self {
            min: center - half_size,
            max: center + half_size,
        }
    }

    /// Creates bounds from center point and full size
    pub fn from_center_size(center: Vec3, size: Vec3) -> Self {
        Self::from_center_half_size(center, size * 0.5)
    }

    /// Smallest bounds enclosing every point, or `None` for an empty iterator
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self::new(first, first), |bounds, point| Self {
            min: bounds.min.min(point),
            max: bounds.max.max(point),
        }))
    }

    /// Creates an empty bounds at the origin
    pub fn zero() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
        }
    }

    /// Returns the size of the bounds
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Returns the center point of the bounds
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Checks if the bounds are valid (min <= max on every axis)
    pub fn is_valid(&self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Tests if a point is contained within the bounds
    ///
    /// Every axis is a closed interval: points on a face, edge or corner are contained.
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Returns the eight corner points of the bounds
    pub fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Moves the bounds through `transform` and re-fits an axis-aligned box around it
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let corners = self.corners().map(|corner| transform.transform_point3(corner));
        Self::from_points(corners).unwrap_or(*self)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    #[test]
    fn test_bounds_creation() {
        let bounds = Bounds::from_center_size(Vec3::new(1.0, 2.0, 3.0), Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.min, Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 4.0, 6.0));
        assert_eq!(bounds.center(), Vec3::new(1.0, 2.0, 3.0));
        assert!(bounds.is_valid());
    }

    #[test]
    fn test_contains_point_is_closed_interval() {
        let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);

        assert!(bounds.contains_point(Vec3::splat(0.5)));
        assert!(bounds.contains_point(Vec3::new(0.0, 0.5, 0.5))); // min face
        assert!(bounds.contains_point(Vec3::new(1.0, 0.5, 0.5))); // max face
        assert!(bounds.contains_point(Vec3::ONE)); // corner

        let eps = 1e-4;
        assert!(!bounds.contains_point(Vec3::new(-eps, 0.5, 0.5)));
        assert!(!bounds.contains_point(Vec3::new(0.5, 1.0 + eps, 0.5)));
        assert!(!bounds.contains_point(Vec3::new(0.5, 0.5, -eps)));
    }

    #[test]
    fn test_from_points() {
        let bounds = Bounds::from_points([
            Vec3::new(1.0, -2.0, 0.0),
            Vec3::new(-1.0, 3.0, 0.5),
            Vec3::new(0.0, 0.0, -4.0),
        ])
        .unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -4.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 0.5));

        assert!(Bounds::from_points(std::iter::empty()).is_none());
    }

    #[test]
    fn test_transformed_translation() {
        let bounds = Bounds::from_center_size(Vec3::ZERO, Vec3::splat(0.2));
        let moved = bounds.transformed(&Mat4::from_translation(Vec3::new(1.0, 0.0, -1.0)));
        assert!((moved.center() - Vec3::new(1.0, 0.0, -1.0)).length() < 1e-6);
        assert!((moved.size() - Vec3::splat(0.2)).length() < 1e-6);
    }

    #[test]
    fn test_transformed_rotation_refits() {
        let bounds = Bounds::from_center_size(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let rotation = Mat4::from_quat(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2));
        let rotated = bounds.transformed(&rotation);
        assert!((rotated.size().y - 2.0).abs() < 1e-5);
        assert!(rotated.size().x.abs() < 1e-5);
    }

    #[test]
    fn test_serde_shape() {
        let bounds = Bounds::new(Vec3::ZERO, Vec3::ONE);
        let json = serde_json::to_string(&bounds).unwrap();
        let back: Bounds = serde_json::from_str(&json).unwrap();
        assert_eq!(bounds, back);
    }
}
