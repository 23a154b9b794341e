//! Rigid pose helpers over glam matrices
//!
//! Poses travel through the workspace as column-major [`Mat4`]s. Tracking anchors
//! supply a local-to-world matrix, joints supply an anchor-local matrix, and the
//! world pose of a joint is the product of the two.

use glam::{Mat4, Quat, Vec3};

/// Composes an anchor's world pose with a pose expressed in that anchor's space
///
/// Formula: anchor * local (anchor space -> world space)
pub fn compose(anchor: &Mat4, local: &Mat4) -> Mat4 {
    *anchor * *local
}

/// Returns the translation part of a pose
pub fn translation(pose: &Mat4) -> Vec3 {
    pose.w_axis.truncate()
}

/// Returns a copy of `pose` with its translation replaced
pub fn with_translation(pose: &Mat4, translation: Vec3) -> Mat4 {
    let mut pose = *pose;
    pose.w_axis = translation.extend(1.0);
    pose
}

/// Builds a pose from a rotation and a translation
pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Mat4 {
    Mat4::from_rotation_translation(rotation, translation)
}

/// Checks that every element of the pose is finite
pub fn is_finite(pose: &Mat4) -> bool {
    pose.is_finite()
}
