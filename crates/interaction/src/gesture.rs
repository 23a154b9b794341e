//! Two-handed triangle gesture.
//!
//! The user touches both index tips together and both thumb tips together while
//! holding the index/thumb pairs well apart, forming a triangle between the hands.

use crate::InteractionConfig;
use glam::Vec3;
use scene::SceneGraph;
use skeleton::{Chirality, JointId, Skeleton};

/// Smallest usable sine of the angle between the triangle's two edges.
const MIN_NORMAL_RATIO: f32 = 1e-4;

/// Cross distances must exceed the contact threshold by this factor.
const SPREAD_FACTOR: f32 = 10.0;

/// World positions of the four fingertips the gesture is built from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrianglePoints {
    pub left_index: Vec3,
    pub right_index: Vec3,
    pub left_thumb: Vec3,
    pub right_thumb: Vec3,
}

impl TrianglePoints {
    /// Reads the four tips from the skeleton; `None` if any of them is untracked.
    pub fn from_skeleton(skeleton: &Skeleton, scene: &SceneGraph) -> Option<Self> {
        Some(Self {
            left_index: skeleton.joint_position(Chirality::Left, JointId::IndexTip, scene)?,
            right_index: skeleton.joint_position(Chirality::Right, JointId::IndexTip, scene)?,
            left_thumb: skeleton.joint_position(Chirality::Left, JointId::ThumbTip, scene)?,
            right_thumb: skeleton.joint_position(Chirality::Right, JointId::ThumbTip, scene)?,
        })
    }

    fn cross_distances(&self) -> [f32; 4] {
        [
            self.left_index.distance(self.left_thumb),
            self.left_index.distance(self.right_thumb),
            self.right_index.distance(self.left_thumb),
            self.right_index.distance(self.right_thumb),
        ]
    }

    pub fn centroid(&self) -> Vec3 {
        (self.left_index + self.right_index + self.left_thumb + self.right_thumb) / 4.0
    }
}

/// Where and in which direction a gesture-triggered effect starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSpawn {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

/// Whether the four tips form the triangle gesture.
pub fn classify_triangle(points: &TrianglePoints, config: &InteractionConfig) -> bool {
    let index_gap = points.left_index.distance(points.right_index);
    let thumb_gap = points.left_thumb.distance(points.right_thumb);
    if index_gap >= config.max_distance || thumb_gap >= config.max_distance {
        return false;
    }

    let mean = points.cross_distances().iter().sum::<f32>() / 4.0;
    mean > config.min_distance && mean > SPREAD_FACTOR * config.max_distance
}

/// Origin and facing of a classified gesture.
///
/// The direction is the normal of the triangle spanned by both index tips and the
/// left thumb tip; thin triangles fall back to `default_direction`.
pub fn gesture_frame(points: &TrianglePoints, default_direction: Vec3) -> GestureSpawn {
    let across = points.right_index - points.left_index;
    let down = points.left_thumb - points.left_index;
    let normal = across.cross(down);
    // Threshold scales with the edge lengths.
    let direction = if normal.length() > MIN_NORMAL_RATIO * across.length() * down.length() {
        normal.normalize()
    } else {
        log::debug!("degenerate gesture triangle, using default direction");
        default_direction.normalize_or(Vec3::NEG_Z)
    };

    GestureSpawn {
        origin: points.centroid(),
        direction,
    }
}

/// Evaluates the gesture against the skeleton's current state.
pub fn detect_triangle_gesture(
    skeleton: &Skeleton,
    scene: &SceneGraph,
    config: &InteractionConfig,
) -> Option<GestureSpawn> {
    let points = TrianglePoints::from_skeleton(skeleton, scene)?;
    if !classify_triangle(&points, config) {
        return None;
    }

    let spawn = gesture_frame(&points, config.default_direction);
    log::debug!("triangle gesture at {} facing {}", spawn.origin, spawn.direction);
    Some(spawn)
}
