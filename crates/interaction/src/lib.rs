//! Interaction engine: touch detection and the two-handed triangle gesture.
//!
//! Both detectors read the skeleton after a sample's joint writes have landed and
//! are evaluated once per processed hand sample. Neither keeps state between
//! frames: a finger resting in a volume re-triggers every frame, and a held
//! gesture fires every frame it stays classified.

mod gesture;
mod touch;

pub use gesture::{classify_triangle, detect_triangle_gesture, gesture_frame, GestureSpawn, TrianglePoints};
pub use touch::detect_touch;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use skeleton::{Chirality, JointId};

/// Thresholds and policies for both detectors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Hand whose fingertip is tested against interactive volumes.
    pub touch_hand: Chirality,
    /// Joint used as the touching fingertip.
    pub touch_joint: JointId,
    /// Upper bound (meters) on the index-index and thumb-thumb distances.
    pub max_distance: f32,
    /// Lower bound (meters) on the mean index/thumb cross distance.
    pub min_distance: f32,
    /// Gesture direction used when the triangle is too thin to define a normal.
    pub default_direction: Vec3,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            touch_hand: Chirality::Right,
            touch_joint: JointId::IndexTip,
            max_distance: 0.01,
            min_distance: 0.005,
            default_direction: Vec3::NEG_Z,
        }
    }
}
