//! Two-handed skeleton model and the joint update pipeline.
//!
//! [`Skeleton::create`] allocates a proxy for every catalog joint of both hands in the
//! shared scene. Tracking samples are applied with [`Skeleton::apply_sample`], which
//! only ever rewrites proxy transforms.

pub mod catalog;
mod hand;
mod update;

pub use catalog::{Chirality, Finger, JointId, JointRole, JointSlot, NamedSlot, JOINT_COUNT};
pub use hand::{FingerData, Hand};
pub use update::{HandSample, JointSample, UpdateOutcome};

use glam::Vec3;
use handspace_core::color::ColorValue;
use scene::{SceneGraph, SceneNodeId};
use serde::{Deserialize, Serialize};

/// How joint proxies are created.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkeletonConfig {
    /// Debug visibility: render the joint proxies or keep them as invisible colliders.
    pub show_joints: bool,
    /// Radius of each joint proxy sphere, in meters.
    pub joint_radius: f32,
    pub left_color: ColorValue,
    pub right_color: ColorValue,
}

impl Default for SkeletonConfig {
    fn default() -> Self {
        Self {
            show_joints: true,
            joint_radius: 0.01,
            left_color: ColorValue::Rgb { r: 0.0, g: 0.0, b: 1.0 },
            right_color: ColorValue::Rgb { r: 1.0, g: 0.0, b: 0.0 },
        }
    }
}

/// Both hands of the tracked user.
#[derive(Debug, Clone)]
pub struct Skeleton {
    left: Hand,
    right: Hand,
}

impl Skeleton {
    /// Creates both hands; called once per session.
    pub fn create(config: &SkeletonConfig, scene: &mut SceneGraph) -> Self {
        let left = Hand::create(Chirality::Left, config.left_color.to_color(), config, scene);
        let right = Hand::create(Chirality::Right, config.right_color.to_color(), config, scene);
        Self { left, right }
    }

    pub fn hand(&self, chirality: Chirality) -> &Hand {
        match chirality {
            Chirality::Left => &self.left,
            Chirality::Right => &self.right,
        }
    }

    fn hand_mut(&mut self, chirality: Chirality) -> &mut Hand {
        match chirality {
            Chirality::Left => &mut self.left,
            Chirality::Right => &mut self.right,
        }
    }

    /// Resolves a joint of either hand to its proxy.
    pub fn slot(&self, chirality: Chirality, joint: JointId) -> Option<SceneNodeId> {
        self.hand(chirality).slot(joint)
    }

    /// World position of a joint that was tracked in its hand's last sample.
    pub fn joint_position(&self, chirality: Chirality, joint: JointId, scene: &SceneGraph) -> Option<Vec3> {
        let hand = self.hand(chirality);
        if !hand.is_joint_tracked(joint) {
            return None;
        }
        scene.world_position(hand.slot(joint)?)
    }
}
