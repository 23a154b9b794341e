use crate::catalog::{Chirality, Finger, JointId, JointRole, JointSlot, NamedSlot, JOINT_COUNT};
use crate::SkeletonConfig;
use handspace_core::Color;
use scene::{NodeKind, SceneGraph, SceneNode, SceneNodeId, Shape};
use std::collections::HashMap;
use strum::IntoEnumIterator;

/// Joint proxies of a single finger, keyed by role.
#[derive(Debug, Clone, Default)]
pub struct FingerData {
    joints: HashMap<JointRole, SceneNodeId>,
}

impl FingerData {
    pub fn joint(&self, role: JointRole) -> Option<SceneNodeId> {
        self.joints.get(&role).copied()
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

/// One tracked hand: its joint proxies and the tracking state of its last sample.
///
/// Proxies are allocated once in [`Hand::create`] and live for the whole session;
/// frames only rewrite their transforms.
#[derive(Debug, Clone)]
pub struct Hand {
    chirality: Chirality,
    wrist: SceneNodeId,
    forearm_wrist: SceneNodeId,
    forearm_arm: SceneNodeId,
    fingers: HashMap<Finger, FingerData>,
    /// Hand-level tracking flag of the last sample received.
    tracked: bool,
    /// Per-joint validity of the last sample that was applied.
    joint_tracked: [bool; JOINT_COUNT],
    last_timestamp: Option<f64>,
}

impl Hand {
    /// Allocates every joint proxy for one hand and registers them in the scene.
    pub fn create(chirality: Chirality, color: Color, config: &SkeletonConfig, scene: &mut SceneGraph) -> Self {
        let mut proxy = || {
            scene.add(
                SceneNode::new(NodeKind::JointProxy)
                    .with_shape(Shape::sphere(config.joint_radius))
                    .with_color(color)
                    .with_visible(config.show_joints),
            )
        };

        let wrist = proxy();
        let forearm_wrist = proxy();
        let forearm_arm = proxy();

        let mut fingers = HashMap::new();
        for finger in Finger::iter() {
            let joints = finger.roles().iter().map(|role| (*role, proxy())).collect();
            fingers.insert(finger, FingerData { joints });
        }

        log::debug!("created {chirality} hand with {JOINT_COUNT} joint proxies");

        Self {
            chirality,
            wrist,
            forearm_wrist,
            forearm_arm,
            fingers,
            tracked: false,
            joint_tracked: [false; JOINT_COUNT],
            last_timestamp: None,
        }
    }

    pub fn chirality(&self) -> Chirality {
        self.chirality
    }

    pub fn named(&self, slot: NamedSlot) -> SceneNodeId {
        match slot {
            NamedSlot::Wrist => self.wrist,
            NamedSlot::ForearmWrist => self.forearm_wrist,
            NamedSlot::ForearmArm => self.forearm_arm,
        }
    }

    pub fn finger(&self, finger: Finger) -> Option<&FingerData> {
        self.fingers.get(&finger)
    }

    /// Resolves a catalog joint to its backing proxy.
    pub fn slot(&self, joint: JointId) -> Option<SceneNodeId> {
        match joint.slot() {
            JointSlot::Named(slot) => Some(self.named(slot)),
            JointSlot::Finger(finger, role) => self.fingers.get(&finger)?.joint(role),
        }
    }

    /// Every proxy of this hand, in catalog order.
    pub fn proxies(&self) -> impl Iterator<Item = (JointId, SceneNodeId)> + '_ {
        JointId::all().filter_map(|joint| self.slot(joint).map(|id| (joint, id)))
    }

    pub fn is_tracked(&self) -> bool {
        self.tracked
    }

    /// Whether `joint` was valid in the last applied sample of a tracked hand.
    pub fn is_joint_tracked(&self, joint: JointId) -> bool {
        self.tracked && self.joint_tracked[joint.index()]
    }

    pub fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    pub(crate) fn mark_untracked(&mut self) {
        self.tracked = false;
    }

    pub(crate) fn mark_tracked(&mut self, joint_tracked: [bool; JOINT_COUNT], timestamp: f64) {
        self.tracked = true;
        self.joint_tracked = joint_tracked;
        self.last_timestamp = Some(timestamp);
    }
}
