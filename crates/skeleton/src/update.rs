//! Joint update pipeline: writes tracking samples onto the joint proxies.

use crate::catalog::{Chirality, JointId, JOINT_COUNT};
use crate::Skeleton;
use glam::Mat4;
use handspace_core::pose;
use scene::SceneGraph;
use serde::{Deserialize, Serialize};

/// Pose of one joint in its hand anchor's space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointSample {
    pub joint: JointId,
    /// Anchor-space transform of the joint.
    pub local: Mat4,
    /// Whether this joint has valid tracking data this frame.
    pub tracked: bool,
}

/// One frame of tracking data for one hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandSample {
    pub chirality: Chirality,
    /// Seconds since the tracking session started.
    pub timestamp: f64,
    /// World transform of the hand anchor.
    pub anchor: Mat4,
    /// Hand-level tracking confidence flag.
    pub tracked: bool,
    /// Joints reported this frame; joints absent from the list count as untracked.
    #[serde(default)]
    pub joints: Vec<JointSample>,
}

/// Result of applying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The hand was untracked; nothing was written.
    Discarded,
    /// The sample was applied; `written + skipped == JOINT_COUNT`.
    Applied { written: usize, skipped: usize },
}

impl UpdateOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, UpdateOutcome::Applied { .. })
    }
}

impl Skeleton {
    /// Applies a tracking sample to the proxies of the sample's hand.
    ///
    /// An untracked hand is discarded whole. Otherwise each catalog joint is written
    /// independently: `anchor * local` when the joint is valid, left untouched when not.
    pub fn apply_sample(&mut self, sample: &HandSample, scene: &mut SceneGraph) -> UpdateOutcome {
        let hand = self.hand_mut(sample.chirality);

        if !sample.tracked {
            hand.mark_untracked();
            log::trace!("discarded untracked {} hand sample", sample.chirality);
            return UpdateOutcome::Discarded;
        }
        if !pose::is_finite(&sample.anchor) {
            hand.mark_untracked();
            log::debug!("discarded {} hand sample with non-finite anchor", sample.chirality);
            return UpdateOutcome::Discarded;
        }

        let mut by_joint: [Option<&JointSample>; JOINT_COUNT] = [None; JOINT_COUNT];
        for joint_sample in &sample.joints {
            by_joint[joint_sample.joint.index()] = Some(joint_sample);
        }

        let mut joint_tracked = [false; JOINT_COUNT];
        let mut written = 0;
        for joint in JointId::all() {
            let Some(joint_sample) = by_joint[joint.index()].filter(|s| s.tracked) else {
                continue;
            };
            if !pose::is_finite(&joint_sample.local) {
                log::debug!("{} {joint}: non-finite pose treated as untracked", sample.chirality);
                continue;
            }
            let Some(proxy) = hand.slot(joint) else {
                continue;
            };

            let world = pose::compose(&sample.anchor, &joint_sample.local);
            if !pose::is_finite(&world) {
                log::debug!("{} {joint}: world pose overflowed, treated as untracked", sample.chirality);
                continue;
            }
            if scene.set_transform(proxy, world) {
                joint_tracked[joint.index()] = true;
                written += 1;
            }
        }

        hand.mark_tracked(joint_tracked, sample.timestamp);

        UpdateOutcome::Applied {
            written,
            skipped: JOINT_COUNT - written,
        }
    }
}
