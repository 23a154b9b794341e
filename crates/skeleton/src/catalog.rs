//! The hand joint catalog and its slot mapping.
//!
//! Every joint a tracking source reports is one of the [`JointId`]s below. Each
//! identifier resolves to exactly one storage slot on a [`crate::Hand`]: either a
//! named hand-level slot (wrist and the two forearm joints) or a (finger, role)
//! pair. The thumb has no metacarpal, so that pair is never produced.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter};

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = 27;

/// Handedness of a tracked hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Chirality {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Little,
}

impl Finger {
    /// Roles present on this finger, from the palm outward.
    pub fn roles(self) -> &'static [JointRole] {
        use JointRole::*;
        match self {
            Finger::Thumb => &[Knuckle, IntermediateBase, IntermediateTip, Tip],
            _ => &[Metacarpal, Knuckle, IntermediateBase, IntermediateTip, Tip],
        }
    }

    pub fn has_role(self, role: JointRole) -> bool {
        self.roles().contains(&role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JointRole {
    Metacarpal,
    Knuckle,
    IntermediateBase,
    IntermediateTip,
    Tip,
}

/// Hand-level joints that belong to no finger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum NamedSlot {
    Wrist,
    ForearmWrist,
    ForearmArm,
}

/// Where a joint is stored on a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointSlot {
    Named(NamedSlot),
    Finger(Finger, JointRole),
}

/// The joints reported by the tracking source, in catalog order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, AsRefStr, Display, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JointId {
    Wrist,
    ForearmWrist,
    ForearmArm,
    ThumbKnuckle,
    ThumbIntermediateBase,
    ThumbIntermediateTip,
    ThumbTip,
    IndexMetacarpal,
    IndexKnuckle,
    IndexIntermediateBase,
    IndexIntermediateTip,
    IndexTip,
    MiddleMetacarpal,
    MiddleKnuckle,
    MiddleIntermediateBase,
    MiddleIntermediateTip,
    MiddleTip,
    RingMetacarpal,
    RingKnuckle,
    RingIntermediateBase,
    RingIntermediateTip,
    RingTip,
    LittleMetacarpal,
    LittleKnuckle,
    LittleIntermediateBase,
    LittleIntermediateTip,
    LittleTip,
}

impl JointId {
    /// Position of this joint in catalog order (0..JOINT_COUNT).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Every catalog identifier, in order.
    pub fn all() -> impl Iterator<Item = JointId> {
        JointId::iter()
    }

    /// Resolves the storage slot backing this joint.
    pub fn slot(self) -> JointSlot {
        use JointId::*;
        use JointRole::*;
        let (finger, role) = match self {
            Wrist => return JointSlot::Named(NamedSlot::Wrist),
            ForearmWrist => return JointSlot::Named(NamedSlot::ForearmWrist),
            ForearmArm => return JointSlot::Named(NamedSlot::ForearmArm),
            ThumbKnuckle => (Finger::Thumb, Knuckle),
            ThumbIntermediateBase => (Finger::Thumb, IntermediateBase),
            ThumbIntermediateTip => (Finger::Thumb, IntermediateTip),
            ThumbTip => (Finger::Thumb, Tip),
            IndexMetacarpal => (Finger::Index, Metacarpal),
            IndexKnuckle => (Finger::Index, Knuckle),
            IndexIntermediateBase => (Finger::Index, IntermediateBase),
            IndexIntermediateTip => (Finger::Index, IntermediateTip),
            IndexTip => (Finger::Index, Tip),
            MiddleMetacarpal => (Finger::Middle, Metacarpal),
            MiddleKnuckle => (Finger::Middle, Knuckle),
            MiddleIntermediateBase => (Finger::Middle, IntermediateBase),
            MiddleIntermediateTip => (Finger::Middle, IntermediateTip),
            MiddleTip => (Finger::Middle, Tip),
            RingMetacarpal => (Finger::Ring, Metacarpal),
            RingKnuckle => (Finger::Ring, Knuckle),
            RingIntermediateBase => (Finger::Ring, IntermediateBase),
            RingIntermediateTip => (Finger::Ring, IntermediateTip),
            RingTip => (Finger::Ring, Tip),
            LittleMetacarpal => (Finger::Little, Metacarpal),
            LittleKnuckle => (Finger::Little, Knuckle),
            LittleIntermediateBase => (Finger::Little, IntermediateBase),
            LittleIntermediateTip => (Finger::Little, IntermediateTip),
            LittleTip => (Finger::Little, Tip),
        };
        JointSlot::Finger(finger, role)
    }

    pub fn finger(self) -> Option<Finger> {
        match self.slot() {
            JointSlot::Finger(finger, _) => Some(finger),
            JointSlot::Named(_) => None,
        }
    }

    pub fn role(self) -> Option<JointRole> {
        match self.slot() {
            JointSlot::Finger(_, role) => Some(role),
            JointSlot::Named(_) => None,
        }
    }

    /// Reverse lookup from a (finger, role) pair; `None` for the thumb metacarpal.
    pub fn from_finger_role(finger: Finger, role: JointRole) -> Option<JointId> {
        JointId::iter().find(|joint| joint.slot() == JointSlot::Finger(finger, role))
    }

    pub fn from_named(slot: NamedSlot) -> JointId {
        match slot {
            NamedSlot::Wrist => JointId::Wrist,
            NamedSlot::ForearmWrist => JointId::ForearmWrist,
            NamedSlot::ForearmArm => JointId::ForearmArm,
        }
    }
}
