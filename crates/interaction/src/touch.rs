use crate::InteractionConfig;
use handspace_core::color::random_color;
use rand::Rng;
use scene::{SceneGraph, SceneNodeId};
use skeleton::Skeleton;

/// Recolors every interactive volume that contains the reference fingertip.
///
/// Containment is closed on all three axes of the volume's world-space bounds.
/// Does nothing while the fingertip is untracked. Returns the touched volumes.
pub fn detect_touch(
    skeleton: &Skeleton,
    scene: &mut SceneGraph,
    config: &InteractionConfig,
    rng: &mut impl Rng,
) -> Vec<SceneNodeId> {
    let Some(tip) = skeleton.joint_position(config.touch_hand, config.touch_joint, scene) else {
        return Vec::new();
    };

    let touched: Vec<SceneNodeId> = scene
        .interactive_volumes()
        .iter()
        .copied()
        .filter(|&volume| {
            scene
                .world_bounds(volume)
                .is_some_and(|bounds| bounds.contains_point(tip))
        })
        .collect();

    for &volume in &touched {
        scene.set_color(volume, random_color(rng));
        log::debug!("touch on volume {volume}");
    }

    touched
}
