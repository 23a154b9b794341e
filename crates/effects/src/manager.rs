use crate::EffectConfig;
use glam::Vec3;
use handspace_core::color::random_color;
use handspace_core::pose;
use rand::Rng;
use scene::{NodeKind, SceneGraph, SceneNode, SceneNodeId, Shape};
use slotmap::SecondaryMap;
use std::time::Duration;

#[derive(Clone, Copy, Debug)]
struct FireballSchedule {
    expires_at: Duration,
    /// Motion has been integrated up to this time.
    integrated_to: Duration,
}

#[derive(Clone, Copy, Debug)]
struct TrailSchedule {
    spawned_at: Duration,
    /// Fade steps applied so far; step 0 is the spawn state.
    step: u32,
}

/// What one sweep did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub moved: usize,
    pub fade_steps: usize,
    pub expired_fireballs: usize,
    pub expired_trails: usize,
    /// Trails moved to the effects container because their fireball expired first.
    pub orphaned_trails: usize,
    /// Schedules whose node was no longer in the scene.
    pub dropped: usize,
}

/// Owns every live effect and the schedules that time them out.
#[derive(Debug)]
pub struct EffectManager {
    config: EffectConfig,
    container: SceneNodeId,
    fireballs: SecondaryMap<SceneNodeId, FireballSchedule>,
    trails: SecondaryMap<SceneNodeId, TrailSchedule>,
}

impl EffectManager {
    /// Creates the manager along with its effects container under the scene root.
    pub fn new(config: EffectConfig, scene: &mut SceneGraph) -> Self {
        let container = scene.add(SceneNode::new(NodeKind::EffectsContainer));
        Self {
            config,
            container,
            fireballs: SecondaryMap::new(),
            trails: SecondaryMap::new(),
        }
    }

    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Node every fireball and orphaned trail is parented to.
    pub fn container(&self) -> SceneNodeId {
        self.container
    }

    pub fn live_fireballs(&self) -> usize {
        self.fireballs.len()
    }

    pub fn live_trails(&self) -> usize {
        self.trails.len()
    }

    pub fn is_idle(&self) -> bool {
        self.fireballs.is_empty() && self.trails.is_empty()
    }

    fn ensure_container(&mut self, scene: &mut SceneGraph) -> SceneNodeId {
        if !scene.contains(self.container) {
            log::warn!("effects container vanished, recreating it");
            self.container = scene.add(SceneNode::new(NodeKind::EffectsContainer));
        }
        self.container
    }

    /// Spawns a fireball at `origin` heading along `direction`, with its trails.
    ///
    /// `now` is the clock the later [`EffectManager::advance`] calls are measured on.
    pub fn spawn_effect(
        &mut self,
        origin: Vec3,
        direction: Vec3,
        now: Duration,
        scene: &mut SceneGraph,
        rng: &mut impl Rng,
    ) -> Option<SceneNodeId> {
        let container = self.ensure_container(scene);
        let direction = direction.normalize_or(Vec3::NEG_Z);
        let local_origin = scene
            .world_transform(container)
            .map_or(origin, |world| world.inverse().transform_point3(origin));

        let fireball = scene.insert(
            Some(container),
            SceneNode::new(NodeKind::Fireball)
                .with_shape(Shape::sphere(self.config.fireball_radius))
                .with_translation(local_origin)
                .with_color(self.config.fireball_color.to_color())
                .with_velocity(direction * self.config.speed),
        )?;
        self.fireballs.insert(
            fireball,
            FireballSchedule {
                expires_at: now + self.config.ttl(),
                integrated_to: now,
            },
        );

        let jitter = self.config.trail_jitter.abs();
        let back = self.config.trail_back_offset.abs();
        // Jitter stays in the plane perpendicular to the flight axis.
        let (side, up) = direction.any_orthonormal_pair();
        for _ in 0..self.config.trail_count {
            let lateral = side * rng.random_range(-jitter..=jitter) + up * rng.random_range(-jitter..=jitter);
            let offset = lateral - direction * rng.random_range(0.0..=back);
            let trail = SceneNode::new(NodeKind::TrailParticle)
                .with_shape(Shape::sphere(self.config.trail_radius))
                .with_translation(offset)
                .with_color(random_color(rng))
                .with_opacity(self.config.fade_opacity(0));

            if let Some(trail) = scene.insert(Some(fireball), trail) {
                self.trails.insert(trail, TrailSchedule { spawned_at: now, step: 0 });
            }
        }

        log::debug!("spawned fireball {fireball} at {origin} heading {direction}");
        Some(fireball)
    }

    /// Brings every effect up to `now`: moves fireballs, applies due fade steps
    /// and removes whatever has reached the end of its lifetime.
    pub fn advance(&mut self, now: Duration, scene: &mut SceneGraph, rng: &mut impl Rng) -> SweepReport {
        let mut report = SweepReport::default();
        self.advance_fireballs(now, scene, &mut report);
        self.advance_trails(now, scene, rng, &mut report);

        if report.expired_fireballs > 0 || report.expired_trails > 0 {
            log::trace!("effect sweep at {now:?}: {report:?}");
        }
        report
    }

    fn advance_fireballs(&mut self, now: Duration, scene: &mut SceneGraph, report: &mut SweepReport) {
        let ids: Vec<SceneNodeId> = self.fireballs.keys().collect();
        for id in ids {
            let Some(node) = scene.get_node(id) else {
                self.fireballs.remove(id);
                report.dropped += 1;
                continue;
            };
            let (transform, velocity) = (node.transform(), node.velocity());

            let Some(schedule) = self.fireballs.get_mut(id) else {
                continue;
            };
            let until = now.min(schedule.expires_at);
            let dt = until.saturating_sub(schedule.integrated_to);
            if !dt.is_zero() {
                let position = pose::translation(&transform) + velocity * dt.as_secs_f32();
                scene.set_transform(id, pose::with_translation(&transform, position));
                schedule.integrated_to = until;
                report.moved += 1;
            }

            if now >= schedule.expires_at {
                self.expire_fireball(id, scene, report);
            }
        }
    }

    fn expire_fireball(&mut self, id: SceneNodeId, scene: &mut SceneGraph, report: &mut SweepReport) {
        let container = self.ensure_container(scene);
        for child in scene.get_children(id) {
            if self.trails.contains_key(child) && scene.reparent_keep_world(container, child) {
                report.orphaned_trails += 1;
            }
        }

        scene.remove_node(id);
        self.fireballs.remove(id);
        report.expired_fireballs += 1;
    }

    fn advance_trails(&mut self, now: Duration, scene: &mut SceneGraph, rng: &mut impl Rng, report: &mut SweepReport) {
        let interval = self.config.fade_interval().as_nanos();
        let fade_end = self.config.fade_duration();
        let last_step = self.config.fade_steps.saturating_sub(1);

        let ids: Vec<SceneNodeId> = self.trails.keys().collect();
        for id in ids {
            if !scene.contains(id) {
                self.trails.remove(id);
                report.dropped += 1;
                continue;
            }
            let Some(schedule) = self.trails.get_mut(id) else {
                continue;
            };

            let elapsed = now.saturating_sub(schedule.spawned_at);
            if elapsed >= fade_end {
                scene.remove_node(id);
                self.trails.remove(id);
                report.expired_trails += 1;
                continue;
            }

            let due = elapsed.as_nanos().checked_div(interval).unwrap_or(0);
            let due = u32::try_from(due).unwrap_or(u32::MAX).min(last_step);
            while schedule.step < due {
                schedule.step += 1;
                scene.set_opacity(id, self.config.fade_opacity(schedule.step));
                scene.set_color(id, random_color(rng));
                report.fade_steps += 1;
            }
        }
    }
}
