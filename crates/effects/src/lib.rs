//! Effect lifecycle manager.
//!
//! Gestures spawn a fireball carrying a cloud of fading trail particles. Every
//! timed behavior (fireball lifetime, trail fade steps, motion) lives in a
//! schedule registry keyed by scene node and is driven by one clock-driven
//! sweep, [`EffectManager::advance`]. Nothing runs between sweeps, so the same
//! sequence of `advance` calls always produces the same scene.

mod manager;

pub use manager::{EffectManager, SweepReport};

use handspace_core::color::ColorValue;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EffectConfig {
    /// Fireball speed along the gesture direction, in units per second.
    pub speed: f32,
    /// Seconds a fireball lives.
    pub ttl_secs: f64,
    pub fireball_radius: f32,
    pub fireball_color: ColorValue,
    /// Trail particles attached to each fireball.
    pub trail_count: usize,
    pub trail_radius: f32,
    /// Lateral trail offset range on x and y, in either direction.
    pub trail_jitter: f32,
    /// Maximum backward trail offset along the gesture direction.
    pub trail_back_offset: f32,
    /// Opacity values each trail steps through, starting opacity included.
    pub fade_steps: u32,
    pub fade_start_opacity: f32,
    /// Seconds between fade steps.
    pub fade_interval_secs: f64,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            speed: 15.0,
            ttl_secs: 4.0,
            fireball_radius: 0.05,
            fireball_color: ColorValue::Rgb { r: 1.0, g: 0.45, b: 0.0 },
            trail_count: 8,
            trail_radius: 0.01,
            trail_jitter: 0.05,
            trail_back_offset: 0.1,
            fade_steps: 8,
            fade_start_opacity: 0.7,
            fade_interval_secs: 0.1,
        }
    }
}

impl EffectConfig {
    pub fn ttl(&self) -> Duration {
        secs(self.ttl_secs)
    }

    pub fn fade_interval(&self) -> Duration {
        secs(self.fade_interval_secs)
    }

    /// Time from a trail's spawn until it is removed.
    pub fn fade_duration(&self) -> Duration {
        self.fade_interval() * self.fade_steps
    }

    /// Opacity after `step` fade steps; step 0 is the spawn opacity and the last
    /// step reaches zero.
    pub fn fade_opacity(&self, step: u32) -> f32 {
        if self.fade_steps <= 1 {
            return 0.0;
        }
        let last = (self.fade_steps - 1) as f32;
        let remaining = (last - step as f32).max(0.0) / last;
        self.fade_start_opacity * remaining
    }
}

fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}
