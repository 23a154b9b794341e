//! # Tracking Session
//!
//! A [`Session`] is the single actor that owns the scene, the skeleton, the mesh
//! anchor store and the live effects. It starts [`Idle`](SessionPhase::Idle) with
//! an empty scene that interactive volumes can be placed into. Acquiring a
//! [`TrackingProvider`] builds the hands and moves it to
//! [`Ready`](SessionPhase::Ready); only then are samples accepted.
//!
//! [`Session::run`] forwards the provider's hand and mesh streams into one channel
//! and drains it from a single loop, so handlers never overlap. Effect timing is
//! driven by hand sample timestamps rather than wall-clock time.
//!
//! A mesh protocol violation halts the session for good.

mod config;
pub mod logger;
mod provider;

pub use config::SessionConfig;
pub use provider::{Recording, RecordingProvider, TrackingProvider, TrackingStreams, UnavailableProvider, VolumeSpec};

use anyhow::Context;
use effects::{EffectManager, SweepReport};
use glam::Vec3;
use interaction::GestureSpawn;
use mesh_anchor::{MeshAnchorStore, MeshChange, MeshEvent, MeshStoreError};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scene::{NodeKind, SceneGraph, SceneNode, SceneNodeId, Shape};
use skeleton::{HandSample, Skeleton, UpdateOutcome};
use smol::stream::StreamExt;
use smol::{channel, future};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session is not tracking yet")]
    NotReady,
    #[error("session has halted")]
    Halted,
    #[error(transparent)]
    Mesh(#[from] MeshStoreError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Ready,
    Halted,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Ready => write!(f, "ready"),
            SessionPhase::Halted => write!(f, "halted"),
        }
    }
}

/// State that only exists once tracking has been acquired.
struct Tracking {
    skeleton: Skeleton,
    store: MeshAnchorStore,
    effects: Option<EffectManager>,
    /// Latest hand sample time seen; never moves backwards.
    clock: Duration,
}

enum Phase {
    Idle,
    Ready(Tracking),
    Halted(Tracking),
}

enum SessionInput {
    Hand(HandSample),
    Mesh(MeshEvent),
}

/// What one hand sample led to.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameReport {
    pub outcome: UpdateOutcome,
    pub touched: Vec<SceneNodeId>,
    pub gesture: Option<GestureSpawn>,
    pub spawned: Option<SceneNodeId>,
    pub sweep: SweepReport,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub hand_samples: usize,
    pub discarded_samples: usize,
    pub touches: usize,
    pub gestures: usize,
    pub mesh_events: usize,
    pub dropped_mesh_events: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionSummary {
    pub phase: SessionPhase,
    pub stats: SessionStats,
    pub live_fragments: usize,
    pub live_fireballs: usize,
    pub live_trails: usize,
}

impl fmt::Display for SessionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "phase:              {}", self.phase)?;
        writeln!(
            f,
            "hand samples:       {} ({} discarded)",
            self.stats.hand_samples, self.stats.discarded_samples
        )?;
        writeln!(f, "touches:            {}", self.stats.touches)?;
        writeln!(f, "gestures:           {}", self.stats.gestures)?;
        writeln!(
            f,
            "mesh events:        {} ({} dropped)",
            self.stats.mesh_events, self.stats.dropped_mesh_events
        )?;
        writeln!(f, "live fragments:     {}", self.live_fragments)?;
        write!(
            f,
            "live effects:       {} fireballs, {} trails",
            self.live_fireballs, self.live_trails
        )
    }
}

pub struct Session {
    config: SessionConfig,
    scene: SceneGraph,
    rng: StdRng,
    phase: Phase,
    stats: SessionStats,
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            scene: SceneGraph::new(),
            rng,
            phase: Phase::Idle,
            stats: SessionStats::default(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn phase(&self) -> SessionPhase {
        match self.phase {
            Phase::Idle => SessionPhase::Idle,
            Phase::Ready(_) => SessionPhase::Ready,
            Phase::Halted(_) => SessionPhase::Halted,
        }
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn skeleton(&self) -> Option<&Skeleton> {
        self.tracking().map(|tracking| &tracking.skeleton)
    }

    pub fn mesh_store(&self) -> Option<&MeshAnchorStore> {
        self.tracking().map(|tracking| &tracking.store)
    }

    pub fn effects(&self) -> Option<&EffectManager> {
        self.tracking().and_then(|tracking| tracking.effects.as_ref())
    }

    fn tracking(&self) -> Option<&Tracking> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Ready(tracking) | Phase::Halted(tracking) => Some(tracking),
        }
    }

    /// Places an interactive cube in the scene; allowed in any phase.
    pub fn add_interactive_volume(&mut self, center: Vec3, edge: f32) -> SceneNodeId {
        let volume = self.scene.add(
            SceneNode::new(NodeKind::InteractiveVolume)
                .with_shape(Shape::cube(edge))
                .with_translation(center),
        );
        log::debug!("interactive volume {volume} placed at {center}");
        volume
    }

    /// Acquires the provider's streams and builds the tracked state.
    ///
    /// On failure the error is logged once and the session stays idle.
    pub fn start(&mut self, provider: &mut impl TrackingProvider) -> Option<TrackingStreams> {
        if !matches!(self.phase, Phase::Idle) {
            log::warn!("session already started ({})", self.phase());
            return None;
        }

        let streams = match provider.acquire() {
            Ok(streams) => streams,
            Err(err) => {
                log::error!("failed to start tracking session: {err:#}");
                return None;
            }
        };

        let skeleton = Skeleton::create(&self.config.skeleton, &mut self.scene);
        let effects = self
            .config
            .gesture_effects
            .then(|| EffectManager::new(self.config.effects.clone(), &mut self.scene));
        self.phase = Phase::Ready(Tracking {
            skeleton,
            store: MeshAnchorStore::new(),
            effects,
            clock: Duration::ZERO,
        });
        log::info!("tracking session ready");
        Some(streams)
    }

    /// Runs a session to completion: starts it, then consumes both streams until
    /// they end or a mesh protocol violation halts it.
    ///
    /// A provider that cannot be acquired is not an error; the session stays idle.
    pub async fn run(&mut self, provider: &mut impl TrackingProvider) -> anyhow::Result<()> {
        let Some(streams) = self.start(provider) else {
            return Ok(());
        };
        let TrackingStreams { mut hands, mut meshes } = streams;

        let (tx, rx) = channel::unbounded();
        let hands_tx = tx.clone();
        let forward_hands = async move {
            while let Some(sample) = hands.next().await {
                if hands_tx.send(SessionInput::Hand(sample)).await.is_err() {
                    break;
                }
                future::yield_now().await;
            }
        };
        let forward_meshes = async move {
            while let Some(event) = meshes.next().await {
                if tx.send(SessionInput::Mesh(event)).await.is_err() {
                    break;
                }
                future::yield_now().await;
            }
        };

        let this = &mut *self;
        let consume = async move {
            while let Ok(input) = rx.recv().await {
                match input {
                    SessionInput::Hand(sample) => {
                        this.handle_hand_sample(&sample)?;
                    }
                    SessionInput::Mesh(event) => {
                        this.handle_mesh_event(&event)?;
                    }
                }
            }
            Ok::<(), SessionError>(())
        };

        let (_, result) = future::zip(future::zip(forward_hands, forward_meshes), consume).await;
        result.context("tracking session halted")?;
        log::info!("tracking streams ended");
        Ok(())
    }

    /// Applies one hand sample, then evaluates touch and gesture and sweeps effects.
    pub fn handle_hand_sample(&mut self, sample: &HandSample) -> Result<FrameReport, SessionError> {
        let tracking = match &mut self.phase {
            Phase::Idle => return Err(SessionError::NotReady),
            Phase::Halted(_) => return Err(SessionError::Halted),
            Phase::Ready(tracking) => tracking,
        };

        self.stats.hand_samples += 1;
        if let Ok(now) = Duration::try_from_secs_f64(sample.timestamp) {
            tracking.clock = tracking.clock.max(now);
        }

        let outcome = tracking.skeleton.apply_sample(sample, &mut self.scene);
        let mut touched = Vec::new();
        let mut gesture = None;
        let mut spawned = None;

        if outcome.is_applied() {
            let policy = &self.config.interaction;
            touched = interaction::detect_touch(&tracking.skeleton, &mut self.scene, policy, &mut self.rng);
            gesture = interaction::detect_triangle_gesture(&tracking.skeleton, &self.scene, policy);

            if let (Some(spawn), Some(effects)) = (gesture, tracking.effects.as_mut()) {
                spawned = effects.spawn_effect(
                    spawn.origin,
                    spawn.direction,
                    tracking.clock,
                    &mut self.scene,
                    &mut self.rng,
                );
            }
        } else {
            self.stats.discarded_samples += 1;
        }

        self.stats.touches += touched.len();
        self.stats.gestures += usize::from(gesture.is_some());

        let sweep = match tracking.effects.as_mut() {
            Some(effects) => effects.advance(tracking.clock, &mut self.scene, &mut self.rng),
            None => SweepReport::default(),
        };

        Ok(FrameReport {
            outcome,
            touched,
            gesture,
            spawned,
            sweep,
        })
    }

    /// Reconciles one mesh event. A protocol violation halts the session.
    pub fn handle_mesh_event(&mut self, event: &MeshEvent) -> Result<MeshChange, SessionError> {
        let tracking = match &mut self.phase {
            Phase::Idle => return Err(SessionError::NotReady),
            Phase::Halted(_) => return Err(SessionError::Halted),
            Phase::Ready(tracking) => tracking,
        };

        self.stats.mesh_events += 1;
        let result = tracking.store.on_mesh_event(event, &mut self.scene);
        match result {
            Ok(change) => {
                if change == MeshChange::Dropped {
                    self.stats.dropped_mesh_events += 1;
                }
                Ok(change)
            }
            Err(err) => {
                log::error!("halting session: {err}");
                if let Phase::Ready(tracking) = std::mem::replace(&mut self.phase, Phase::Idle) {
                    self.phase = Phase::Halted(tracking);
                }
                Err(err.into())
            }
        }
    }

    pub fn summary(&self) -> SessionSummary {
        let tracking = self.tracking();
        SessionSummary {
            phase: self.phase(),
            stats: self.stats,
            live_fragments: tracking.map_or(0, |t| t.store.len()),
            live_fireballs: self.effects().map_or(0, |e| e.live_fireballs()),
            live_trails: self.effects().map_or(0, |e| e.live_trails()),
        }
    }
}
