//! Sources of tracking data.

use anyhow::{Context, Result};
use glam::Vec3;
use mesh_anchor::MeshEvent;
use serde::{Deserialize, Serialize};
use skeleton::HandSample;
use smol::stream::{self, StreamExt};
use std::path::Path;

/// The two independent sequences a tracking source produces.
pub struct TrackingStreams {
    pub hands: stream::Boxed<HandSample>,
    pub meshes: stream::Boxed<MeshEvent>,
}

/// Something that can start a tracking session.
///
/// Acquisition may fail (no permission, no device). Streams are not restartable:
/// once they end, the session is over.
pub trait TrackingProvider {
    fn acquire(&mut self) -> Result<TrackingStreams>;
}

/// An interactive cube placed before tracking starts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub center: Vec3,
    pub edge: f32,
}

/// A captured session, replayable as a [`TrackingProvider`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default)]
    pub volumes: Vec<VolumeSpec>,
    #[serde(default)]
    pub hands: Vec<HandSample>,
    #[serde(default)]
    pub meshes: Vec<MeshEvent>,
}

impl Recording {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording: {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("Failed to parse recording: {}", path.display()))
    }
}

/// Replays a [`Recording`] once.
#[derive(Debug)]
pub struct RecordingProvider {
    recording: Option<Recording>,
}

impl RecordingProvider {
    pub fn new(recording: Recording) -> Self {
        Self {
            recording: Some(recording),
        }
    }
}

impl TrackingProvider for RecordingProvider {
    fn acquire(&mut self) -> Result<TrackingStreams> {
        let recording = self
            .recording
            .take()
            .context("recording has already been replayed")?;

        Ok(TrackingStreams {
            hands: stream::iter(recording.hands).boxed(),
            meshes: stream::iter(recording.meshes).boxed(),
        })
    }
}

/// A provider whose acquisition always fails.
#[derive(Debug, Clone)]
pub struct UnavailableProvider {
    pub reason: String,
}

impl TrackingProvider for UnavailableProvider {
    fn acquire(&mut self) -> Result<TrackingStreams> {
        Err(anyhow::anyhow!("tracking unavailable: {}", self.reason))
    }
}
