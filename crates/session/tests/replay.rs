use glam::{Mat4, Vec3};
use mesh_anchor::{FragmentId, MeshEvent, MeshEventKind, MeshGeometry};
use scene::NodeKind;
use session::{Recording, RecordingProvider, Session, SessionConfig, SessionPhase, UnavailableProvider, VolumeSpec};
use skeleton::{Chirality, HandSample, JointId, JointSample};

fn tips(chirality: Chirality, timestamp: f64, index: Vec3, thumb: Vec3) -> HandSample {
    HandSample {
        chirality,
        timestamp,
        anchor: Mat4::IDENTITY,
        tracked: true,
        joints: [(JointId::IndexTip, index), (JointId::ThumbTip, thumb)]
            .into_iter()
            .map(|(joint, position)| JointSample {
                joint,
                local: Mat4::from_translation(position),
                tracked: true,
            })
            .collect(),
    }
}

fn mesh(id: u128, kind: MeshEventKind, x: f32) -> MeshEvent {
    MeshEvent {
        id: FragmentId::from_u128(id),
        kind,
        transform: Mat4::from_translation(Vec3::new(x, 0.0, 0.0)),
        geometry: MeshGeometry {
            vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Z],
            triangles: vec![[0, 1, 2]],
        },
    }
}

fn seeded() -> SessionConfig {
    SessionConfig {
        seed: Some(5),
        ..Default::default()
    }
}

fn place_volumes(session: &mut Session, recording: &Recording) {
    for volume in &recording.volumes {
        session.add_interactive_volume(volume.center, volume.edge);
    }
}

#[test]
fn test_replay_full_session() {
    let cube = Vec3::new(0.3, 1.0, -0.5);
    let thumb = Vec3::new(0.0, -0.11, 0.0);
    let gap = Vec3::new(0.005, 0.0, 0.0);

    let recording = Recording {
        volumes: vec![VolumeSpec { center: cube, edge: 0.1 }],
        hands: vec![
            tips(Chirality::Right, 0.0, cube, Vec3::ZERO),
            tips(Chirality::Left, 0.5, Vec3::ZERO, thumb),
            tips(Chirality::Right, 0.5, gap, gap + thumb),
            HandSample {
                chirality: Chirality::Left,
                timestamp: 0.6,
                anchor: Mat4::IDENTITY,
                tracked: false,
                joints: Vec::new(),
            },
            tips(Chirality::Right, 5.0, Vec3::new(1.0, 0.0, 0.0), Vec3::ZERO),
        ],
        meshes: vec![
            mesh(1, MeshEventKind::Added, 0.0),
            mesh(2, MeshEventKind::Added, 1.0),
            mesh(1, MeshEventKind::Updated, 2.0),
            mesh(2, MeshEventKind::Removed, 0.0),
            mesh(9, MeshEventKind::Removed, 0.0),
        ],
    };

    let mut session = Session::new(seeded());
    place_volumes(&mut session, &recording);
    let mut provider = RecordingProvider::new(recording);
    smol::block_on(session.run(&mut provider)).unwrap();

    let summary = session.summary();
    assert_eq!(summary.phase, SessionPhase::Ready);
    assert_eq!(summary.stats.hand_samples, 5);
    assert_eq!(summary.stats.discarded_samples, 1);
    // The right tip stays in the cube while the left hand's first sample lands.
    assert_eq!(summary.stats.touches, 2);
    assert_eq!(summary.stats.gestures, 1);
    assert_eq!(summary.stats.mesh_events, 5);
    assert_eq!(summary.live_fragments, 1);
    // The last sample is 4.5s after the gesture, past the fireball's lifetime.
    assert_eq!(summary.live_fireballs, 0);
    assert_eq!(summary.live_trails, 0);

    let store = session.mesh_store().unwrap();
    let fragment = store.get(FragmentId::from_u128(1)).unwrap();
    assert_eq!(fragment.transform(), Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(session.scene().count_of(NodeKind::MeshFragment), 1);
}

#[test]
fn test_replay_halts_on_protocol_violation() {
    let recording = Recording {
        meshes: vec![mesh(3, MeshEventKind::Updated, 0.0), mesh(4, MeshEventKind::Added, 0.0)],
        ..Default::default()
    };

    let mut session = Session::new(seeded());
    let mut provider = RecordingProvider::new(recording);
    let err = smol::block_on(session.run(&mut provider)).unwrap_err();

    assert!(format!("{err:#}").contains("updated before it was added"));
    assert_eq!(session.phase(), SessionPhase::Halted);
    assert_eq!(session.summary().live_fragments, 0);
}

#[test]
fn test_unavailable_provider_leaves_session_idle() {
    let mut session = Session::new(seeded());
    let mut provider = UnavailableProvider {
        reason: "world sensing denied".into(),
    };

    smol::block_on(session.run(&mut provider)).unwrap();
    assert_eq!(session.phase(), SessionPhase::Idle);
    assert!(session.skeleton().is_none());
}

#[test]
fn test_recording_round_trips_through_json() {
    let recording = Recording {
        volumes: vec![VolumeSpec {
            center: Vec3::ONE,
            edge: 0.2,
        }],
        hands: vec![tips(Chirality::Left, 0.25, Vec3::X, Vec3::Y)],
        meshes: vec![mesh(7, MeshEventKind::Added, 0.0)],
    };
    let json = serde_json::to_string(&recording).unwrap();
    let path = std::env::temp_dir().join(format!("handspace-recording-{}.json", uuid::Uuid::new_v4()));
    std::fs::write(&path, json).unwrap();

    assert_eq!(Recording::load(&path).unwrap(), recording);
    std::fs::remove_file(&path).unwrap();
}
