//! [`PoseResolver`] – the pose subsystem facade.
//!
//! Given a loosely-typed [`PoseRef`], tries an ordered chain of resolution
//! strategies and normalizes whichever succeeds:
//!
//! 1. exact match in the symbolic place registry (authoritative, returned
//!    unchanged),
//! 2. the transform backend, treating the reference as a frame name,
//! 3. the tracking backend, treating the reference as a tracked entity.
//!
//! The order reflects cost: registry reads are local, transform lookups are
//! cheap, tracking lookups are a round trip to an external process. Backend
//! misses are swallowed; only exhaustion of the whole chain surfaces as
//! [`PoseError::UnresolvedReference`]. Literal references (coordinate
//! sequences, field maps) bypass the chain entirely and go straight to the
//! normalizer.

use std::sync::Arc;

use tracing::{debug, warn};

use posekit_middleware::channel::{TrackingChannel, TransformChannel};
use posekit_middleware::tracking::{DEFAULT_PART, TrackingBackend};
use posekit_middleware::transform::TransformBackend;
use posekit_types::{BASE_FRAME, Capabilities, CapabilityProbe, Pose, PoseError, PoseRef};

use crate::geometry::{contains, zone_polygon};
use crate::normalize::Normalizer;
use crate::places::PlaceSource;

/// One step in the resolution chain.
///
/// `Ok(None)` is a miss ("try the next strategy"); `Err` is a hard failure
/// (e.g. a missing conversion capability) that aborts the chain.
trait ResolveStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn resolve(&self, reference: &str) -> Result<Option<Pose>, PoseError>;
}

struct PlaceStrategy {
    places: Arc<dyn PlaceSource>,
}

impl ResolveStrategy for PlaceStrategy {
    fn name(&self) -> &'static str {
        "places"
    }

    fn resolve(&self, reference: &str) -> Result<Option<Pose>, PoseError> {
        // Registry entries are already canonical, no renormalization.
        Ok(self.places.lookup(reference))
    }
}

struct TransformStrategy {
    backend: TransformBackend,
    normalizer: Normalizer,
}

impl ResolveStrategy for TransformStrategy {
    fn name(&self) -> &'static str {
        "transform"
    }

    fn resolve(&self, reference: &str) -> Result<Option<Pose>, PoseError> {
        let Some(([x, y, z], [qx, qy, qz, qw])) = self.backend.lookup(reference) else {
            return Ok(None);
        };
        let pose = self
            .normalizer
            .normalize(&PoseRef::Coords(vec![x, y, z, qx, qy, qz, qw]))?;
        Ok(Some(pose))
    }
}

struct TrackingStrategy {
    backend: Arc<TrackingBackend>,
    normalizer: Normalizer,
}

impl ResolveStrategy for TrackingStrategy {
    fn name(&self) -> &'static str {
        "tracking"
    }

    fn resolve(&self, reference: &str) -> Result<Option<Pose>, PoseError> {
        let Some(coords) = self.backend.lookup(reference, DEFAULT_PART) else {
            return Ok(None);
        };
        let pose = self.normalizer.normalize(&PoseRef::Coords(coords.to_vec()))?;
        Ok(Some(pose))
    }
}

/// The pose subsystem facade, constructed once per robot session.
///
/// Capabilities are probed at construction and never change; a missing
/// backend is logged and the resolver degrades to the remaining
/// strategies. The resolver holds no cache: every [`PoseResolver::get`]
/// re-queries the registry and the live backends.
pub struct PoseResolver {
    strategies: Vec<Box<dyn ResolveStrategy>>,
    tracking: Option<Arc<TrackingBackend>>,
    normalizer: Normalizer,
    places: Arc<dyn PlaceSource>,
}

impl PoseResolver {
    /// Probe capabilities and wire up whichever backends the host supplied.
    ///
    /// A backend strategy is installed only when the probe grants the
    /// capability *and* a channel was provided; the transform backend may
    /// block briefly waiting for its initial data.
    pub fn connect(
        places: Arc<dyn PlaceSource>,
        probe: &dyn CapabilityProbe,
        transform: Option<Box<dyn TransformChannel>>,
        tracking: Option<Box<dyn TrackingChannel>>,
    ) -> Self {
        let mut caps = Capabilities::probe(probe);
        let transform = transform.filter(|_| caps.transform);
        let tracking = tracking.filter(|_| caps.tracking);
        caps.transform = transform.is_some();
        caps.tracking = tracking.is_some();

        let normalizer = Normalizer::new(caps);

        let mut strategies: Vec<Box<dyn ResolveStrategy>> = vec![Box::new(PlaceStrategy {
            places: Arc::clone(&places),
        })];

        if let Some(channel) = transform {
            strategies.push(Box::new(TransformStrategy {
                backend: TransformBackend::connect(channel),
                normalizer,
            }));
        } else {
            warn!("no transform backend; frame lookups won't be available");
        }

        let tracking_backend = if let Some(channel) = tracking {
            let backend = Arc::new(TrackingBackend::new(channel));
            strategies.push(Box::new(TrackingStrategy {
                backend: Arc::clone(&backend),
                normalizer,
            }));
            Some(backend)
        } else {
            warn!("no tracking backend; tracked-entity poses won't be available");
            None
        };

        if !caps.orientation_conversion {
            warn!("no orientation conversion; euler-angle inputs will be rejected");
        }

        Self {
            strategies,
            tracking: tracking_backend,
            normalizer,
            places,
        }
    }

    /// Resolve a loosely-typed pose reference into a canonical [`Pose`].
    pub fn get(&self, raw: &PoseRef) -> Result<Pose, PoseError> {
        match raw {
            PoseRef::Name(name) => {
                for strategy in &self.strategies {
                    if let Some(pose) = strategy.resolve(name)? {
                        debug!(%name, strategy = strategy.name(), "reference resolved");
                        return Ok(pose);
                    }
                }
                Err(PoseError::UnresolvedReference(name.clone()))
            }
            PoseRef::EntityPart { entity, part } => self.entity_part_pose(entity, part),
            literal => self.normalizer.normalize(literal),
        }
    }

    /// Resolve a tracked entity qualified by a sub-part.
    ///
    /// Entity/part pairs only ever come from the tracking subsystem; the
    /// registry and the transform tree are not consulted.
    pub fn entity_part_pose(&self, entity: &str, part: &str) -> Result<Pose, PoseError> {
        let Some(tracking) = &self.tracking else {
            return Err(PoseError::UnresolvedReference(format!("{entity}/{part}")));
        };
        match tracking.lookup(entity, part) {
            Some(coords) => self.normalizer.normalize(&PoseRef::Coords(coords.to_vec())),
            None => Err(PoseError::UnresolvedReference(format!("{entity}/{part}"))),
        }
    }

    /// The current pose of the robot base.
    pub fn base_pose(&self) -> Result<Pose, PoseError> {
        self.get(&PoseRef::name(BASE_FRAME))
    }

    /// Whether a pose's planar position falls within the zone spanned by
    /// four named corner places, in registry order.
    pub fn in_zone(&self, pose: &Pose, corners: [&str; 4]) -> Result<bool, PoseError> {
        let polygon = zone_polygon(self.places.as_ref(), corners)?;
        Ok(contains(pose.xy(), &polygon))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::places::StaticPlaces;
    use posekit_types::{Capability, FixedProbe, PoseFields, TrackingReply, TrackingRequest};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ── Test doubles ────────────────────────────────────────────────────────

    struct TreeState {
        frames: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[derive(Clone)]
    struct FakeTree(Arc<TreeState>);

    impl FakeTree {
        fn with_frames(frames: Vec<&'static str>) -> Self {
            Self(Arc::new(TreeState {
                frames,
                calls: AtomicUsize::new(0),
            }))
        }
    }

    impl TransformChannel for FakeTree {
        fn has_frame(&self, frame: &str) -> bool {
            frame == posekit_types::MAP_FRAME || self.0.frames.contains(&frame)
        }

        fn wait_for_frame(&self, _frame: &str, _timeout: Duration) -> bool {
            true
        }

        fn query(&self, _target: &str, source: &str) -> Option<([f64; 3], [f64; 4])> {
            self.0.calls.fetch_add(1, Ordering::SeqCst);
            if self.0.frames.contains(&source) {
                Some(([2.0, 3.0, 0.0], [0.0, 0.0, 0.0, 1.0]))
            } else {
                None
            }
        }
    }

    struct TrackerState {
        entities: Vec<&'static str>,
        calls: Mutex<Vec<TrackingRequest>>,
    }

    #[derive(Clone)]
    struct FakeTracker(Arc<TrackerState>);

    impl FakeTracker {
        fn with_entities(entities: Vec<&'static str>) -> Self {
            Self(Arc::new(TrackerState {
                entities,
                calls: Mutex::new(Vec::new()),
            }))
        }
    }

    impl TrackingChannel for FakeTracker {
        fn send(&self, request: &TrackingRequest) -> TrackingReply {
            self.0.calls.lock().unwrap().push(request.clone());
            let entity = request.args[0].as_str();
            if self.0.entities.contains(&entity) {
                TrackingReply {
                    ok: true,
                    // (yaw, pitch, roll, x, y, z)
                    payload: vec![0.0, 0.0, 0.0, 7.0, 8.0, 0.9],
                }
            } else {
                TrackingReply {
                    ok: false,
                    payload: vec![],
                }
            }
        }
    }

    fn full_probe() -> FixedProbe {
        FixedProbe::new()
            .grant(Capability::TransformBackend)
            .grant(Capability::TrackingBackend)
            .grant(Capability::OrientationConversion)
    }

    fn known_place() -> Pose {
        Pose {
            x: 1.5,
            y: -0.5,
            z: 0.8,
            qw: 1.0,
            ..Pose::default()
        }
    }

    // ── Chain ordering ──────────────────────────────────────────────────────

    #[test]
    fn known_place_wins_without_consulting_backends() {
        let places = Arc::new(StaticPlaces::new().with("kitchen_table", known_place()));
        let tree = FakeTree::with_frames(vec!["kitchen_table"]);
        let tracker = FakeTracker::with_entities(vec!["kitchen_table"]);

        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            Some(Box::new(tree.clone())),
            Some(Box::new(tracker.clone())),
        );

        let pose = resolver.get(&PoseRef::name("kitchen_table")).unwrap();
        assert_eq!(pose, known_place());
        assert_eq!(tree.0.calls.load(Ordering::SeqCst), 0);
        assert!(tracker.0.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn unknown_place_falls_through_to_transform() {
        let places = Arc::new(StaticPlaces::new());
        let tree = FakeTree::with_frames(vec!["gripper"]);
        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            Some(Box::new(tree)),
            None,
        );

        let pose = resolver.get(&PoseRef::name("gripper")).unwrap();
        assert_eq!(pose.x, 2.0);
        assert_eq!(pose.y, 3.0);
        assert_eq!(pose.qw, 1.0);
        assert_eq!(pose.frame, "map");
    }

    #[test]
    fn transform_miss_falls_through_to_tracking() {
        let places = Arc::new(StaticPlaces::new());
        let tree = FakeTree::with_frames(vec![]);
        let tracker = FakeTracker::with_entities(vec!["human_1"]);
        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            Some(Box::new(tree)),
            Some(Box::new(tracker.clone())),
        );

        let pose = resolver.get(&PoseRef::name("human_1")).unwrap();
        assert_eq!(pose.x, 7.0);
        assert_eq!(pose.y, 8.0);
        // Identity orientation out of zero euler angles.
        assert_eq!(pose.qw, 1.0);

        let calls = tracker.0.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].args, vec!["human_1", DEFAULT_PART]);
    }

    #[test]
    fn exhausted_chain_names_the_reference() {
        let places = Arc::new(StaticPlaces::new());
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let err = resolver.get(&PoseRef::name("ghost")).unwrap_err();
        assert_eq!(err, PoseError::UnresolvedReference("ghost".to_string()));
    }

    #[test]
    fn ungranted_capability_skips_a_supplied_channel() {
        // Probe grants nothing: the channels must never be installed.
        let places = Arc::new(StaticPlaces::new());
        let tree = FakeTree::with_frames(vec!["gripper"]);
        let resolver = PoseResolver::connect(
            places,
            &FixedProbe::new(),
            Some(Box::new(tree.clone())),
            None,
        );

        assert!(resolver.get(&PoseRef::name("gripper")).is_err());
        assert_eq!(tree.0.calls.load(Ordering::SeqCst), 0);
    }

    // ── Literal references bypass the chain ─────────────────────────────────

    #[test]
    fn coordinate_sequence_goes_straight_to_the_normalizer() {
        let places = Arc::new(StaticPlaces::new());
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let pose = resolver.get(&PoseRef::Coords(vec![1.0, 2.0, 3.0])).unwrap();
        assert_eq!((pose.x, pose.y, pose.z), (1.0, 2.0, 3.0));
    }

    #[test]
    fn field_map_goes_straight_to_the_normalizer() {
        let places = Arc::new(StaticPlaces::new());
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let pose = resolver
            .get(&PoseRef::Fields(PoseFields {
                z: Some(0.5),
                ..PoseFields::default()
            }))
            .unwrap();
        assert_eq!(pose.z, 0.5);
        assert_eq!(pose.frame, "map");
    }

    #[test]
    fn malformed_sequence_fails_without_consulting_backends() {
        let places = Arc::new(StaticPlaces::new());
        let tracker = FakeTracker::with_entities(vec![]);
        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            None,
            Some(Box::new(tracker.clone())),
        );

        let err = resolver
            .get(&PoseRef::Coords(vec![1.0, 2.0, 3.0, 4.0]))
            .unwrap_err();
        assert!(matches!(err, PoseError::MalformedPose(_)));
        assert!(tracker.0.calls.lock().unwrap().is_empty());
    }

    // ── Entity/part pairs ───────────────────────────────────────────────────

    #[test]
    fn entity_part_pair_queries_tracking_with_both() {
        let places = Arc::new(StaticPlaces::new());
        let tracker = FakeTracker::with_entities(vec!["human_1"]);
        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            None,
            Some(Box::new(tracker.clone())),
        );

        let pose = resolver
            .get(&PoseRef::entity_part("human_1", "Pelvis"))
            .unwrap();
        assert_eq!(pose.x, 7.0);

        let calls = tracker.0.calls.lock().unwrap();
        assert_eq!(calls[0].args, vec!["human_1", "Pelvis"]);
    }

    #[test]
    fn entity_part_pair_without_tracking_is_unresolved() {
        let places = Arc::new(StaticPlaces::new());
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let err = resolver
            .get(&PoseRef::entity_part("human_1", "Pelvis"))
            .unwrap_err();
        assert_eq!(
            err,
            PoseError::UnresolvedReference("human_1/Pelvis".to_string())
        );
    }

    // ── Convenience queries ─────────────────────────────────────────────────

    #[test]
    fn base_pose_resolves_the_base_frame() {
        let places = Arc::new(StaticPlaces::new());
        let tree = FakeTree::with_frames(vec![BASE_FRAME]);
        let resolver = PoseResolver::connect(
            places,
            &full_probe(),
            Some(Box::new(tree)),
            None,
        );

        let pose = resolver.base_pose().unwrap();
        assert_eq!(pose.x, 2.0);
    }

    #[test]
    fn in_zone_uses_registry_corners() {
        fn corner(x: f64, y: f64) -> Pose {
            Pose {
                x,
                y,
                ..Pose::default()
            }
        }

        let places = Arc::new(
            StaticPlaces::new()
                .with("STAGE_A", corner(0.0, 0.0))
                .with("STAGE_B", corner(4.0, 0.0))
                .with("STAGE_C", corner(4.0, 3.0))
                .with("STAGE_D", corner(0.0, 3.0)),
        );
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let on_stage = Pose {
            x: 2.0,
            y: 1.0,
            ..Pose::default()
        };
        let off_stage = Pose {
            x: 9.0,
            y: 1.0,
            ..Pose::default()
        };
        let corners = ["STAGE_A", "STAGE_B", "STAGE_C", "STAGE_D"];

        assert!(resolver.in_zone(&on_stage, corners).unwrap());
        assert!(!resolver.in_zone(&off_stage, corners).unwrap());
    }

    #[test]
    fn in_zone_with_missing_corner_is_unresolved() {
        let places = Arc::new(StaticPlaces::new());
        let resolver = PoseResolver::connect(places, &full_probe(), None, None);

        let err = resolver
            .in_zone(&Pose::default(), ["STAGE_A", "STAGE_B", "STAGE_C", "STAGE_D"])
            .unwrap_err();
        assert!(matches!(err, PoseError::UnresolvedReference(_)));
    }
}
