//! [`TrackingBackend`] – entity lookups against the vision/tracking
//! subsystem.
//!
//! Wraps a [`TrackingChannel`] carrying the generic request envelope. All
//! misses (`ok == false`, malformed payloads, the origin sentinel) are soft:
//! they return `None` so the resolver can report exhaustion on its own
//! terms.

use tracing::{debug, info, warn};

use posekit_types::{TrackingReply, TrackingRequest};

use crate::channel::TrackingChannel;

/// Entities reported closer than this to the tracking origin on both planar
/// axes are considered not actually tracked (still at their uninitialized
/// origin), in distance units of the tracking subsystem.
pub const ORIGIN_EPSILON: f64 = 0.1;

/// The sub-part queried when the caller does not name one.
pub const DEFAULT_PART: &str = "default";

const TRACKER_MODULE: &str = "tracker";

/// Adapter over the external tracking subsystem.
pub struct TrackingBackend {
    channel: Box<dyn TrackingChannel>,
}

impl TrackingBackend {
    pub fn new(channel: Box<dyn TrackingChannel>) -> Self {
        Self { channel }
    }

    /// The absolute pose of `part` of `entity`, as `(x, y, z, roll, pitch,
    /// yaw)` in the canonical frame, or `None` if the entity is unknown or
    /// not yet tracked.
    pub fn lookup(&self, entity: &str, part: &str) -> Option<[f64; 6]> {
        let request = TrackingRequest::new(
            TRACKER_MODULE,
            "GetEntityPose",
            vec![entity.to_string(), part.to_string()],
        );
        self.process(entity, self.channel.send(&request))
    }

    /// The pose of `entity` expressed relative to another tracked entity,
    /// following the same reply protocol as [`TrackingBackend::lookup`].
    pub fn relative(&self, entity: &str, reference: &str) -> Option<[f64; 6]> {
        let request = TrackingRequest::new(
            TRACKER_MODULE,
            "GetRelativePose",
            vec![entity.to_string(), reference.to_string()],
        );
        self.process(entity, self.channel.send(&request))
    }

    fn process(&self, entity: &str, reply: TrackingReply) -> Option<[f64; 6]> {
        if !reply.ok {
            debug!(%entity, "tracking subsystem does not know this entity");
            return None;
        }

        let &[yaw, pitch, roll, x, y, z] = reply.payload.as_slice() else {
            warn!(
                %entity,
                len = reply.payload.len(),
                "tracking reply payload is not six floats"
            );
            return None;
        };

        if x.abs() < ORIGIN_EPSILON && y.abs() < ORIGIN_EPSILON {
            info!(%entity, "entity still at tracking origin, considered not tracked");
            return None;
        }

        Some([x, y, z, roll, pitch, yaw])
    }
}
