//! [`TransformBackend`] – frame lookups against a live transform tree.
//!
//! Wraps a [`TransformChannel`] and fails soft everywhere: an unready tree
//! or an unknown frame is logged and reported as `None`, never as an error,
//! so the resolver can fall through to its next strategy.

use std::time::Duration;

use tracing::{debug, error};

use posekit_types::MAP_FRAME;

use crate::channel::TransformChannel;

/// How long the adapter waits at startup for the canonical frame to appear
/// in the transform tree.
pub const STARTUP_WAIT: Duration = Duration::from_secs(1);

/// Adapter over a live transform tree.
///
/// Constructed once per session. If the canonical frame does not become
/// available within [`STARTUP_WAIT`], the adapter marks itself unready and
/// every subsequent lookup returns `None`.
pub struct TransformBackend {
    channel: Box<dyn TransformChannel>,
    ready: bool,
}

impl TransformBackend {
    /// Connect to the transform tree, blocking up to [`STARTUP_WAIT`] for
    /// the canonical frame.
    pub fn connect(channel: Box<dyn TransformChannel>) -> Self {
        let ready = channel.wait_for_frame(MAP_FRAME, STARTUP_WAIT);
        if !ready {
            error!(
                frame = MAP_FRAME,
                "canonical frame did not become available; transform lookups disabled"
            );
        }
        Self { channel, ready }
    }

    /// The pose of `frame` in the canonical frame, as `(position,
    /// quaternion)`, or `None` if either frame is currently unknown.
    ///
    /// The result is already expressed in the canonical frame, so no
    /// conversion is applied beyond normalization downstream.
    pub fn lookup(&self, frame: &str) -> Option<([f64; 3], [f64; 4])> {
        if !self.ready {
            return None;
        }

        if self.channel.has_frame(frame) && self.channel.has_frame(MAP_FRAME) {
            if let Some(result) = self.channel.query(MAP_FRAME, frame) {
                return Some(result);
            }
        }

        debug!(%frame, target = MAP_FRAME, "could not read frame pose from the transform tree");
        None
    }
}
