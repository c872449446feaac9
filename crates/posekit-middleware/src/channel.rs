//! The channel traits a host environment must implement.
//!
//! Both channels are synchronous and blocking: the pose subsystem is driven
//! from a single control thread and every lookup is a round trip to an
//! external service. Callers needing timeouts wrap calls externally.

use std::time::Duration;

use posekit_types::{TrackingReply, TrackingRequest};

/// A live transform tree that can be queried for the pose of one named
/// frame relative to another.
///
/// # Contract
///
/// * `has_frame` – whether the tree currently knows the frame.
/// * `wait_for_frame` – block until the frame becomes available or the
///   timeout elapses; used once at adapter startup.
/// * `query` – the pose of `source` expressed in `target`, read at the
///   latest time both frames share a transform. `None` when no common
///   transform exists.
pub trait TransformChannel: Send + Sync {
    fn has_frame(&self, frame: &str) -> bool;

    fn wait_for_frame(&self, frame: &str, timeout: Duration) -> bool;

    fn query(&self, target: &str, source: &str) -> Option<([f64; 3], [f64; 4])>;
}

/// The request/response channel to the external tracking subsystem.
///
/// The same mechanism carries motion commands in the action layer; here it
/// is used for read queries only. A reply with `ok == false` means the
/// queried entity is unknown, not that the channel failed.
pub trait TrackingChannel: Send + Sync {
    fn send(&self, request: &TrackingRequest) -> TrackingReply;
}
