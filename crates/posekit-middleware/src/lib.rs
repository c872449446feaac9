//! `posekit-middleware` – backend adapters for the pose subsystem.
//!
//! The resolver never speaks directly to a transform tree or a tracking
//! subsystem. The host environment supplies channel implementations and the
//! adapters in this crate translate between those raw protocols and the
//! resolver's contracts.
//!
//! # Overview
//!
//! - [`channel`] – [`TransformChannel`][channel::TransformChannel] and
//!   [`TrackingChannel`][channel::TrackingChannel]: the traits a host must
//!   implement.
//! - [`transform`] – [`TransformBackend`][transform::TransformBackend]:
//!   fail-soft frame lookups against a live transform tree.
//! - [`tracking`] – [`TrackingBackend`][tracking::TrackingBackend]:
//!   request/response entity lookups with the origin-sentinel policy.

pub mod channel;
pub mod tracking;
pub mod transform;

pub use channel::{TrackingChannel, TransformChannel};
pub use tracking::{DEFAULT_PART, ORIGIN_EPSILON, TrackingBackend};
pub use transform::{STARTUP_WAIT, TransformBackend};
