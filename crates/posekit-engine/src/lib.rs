//! `posekit-engine` – pose resolution and normalization.
//!
//! Turns loosely-typed pose references (symbolic names, coordinate
//! sequences, partial field maps) into canonical [`Pose`][posekit_types::Pose]
//! values, consulting the place registry and the live backends in priority
//! order.
//!
//! # Modules
//!
//! - [`convert`] – Euler ↔ quaternion conversions (sxyz convention).
//! - [`normalize`] – [`Normalizer`][normalize::Normalizer]: fills defaults
//!   and converts 3/6/7-element coordinate sequences into canonical poses.
//! - [`places`] – [`PlaceSource`][places::PlaceSource]: the read port over
//!   the symbolic place registry.
//! - [`resolver`] – [`PoseResolver`][resolver::PoseResolver]: the facade
//!   orchestrating registry, transform and tracking strategies.
//! - [`geometry`] – even-odd point-in-polygon containment and zone
//!   membership queries.

pub mod convert;
pub mod geometry;
pub mod normalize;
pub mod places;
pub mod resolver;

pub use normalize::Normalizer;
pub use places::{PlaceSource, StaticPlaces};
pub use resolver::PoseResolver;
