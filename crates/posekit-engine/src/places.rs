//! [`PlaceSource`] – the read port over the symbolic place registry.
//!
//! The registry is maintained outside this workspace and may be reloaded
//! between calls, so consumers take a fresh snapshot on every lookup rather
//! than caching its contents.

use std::collections::BTreeMap;

use posekit_types::Pose;

/// Read access to the symbolic place registry.
///
/// Entries are assumed already canonical: the resolver returns them
/// unchanged, without renormalization.
pub trait PlaceSource: Send + Sync {
    /// A fresh snapshot of every known place.
    fn snapshot(&self) -> BTreeMap<String, Pose>;

    /// Convenience exact-match lookup against a fresh snapshot.
    fn lookup(&self, name: &str) -> Option<Pose> {
        self.snapshot().get(name).cloned()
    }
}

/// A fixed in-memory place registry, for hosts whose positions library is
/// loaded once at startup (and for tests).
#[derive(Debug, Clone, Default)]
pub struct StaticPlaces {
    places: BTreeMap<String, Pose>,
}

impl StaticPlaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a named place.
    pub fn with(mut self, name: impl Into<String>, pose: Pose) -> Self {
        self.places.insert(name.into(), pose);
        self
    }
}

impl PlaceSource for StaticPlaces {
    fn snapshot(&self) -> BTreeMap<String, Pose> {
        self.places.clone()
    }
}
