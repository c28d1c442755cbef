//! Telemetry cache
//!
//! The writer replaces the published `Arc` under the write lock; readers take
//! the read lock only long enough to clone the `Arc`. A published snapshot is
//! never mutated, so readers can hold it as long as they like.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use tss_wire::Payload;

use crate::TelemetrySnapshot;

/// Result of one merge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateResult {
    pub was_online: bool,
    pub online: bool,
}

impl UpdateResult {
    pub fn went_online(&self) -> bool {
        !self.was_online && self.online
    }

    pub fn went_offline(&self) -> bool {
        self.was_online && !self.online
    }
}

/// Shared telemetry state, written by the poll driver
#[derive(Debug, Default)]
pub struct TelemetryCache {
    current: RwLock<Arc<TelemetrySnapshot>>,
}

impl TelemetryCache {
    pub fn new() -> Self {
        TelemetryCache::default()
    }

    /// Merge one poll cycle.
    ///
    /// An absent domain keeps its previous value. The source is online only
    /// if both domains arrived, and only then is `last_updated` stamped.
    pub fn update(&self, eva: Option<Payload>, ltv: Option<Payload>) -> UpdateResult {
        self.update_at(eva, ltv, SystemTime::now())
    }

    pub fn update_at(
        &self,
        eva: Option<Payload>,
        ltv: Option<Payload>,
        now: SystemTime,
    ) -> UpdateResult {
        let mut current = self.current.write();
        let was_online = current.source_online;
        let online = eva.is_some() && ltv.is_some();

        // Clones only if a reader still holds the previous snapshot
        let next = Arc::make_mut(&mut *current);
        if let Some(eva) = eva {
            next.eva = eva;
        }
        if let Some(ltv) = ltv {
            next.ltv = ltv;
        }
        next.source_online = online;
        if online {
            next.last_updated = Some(now);
        }

        UpdateResult { was_online, online }
    }

    /// Shared handle to the latest published snapshot
    pub fn current(&self) -> Arc<TelemetrySnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Independent deep copy of the latest snapshot
    pub fn snapshot(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::clone(&self.current())
    }

    pub fn is_online(&self) -> bool {
        self.current.read().source_online
    }
}
