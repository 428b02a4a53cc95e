//! The `MobilityStateStore` — one mobility record per client, shared safely
//! across tasks.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use wm_core::{AgentAddr, ClientMac, Dbm, Timestamp};

use crate::{MobilityError, MobilityRecord, MobilityResult};

/// A single client's record behind its own async lock.
///
/// Holding the lock is what serializes decision-and-commit for that client:
/// the manager keeps it across the scan, the handoff dispatch, and the final
/// write, so two events for one client can never decide against the same
/// stale record.
pub type SharedRecord = Arc<Mutex<MobilityRecord>>;

#[cfg(feature = "fx-hash")]
type ClientHasher = rustc_hash::FxBuildHasher;
#[cfg(not(feature = "fx-hash"))]
type ClientHasher = std::collections::hash_map::RandomState;

/// Concurrent map `ClientMac → SharedRecord`.
///
/// The outer map is sharded (`DashMap`), so lookups for different clients
/// don't contend; each record then has its own lock.  Map shard guards are
/// never held across an `.await`.
pub struct MobilityStateStore {
    records: DashMap<ClientMac, SharedRecord, ClientHasher>,
}

impl Default for MobilityStateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MobilityStateStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::with_hasher(ClientHasher::default()),
        }
    }

    /// Return the record for `client`, creating an unassigned one seeded with
    /// `initial` / `now` / `reporting` if none exists.
    ///
    /// Creation happens under the map's shard lock, so concurrent callers for
    /// the same client all get the same record and exactly one of them sees
    /// `created == true`.
    pub fn get_or_create(
        &self,
        client:    ClientMac,
        initial:   Dbm,
        now:       Timestamp,
        reporting: AgentAddr,
    ) -> (SharedRecord, bool) {
        let mut created = false;
        let entry = self.records.entry(client).or_insert_with(|| {
            created = true;
            Arc::new(Mutex::new(MobilityRecord::unassigned(initial, now, reporting)))
        });
        (Arc::clone(entry.value()), created)
    }

    /// The shared record for `client`, if one exists.
    pub fn get(&self, client: ClientMac) -> Option<SharedRecord> {
        self.records.get(&client).map(|r| Arc::clone(r.value()))
    }

    /// A copy of `client`'s record as of now.
    ///
    /// Waits for any in-flight decision on that client to finish.
    pub async fn snapshot(&self, client: ClientMac) -> Option<MobilityRecord> {
        let record = self.get(client)?;
        let guard  = record.lock().await;
        Some(*guard)
    }

    /// Apply `mutation` to `client`'s record under its lock.
    ///
    /// # Errors
    ///
    /// [`MobilityError::ClientNotTracked`] if no record exists; records are
    /// only ever created through [`get_or_create`](Self::get_or_create).
    pub async fn update<F, R>(&self, client: ClientMac, mutation: F) -> MobilityResult<R>
    where
        F: FnOnce(&mut MobilityRecord) -> R,
    {
        let record    = self.get(client).ok_or(MobilityError::ClientNotTracked(client))?;
        let mut guard = record.lock().await;
        Ok(mutation(&mut *guard))
    }

    /// Number of tracked clients.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Every tracked client, in address order.
    pub fn clients(&self) -> Vec<ClientMac> {
        let mut clients: Vec<ClientMac> = self.records.iter().map(|e| *e.key()).collect();
        clients.sort();
        clients
    }
}
