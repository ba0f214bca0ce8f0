//! Connection registry.
//!
//! One concurrent map keyed by connection id. An entry owns the open pool
//! and, for connections created through the manager, their metadata, so the
//! two can only change together. Guards never outlive a method call; pools
//! are cloned out before any I/O.

use dashmap::DashMap;

use crate::manager::ManagedConnection;
use crate::sql::DatabasePool;

/// One registered connection.
#[derive(Default)]
pub struct RegistryEntry {
    /// Open pool; `None` once disconnected.
    pub pool: Option<DatabasePool>,
    /// Manager metadata; `None` for driver-only handles.
    pub managed: Option<ManagedConnection>,
}

impl RegistryEntry {
    fn is_empty(&self) -> bool {
        self.pool.is_none() && self.managed.is_none()
    }
}

/// Sharded map of connection id to [`RegistryEntry`].
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: DashMap<String, RegistryEntry>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pool with no metadata.
    pub fn insert_pool(&self, id: String, pool: DatabasePool) {
        self.entries.insert(
            id,
            RegistryEntry {
                pool: Some(pool),
                managed: None,
            },
        );
    }

    /// Registers a pool together with its metadata.
    pub fn insert_managed(&self, id: String, pool: DatabasePool, managed: ManagedConnection) {
        self.entries.insert(
            id,
            RegistryEntry {
                pool: Some(pool),
                managed: Some(managed),
            },
        );
    }

    /// Clone of the open pool for `id`.
    pub fn pool(&self, id: &str) -> Option<DatabasePool> {
        self.entries.get(id).and_then(|e| e.pool.clone())
    }

    /// Takes the pool out of `id`, dropping the entry if nothing is left.
    pub fn take_pool(&self, id: &str) -> Option<DatabasePool> {
        let pool = self.entries.get_mut(id)?.pool.take();
        self.entries.remove_if(id, |_, e| e.is_empty());
        pool
    }

    /// Clone of the metadata for `id`.
    pub fn managed(&self, id: &str) -> Option<ManagedConnection> {
        self.entries.get(id).and_then(|e| e.managed.clone())
    }

    /// Applies `f` to the entry of `id` while holding its shard lock.
    pub fn update<R>(&self, id: &str, f: impl FnOnce(&mut RegistryEntry) -> R) -> Option<R> {
        self.entries.get_mut(id).map(|mut e| f(&mut *e))
    }

    /// Removes the entry of `id` if it carries metadata.
    pub fn remove_managed(&self, id: &str) -> Option<RegistryEntry> {
        self.entries
            .remove_if(id, |_, e| e.managed.is_some())
            .map(|(_, entry)| entry)
    }

    /// Clones of all metadata records, in no particular order.
    pub fn managed_all(&self) -> Vec<ManagedConnection> {
        self.entries
            .iter()
            .filter_map(|e| e.managed.clone())
            .collect()
    }

    /// Number of entries, managed or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
