//! Store behavior options.

/// How mutations relate to persistence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistencePolicy {
    /// Apply in memory, then save. A failed save is reported to the caller
    /// but the in-memory state keeps the mutation.
    #[default]
    BestEffort,
    /// Save the next state first; commit it in memory only if the save
    /// succeeded.
    WriteThrough,
}

/// What `HabitStore::open` does with an unreadable snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadFallback {
    /// Log the failure and open with an empty collection. The stored snapshot
    /// is left untouched until the next successful mutation.
    #[default]
    StartEmpty,
    /// Fail `open` with the storage error.
    Fail,
}

/// Options for `HabitStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub persistence: PersistencePolicy,
    pub load_fallback: LoadFallback,
    /// Persisted alongside every snapshot when set.
    pub version_stamp: Option<String>,
}

impl StoreConfig {
    pub fn with_persistence(mut self, persistence: PersistencePolicy) -> Self {
        self.persistence = persistence;
        self
    }

    pub fn with_load_fallback(mut self, load_fallback: LoadFallback) -> Self {
        self.load_fallback = load_fallback;
        self
    }

    pub fn with_version_stamp(mut self, version: impl Into<String>) -> Self {
        self.version_stamp = Some(version.into());
        self
    }
}
