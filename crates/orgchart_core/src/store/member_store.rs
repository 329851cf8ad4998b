//! Member collection persistence over a `BlobStore`.
//!
//! # Responsibility
//! - Load the member list, falling back to the seed when stored data is
//!   missing, unreadable, from the legacy schema or lacks the sentinel record.
//! - Run record-level migration on every load and re-persist on change.
//! - Save the whole collection as one JSON array.
//!
//! # Invariants
//! - `load` never fails because of stored content; only blob I/O errors surface.
//! - A successful `load` leaves the blob equal to the returned collection.

use super::blob_store::BlobStore;
use super::migrate::{migrate, MigrationReport};
use super::seed::Seed;
use super::{StoreError, StoreResult};
use crate::model::member::Member;
use log::{info, warn};
use serde_json::Value;

/// Default blob key for the member collection.
pub const DEFAULT_STORAGE_KEY: &str = "orgChartMembers";

/// Why `load` returned the seed instead of stored data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// Nothing stored under the key.
    Empty,
    /// Stored blob is not a JSON array of member records.
    Unreadable,
    /// First stored record lacks `reportsTo`.
    LegacySchema,
    /// Stored records do not contain the seed's sentinel id.
    MissingSentinel,
}

impl FallbackReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Unreadable => "unreadable",
            Self::LegacySchema => "legacy_schema",
            Self::MissingSentinel => "missing_sentinel",
        }
    }
}

/// Where a loaded collection came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    Stored(MigrationReport),
    Seed(FallbackReason),
}

/// Result of [`MemberStore::load_detailed`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub members: Vec<Member>,
    pub source: LoadSource,
}

/// Whole-collection member persistence.
pub struct MemberStore<B: BlobStore> {
    blobs: B,
    key: String,
    seed: Seed,
}

impl<B: BlobStore> MemberStore<B> {
    /// Creates a store using the default key and the shipped seed.
    pub fn new(blobs: B) -> Self {
        Self::with_seed(blobs, DEFAULT_STORAGE_KEY, Seed::default_org())
    }

    /// Creates a store with an explicit key and seed.
    pub fn with_seed(blobs: B, key: impl Into<String>, seed: Seed) -> Self {
        Self {
            blobs,
            key: key.into(),
            seed,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn blobs(&self) -> &B {
        &self.blobs
    }

    /// Loads the member collection. See [`MemberStore::load_detailed`].
    pub fn load(&self) -> StoreResult<Vec<Member>> {
        self.load_detailed().map(|outcome| outcome.members)
    }

    /// Loads the member collection and reports where it came from.
    ///
    /// # Errors
    /// - Blob store read/write failures.
    pub fn load_detailed(&self) -> StoreResult<LoadOutcome> {
        let Some(raw) = self.blobs.get(&self.key)? else {
            return self.fall_back(FallbackReason::Empty);
        };

        let records = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(records) => records,
            Err(err) => {
                warn!("event=store_load module=store status=unreadable error={err}");
                return self.fall_back(FallbackReason::Unreadable);
            }
        };

        if records
            .first()
            .is_some_and(|first| first.get("reportsTo").is_none())
        {
            return self.fall_back(FallbackReason::LegacySchema);
        }

        let mut members = match records
            .into_iter()
            .map(serde_json::from_value::<Member>)
            .collect::<Result<Vec<_>, _>>()
        {
            Ok(members) => members,
            Err(err) => {
                warn!("event=store_load module=store status=unreadable error={err}");
                return self.fall_back(FallbackReason::Unreadable);
            }
        };

        if let Some(sentinel) = self.seed.sentinel_id {
            if !members.iter().any(|member| member.id == sentinel) {
                self.blobs.remove(&self.key)?;
                return self.fall_back(FallbackReason::MissingSentinel);
            }
        }

        let report = migrate(&mut members, self.seed.fixes);
        if report.changed {
            self.save(&members)?;
        }
        info!(
            "event=store_load module=store status=ok source=stored count={} migrated={}",
            members.len(),
            report.changed
        );
        Ok(LoadOutcome {
            members,
            source: LoadSource::Stored(report),
        })
    }

    /// Serializes and stores the whole collection, replacing the previous blob.
    pub fn save(&self, members: &[Member]) -> StoreResult<()> {
        let encoded = serde_json::to_string(members).map_err(StoreError::Encode)?;
        self.blobs.put(&self.key, &encoded)
    }

    fn fall_back(&self, reason: FallbackReason) -> StoreResult<LoadOutcome> {
        let members = (self.seed.members)();
        self.save(&members)?;
        info!(
            "event=store_load module=store status=fallback reason={} count={}",
            reason.as_str(),
            members.len()
        );
        Ok(LoadOutcome {
            members,
            source: LoadSource::Seed(reason),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FallbackReason, LoadSource, MemberStore, DEFAULT_STORAGE_KEY};
    use crate::model::member::Member;
    use crate::store::blob_store::{BlobStore, MemoryBlobStore};
    use crate::store::seed::{default_members, Seed};

    #[test]
    fn empty_store_falls_back_to_seed_and_persists_it() {
        let blobs = MemoryBlobStore::new();
        let store = MemberStore::new(&blobs);

        let outcome = store.load_detailed().unwrap();
        assert_eq!(outcome.source, LoadSource::Seed(FallbackReason::Empty));
        assert_eq!(outcome.members, default_members());
        assert!(blobs.get(DEFAULT_STORAGE_KEY).unwrap().is_some());

        let again = store.load_detailed().unwrap();
        assert!(matches!(again.source, LoadSource::Stored(ref report) if !report.changed));
        assert_eq!(again.members, outcome.members);
    }

    #[test]
    fn legacy_schema_without_reports_to_is_replaced() {
        let blobs =
            MemoryBlobStore::with_blob(DEFAULT_STORAGE_KEY, r#"[{"id":"1","name":"Old"}]"#);
        let outcome = MemberStore::new(&blobs).load_detailed().unwrap();
        assert_eq!(outcome.source, LoadSource::Seed(FallbackReason::LegacySchema));
    }

    #[test]
    fn unreadable_blob_is_replaced() {
        let blobs = MemoryBlobStore::with_blob(DEFAULT_STORAGE_KEY, "{not json");
        let outcome = MemberStore::new(&blobs).load_detailed().unwrap();
        assert_eq!(outcome.source, LoadSource::Seed(FallbackReason::Unreadable));
    }

    #[test]
    fn missing_sentinel_discards_stored_data() {
        let blobs = MemoryBlobStore::with_blob(
            DEFAULT_STORAGE_KEY,
            r#"[{"id":"1","name":"Solo","reportsTo":null}]"#,
        );
        let outcome = MemberStore::new(&blobs).load_detailed().unwrap();
        assert_eq!(
            outcome.source,
            LoadSource::Seed(FallbackReason::MissingSentinel)
        );
        assert_eq!(outcome.members.len(), default_members().len());
    }

    #[test]
    fn stored_data_is_migrated_and_repersisted() {
        let blobs = MemoryBlobStore::new();
        let store = MemberStore::with_seed(&blobs, "k", Seed::empty());
        store
            .save(&[
                Member::new("a", "A", "").reporting_to("b"),
                Member::new("b", "B", "").reporting_to("a"),
            ])
            .unwrap();

        let members = store.load().unwrap();
        assert_eq!(members[0].reports_to, None);

        let raw = blobs.get("k").unwrap().unwrap();
        assert!(raw.contains(r#""reportsTo":null"#));
        let reloaded = store.load_detailed().unwrap();
        assert!(matches!(reloaded.source, LoadSource::Stored(ref report) if !report.changed));
    }

    #[test]
    fn empty_seed_with_empty_store_loads_nothing() {
        let blobs = MemoryBlobStore::new();
        let store = MemberStore::with_seed(&blobs, "k", Seed::empty());
        assert!(store.load().unwrap().is_empty());
        assert_eq!(blobs.get("k").unwrap().as_deref(), Some("[]"));
    }
}
