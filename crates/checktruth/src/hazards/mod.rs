//! Hazard reference table: the immutable set of harmful ingredient entries
//! consulted by the chemical matcher.
//!
//! A [`HazardStore`] is built once and never mutated. Reloading goes through
//! [`HazardRegistry::replace`], which swaps the whole table so readers holding
//! a snapshot keep a consistent view.

mod dataset;
mod domain;

pub use dataset::{DataLoadError, DatasetFormat};
pub use domain::{HazardEntry, RiskLevel};

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;
use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use dataset::{canonical_name, parse_csv, parse_json, BUILTIN_DATASET};

/// Read-only mapping from canonical hazard name to entry.
#[derive(Debug, Clone, Default)]
pub struct HazardStore {
    entries: BTreeMap<String, Arc<HazardEntry>>,
}

impl HazardStore {
    /// Parse a JSON dataset (list or keyed layout).
    pub fn load(dataset: &str) -> Result<Self, DataLoadError> {
        Self::from_entries(parse_json(dataset)?)
    }

    /// Load the dataset bundled with the crate.
    pub fn builtin() -> Result<Self, DataLoadError> {
        Self::load(BUILTIN_DATASET)
    }

    pub fn from_csv_reader<R: std::io::Read>(reader: R) -> Result<Self, DataLoadError> {
        Self::from_entries(parse_csv(reader)?)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DataLoadError> {
        let path = path.as_ref();
        let store = match DatasetFormat::from_path(path)? {
            DatasetFormat::Json => Self::load(&std::fs::read_to_string(path)?)?,
            DatasetFormat::Csv => Self::from_csv_reader(File::open(path)?)?,
        };
        info!(path = %path.display(), hazards = store.len(), "hazard dataset loaded");
        Ok(store)
    }

    /// Build a store from already-validated entries, rejecting duplicate names.
    pub fn from_entries<I>(entries: I) -> Result<Self, DataLoadError>
    where
        I: IntoIterator<Item = HazardEntry>,
    {
        let mut table = BTreeMap::new();
        for mut entry in entries {
            entry.name = canonical_name(&entry.name);
            if table.contains_key(&entry.name) {
                return Err(DataLoadError::DuplicateName(entry.name));
            }
            table.insert(entry.name.clone(), Arc::new(entry));
        }
        debug!(hazards = table.len(), "hazard table built");
        Ok(Self { entries: table })
    }

    /// Every entry, ordered by name.
    pub fn all(&self) -> impl Iterator<Item = &Arc<HazardEntry>> {
        self.entries.values()
    }

    pub fn get(&self, name: &str) -> Option<&Arc<HazardEntry>> {
        self.entries.get(&canonical_name(name))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Process-wide holder publishing the current hazard table.
#[derive(Debug, Default)]
pub struct HazardRegistry {
    current: RwLock<Arc<HazardStore>>,
}

impl HazardRegistry {
    pub fn new(store: HazardStore) -> Self {
        Self {
            current: RwLock::new(Arc::new(store)),
        }
    }

    /// Snapshot of the table in effect right now.
    pub fn current(&self) -> Arc<HazardStore> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&*guard),
            Err(poisoned) => Arc::clone(&*poisoned.into_inner()),
        }
    }

    /// Atomically publish a new table. Existing snapshots are unaffected.
    pub fn replace(&self, store: HazardStore) -> Arc<HazardStore> {
        let next = Arc::new(store);
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        info!(hazards = next.len(), "hazard table replaced");
        std::mem::replace(&mut *guard, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn entry(name: &str, risk_level: RiskLevel) -> HazardEntry {
        HazardEntry {
            name: name.to_string(),
            risk_level,
            cause: "cause".to_string(),
            avoid_if: "avoid".to_string(),
            associated_diseases: BTreeSet::new(),
        }
    }

    #[test]
    fn duplicate_names_are_rejected_case_insensitively() {
        let result = HazardStore::from_entries(vec![
            entry("Red 40", RiskLevel::High),
            entry("red  40", RiskLevel::Low),
        ]);

        match result {
            Err(DataLoadError::DuplicateName(name)) => assert_eq!(name, "red 40"),
            other => panic!("expected duplicate error, got {other:?}"),
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let store = HazardStore::from_entries(vec![entry("BHT", RiskLevel::Low)])
            .expect("store builds");

        assert!(store.get("bht").is_some());
        assert!(store.get(" Bht ").is_some());
        assert!(store.get("bha").is_none());
    }

    #[test]
    fn all_is_ordered_by_name() {
        let store = HazardStore::from_entries(vec![
            entry("yellow 5", RiskLevel::Medium),
            entry("aspartame", RiskLevel::Medium),
        ])
        .expect("store builds");

        let names: Vec<_> = store.all().map(|entry| entry.name.as_str()).collect();
        assert_eq!(names, vec!["aspartame", "yellow 5"]);
    }

    #[test]
    fn registry_swap_keeps_old_snapshots_intact() {
        let registry = HazardRegistry::new(
            HazardStore::from_entries(vec![entry("bha", RiskLevel::Medium)]).expect("store"),
        );
        let before = registry.current();

        let previous = registry.replace(
            HazardStore::from_entries(vec![
                entry("bha", RiskLevel::Medium),
                entry("bht", RiskLevel::Low),
            ])
            .expect("store"),
        );

        assert_eq!(before.len(), 1);
        assert_eq!(previous.len(), 1);
        assert_eq!(registry.current().len(), 2);
    }

    #[test]
    fn builtin_table_is_not_empty() {
        let store = HazardStore::builtin().expect("builtin loads");
        assert!(!store.is_empty());
        assert!(store.get("red 40").is_some_and(|entry| entry.is_critical()));
    }
}
