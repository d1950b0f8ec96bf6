//! In-memory duplicate suppression
//!
//! The ledger is never persisted. It is rebuilt from the dataset on every
//! start, so the dataset stays the single source of truth.

use crate::record::ListingRecord;
use crate::storage::traits::ListingStore;
use std::collections::HashSet;

/// Set of listing names already present in the dataset or accepted this run
#[derive(Debug, Default, Clone)]
pub struct DedupLedger {
    names: HashSet<String>,
}

/// Result of filtering one page's records through the ledger
#[derive(Debug, Default)]
pub struct Admission {
    /// Records that are new and pass the price requirement
    pub accepted: Vec<ListingRecord>,
    /// Records dropped because their name was already seen
    pub duplicates: usize,
    /// Records dropped because a price was required but missing
    pub unpriced: usize,
}

impl DedupLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the ledger from the store's `Name` column
    ///
    /// An unreadable store is logged and treated as empty so a damaged file
    /// never prevents a crawl from starting.
    pub fn from_store<S: ListingStore>(store: &S) -> Self {
        match store.load_names() {
            Ok(names) => {
                if !names.is_empty() {
                    tracing::info!("Loaded {} existing listings", names.len());
                }
                Self { names }
            }
            Err(e) => {
                tracing::error!("Error loading existing data: {}", e);
                Self::new()
            }
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Adds `name`, returning false if it was already present
    pub fn add(&mut self, name: impl Into<String>) -> bool {
        self.names.insert(name.into())
    }

    /// Removes names again, used when the records carrying them were not persisted
    pub fn forget<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) {
        for name in names {
            self.names.remove(name);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Filters a page's records: duplicates first, then the price requirement
    ///
    /// Accepted names are added to the ledger immediately, so a name repeated
    /// within the same page is only accepted once.
    pub fn admit(&mut self, records: Vec<ListingRecord>, requires_price: bool) -> Admission {
        let mut admission = Admission::default();

        for record in records {
            if self.contains(&record.name) {
                tracing::info!("Skipping duplicate: {}", record.name);
                admission.duplicates += 1;
                continue;
            }
            if requires_price && !record.has_price() {
                tracing::debug!("Skipping listing without price: {}", record.name);
                admission.unpriced += 1;
                continue;
            }

            tracing::info!("Added product: {}", record.name);
            self.add(record.name.clone());
            admission.accepted.push(record);
        }

        admission
    }
}
