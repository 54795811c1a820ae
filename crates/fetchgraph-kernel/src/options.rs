//! Fetch options attached to attribute nodes.
//!
//! Options are advisory. Each option occupies a slot; `Eager` and `Lazy`
//! share the inclusion slot, so at most one of them is present. Inserting an
//! option replaces whatever occupied its slot.

use crate::error::{GraphError, Result};
use fetchgraph_catalog::{CacheRetrieveMode, CacheStoreMode, FetchOption};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Slot {
    Inclusion,
    CacheRetrieve,
    CacheStore,
    BatchSize,
    Hint(String),
}

fn slot_of(option: &FetchOption) -> Slot {
    match option {
        FetchOption::Eager | FetchOption::Lazy => Slot::Inclusion,
        FetchOption::CacheRetrieve(_) => Slot::CacheRetrieve,
        FetchOption::CacheStore(_) => Slot::CacheStore,
        FetchOption::BatchSize(_) => Slot::BatchSize,
        FetchOption::Hint { key, .. } => Slot::Hint(key.clone()),
    }
}

pub(crate) fn validate(option: &FetchOption) -> Result<()> {
    match option {
        FetchOption::BatchSize(0) => Err(GraphError::InvalidFetchOption(
            "batch size must be positive".to_string(),
        )),
        FetchOption::Hint { key, .. } if key.trim().is_empty() => Err(
            GraphError::InvalidFetchOption("hint key must be non-empty".to_string()),
        ),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    slots: BTreeMap<Slot, FetchOption>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an option, returning the one it displaced.
    pub fn insert(&mut self, option: FetchOption) -> Result<Option<FetchOption>> {
        validate(&option)?;
        Ok(self.slots.insert(slot_of(&option), option))
    }

    /// Remove exactly this option. Returns whether it was present.
    pub fn remove(&mut self, option: &FetchOption) -> bool {
        let slot = slot_of(option);
        if self.slots.get(&slot) == Some(option) {
            self.slots.remove(&slot);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, option: &FetchOption) -> bool {
        self.slots.get(&slot_of(option)) == Some(option)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FetchOption> {
        self.slots.values()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_eager(&self) -> bool {
        matches!(self.slots.get(&Slot::Inclusion), Some(FetchOption::Eager))
    }

    pub fn is_lazy(&self) -> bool {
        matches!(self.slots.get(&Slot::Inclusion), Some(FetchOption::Lazy))
    }

    pub fn batch_size(&self) -> Option<u32> {
        match self.slots.get(&Slot::BatchSize) {
            Some(FetchOption::BatchSize(size)) => Some(*size),
            _ => None,
        }
    }

    pub fn cache_retrieve(&self) -> Option<CacheRetrieveMode> {
        match self.slots.get(&Slot::CacheRetrieve) {
            Some(FetchOption::CacheRetrieve(mode)) => Some(*mode),
            _ => None,
        }
    }

    pub fn cache_store(&self) -> Option<CacheStoreMode> {
        match self.slots.get(&Slot::CacheStore) {
            Some(FetchOption::CacheStore(mode)) => Some(*mode),
            _ => None,
        }
    }

    pub fn hint(&self, key: &str) -> Option<&str> {
        match self.slots.get(&Slot::Hint(key.to_string())) {
            Some(FetchOption::Hint { value, .. }) => Some(value),
            _ => None,
        }
    }

    /// Fold `other` into `self`.
    ///
    /// On a slot conflict `Eager` beats `Lazy`, the larger batch size wins,
    /// and otherwise the option already in `self` is kept.
    pub(crate) fn absorb(&mut self, other: &FetchOptions) {
        for (slot, incoming) in &other.slots {
            match self.slots.get_mut(slot) {
                None => {
                    self.slots.insert(slot.clone(), incoming.clone());
                }
                Some(current) => {
                    let replace = match (&*current, incoming) {
                        (FetchOption::Lazy, FetchOption::Eager) => true,
                        (FetchOption::BatchSize(have), FetchOption::BatchSize(want)) => want > have,
                        _ => false,
                    };
                    if replace {
                        *current = incoming.clone();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eager_and_lazy_share_a_slot() {
        let mut options = FetchOptions::new();
        assert_eq!(options.insert(FetchOption::Lazy).unwrap(), None);
        assert_eq!(
            options.insert(FetchOption::Eager).unwrap(),
            Some(FetchOption::Lazy)
        );
        assert!(options.is_eager());
        assert!(!options.is_lazy());
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let mut options = FetchOptions::new();
        let err = options.insert(FetchOption::BatchSize(0)).unwrap_err();
        assert!(matches!(err, GraphError::InvalidFetchOption(_)));
        assert!(options.is_empty());
    }

    #[test]
    fn hints_are_keyed_independently() {
        let mut options = FetchOptions::new();
        options
            .insert(FetchOption::Hint {
                key: "timeout".to_string(),
                value: "5s".to_string(),
            })
            .unwrap();
        options
            .insert(FetchOption::Hint {
                key: "comment".to_string(),
                value: "dashboard".to_string(),
            })
            .unwrap();
        assert_eq!(options.hint("timeout"), Some("5s"));
        assert_eq!(options.hint("comment"), Some("dashboard"));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn remove_requires_exact_match() {
        let mut options = FetchOptions::new();
        options.insert(FetchOption::BatchSize(8)).unwrap();
        assert!(!options.remove(&FetchOption::BatchSize(16)));
        assert!(options.remove(&FetchOption::BatchSize(8)));
        assert!(options.is_empty());
    }

    #[test]
    fn absorb_resolves_conflicts() {
        let mut left = FetchOptions::new();
        left.insert(FetchOption::Lazy).unwrap();
        left.insert(FetchOption::BatchSize(8)).unwrap();
        left.insert(FetchOption::CacheRetrieve(CacheRetrieveMode::Use))
            .unwrap();
        let mut right = FetchOptions::new();
        right.insert(FetchOption::Eager).unwrap();
        right.insert(FetchOption::BatchSize(32)).unwrap();
        right
            .insert(FetchOption::CacheRetrieve(CacheRetrieveMode::Bypass))
            .unwrap();
        right
            .insert(FetchOption::CacheStore(CacheStoreMode::Refresh))
            .unwrap();

        left.absorb(&right);
        assert!(left.is_eager());
        assert_eq!(left.batch_size(), Some(32));
        assert_eq!(left.cache_retrieve(), Some(CacheRetrieveMode::Use));
        assert_eq!(left.cache_store(), Some(CacheStoreMode::Refresh));
    }
}
