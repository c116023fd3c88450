//! Dataset service: a narrow, read-only capability interface over
//! reference data the engine consults but never owns — `get(name) ->
//! {isInvalid(value) -> bool}`, with no inheritance hierarchy
//! required.
//!
//! Refreshing these datasets from IANA/EPP sources is an external
//! collaborator's job; the engine only ever reads through this trait.
use std::collections::HashSet;

/// A single named dataset, treated as a frozen membership predicate.
pub trait Dataset: Send + Sync {
    /// Returns `true` if `value` is flagged invalid by this dataset.
    fn is_invalid(&self, value: &str) -> bool;
}

/// Looks datasets up by name. Implementations are expected to be
/// read-only after construction and safe to share across concurrent
/// validation runs.
pub trait DatasetService: Send + Sync {
    fn get(&self, name: &str) -> Option<&dyn Dataset>;
}

/// A dataset backed by an in-memory set of flagged values, matching
/// how EPP ROID and IANA registry snapshots are distributed (a flat
/// list of known values).
#[derive(Debug, Default)]
pub struct SetDataset(HashSet<String>);

impl SetDataset {
    pub fn new(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        SetDataset(values.into_iter().map(Into::into).collect())
    }
}

impl Dataset for SetDataset {
    fn is_invalid(&self, value: &str) -> bool {
        self.0.contains(value)
    }
}

/// A dataset service backed by a fixed map of named [`SetDataset`]s,
/// the shape the engine receives once datasets have already been
/// downloaded and parsed by the external refresh job.
#[derive(Debug, Default)]
pub struct FrozenDatasetService(std::collections::HashMap<String, SetDataset>);

impl FrozenDatasetService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dataset(mut self, name: impl Into<String>, dataset: SetDataset) -> Self {
        self.0.insert(name.into(), dataset);
        self
    }
}

impl DatasetService for FrozenDatasetService {
    fn get(&self, name: &str) -> Option<&dyn Dataset> {
        self.0.get(name).map(|d| d as &dyn Dataset)
    }
}

/// Well-known dataset names consulted by the built-in profile checks.
pub mod names {
    pub const EPP_ROID: &str = "epp-roid";
    pub const IPV4_SPECIAL_PURPOSE: &str = "ipv4-special-purpose";
    pub const IPV6_SPECIAL_PURPOSE: &str = "ipv6-special-purpose";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_dataset_name_returns_none() {
        let service = FrozenDatasetService::new();
        assert!(service.get("does-not-exist").is_none());
    }

    #[test]
    fn flagged_value_is_invalid() {
        let service = FrozenDatasetService::new()
            .with_dataset(names::EPP_ROID, SetDataset::new(["BADROID"]));
        let dataset = service.get(names::EPP_ROID).unwrap();
        assert!(dataset.is_invalid("BADROID"));
        assert!(!dataset.is_invalid("EXAMPLE"));
    }
}
