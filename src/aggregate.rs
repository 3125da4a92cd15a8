// 📊 Aggregator - value counts over the categorical columns
// Every function is pure: &Dataset in, fresh counts out.

use crate::dataset::Dataset;
use crate::error::{DashboardError, Result};
use crate::registry::{Bucket, EquityDesignation, LicenseCategory, LicenseStatus};
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// CATEGORY COUNTS
// ============================================================================

/// Occurrence count per bucket. A bucket that never occurs reads as 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts<K: Bucket> {
    counts: HashMap<K, usize>,

    /// Rows whose cell was empty
    pub missing: usize,

    /// Rows whose cell held a value outside the bucket domain
    pub unrecognized: usize,
}

pub type StatusCounts = CategoryCounts<LicenseStatus>;
pub type LicenseCategoryCounts = CategoryCounts<LicenseCategory>;

impl<K: Bucket> CategoryCounts<K> {
    fn empty() -> Self {
        CategoryCounts {
            counts: HashMap::new(),
            missing: 0,
            unrecognized: 0,
        }
    }

    fn add(&mut self, key: K) {
        *self.counts.entry(key).or_insert(0) += 1;
    }

    pub fn get(&self, key: K) -> usize {
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// (bucket, count) pairs in the bucket's fixed order
    pub fn ordered(&self) -> Vec<(K, usize)> {
        K::ALL.iter().map(|k| (*k, self.get(*k))).collect()
    }

    /// Sum over the named buckets only
    pub fn counted(&self) -> usize {
        self.counts.values().sum()
    }

    /// Every row seen, including missing and unrecognized cells
    pub fn total(&self) -> usize {
        self.counted() + self.missing + self.unrecognized
    }
}

impl<K: Bucket> Serialize for CategoryCounts<K> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let buckets: Vec<(&'static str, usize)> = self
            .ordered()
            .into_iter()
            .map(|(k, n)| (k.label(), n))
            .collect();

        let mut state = serializer.serialize_struct("CategoryCounts", 3)?;
        state.serialize_field("buckets", &buckets)?;
        state.serialize_field("missing", &self.missing)?;
        state.serialize_field("unrecognized", &self.unrecognized)?;
        state.end()
    }
}

/// Count a column into `K` buckets. `cell` extracts the raw value.
fn count_column<K, F>(dataset: &Dataset, cell: F) -> CategoryCounts<K>
where
    K: Bucket,
    F: Fn(&crate::registry::RegistryRecord) -> Option<&str>,
{
    let mut counts = CategoryCounts::empty();

    for record in dataset.records() {
        match cell(record).map(str::trim).filter(|v| !v.is_empty()) {
            None => counts.missing += 1,
            Some(raw) => match K::parse(raw) {
                Some(key) => counts.add(key),
                None => counts.unrecognized += 1,
            },
        }
    }

    debug!(
        column = K::COLUMN,
        counted = counts.counted(),
        missing = counts.missing,
        unrecognized = counts.unrecognized,
        "aggregated column"
    );

    counts
}

// ============================================================================
// AGGREGATIONS
// ============================================================================

/// Counts per license status. Null statuses land in `missing`, so the
/// buckets plus `missing` and `unrecognized` always sum to the row count.
pub fn count_by_license_status(dataset: &Dataset) -> StatusCounts {
    count_column(dataset, |r| r.license_status.as_deref())
}

/// Counts per license category. Rows with a null category are excluded
/// by content and reported through `missing`.
pub fn count_by_license_category(dataset: &Dataset) -> LicenseCategoryCounts {
    count_column(dataset, |r| r.license_category.as_deref())
}

// ============================================================================
// EQUITY PROGRAM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EquityCounts {
    pub yes: usize,
    pub no: usize,
    pub not_applicable: usize,
}

impl EquityCounts {
    pub fn get(&self, designation: EquityDesignation) -> usize {
        match designation {
            EquityDesignation::Yes => self.yes,
            EquityDesignation::No => self.no,
            EquityDesignation::NotApplicable => self.not_applicable,
        }
    }

    /// Yes, No, Not Applicable
    pub fn ordered(&self) -> Vec<(EquityDesignation, usize)> {
        EquityDesignation::ALL
            .iter()
            .map(|d| (*d, self.get(*d)))
            .collect()
    }

    pub fn total(&self) -> usize {
        self.yes + self.no + self.not_applicable
    }
}

/// Yes / No / Not Applicable counts, where Not Applicable is every row that
/// is neither `Y` nor `N`. Fails if either `Y` or `N` never occurs.
pub fn count_by_equity_designation(dataset: &Dataset) -> Result<EquityCounts> {
    let mut yes = 0;
    let mut no = 0;

    for record in dataset.records() {
        match record.equity() {
            EquityDesignation::Yes => yes += 1,
            EquityDesignation::No => no += 1,
            EquityDesignation::NotApplicable => {}
        }
    }

    for (designation, count) in [(EquityDesignation::Yes, yes), (EquityDesignation::No, no)] {
        if count == 0 {
            return Err(DashboardError::MissingCategory {
                field: EquityDesignation::COLUMN.to_string(),
                value: designation.code().unwrap_or_default().to_string(),
            });
        }
    }

    Ok(EquityCounts {
        yes,
        no,
        not_applicable: dataset.len() - yes - no,
    })
}
