// 🎛️ Selection State - dropdown (license category) + radio group (license status)
// Lives for one dashboard session; never persisted.

use crate::error::ValidationError;
use crate::registry::{Bucket, LicenseCategory, LicenseStatus};
use serde::Serialize;

const CONTEXT: &str = "Selection";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectionState {
    category: LicenseCategory,
    status: LicenseStatus,
}

impl Default for SelectionState {
    /// First member of each domain, as the widgets show before any input
    fn default() -> Self {
        SelectionState {
            category: LicenseCategory::ALL[0],
            status: LicenseStatus::ALL[0],
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_category(&self) -> LicenseCategory {
        self.category
    }

    pub fn selected_status(&self) -> LicenseStatus {
        self.status
    }

    /// Set the dropdown value from its raw label. Rejects anything outside
    /// the nine categories and leaves the current choice in place.
    pub fn set_selected_category(&mut self, value: &str) -> Result<LicenseCategory, ValidationError> {
        let category = LicenseCategory::parse(value).ok_or_else(|| {
            ValidationError::new(
                LicenseCategory::COLUMN,
                format!("'{}' is not a license category", value),
                CONTEXT,
            )
        })?;
        self.category = category;
        Ok(category)
    }

    /// Set the radio value from its raw label
    pub fn set_selected_status(&mut self, value: &str) -> Result<LicenseStatus, ValidationError> {
        let status = LicenseStatus::parse(value).ok_or_else(|| {
            ValidationError::new(
                LicenseStatus::COLUMN,
                format!("'{}' is not a license status", value),
                CONTEXT,
            )
        })?;
        self.status = status;
        Ok(status)
    }

    pub fn select_category(&mut self, category: LicenseCategory) {
        self.category = category;
    }

    pub fn select_status(&mut self, status: LicenseStatus) {
        self.status = status;
    }

    pub fn next_category(&mut self) {
        self.category = cycle(self.category, 1);
    }

    pub fn previous_category(&mut self) {
        self.category = cycle(self.category, -1);
    }

    pub fn next_status(&mut self) {
        self.status = cycle(self.status, 1);
    }

    pub fn previous_status(&mut self) {
        self.status = cycle(self.status, -1);
    }
}

/// Step through `K::ALL`, wrapping at both ends
fn cycle<K: Bucket>(current: K, step: isize) -> K {
    let all = K::ALL;
    let len = all.len() as isize;
    let index = all.iter().position(|k| *k == current).unwrap_or(0) as isize;
    all[(index + step).rem_euclid(len) as usize]
}
