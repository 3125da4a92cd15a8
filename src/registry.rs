// 🌿 Registry Records - one row of the cannabis business registry
// Core fields are read straight from the CSV and never mutated afterwards

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

// ============================================================================
// BUCKET TRAIT
// ============================================================================

/// A closed set of values that a categorical column is counted into.
///
/// `ALL` fixes the order used by every aggregation and chart, so labels
/// and values can be zipped positionally.
pub trait Bucket: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every member, in display order
    const ALL: &'static [Self];

    /// Raw CSV column this bucket is read from
    const COLUMN: &'static str;

    /// Human-readable label shown on charts
    fn label(&self) -> &'static str;

    /// Parse a raw cell value (case-insensitive)
    fn parse(raw: &str) -> Option<Self>;
}

// ============================================================================
// LICENSE STATUS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseStatus {
    Inactive,
    Active,
    Expired,
    Deleted,
}

impl Bucket for LicenseStatus {
    const ALL: &'static [Self] = &[
        LicenseStatus::Inactive,
        LicenseStatus::Active,
        LicenseStatus::Expired,
        LicenseStatus::Deleted,
    ];

    const COLUMN: &'static str = "app_license_status";

    fn label(&self) -> &'static str {
        match self {
            LicenseStatus::Inactive => "Inactive",
            LicenseStatus::Active => "Active",
            LicenseStatus::Expired => "Expired",
            LicenseStatus::Deleted => "Deleted",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for LicenseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// LICENSE CATEGORY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseCategory {
    Retail,
    Cultivate,
    Manufact,
    #[serde(rename = "Co-Located")]
    CoLocated,
    Courier,
    Operator,
    TestLab,
    Transport,
    Medical,
}

impl Bucket for LicenseCategory {
    const ALL: &'static [Self] = &[
        LicenseCategory::Retail,
        LicenseCategory::Cultivate,
        LicenseCategory::Manufact,
        LicenseCategory::CoLocated,
        LicenseCategory::Courier,
        LicenseCategory::Operator,
        LicenseCategory::TestLab,
        LicenseCategory::Transport,
        LicenseCategory::Medical,
    ];

    const COLUMN: &'static str = "app_license_category";

    fn label(&self) -> &'static str {
        match self {
            LicenseCategory::Retail => "Retail",
            LicenseCategory::Cultivate => "Cultivate",
            LicenseCategory::Manufact => "Manufact",
            LicenseCategory::CoLocated => "Co-Located",
            LicenseCategory::Courier => "Courier",
            LicenseCategory::Operator => "Operator",
            LicenseCategory::TestLab => "TestLab",
            LicenseCategory::Transport => "Transport",
            LicenseCategory::Medical => "Medical",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.label().eq_ignore_ascii_case(raw.trim()))
    }
}

impl fmt::Display for LicenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// EQUITY PROGRAM DESIGNATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquityDesignation {
    Yes,
    No,
    NotApplicable,
}

impl EquityDesignation {
    pub const ALL: [EquityDesignation; 3] = [
        EquityDesignation::Yes,
        EquityDesignation::No,
        EquityDesignation::NotApplicable,
    ];

    pub const COLUMN: &'static str = "equity_program_designation";

    pub fn label(&self) -> &'static str {
        match self {
            EquityDesignation::Yes => "Yes",
            EquityDesignation::No => "No",
            EquityDesignation::NotApplicable => "Not Applicable",
        }
    }

    /// Raw cell code, `None` for the derived Not Applicable bucket
    pub fn code(&self) -> Option<&'static str> {
        match self {
            EquityDesignation::Yes => Some("Y"),
            EquityDesignation::No => Some("N"),
            EquityDesignation::NotApplicable => None,
        }
    }

    /// Anything other than `Y`/`N` (including an empty cell) is Not Applicable
    pub fn from_cell(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Y") => EquityDesignation::Yes,
            Some("N") => EquityDesignation::No,
            _ => EquityDesignation::NotApplicable,
        }
    }
}

// ============================================================================
// REGISTRY RECORD
// ============================================================================

/// One licensed business. Empty CSV cells deserialize to `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryRecord {
    #[serde(rename = "app_business_name", default)]
    pub business_name: Option<String>,

    #[serde(rename = "facility_address", default)]
    pub facility_address: Option<String>,

    #[serde(rename = "facility_zip_code", default)]
    pub facility_zip_code: Option<String>,

    /// Non-numeric coordinates are treated as missing
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub longitude: Option<f64>,

    #[serde(rename = "app_license_status", default)]
    pub license_status: Option<String>,

    #[serde(rename = "app_license_category", default)]
    pub license_category: Option<String>,

    #[serde(rename = "equity_program_designation", default)]
    pub equity_program_designation: Option<String>,
}

impl RegistryRecord {
    pub fn status(&self) -> Option<LicenseStatus> {
        self.license_status.as_deref().and_then(LicenseStatus::parse)
    }

    pub fn category(&self) -> Option<LicenseCategory> {
        self.license_category.as_deref().and_then(LicenseCategory::parse)
    }

    pub fn equity(&self) -> EquityDesignation {
        EquityDesignation::from_cell(self.equity_program_designation.as_deref())
    }

    /// Both coordinates, if the row can be placed on the map
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }

    /// Zip code as displayed. Massachusetts zips start with 0, which
    /// numeric exports drop, so four-digit codes get it back.
    pub fn zip_code_display(&self) -> Option<String> {
        let zip = self.facility_zip_code.as_deref()?.trim();
        if zip.is_empty() {
            return None;
        }
        if zip.len() == 4 && zip.chars().all(|c| c.is_ascii_digit()) {
            Some(format!("0{}", zip))
        } else {
            Some(zip.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_case_insensitive() {
        assert_eq!(LicenseStatus::parse("active"), Some(LicenseStatus::Active));
        assert_eq!(LicenseStatus::parse(" Deleted "), Some(LicenseStatus::Deleted));
        assert_eq!(LicenseStatus::parse("Pending"), None);
    }

    #[test]
    fn test_category_parse_accepts_both_testlab_spellings() {
        assert_eq!(LicenseCategory::parse("TestLab"), Some(LicenseCategory::TestLab));
        assert_eq!(LicenseCategory::parse("Testlab"), Some(LicenseCategory::TestLab));
        assert_eq!(LicenseCategory::parse("co-located"), Some(LicenseCategory::CoLocated));
        assert_eq!(LicenseCategory::parse(""), None);
    }

    #[test]
    fn test_fixed_orders() {
        let statuses: Vec<&str> = LicenseStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(statuses, vec!["Inactive", "Active", "Expired", "Deleted"]);
        assert_eq!(LicenseCategory::ALL.len(), 9);
        assert_eq!(LicenseCategory::ALL[0], LicenseCategory::Retail);
        assert_eq!(LicenseCategory::ALL[8], LicenseCategory::Medical);
    }

    #[test]
    fn test_equity_from_cell() {
        assert_eq!(EquityDesignation::from_cell(Some("Y")), EquityDesignation::Yes);
        assert_eq!(EquityDesignation::from_cell(Some("N")), EquityDesignation::No);
        assert_eq!(EquityDesignation::from_cell(Some("Maybe")), EquityDesignation::NotApplicable);
        assert_eq!(EquityDesignation::from_cell(None), EquityDesignation::NotApplicable);
    }

    #[test]
    fn test_zip_code_display_restores_leading_zero() {
        let mut record = RegistryRecord {
            facility_zip_code: Some("2118".to_string()),
            ..Default::default()
        };
        assert_eq!(record.zip_code_display().as_deref(), Some("02118"));

        record.facility_zip_code = Some("02130".to_string());
        assert_eq!(record.zip_code_display().as_deref(), Some("02130"));

        record.facility_zip_code = None;
        assert_eq!(record.zip_code_display(), None);
    }

    #[test]
    fn test_coordinates_require_both() {
        let record = RegistryRecord {
            latitude: Some(42.35),
            longitude: None,
            ..Default::default()
        };
        assert_eq!(record.coordinates(), None);

        let record = RegistryRecord {
            latitude: Some(42.35),
            longitude: Some(-71.06),
            ..Default::default()
        };
        assert_eq!(record.coordinates(), Some((42.35, -71.06)));
    }
}
