// 📈 Presentation Adapters - counts → chart-ready tables
// Inputs are borrowed and never mutated; every call builds fresh output.

use crate::aggregate::{EquityCounts, LicenseCategoryCounts, StatusCounts};
use crate::config::MapConfig;
use crate::dataset::Dataset;
use crate::registry::Bucket;
use crate::selection::SelectionState;
use serde::Serialize;

/// Offset applied to the selected pie slice
pub const EXPLODE_OFFSET: f64 = 0.5;

// ============================================================================
// BAR CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartData {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub points: Vec<ChartPoint>,
}

impl BarChartData {
    pub fn max_value(&self) -> u64 {
        self.points.iter().map(|p| p.value).max().unwrap_or(0)
    }
}

fn points<'a>(pairs: impl IntoIterator<Item = (&'a str, usize)>) -> Vec<ChartPoint> {
    pairs
        .into_iter()
        .map(|(label, value)| ChartPoint {
            label: label.to_string(),
            value: value as u64,
        })
        .collect()
}

/// Bars for Inactive, Active, Expired, Deleted
pub fn status_bar_chart(counts: &StatusCounts) -> BarChartData {
    BarChartData {
        title: "License Status and Amounts".to_string(),
        x_label: "License Status".to_string(),
        y_label: "Amount of Licenses".to_string(),
        points: points(counts.ordered().into_iter().map(|(s, n)| (s.label(), n))),
    }
}

/// Bars for Yes, No, Not Applicable
pub fn equity_bar_chart(counts: &EquityCounts) -> BarChartData {
    BarChartData {
        title: "Number of Registries Seeking Boston Equity Program".to_string(),
        x_label: "Is Registry Applying for BEP?".to_string(),
        y_label: "Number of Registries".to_string(),
        points: points(counts.ordered().into_iter().map(|(d, n)| (d.label(), n))),
    }
}

// ============================================================================
// PIE CHART
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub label: String,
    pub value: u64,

    /// Share of the pie, 0.0 when the pie is empty
    pub fraction: f64,

    /// True only for the slice matching the current selection
    pub emphasized: bool,

    pub explode: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChartData {
    pub title: String,
    pub slices: Vec<PieSlice>,
}

impl PieChartData {
    pub fn emphasized(&self) -> Option<&PieSlice> {
        self.slices.iter().find(|s| s.emphasized)
    }
}

/// One slice per license category, the selected one exploded
pub fn category_pie_chart(counts: &LicenseCategoryCounts, selection: &SelectionState) -> PieChartData {
    let selected = selection.selected_category();
    let total = counts.counted() as f64;

    let slices = counts
        .ordered()
        .into_iter()
        .map(|(category, n)| {
            let emphasized = category == selected;
            PieSlice {
                label: category.label().to_string(),
                value: n as u64,
                fraction: if total > 0.0 { n as f64 / total } else { 0.0 },
                emphasized,
                explode: if emphasized { EXPLODE_OFFSET } else { 0.0 },
            }
        })
        .collect();

    PieChartData {
        title: "License Category Pie Chart Breakdown".to_string(),
        slices,
    }
}

// ============================================================================
// MAP LAYER
// ============================================================================

/// One labelled line of hover text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub name: Option<String>,
    pub address: Option<String>,
    pub zip_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,

    /// Hover text: registry name, address, zip code. Values are plain text.
    pub tooltip: Vec<TooltipRow>,
}

fn tooltip_rows(name: Option<&str>, address: Option<&str>, zip_code: Option<&str>) -> Vec<TooltipRow> {
    [
        ("Registry Name", name),
        ("Registry Address", address),
        ("Zip Code", zip_code),
    ]
    .into_iter()
    .map(|(label, value)| TooltipRow {
        label: label.to_string(),
        value: value.unwrap_or("Unknown").to_string(),
    })
    .collect()
}

/// Initial camera position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapLayer {
    pub points: Vec<MapPoint>,

    /// `None` when no record has coordinates
    pub view: Option<MapView>,

    pub radius: u32,
    pub color: [u8; 3],
}

impl MapLayer {
    /// (min_lon, max_lon, min_lat, max_lat) over all points
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.points.first()?;
        let init = (first.longitude, first.longitude, first.latitude, first.latitude);
        Some(self.points.iter().fold(init, |(x0, x1, y0, y1), p| {
            (x0.min(p.longitude), x1.max(p.longitude), y0.min(p.latitude), y1.max(p.latitude))
        }))
    }
}

/// Every record with both coordinates, in dataset order, centered on
/// their mean position
pub fn registry_map_layer(dataset: &Dataset, config: &MapConfig) -> MapLayer {
    let points: Vec<MapPoint> = dataset
        .records()
        .iter()
        .filter_map(|record| {
            let (latitude, longitude) = record.coordinates()?;
            let zip_code = record.zip_code_display();
            Some(MapPoint {
                tooltip: tooltip_rows(
                    record.business_name.as_deref(),
                    record.facility_address.as_deref(),
                    zip_code.as_deref(),
                ),
                name: record.business_name.clone(),
                address: record.facility_address.clone(),
                zip_code,
                latitude,
                longitude,
            })
        })
        .collect();

    let view = if points.is_empty() {
        None
    } else {
        let n = points.len() as f64;
        Some(MapView {
            latitude: points.iter().map(|p| p.latitude).sum::<f64>() / n,
            longitude: points.iter().map(|p| p.longitude).sum::<f64>() / n,
            zoom: config.zoom,
            pitch: config.pitch,
        })
    };

    MapLayer {
        points,
        view,
        radius: config.radius,
        color: config.color,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{count_by_equity_designation, count_by_license_category, count_by_license_status};
    use crate::registry::{LicenseCategory, RegistryRecord};

    fn located(name: &str, lat: Option<f64>, lon: Option<f64>) -> RegistryRecord {
        RegistryRecord {
            business_name: Some(name.to_string()),
            facility_address: Some(format!("{} Main St", name.len())),
            facility_zip_code: Some("2118".to_string()),
            latitude: lat,
            longitude: lon,
            license_status: Some("Active".to_string()),
            license_category: Some("Retail".to_string()),
            equity_program_designation: Some("Y".to_string()),
        }
    }

    fn ten_with_two_unplaced() -> Dataset {
        let mut records: Vec<RegistryRecord> = (0..8)
            .map(|i| located(&format!("R{}", i), Some(42.0 + i as f64 * 0.01), Some(-71.0)))
            .collect();
        records.insert(3, located("NoLat", None, Some(-71.0)));
        records.insert(7, located("NoLon", Some(42.0), None));
        Dataset::from_records(records)
    }

    #[test]
    fn test_map_layer_drops_only_unplaced_records() {
        let dataset = ten_with_two_unplaced();
        assert_eq!(dataset.len(), 10);

        let layer = registry_map_layer(&dataset, &MapConfig::default());

        assert_eq!(layer.points.len(), 8);
        assert!(layer.points.iter().all(|p| p.name.as_deref().map_or(false, |n| n.starts_with('R'))));
        let names: Vec<&str> = layer.points.iter().filter_map(|p| p.name.as_deref()).collect();
        assert_eq!(names, vec!["R0", "R1", "R2", "R3", "R4", "R5", "R6", "R7"]);
    }

    #[test]
    fn test_map_view_centered_on_mean() {
        let dataset = Dataset::from_records(vec![
            located("A", Some(42.0), Some(-71.0)),
            located("B", Some(42.2), Some(-71.2)),
        ]);
        let layer = registry_map_layer(&dataset, &MapConfig::default());
        let view = layer.view.unwrap();

        assert!((view.latitude - 42.1).abs() < 1e-9);
        assert!((view.longitude + 71.1).abs() < 1e-9);
        assert_eq!(view.zoom, 11.0);
        assert_eq!(layer.radius, 75);
    }

    #[test]
    fn test_map_layer_empty_has_no_view() {
        let dataset = Dataset::from_records(vec![located("A", None, None)]);
        let layer = registry_map_layer(&dataset, &MapConfig::default());
        assert!(layer.points.is_empty());
        assert!(layer.view.is_none());
        assert!(layer.bounds().is_none());
    }

    #[test]
    fn test_tooltip_rows_carried_by_layer() {
        let mut unnamed = located("Green", Some(42.1), Some(-71.1));
        unnamed.business_name = None;
        let dataset = Dataset::from_records(vec![located("Green", Some(42.0), Some(-71.0)), unnamed]);
        let layer = registry_map_layer(&dataset, &MapConfig::default());

        let rows: Vec<(&str, &str)> = layer.points[0]
            .tooltip
            .iter()
            .map(|r| (r.label.as_str(), r.value.as_str()))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Registry Name", "Green"),
                ("Registry Address", "5 Main St"),
                ("Zip Code", "02118"),
            ]
        );
        assert_eq!(layer.points[1].tooltip[0].value, "Unknown");

        let json = serde_json::to_value(&layer).unwrap();
        assert_eq!(json["points"][0]["tooltip"][2]["label"], "Zip Code");
        assert_eq!(json["points"][0]["tooltip"][2]["value"], "02118");
    }

    #[test]
    fn test_pie_emphasizes_only_selected_slice() {
        let dataset = Dataset::from_records(vec![
            RegistryRecord { license_category: Some("Retail".into()), ..Default::default() },
            RegistryRecord { license_category: Some("Courier".into()), ..Default::default() },
            RegistryRecord { license_category: Some("Courier".into()), ..Default::default() },
            RegistryRecord { license_category: Some("Medical".into()), ..Default::default() },
        ]);
        let counts = count_by_license_category(&dataset);

        let mut selection = SelectionState::new();
        for category in LicenseCategory::ALL {
            selection.select_category(*category);
            let pie = category_pie_chart(&counts, &selection);

            let emphasized: Vec<&PieSlice> = pie.slices.iter().filter(|s| s.emphasized).collect();
            assert_eq!(emphasized.len(), 1);
            assert_eq!(emphasized[0].label, category.label());
            assert_eq!(emphasized[0].explode, EXPLODE_OFFSET);
            assert!(pie.slices.iter().filter(|s| !s.emphasized).all(|s| s.explode == 0.0));
        }
    }

    #[test]
    fn test_pie_fractions() {
        let dataset = Dataset::from_records(vec![
            RegistryRecord { license_category: Some("Retail".into()), ..Default::default() },
            RegistryRecord { license_category: Some("Courier".into()), ..Default::default() },
            RegistryRecord::default(),
        ]);
        let pie = category_pie_chart(&count_by_license_category(&dataset), &SelectionState::new());

        assert_eq!(pie.slices.len(), 9);
        assert_eq!(pie.slices[0].fraction, 0.5);
        assert_eq!(pie.slices[4].label, "Courier");
        assert_eq!(pie.slices[4].fraction, 0.5);
        assert_eq!(pie.emphasized().map(|s| s.label.as_str()), Some("Retail"));
    }

    #[test]
    fn test_bar_charts_keep_fixed_order() {
        let dataset = ten_with_two_unplaced();

        let status = status_bar_chart(&count_by_license_status(&dataset));
        let labels: Vec<&str> = status.points.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["Inactive", "Active", "Expired", "Deleted"]);
        assert_eq!(status.points[1].value, 10);
        assert_eq!(status.max_value(), 10);

        let mut records = dataset.records().to_vec();
        records[0].equity_program_designation = Some("N".to_string());
        records[1].equity_program_designation = None;
        let equity = count_by_equity_designation(&Dataset::from_records(records)).unwrap();
        let chart = equity_bar_chart(&equity);
        let pairs: Vec<(&str, u64)> = chart.points.iter().map(|p| (p.label.as_str(), p.value)).collect();
        assert_eq!(pairs, vec![("Yes", 8), ("No", 1), ("Not Applicable", 1)]);
    }
}
