// 🧭 Session Context - one dashboard session's dataset + selection
// Every render is a full recomputation from the in-memory dataset.

use crate::aggregate::{
    count_by_equity_designation, count_by_license_category, count_by_license_status,
};
use crate::charts::{
    category_pie_chart, equity_bar_chart, registry_map_layer, status_bar_chart, BarChartData,
    MapLayer, PieChartData,
};
use crate::config::DashboardConfig;
use crate::dataset::{load_dataset, Dataset, DatasetInfo};
use crate::error::{Result, ValidationError};
use crate::selection::SelectionState;
use crate::summary::{category_summary, status_summary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

// ============================================================================
// WIDGET RESULT
// ============================================================================

/// Outcome of building one widget. A failure stays local to its widget.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Widget<T> {
    Ready { data: T },
    Failed { message: String },
}

impl<T> Widget<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Widget::Ready { data } => Some(data),
            Widget::Failed { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Widget::Ready { .. })
    }
}

impl<T, E: std::fmt::Display> From<std::result::Result<T, E>> for Widget<T> {
    fn from(result: std::result::Result<T, E>) -> Self {
        match result {
            Ok(data) => Widget::Ready { data },
            Err(e) => Widget::Failed {
                message: e.to_string(),
            },
        }
    }
}

// ============================================================================
// DASHBOARD VIEW
// ============================================================================

/// Everything a front end needs for one frame
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub session_id: String,
    pub session_started_at: DateTime<Utc>,
    pub dataset: DatasetInfo,
    pub total_records: usize,
    pub selection: SelectionState,

    pub category_summary: String,
    pub status_summary: String,

    pub category_pie: Widget<PieChartData>,
    pub status_bar: Widget<BarChartData>,
    pub equity_bar: Widget<BarChartData>,
    pub map: Widget<MapLayer>,

    pub banner_path: String,
    pub banner_width: u32,
}

// ============================================================================
// SESSION CONTEXT
// ============================================================================

pub struct SessionContext {
    id: String,
    started_at: DateTime<Utc>,
    dataset: Dataset,
    selection: SelectionState,
    config: DashboardConfig,
}

impl SessionContext {
    pub fn new(dataset: Dataset, config: DashboardConfig) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        info!(session = %id, rows = dataset.len(), "session started");

        SessionContext {
            id,
            started_at: Utc::now(),
            dataset,
            selection: SelectionState::default(),
            config,
        }
    }

    /// Load the configured CSV. Any load failure is fatal for the session.
    pub fn open(config: DashboardConfig) -> Result<Self> {
        let dataset = load_dataset(&config.data.csv_path)?;
        Ok(Self::new(dataset, config))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionState {
        &mut self.selection
    }

    pub fn set_selected_category(&mut self, value: &str) -> std::result::Result<(), ValidationError> {
        let category = self.selection.set_selected_category(value).map_err(|e| {
            warn!(session = %self.id, error = %e, "rejected category selection");
            e
        })?;
        debug!(session = %self.id, category = %category, "category selected");
        Ok(())
    }

    pub fn set_selected_status(&mut self, value: &str) -> std::result::Result<(), ValidationError> {
        let status = self.selection.set_selected_status(value).map_err(|e| {
            warn!(session = %self.id, error = %e, "rejected status selection");
            e
        })?;
        debug!(session = %self.id, status = %status, "status selected");
        Ok(())
    }

    /// Full pass: four aggregations, three charts, the map, two summaries
    pub fn render(&self) -> DashboardView {
        let region = self.config.data.region.as_str();

        let status_counts = count_by_license_status(&self.dataset);
        let category_counts = count_by_license_category(&self.dataset);
        let equity = count_by_equity_designation(&self.dataset);

        if let Err(e) = &equity {
            warn!(session = %self.id, error = %e, "equity chart unavailable");
        }

        DashboardView {
            session_id: self.id.clone(),
            session_started_at: self.started_at(),
            dataset: self.dataset.info(),
            total_records: self.dataset.len(),
            selection: self.selection,
            category_summary: category_summary(
                &category_counts,
                self.selection.selected_category(),
                region,
            ),
            status_summary: status_summary(&status_counts, self.selection.selected_status(), region),
            category_pie: Widget::Ready {
                data: category_pie_chart(&category_counts, &self.selection),
            },
            status_bar: Widget::Ready {
                data: status_bar_chart(&status_counts),
            },
            equity_bar: equity.map(|counts| equity_bar_chart(&counts)).into(),
            map: Widget::Ready {
                data: registry_map_layer(&self.dataset, &self.config.map),
            },
            banner_path: self.config.data.banner_path.display().to_string(),
            banner_width: self.config.data.banner_width,
        }
    }
}
