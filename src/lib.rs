// Cannabis Registry Dashboard - Core Library
// Exposes all modules for use in the terminal dashboard, web server, and tests

pub mod error;
pub mod registry;
pub mod dataset;
pub mod aggregate;
pub mod selection;
pub mod charts;
pub mod summary;
pub mod config;
pub mod session;

// Re-export commonly used types
pub use error::{DashboardError, ValidationError};
pub use registry::{
    Bucket, EquityDesignation, LicenseCategory, LicenseStatus, RegistryRecord,
};
pub use dataset::{load_dataset, Dataset, DatasetInfo};
pub use aggregate::{
    CategoryCounts, EquityCounts, LicenseCategoryCounts, StatusCounts,
    count_by_equity_designation, count_by_license_category, count_by_license_status,
};
pub use selection::SelectionState;
pub use charts::{
    BarChartData, ChartPoint, MapLayer, MapPoint, MapView, PieChartData, PieSlice, TooltipRow,
    category_pie_chart, equity_bar_chart, registry_map_layer, status_bar_chart,
};
pub use summary::{category_summary, status_summary};
pub use config::DashboardConfig;
pub use session::{DashboardView, SessionContext, Widget};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
