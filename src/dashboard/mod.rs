pub mod dashboard_model;
pub mod dashboard_service;

pub use dashboard_model::{ChartData, ChartDataset, ChartKind, DashboardSummary, Period};
pub use dashboard_service::DashboardService;
