//! Aggregates over committed transactions plus the dashboard summary.

mod aggregate;
mod service;
pub mod views;

pub use aggregate::{monthly, overview, partners, products};
pub use service::StatisticsService;
pub use views::{
    Dashboard, MonthlyEntry, Overview, PartnerEntry, ProductEntry, StatisticsQuery,
    DEFAULT_BREAKDOWN_LIMIT,
};
