//! Auto Dashboard: load a CSV or Excel table, infer column types, filter
//! it, chart it, and export the filtered rows or a statistical summary.

pub mod chart;
pub mod color;
pub mod config;
pub mod data;
pub mod export;
pub mod state;
pub mod ui;

mod app;

pub use app::AutoDashboardApp;
