pub mod app;
pub mod config;
pub mod dashboard;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod state;
pub mod summary;
pub mod tracking;
pub mod ui;

pub use app::router;
pub use config::DashboardConfig;
pub use state::AppState;
