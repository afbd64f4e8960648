pub mod api;
pub mod canvas;
pub mod charts;
pub mod controller;
pub mod heatmap;
pub mod suggestions;

pub use api::{AnalyticsApi, ApiError, HttpAnalyticsApi};
pub use controller::{DashboardController, DashboardView, ExportFile, Metric, EXPORT_FAILED, REFRESH_INTERVAL};

pub(crate) fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
