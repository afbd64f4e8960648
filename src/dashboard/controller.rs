use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{error, warn};

use super::{
    api::{AnalyticsApi, ApiError},
    canvas::SvgCanvas,
    charts::{self, ChartRegistry, ChartSlot},
    heatmap::{render_empty_heatmap, render_heatmap},
    suggestions::{render_notice, render_suggestions, LOADING, LOAD_FAILED},
};
use crate::models::{HeatmapData, ScrollData, SuggestionsResponse};
use crate::summary::AnalyticsSummary;

/// The page reloads itself on this cadence; nothing is re-fetched in place.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

pub const EXPORT_FAILED: &str = "Failed to export data. Please try again.";

const DEPTH_BUCKETS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Metric {
    TotalClicks,
    ClickClusters,
    AvgScrollDepth,
    MaxScrollDepth,
    BounceRate,
}

impl Metric {
    pub fn element_id(self) -> &'static str {
        match self {
            Metric::TotalClicks => "total-clicks",
            Metric::ClickClusters => "click-clusters",
            Metric::AvgScrollDepth => "avg-scroll-depth",
            Metric::MaxScrollDepth => "max-scroll-depth",
            Metric::BounceRate => "bounce-rate",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    pub metrics: BTreeMap<Metric, String>,
    pub heatmap: SvgCanvas,
    pub suggestions_html: String,
}

impl DashboardView {
    pub fn metric(&self, metric: Metric) -> Option<&str> {
        self.metrics.get(&metric).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    pub fn file_name_for(date: NaiveDate) -> String {
        format!("ux-analytics-data-{}.json", date.format("%Y-%m-%d"))
    }
}

pub struct DashboardController<A> {
    api: A,
    summary: Option<AnalyticsSummary>,
    charts: ChartRegistry,
    view: DashboardView,
}

impl<A: AnalyticsApi> DashboardController<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            summary: None,
            charts: ChartRegistry::default(),
            view: DashboardView::default(),
        }
    }

    pub async fn initialize(&mut self, summary: AnalyticsSummary) {
        self.charts.replace(
            ChartSlot::EventDistribution,
            charts::event_distribution_chart(&summary.event_types),
        );
        self.charts
            .replace(ChartSlot::Timeline, charts::timeline_chart(summary.total_events));
        self.summary = Some(summary);

        self.load_all().await;
    }

    /// Fetches the three panels concurrently. A failure in one never keeps
    /// the others from rendering.
    pub async fn load_all(&mut self) {
        self.view.suggestions_html = render_notice(LOADING);
        let (heatmap, scroll, suggestions) = tokio::join!(
            self.api.heatmap_data(),
            self.api.scroll_data(),
            self.api.suggestions()
        );
        self.apply_heatmap(heatmap);
        self.apply_scroll(scroll);
        self.apply_suggestions(suggestions);
    }

    pub async fn reload_heatmap(&mut self) {
        let result = self.api.heatmap_data().await;
        self.apply_heatmap(result);
    }

    pub async fn reload_suggestions(&mut self) {
        self.view.suggestions_html = render_notice(LOADING);
        let result = self.api.suggestions().await;
        self.apply_suggestions(result);
    }

    pub async fn export(&self, today: NaiveDate) -> Result<ExportFile, ApiError> {
        let data = self.api.export_data().await.inspect_err(|err| {
            error!("error exporting data: {err}");
        })?;
        let contents = serde_json::to_string_pretty(&data).unwrap_or_else(|_| data.to_string());
        Ok(ExportFile {
            file_name: ExportFile::file_name_for(today),
            contents,
        })
    }

    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    pub fn charts(&self) -> &ChartRegistry {
        &self.charts
    }

    pub fn summary(&self) -> Option<&AnalyticsSummary> {
        self.summary.as_ref()
    }

    fn apply_heatmap(&mut self, result: Result<HeatmapData, ApiError>) {
        match result {
            Ok(data) => {
                render_heatmap(&mut self.view.heatmap, &data);
                self.set_metric(Metric::TotalClicks, data.total_clicks.to_string());
                self.set_metric(Metric::ClickClusters, data.clusters.to_string());
            }
            Err(err) => {
                warn!("error loading heatmap data: {err}");
                render_empty_heatmap(&mut self.view.heatmap);
                self.set_metric(Metric::TotalClicks, "0".to_string());
                self.set_metric(Metric::ClickClusters, "0".to_string());
            }
        }
    }

    fn apply_scroll(&mut self, result: Result<ScrollData, ApiError>) {
        match result {
            Ok(data) => {
                self.set_metric(Metric::AvgScrollDepth, percent(data.average_depth));
                self.set_metric(Metric::MaxScrollDepth, percent(data.max_depth));
                self.set_metric(Metric::BounceRate, percent(data.bounce_rate));
                if let Some(distribution) = &data.depth_distribution {
                    self.charts.replace(
                        ChartSlot::ScrollDepth,
                        charts::scroll_depth_chart(distribution, charts::LIVE_BAR_ALPHA),
                    );
                }
            }
            Err(err) => {
                warn!("error loading scroll data: {err}");
                for metric in [Metric::AvgScrollDepth, Metric::MaxScrollDepth, Metric::BounceRate] {
                    self.set_metric(metric, "0%".to_string());
                }
                self.charts.replace(
                    ChartSlot::ScrollDepth,
                    charts::scroll_depth_chart(&[0.0; DEPTH_BUCKETS], charts::EMPTY_BAR_ALPHA),
                );
            }
        }
    }

    fn apply_suggestions(&mut self, result: Result<SuggestionsResponse, ApiError>) {
        self.view.suggestions_html = match result {
            Ok(response) => render_suggestions(&response.suggestions),
            Err(err) => {
                warn!("error loading suggestions: {err}");
                render_notice(LOAD_FAILED)
            }
        };
    }

    fn set_metric(&mut self, metric: Metric, value: String) {
        self.view.metrics.insert(metric, value);
    }
}

fn percent(value: f64) -> String {
    format!("{value}%")
}
