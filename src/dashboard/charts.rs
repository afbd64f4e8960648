use std::collections::{btree_map::Entry, BTreeMap};

use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

pub const DEPTH_LABELS: [&str; 10] = [
    "0-10%", "10-20%", "20-30%", "30-40%", "40-50%", "50-60%", "60-70%", "70-80%", "80-90%",
    "90-100%",
];

pub const TIMELINE_LABELS: [&str; 7] = ["6h ago", "5h ago", "4h ago", "3h ago", "2h ago", "1h ago", "Now"];

const PALETTE: [&str; 5] = [
    "hsl(220, 100%, 50%)",
    "hsl(45, 100%, 50%)",
    "hsl(120, 100%, 35%)",
    "hsl(35, 100%, 50%)",
    "hsl(0, 100%, 50%)",
];
const PRIMARY: &str = "hsl(220, 100%, 50%)";

pub const LIVE_BAR_ALPHA: f64 = 0.7;
pub const EMPTY_BAR_ALPHA: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSlot {
    EventDistribution,
    Timeline,
    ScrollDepth,
}

impl ChartSlot {
    pub fn element_id(self) -> &'static str {
        match self {
            ChartSlot::EventDistribution => "eventChart",
            ChartSlot::Timeline => "timelineChart",
            ChartSlot::ScrollDepth => "scrollChart",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Doughnut,
    Line,
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Colors {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub background_color: Colors,
    pub border_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tension: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub data: ChartData,
    pub options: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub id: u64,
    pub slot: ChartSlot,
    pub config: ChartConfig,
}

#[derive(Debug, Default)]
pub struct ChartRegistry {
    charts: BTreeMap<ChartSlot, Chart>,
    next_id: u64,
    destroyed: u64,
}

impl ChartRegistry {
    /// Destroys whatever occupies `slot` and mounts a fresh chart there.
    pub fn replace(&mut self, slot: ChartSlot, config: ChartConfig) -> &Chart {
        self.next_id += 1;
        let chart = Chart {
            id: self.next_id,
            slot,
            config,
        };

        match self.charts.entry(slot) {
            Entry::Occupied(mut occupied) => {
                let old = occupied.insert(chart);
                self.destroyed += 1;
                debug!(slot = slot.element_id(), id = old.id, "destroyed chart");
                occupied.into_mut()
            }
            Entry::Vacant(vacant) => vacant.insert(chart),
        }
    }

    pub fn get(&self, slot: ChartSlot) -> Option<&Chart> {
        self.charts.get(&slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chart> {
        self.charts.values()
    }

    pub fn len(&self) -> usize {
        self.charts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.charts.is_empty()
    }

    pub fn destroyed_count(&self) -> u64 {
        self.destroyed
    }
}

pub fn event_distribution_chart(event_types: &BTreeMap<String, u64>) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Doughnut,
        data: ChartData {
            labels: event_types.keys().map(|label| capitalize(label)).collect(),
            datasets: vec![Dataset {
                label: None,
                data: event_types.values().map(|count| *count as f64).collect(),
                background_color: Colors::Many(PALETTE.iter().map(|c| c.to_string()).collect()),
                border_color: "#ffffff".to_string(),
                border_width: Some(2),
                fill: None,
                tension: None,
            }],
        },
        options: json!({
            "responsive": true,
            "maintainAspectRatio": false,
            "plugins": {
                "legend": {
                    "position": "bottom",
                    "labels": { "padding": 20, "usePointStyle": true }
                }
            }
        }),
    }
}

/// Only the latest bucket carries data until hourly series exist upstream.
pub fn timeline_chart(total_events: u64) -> ChartConfig {
    let mut data = vec![0.0; TIMELINE_LABELS.len()];
    if let Some(now) = data.last_mut() {
        *now = total_events as f64;
    }

    ChartConfig {
        kind: ChartKind::Line,
        data: ChartData {
            labels: TIMELINE_LABELS.iter().map(|l| l.to_string()).collect(),
            datasets: vec![Dataset {
                label: Some("Events".to_string()),
                data,
                background_color: Colors::One("hsl(220, 100%, 50%, 0.1)".to_string()),
                border_color: PRIMARY.to_string(),
                border_width: None,
                fill: Some(true),
                tension: Some(0.4),
            }],
        },
        options: axis_options(),
    }
}

pub fn scroll_depth_chart(distribution: &[f64], fill_alpha: f64) -> ChartConfig {
    ChartConfig {
        kind: ChartKind::Bar,
        data: ChartData {
            labels: DEPTH_LABELS.iter().map(|l| l.to_string()).collect(),
            datasets: vec![Dataset {
                label: Some("Sessions".to_string()),
                data: distribution.to_vec(),
                background_color: Colors::One(format!("hsl(220, 100%, 50%, {fill_alpha})")),
                border_color: PRIMARY.to_string(),
                border_width: Some(1),
                fill: None,
                tension: None,
            }],
        },
        options: axis_options(),
    }
}

fn axis_options() -> Value {
    json!({
        "responsive": true,
        "maintainAspectRatio": false,
        "scales": { "y": { "beginAtZero": true } },
        "plugins": { "legend": { "display": false } }
    })
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
