use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub total_events: u64,
    pub unique_sessions: u64,
    pub event_types: BTreeMap<String, u64>,
    pub events_per_session: f64,
}

impl AnalyticsSummary {
    /// Derives the summary from an export dump
    /// (`{events: [...], sessions: [...], total_events, total_sessions}`).
    /// Missing pieces count as zero.
    pub fn from_export(export: &Value) -> Self {
        let events = export
            .get("events")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        let mut event_types = BTreeMap::new();
        let mut session_ids = BTreeSet::new();
        for event in events {
            if let Some(kind) = event.get("event_type").and_then(Value::as_str) {
                *event_types.entry(kind.to_string()).or_insert(0) += 1;
            }
            if let Some(session) = event.get("session_id").and_then(Value::as_str) {
                session_ids.insert(session);
            }
        }

        let total_events = export
            .get("total_events")
            .and_then(Value::as_u64)
            .unwrap_or(events.len() as u64);
        let unique_sessions = export
            .get("total_sessions")
            .and_then(Value::as_u64)
            .unwrap_or(session_ids.len() as u64);

        let events_per_session = if unique_sessions == 0 {
            0.0
        } else {
            (total_events as f64 / unique_sessions as f64 * 100.0).round() / 100.0
        };

        Self {
            total_events,
            unique_sessions,
            event_types,
            events_per_session,
        }
    }
}

pub fn format_number(value: u64) -> String {
    if value >= 1_000_000 {
        format!("{:.1}M", value as f64 / 1_000_000.0)
    } else if value >= 1_000 {
        format!("{:.1}K", value as f64 / 1_000.0)
    } else {
        value.to_string()
    }
}
