use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapPoint {
    #[serde(deserialize_with = "null_as_default")]
    pub x: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub y: f64,
    /// Normalized to 0..=1 by the server.
    #[serde(deserialize_with = "null_as_default")]
    pub intensity: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapData {
    #[serde(deserialize_with = "null_as_default")]
    pub points: Vec<HeatmapPoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub total_clicks: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub clusters: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollData {
    #[serde(deserialize_with = "null_as_default")]
    pub average_depth: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub max_depth: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub bounce_rate: f64,
    /// Ten buckets, 0-10% through 90-100%.
    pub depth_distribution: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Suggestion {
    pub title: String,
    pub description: String,
    pub priority: String,
    pub actionable_tips: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Suggestion>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
