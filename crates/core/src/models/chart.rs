use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single data point of the net-worth growth chart.
///
/// The core generates these; the frontend only renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataPoint {
    pub date: DateTime<Utc>,

    /// Snapshot total in the chart currency
    pub total_value: f64,

    /// Trailing simple moving average, once enough points exist
    pub moving_average: Option<f64>,

    /// Percent change from the previous point
    pub growth_rate: Option<f64>,
}
