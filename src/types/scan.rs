use super::{Analysis, Signal};
use serde::{Deserialize, Serialize};

/// One qualifying symbol from a scan run.
///
/// A completed scan yields these sorted by `strongest_signal.strength`
/// descending; equal strengths keep the volume-ranked scan order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    pub symbol: String,
    pub price: f64,
    /// 24h quote volume at scan time.
    pub quote_volume: f64,
    /// 24h price change in percent, when the ticker reported one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_24h: Option<f64>,
    pub analysis: Analysis,
    pub strongest_signal: Signal,
    /// Unix timestamp (milliseconds) when this symbol was evaluated.
    pub scanned_at: i64,
}

/// Lifecycle and progress events emitted while a scan runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum ScanEvent {
    /// A scan run was accepted and is starting.
    Started,
    /// A symbol is being evaluated.
    Progress {
        current: usize,
        total: usize,
        symbol: String,
    },
    /// The run finished; carries the ranked results.
    Completed {
        results: Vec<ScanResult>,
        timestamp: i64,
    },
    /// The run aborted before producing results.
    Failed { message: String },
}
