use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// RawDuration
// ---------------------------------------------------------------------------

/// A duration-like value as it arrives from the load-testing backend.
///
/// The backend emits either a bare number (unit unknown) or a string that may
/// already carry an `ms` / `s` suffix. The shape is resolved once here; the
/// unit is resolved later by [`crate::interpret::normalize_duration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDuration {
    Number(f64),
    Text(String),
}

impl std::fmt::Display for RawDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawDuration::Number(n) => write!(f, "{n}"),
            RawDuration::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<f64> for RawDuration {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for RawDuration {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawDuration {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl Default for RawDuration {
    fn default() -> Self {
        Self::Number(0.0)
    }
}

// ---------------------------------------------------------------------------
// Latencies / DataTransfer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Latencies {
    pub mean: RawDuration,
    pub p50: RawDuration,
    pub p95: RawDuration,
    pub p99: RawDuration,
}

/// Bytes moved during the run. The non-`_total` fields are per-request
/// averages and may be fractional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DataTransfer {
    #[serde(default)]
    pub bytes_in: f64,
    #[serde(default)]
    pub bytes_out: f64,
    #[serde(default)]
    pub bytes_in_total: f64,
    #[serde(default)]
    pub bytes_out_total: f64,
}

// ---------------------------------------------------------------------------
// LoadTestSummary
// ---------------------------------------------------------------------------

/// Summary payload of one completed load test.
///
/// Read-only input: nothing in this crate mutates a summary, every derived
/// value is built fresh from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoadTestSummary {
    pub api_name: String,
    pub requests: u64,
    /// Requests per second.
    pub throughput: f64,
    pub duration: RawDuration,
    /// Average wait time.
    pub wait: RawDuration,
    pub latencies: Latencies,
    /// Occurrences keyed by status code text (`"200"`, `"503"`, ...).
    #[serde(default)]
    pub status_codes: BTreeMap<String, u64>,
    #[serde(default)]
    pub data: DataTransfer,
    /// Success ratio in `[0, 1]`.
    pub success: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
