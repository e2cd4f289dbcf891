pub mod export;

use serde::{Deserialize, Serialize};

use crate::interpret::{
    classify_normalized, classify_status_code, format_byte_size, normalize_duration, to_fixed,
    LatencyClass, NormalizedDuration, StatusClass,
};
use crate::summary::{LoadTestSummary, RawDuration};

/// Shown in the error section when the backend reported errors but no message.
pub const NO_ERROR_DETAILS: &str = "No specific error details available.";

// ---------------------------------------------------------------------------
// Report sections
// ---------------------------------------------------------------------------

/// One latency figure with its severity bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LatencyMetric {
    pub label: String,
    pub duration: NormalizedDuration,
    pub class: LatencyClass,
}

impl LatencyMetric {
    fn from_raw(label: &str, raw: &RawDuration) -> Self {
        let duration = normalize_duration(raw);
        let class = classify_normalized(&duration);
        Self {
            label: label.to_string(),
            duration,
            class,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StatusCodeEntry {
    pub code: String,
    pub count: u64,
    pub class: StatusClass,
}

/// Humanized byte sizes, totals and per-request averages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TransferView {
    pub downloaded_total: String,
    pub downloaded_avg: String,
    pub uploaded_total: String,
    pub uploaded_avg: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ErrorSection {
    pub count: u64,
    /// The backend's error message, or [`NO_ERROR_DETAILS`].
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// ---------------------------------------------------------------------------
// ResultReport
// ---------------------------------------------------------------------------

/// Display-ready interpretation of a [`LoadTestSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ResultReport {
    pub api_name: String,
    /// Success ratio as a percentage, one decimal.
    pub success_percent: String,
    /// True only when the success ratio is exactly 1.
    pub fully_successful: bool,
    pub requests: u64,
    /// Requests per second, one decimal.
    pub throughput: String,
    pub duration: NormalizedDuration,
    pub wait: NormalizedDuration,
    /// Mean, p50, p95, p99 in that order.
    pub latencies: Vec<LatencyMetric>,
    /// Numeric codes ascending, then any non-numeric keys in text order.
    pub status_codes: Vec<StatusCodeEntry>,
    pub transfer: TransferView,
    /// Present only when the error count is above zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ErrorSection>,
}

impl ResultReport {
    pub fn from_summary(summary: &LoadTestSummary) -> Self {
        let lat = &summary.latencies;
        let latencies = vec![
            LatencyMetric::from_raw("Mean", &lat.mean),
            LatencyMetric::from_raw("50th Percentile", &lat.p50),
            LatencyMetric::from_raw("95th Percentile", &lat.p95),
            LatencyMetric::from_raw("99th Percentile", &lat.p99),
        ];

        let mut status_codes: Vec<StatusCodeEntry> = summary
            .status_codes
            .iter()
            .map(|(code, count)| StatusCodeEntry {
                code: code.clone(),
                count: *count,
                class: classify_status_code(code),
            })
            .collect();
        // Stable sort: non-numeric keys keep their text order after the codes.
        status_codes.sort_by_key(|e| histogram_index(&e.code).map_or((1, 0), |n| (0, n)));

        let data = &summary.data;
        let transfer = TransferView {
            downloaded_total: format_byte_size(data.bytes_in_total),
            downloaded_avg: format_byte_size(data.bytes_in),
            uploaded_total: format_byte_size(data.bytes_out_total),
            uploaded_avg: format_byte_size(data.bytes_out),
        };

        let errors = match summary.errors {
            Some(count) if count > 0 => {
                let message = summary.error.clone().filter(|m| !m.is_empty());
                // Details only accompany a real message.
                let details = message
                    .as_ref()
                    .and(summary.details.clone())
                    .filter(|d| !d.is_empty());
                Some(ErrorSection {
                    count,
                    message: message.unwrap_or_else(|| NO_ERROR_DETAILS.to_string()),
                    details,
                })
            }
            _ => None,
        };

        Self {
            api_name: summary.api_name.clone(),
            success_percent: to_fixed(summary.success * 100.0, 1),
            fully_successful: summary.success == 1.0,
            requests: summary.requests,
            throughput: to_fixed(summary.throughput, 1),
            duration: normalize_duration(&summary.duration),
            wait: normalize_duration(&summary.wait),
            latencies,
            status_codes,
            transfer,
            errors,
        }
    }

    /// The most severe latency bucket across all reported percentiles.
    pub fn worst_latency(&self) -> Option<LatencyClass> {
        self.latencies.iter().map(|m| m.class).max()
    }

    /// Total responses per status bucket, in bucket order.
    pub fn status_totals(&self) -> Vec<(StatusClass, u64)> {
        let mut totals: Vec<(StatusClass, u64)> = Vec::new();
        for entry in &self.status_codes {
            match totals.iter_mut().find(|(class, _)| *class == entry.class) {
                Some((_, total)) => *total += entry.count,
                None => totals.push((entry.class, entry.count)),
            }
        }
        totals.sort_by_key(|(class, _)| status_rank(*class));
        totals
    }
}

/// A histogram key that is a canonical unsigned integer (no sign, no leading
/// zero). These sort numerically ahead of every other key.
fn histogram_index(code: &str) -> Option<u32> {
    let canonical = !code.is_empty()
        && code.bytes().all(|b| b.is_ascii_digit())
        && (code.len() == 1 || !code.starts_with('0'));
    if !canonical {
        return None;
    }
    code.parse::<u32>().ok().filter(|n| *n != u32::MAX)
}

fn status_rank(class: StatusClass) -> u8 {
    match class {
        StatusClass::Success => 0,
        StatusClass::Redirect => 1,
        StatusClass::ClientError => 2,
        StatusClass::ServerError => 3,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
