use crate::error::LoadViewError;
use crate::interpret::normalize_duration;
use crate::summary::model::{LoadTestSummary, RawDuration};

/// Check a [`LoadTestSummary`] for values the interpreter would render as
/// garbage, and return one error per finding.
///
/// An empty `Vec` means the summary is valid. Interpretation never depends
/// on this; it is for callers that want to reject bad payloads up front.
pub fn validate_summary(summary: &LoadTestSummary) -> Vec<LoadViewError> {
    let mut errors = Vec::new();

    if summary.api_name.trim().is_empty() {
        errors.push(LoadViewError::Validation(
            "api_name must not be empty".to_string(),
        ));
    }

    if !(0.0..=1.0).contains(&summary.success) {
        errors.push(LoadViewError::Validation(format!(
            "success ratio must be within [0, 1] (got: {})",
            summary.success
        )));
    }

    if summary.throughput.is_nan() || summary.throughput < 0.0 {
        errors.push(LoadViewError::Validation(format!(
            "throughput must be a non-negative number (got: {})",
            summary.throughput
        )));
    }

    errors.extend(validate_duration("duration", &summary.duration));
    errors.extend(validate_duration("wait", &summary.wait));
    let lat = &summary.latencies;
    for (name, raw) in [
        ("latencies.mean", &lat.mean),
        ("latencies.p50", &lat.p50),
        ("latencies.p95", &lat.p95),
        ("latencies.p99", &lat.p99),
    ] {
        errors.extend(validate_duration(name, raw));
    }

    for code in summary.status_codes.keys() {
        let well_formed = code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit());
        if !well_formed {
            errors.push(LoadViewError::Validation(format!(
                "status code '{code}' is not a three-digit HTTP status"
            )));
        }
    }

    let data = &summary.data;
    for (name, value) in [
        ("data.bytes_in", data.bytes_in),
        ("data.bytes_out", data.bytes_out),
        ("data.bytes_in_total", data.bytes_in_total),
        ("data.bytes_out_total", data.bytes_out_total),
    ] {
        if value.is_nan() || value < 0.0 {
            errors.push(LoadViewError::Validation(format!(
                "{name} must be a non-negative number (got: {value})"
            )));
        }
    }

    if let Some(count) = summary.errors {
        if count > summary.requests {
            errors.push(LoadViewError::Validation(format!(
                "error count {count} exceeds request count {}",
                summary.requests
            )));
        }
    }

    for err in &errors {
        tracing::warn!(api_name = %summary.api_name, "{err}");
    }

    errors
}

fn validate_duration(name: &str, raw: &RawDuration) -> Option<LoadViewError> {
    let normalized = normalize_duration(raw);
    if normalized.as_seconds().is_nan() {
        Some(LoadViewError::Validation(format!(
            "{name} has no numeric value (got: {raw})"
        )))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
