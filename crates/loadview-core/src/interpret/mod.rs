//! Rules that turn raw load-test values into display-ready scalars.
//!
//! Every function here is pure and total: malformed input degrades to a
//! best-effort value (`"NaN"`, the `serverError` bucket, the nearest byte
//! unit) instead of an error. Callers that need strict checks should run
//! [`crate::summary::validate_summary`] first.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::summary::RawDuration;

// ---------------------------------------------------------------------------
// DurationUnit / NormalizedDuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationUnit {
    Ms,
    S,
}

impl DurationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Ms => "ms",
            DurationUnit::S => "s",
        }
    }
}

impl std::fmt::Display for DurationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A duration rendered to two decimals together with its resolved unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct NormalizedDuration {
    /// Fixed to two decimals; may be `"NaN"` for non-numeric input.
    pub value: String,
    pub unit: DurationUnit,
}

impl NormalizedDuration {
    /// The rendered value converted to seconds. `NaN` when the value is `"NaN"`.
    pub fn as_seconds(&self) -> f64 {
        let value = parse_leading_float(&self.value);
        match self.unit {
            DurationUnit::S => value,
            DurationUnit::Ms => value / 1000.0,
        }
    }
}

/// Renders as `"{value}{unit}"`, e.g. `250.00ms`. The output normalizes back
/// to the same pair.
impl std::fmt::Display for NormalizedDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

// ---------------------------------------------------------------------------
// normalize_duration
// ---------------------------------------------------------------------------

/// Plain numbers above this are taken as milliseconds, the rest as seconds.
const MS_INFERENCE_THRESHOLD: f64 = 10.0;

fn ms_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([0-9.]+)\s*ms$").expect("ms marker pattern is valid"))
}

fn s_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^([0-9.]+)\s*s$").expect("s marker pattern is valid"))
}

/// Resolve a raw duration into a two-decimal value and a unit.
///
/// Text carrying an `ms` or `s` marker keeps that unit. Anything else is read
/// as a plain number and the unit is inferred: above 10 means milliseconds,
/// 10 or below means seconds.
pub fn normalize_duration(raw: &RawDuration) -> NormalizedDuration {
    match raw {
        RawDuration::Number(n) => infer_unit(*n),
        RawDuration::Text(text) => normalize_duration_str(text),
    }
}

/// [`normalize_duration`] for text input.
pub fn normalize_duration_str(text: &str) -> NormalizedDuration {
    if let Some(caps) = ms_marker().captures(text) {
        return NormalizedDuration {
            value: format_fixed(parse_leading_float(&caps[1])),
            unit: DurationUnit::Ms,
        };
    }
    if let Some(caps) = s_marker().captures(text) {
        return NormalizedDuration {
            value: format_fixed(parse_leading_float(&caps[1])),
            unit: DurationUnit::S,
        };
    }
    infer_unit(parse_leading_float(text))
}

fn infer_unit(value: f64) -> NormalizedDuration {
    let unit = if value > MS_INFERENCE_THRESHOLD {
        DurationUnit::Ms
    } else {
        DurationUnit::S
    };
    NormalizedDuration {
        value: format_fixed(value),
        unit,
    }
}

// ---------------------------------------------------------------------------
// classify_latency
// ---------------------------------------------------------------------------

/// Severity bucket for a latency value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LatencyClass {
    /// Under 200ms.
    Fast,
    /// Under 500ms.
    Normal,
    /// Under one second.
    Slow,
    /// One second or more, or not a number.
    Critical,
}

impl LatencyClass {
    pub fn as_str(self) -> &'static str {
        match self {
            LatencyClass::Fast => "fast",
            LatencyClass::Normal => "normal",
            LatencyClass::Slow => "slow",
            LatencyClass::Critical => "critical",
        }
    }
}

impl std::fmt::Display for LatencyClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_latency(raw: &RawDuration) -> LatencyClass {
    classify_normalized(&normalize_duration(raw))
}

/// Bucket an already normalized duration.
pub fn classify_normalized(duration: &NormalizedDuration) -> LatencyClass {
    let seconds = duration.as_seconds();
    if seconds < 0.2 {
        LatencyClass::Fast
    } else if seconds < 0.5 {
        LatencyClass::Normal
    } else if seconds < 1.0 {
        LatencyClass::Slow
    } else {
        LatencyClass::Critical
    }
}

// ---------------------------------------------------------------------------
// format_byte_size
// ---------------------------------------------------------------------------

const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Humanize a byte count with 1024-based units, at most two decimals.
///
/// Magnitudes past GB stay in GB; values below one byte, negative and NaN
/// values stay in B.
pub fn format_byte_size(bytes: f64) -> String {
    if bytes == 0.0 {
        return "0 B".to_string();
    }

    // log2 / 10 is exact at powers of 1024, unlike ln(b) / ln(1024).
    let index = if bytes >= 1.0 {
        ((bytes.log2() / 10.0).floor() as usize).min(BYTE_UNITS.len() - 1)
    } else {
        0
    };
    let scaled = bytes / 1024f64.powi(index as i32);
    let rounded = to_fixed(scaled, 2).parse::<f64>().unwrap_or(scaled);
    format!("{} {}", format_number(rounded), BYTE_UNITS[index])
}

// ---------------------------------------------------------------------------
// classify_status_code
// ---------------------------------------------------------------------------

/// HTTP status bucket by hundred-range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusClass {
    Success,
    Redirect,
    ClientError,
    /// 5xx and everything that is not a 2xx, 3xx or 4xx code.
    ServerError,
}

impl StatusClass {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusClass::Success => "success",
            StatusClass::Redirect => "redirect",
            StatusClass::ClientError => "clientError",
            StatusClass::ServerError => "serverError",
        }
    }
}

impl std::fmt::Display for StatusClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn classify_status_code(code: &str) -> StatusClass {
    match parse_leading_int(code) {
        Some(200..=299) => StatusClass::Success,
        Some(300..=399) => StatusClass::Redirect,
        Some(400..=499) => StatusClass::ClientError,
        _ => StatusClass::ServerError,
    }
}

// ---------------------------------------------------------------------------
// Numeric helpers
// ---------------------------------------------------------------------------

/// Parse the longest numeric prefix of `text` after leading whitespace.
/// Returns `NaN` when there is no numeric prefix at all.
fn parse_leading_float(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    if s[end..].starts_with("Infinity") {
        return if s.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - end - 1;
        if digits > 0 {
            end = frac_end;
        }
    }
    if digits == 0 {
        return f64::NAN;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().unwrap_or(f64::NAN)
}

/// Parse the leading decimal integer of `text`. `None` when there are no
/// digits or the value overflows.
fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }
    let magnitude = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Two-decimal rendering with `NaN` / `Infinity` spelled out.
fn format_fixed(value: f64) -> String {
    to_fixed(value, 2)
}

/// Digits printed when reading the exact decimal expansion of an `f64`.
/// The smallest subnormal needs 1074 fractional digits.
const EXACT_FRACTION_DIGITS: usize = 1100;

/// Render `value` with `digits` decimals.
///
/// Rounding is decided on the exact binary value and ties go away from zero,
/// so `0.125` gives `0.13` while `1.005` (really `1.00499...`) gives `1.00`.
/// Negative values keep their sign, `-0.0` renders unsigned.
pub(crate) fn to_fixed(value: f64, digits: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return infinity_text(value);
    }

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let digits = digits.min(frac.len());
    let round_up = frac.as_bytes().get(digits).is_some_and(|d| *d >= b'5');

    let mut buf: Vec<u8> = int_part.bytes().chain(frac[..digits].bytes()).collect();
    if round_up {
        let mut i = buf.len();
        loop {
            if i == 0 {
                buf.insert(0, b'1');
                break;
            }
            i -= 1;
            if buf[i] == b'9' {
                buf[i] = b'0';
            } else {
                buf[i] += 1;
                break;
            }
        }
    }

    let split = buf.len() - digits;
    let mut out = String::with_capacity(buf.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(buf[..split].iter().map(|b| char::from(*b)));
    if digits > 0 {
        out.push('.');
        out.extend(buf[split..].iter().map(|b| char::from(*b)));
    }
    out
}

/// Shortest rendering, dropping trailing zeros (`1`, `1.5`).
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        infinity_text(value)
    } else {
        format!("{value}")
    }
}

fn infinity_text(value: f64) -> String {
    if value.is_sign_negative() {
        "-Infinity".to_string()
    } else {
        "Infinity".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn nd(value: &str, unit: DurationUnit) -> NormalizedDuration {
        NormalizedDuration {
            value: value.to_string(),
            unit,
        }
    }

    // -----------------------------------------------------------------------
    // normalize_duration
    // -----------------------------------------------------------------------

    #[test]
    fn ms_marker_is_kept() {
        assert_eq!(
            normalize_duration(&"250ms".into()),
            nd("250.00", DurationUnit::Ms)
        );
    }

    #[test]
    fn s_marker_is_kept() {
        assert_eq!(
            normalize_duration(&"1.5s".into()),
            nd("1.50", DurationUnit::S)
        );
    }

    #[test]
    fn markers_are_case_insensitive_and_allow_whitespace() {
        assert_eq!(
            normalize_duration_str("12.346 MS"),
            nd("12.35", DurationUnit::Ms)
        );
        assert_eq!(normalize_duration_str("3 S"), nd("3.00", DurationUnit::S));
    }

    #[test]
    fn plain_number_above_ten_is_ms() {
        assert_eq!(
            normalize_duration(&50.0.into()),
            nd("50.00", DurationUnit::Ms)
        );
        assert_eq!(
            normalize_duration(&100.0.into()),
            nd("100.00", DurationUnit::Ms)
        );
        assert_eq!(
            normalize_duration(&4321.0.into()),
            nd("4321.00", DurationUnit::Ms)
        );
    }

    #[test]
    fn plain_number_up_to_ten_is_seconds() {
        assert_eq!(normalize_duration(&5.0.into()), nd("5.00", DurationUnit::S));
        assert_eq!(
            normalize_duration(&10.0.into()),
            nd("10.00", DurationUnit::S)
        );
    }

    #[test]
    fn unmarked_text_uses_the_same_inference() {
        assert_eq!(normalize_duration_str("42"), nd("42.00", DurationUnit::Ms));
        assert_eq!(normalize_duration_str("0.75"), nd("0.75", DurationUnit::S));
    }

    #[test]
    fn non_numeric_text_renders_nan() {
        assert_eq!(normalize_duration_str("abc"), nd("NaN", DurationUnit::S));
        assert_eq!(normalize_duration_str(""), nd("NaN", DurationUnit::S));
    }

    #[test]
    fn unknown_suffix_falls_back_to_numeric_prefix() {
        // "us" is not a recognised marker; only the leading number is read.
        assert_eq!(normalize_duration_str("800us"), nd("800.00", DurationUnit::Ms));
    }

    #[test]
    fn normalization_is_idempotent_on_its_own_output() {
        for raw in ["250ms", "1.5s", "0.123s"] {
            let first = normalize_duration_str(raw);
            let second = normalize_duration_str(&first.to_string());
            assert_eq!(first, second, "re-normalizing {raw}");
        }
        assert_eq!(
            normalize_duration_str("250.00ms"),
            nd("250.00", DurationUnit::Ms)
        );
    }

    #[test]
    fn infinite_values_are_spelled_out() {
        assert_eq!(
            normalize_duration(&f64::INFINITY.into()),
            nd("Infinity", DurationUnit::Ms)
        );
    }

    #[test]
    fn as_seconds_converts_ms() {
        assert!((nd("250.00", DurationUnit::Ms).as_seconds() - 0.25).abs() < 1e-9);
        assert!((nd("1.50", DurationUnit::S).as_seconds() - 1.5).abs() < 1e-9);
        assert!(nd("NaN", DurationUnit::S).as_seconds().is_nan());
    }

    // -----------------------------------------------------------------------
    // classify_latency
    // -----------------------------------------------------------------------

    #[test]
    fn latency_buckets() {
        assert_eq!(classify_latency(&"150ms".into()), LatencyClass::Fast);
        assert_eq!(classify_latency(&"300ms".into()), LatencyClass::Normal);
        assert_eq!(classify_latency(&"600ms".into()), LatencyClass::Slow);
        assert_eq!(classify_latency(&"1200ms".into()), LatencyClass::Critical);
    }

    #[test]
    fn latency_bucket_boundaries_are_exclusive() {
        assert_eq!(classify_latency(&"200ms".into()), LatencyClass::Normal);
        assert_eq!(classify_latency(&"0.5s".into()), LatencyClass::Slow);
        assert_eq!(classify_latency(&"1s".into()), LatencyClass::Critical);
    }

    #[test]
    fn latency_from_plain_numbers_uses_inferred_unit() {
        // 50 -> 50ms, 5 -> 5s
        assert_eq!(classify_latency(&50.0.into()), LatencyClass::Fast);
        assert_eq!(classify_latency(&5.0.into()), LatencyClass::Critical);
    }

    #[test]
    fn nan_latency_is_critical() {
        assert_eq!(classify_latency(&"n/a".into()), LatencyClass::Critical);
    }

    #[test]
    fn latency_class_serializes_lowercase() {
        let json = serde_json::to_string(&LatencyClass::Critical).expect("serialize");
        assert_eq!(json, "\"critical\"");
    }

    // -----------------------------------------------------------------------
    // format_byte_size
    // -----------------------------------------------------------------------

    #[test]
    fn byte_sizes() {
        assert_eq!(format_byte_size(0.0), "0 B");
        assert_eq!(format_byte_size(512.0), "512 B");
        assert_eq!(format_byte_size(1024.0), "1 KB");
        assert_eq!(format_byte_size(1536.0), "1.5 KB");
        assert_eq!(format_byte_size(1_048_576.0), "1 MB");
        assert_eq!(format_byte_size(1_073_741_824.0), "1 GB");
    }

    #[test]
    fn byte_size_rounds_to_two_decimals() {
        assert_eq!(format_byte_size(1234.0), "1.21 KB");
        assert_eq!(format_byte_size(10_000_000.0), "9.54 MB");
    }

    #[test]
    fn byte_size_beyond_gb_stays_in_gb() {
        assert_eq!(format_byte_size(2.0 * 1024f64.powi(4)), "2048 GB");
    }

    #[test]
    fn fractional_and_negative_bytes_stay_in_b() {
        assert_eq!(format_byte_size(0.5), "0.5 B");
        assert_eq!(format_byte_size(-5.0), "-5 B");
        assert_eq!(format_byte_size(f64::NAN), "NaN B");
    }

    // -----------------------------------------------------------------------
    // classify_status_code
    // -----------------------------------------------------------------------

    #[test]
    fn status_buckets() {
        assert_eq!(classify_status_code("204"), StatusClass::Success);
        assert_eq!(classify_status_code("301"), StatusClass::Redirect);
        assert_eq!(classify_status_code("404"), StatusClass::ClientError);
        assert_eq!(classify_status_code("503"), StatusClass::ServerError);
    }

    #[test]
    fn unparseable_or_out_of_range_status_is_server_error() {
        assert_eq!(classify_status_code("abc"), StatusClass::ServerError);
        assert_eq!(classify_status_code(""), StatusClass::ServerError);
        assert_eq!(classify_status_code("0"), StatusClass::ServerError);
        assert_eq!(classify_status_code("-200"), StatusClass::ServerError);
        assert_eq!(classify_status_code("199"), StatusClass::ServerError);
        assert_eq!(
            classify_status_code("99999999999999999999"),
            StatusClass::ServerError
        );
    }

    #[test]
    fn status_code_reads_leading_integer() {
        assert_eq!(classify_status_code(" 200 OK"), StatusClass::Success);
        assert_eq!(classify_status_code("302.5"), StatusClass::Redirect);
    }

    #[test]
    fn status_class_serializes_camel_case() {
        let json = serde_json::to_string(&StatusClass::ClientError).expect("serialize");
        assert_eq!(json, "\"clientError\"");
    }

    // -----------------------------------------------------------------------
    // helpers
    // -----------------------------------------------------------------------

    #[test]
    fn leading_float_prefixes() {
        assert_eq!(parse_leading_float("  12.5abc"), 12.5);
        assert_eq!(parse_leading_float("-3"), -3.0);
        assert_eq!(parse_leading_float(".5"), 0.5);
        assert_eq!(parse_leading_float("5."), 5.0);
        assert_eq!(parse_leading_float("1e3ms"), 1000.0);
        assert_eq!(parse_leading_float("2e"), 2.0);
        assert_eq!(parse_leading_float("1.2.3"), 1.2);
        assert!(parse_leading_float(".").is_nan());
        assert!(parse_leading_float("-").is_nan());
    }

    #[test]
    fn fixed_formatting_drops_negative_zero() {
        assert_eq!(format_fixed(-0.0), "0.00");
        assert_eq!(format_fixed(1.005_f64 + 0.001), "1.01");
    }

    #[test]
    fn fixed_formatting_rounds_exact_ties_away_from_zero() {
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(10.125, 2), "10.13");
        assert_eq!(to_fixed(2.25, 1), "2.3");
        assert_eq!(to_fixed(-0.125, 2), "-0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
    }

    #[test]
    fn fixed_formatting_uses_the_exact_binary_value() {
        // 1.005 and 0.995 are stored just below the tie.
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.995, 2), "0.99");
        assert_eq!(to_fixed(19.96, 1), "20.0");
        assert_eq!(to_fixed(9.999, 2), "10.00");
        assert_eq!(to_fixed(99.99, 1), "100.0");
        assert_eq!(to_fixed(-0.001, 2), "-0.00");
    }

    #[test]
    fn tied_durations_round_up() {
        assert_eq!(normalize_duration_str("0.125s"), nd("0.13", DurationUnit::S));
        assert_eq!(
            normalize_duration_str("10.125ms"),
            nd("10.13", DurationUnit::Ms)
        );
    }

    #[test]
    fn tied_byte_sizes_round_up() {
        // 1152 / 1024 == 1.125 exactly
        assert_eq!(format_byte_size(1152.0), "1.13 KB");
    }
}
