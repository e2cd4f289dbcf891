use std::str::FromStr;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::ResultReport;
use crate::error::LoadViewError;
use crate::interpret::{LatencyClass, StatusClass};

// ---------------------------------------------------------------------------
// ExportFormat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Text,
    Json,
    Csv,
    Html,
}

impl FromStr for ExportFormat {
    type Err = LoadViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "html" => Ok(Self::Html),
            other => Err(LoadViewError::InvalidArgument(format!(
                "unknown export format '{other}' (expected text, json, csv or html)"
            ))),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExportFormat::Text => "text",
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Html => "html",
        };
        write!(f, "{s}")
    }
}

/// Render a report in the requested format.
pub fn export(report: &ResultReport, format: ExportFormat) -> Result<String, LoadViewError> {
    match format {
        ExportFormat::Text => Ok(export_text(report)),
        ExportFormat::Json => Ok(export_json(report)?),
        ExportFormat::Csv => export_csv(report),
        ExportFormat::Html => Ok(export_html(report)),
    }
}

// ---------------------------------------------------------------------------
// Text export
// ---------------------------------------------------------------------------

/// Plain-text rendering for terminals.
pub fn export_text(report: &ResultReport) -> String {
    let mut out = String::new();

    let outcome = if report.fully_successful { "ok" } else { "partial" };
    out.push_str(&format!("Load Test Results: {}\n", report.api_name));
    out.push_str(&format!(
        "  Success:     {}% ({})\n",
        report.success_percent, outcome
    ));
    out.push_str(&format!("  Requests:    {}\n", report.requests));
    out.push_str(&format!("  Throughput:  {}/sec\n", report.throughput));
    out.push_str(&format!("  Duration:    {}\n", report.duration));
    out.push_str(&format!("  Avg Wait:    {}\n", report.wait));

    out.push_str("\nResponse Times\n");
    for m in &report.latencies {
        out.push_str(&format!(
            "  {:<16} {:>12}  [{}]\n",
            m.label,
            m.duration.to_string(),
            m.class
        ));
    }

    out.push_str("\nStatus Codes\n");
    if report.status_codes.is_empty() {
        out.push_str("  (none)\n");
    }
    for e in &report.status_codes {
        out.push_str(&format!("  {}: {}  [{}]\n", e.code, e.count, e.class));
    }

    let t = &report.transfer;
    out.push_str("\nData Transfer\n");
    out.push_str(&format!(
        "  Downloaded:  {} ({} avg/req)\n",
        t.downloaded_total, t.downloaded_avg
    ));
    out.push_str(&format!(
        "  Uploaded:    {} ({} avg/req)\n",
        t.uploaded_total, t.uploaded_avg
    ));

    if let Some(errors) = &report.errors {
        out.push_str(&format!("\nErrors ({})\n", errors.count));
        out.push_str(&format!("  {}\n", errors.message));
        if let Some(details) = &errors.details {
            out.push_str(&format!("  {}\n", details));
        }
    }

    out
}

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export a report as pretty-printed JSON.
pub fn export_json(report: &ResultReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Export a report as CSV, one row per displayed figure.
///
/// Columns: `section,metric,value,unit,class`.
pub fn export_csv(report: &ResultReport) -> Result<String, LoadViewError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["section", "metric", "value", "unit", "class"])?;

    let requests = report.requests.to_string();
    let duration_unit = report.duration.unit.to_string();
    let wait_unit = report.wait.unit.to_string();
    wtr.write_record(["summary", "api_name", report.api_name.as_str(), "", ""])?;
    wtr.write_record(["summary", "success_rate", report.success_percent.as_str(), "%", ""])?;
    wtr.write_record(["summary", "requests", requests.as_str(), "", ""])?;
    wtr.write_record(["summary", "throughput", report.throughput.as_str(), "/sec", ""])?;
    wtr.write_record([
        "summary",
        "duration",
        report.duration.value.as_str(),
        duration_unit.as_str(),
        "",
    ])?;
    wtr.write_record([
        "summary",
        "wait",
        report.wait.value.as_str(),
        wait_unit.as_str(),
        "",
    ])?;

    for m in &report.latencies {
        wtr.write_record([
            "latency",
            m.label.as_str(),
            m.duration.value.as_str(),
            m.duration.unit.as_str(),
            m.class.as_str(),
        ])?;
    }

    for e in &report.status_codes {
        let count = e.count.to_string();
        wtr.write_record(["status", e.code.as_str(), count.as_str(), "", e.class.as_str()])?;
    }

    let t = &report.transfer;
    wtr.write_record(["transfer", "downloaded_total", t.downloaded_total.as_str(), "", ""])?;
    wtr.write_record(["transfer", "downloaded_avg", t.downloaded_avg.as_str(), "", ""])?;
    wtr.write_record(["transfer", "uploaded_total", t.uploaded_total.as_str(), "", ""])?;
    wtr.write_record(["transfer", "uploaded_avg", t.uploaded_avg.as_str(), "", ""])?;

    if let Some(errors) = &report.errors {
        let count = errors.count.to_string();
        wtr.write_record(["errors", "count", count.as_str(), "", ""])?;
        wtr.write_record(["errors", "message", errors.message.as_str(), "", ""])?;
        if let Some(details) = &errors.details {
            wtr.write_record(["errors", "details", details.as_str(), "", ""])?;
        }
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| LoadViewError::Io(e.into_error()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

// ---------------------------------------------------------------------------
// HTML export
// ---------------------------------------------------------------------------

fn latency_css(class: LatencyClass) -> &'static str {
    match class {
        LatencyClass::Fast => "good",
        LatencyClass::Normal => "",
        LatencyClass::Slow => "warn",
        LatencyClass::Critical => "bad",
    }
}

fn status_css(class: StatusClass) -> &'static str {
    match class {
        StatusClass::Success => "s2xx",
        StatusClass::Redirect => "s3xx",
        StatusClass::ClientError => "s4xx",
        StatusClass::ServerError => "s5xx",
    }
}

/// Export a report as a standalone HTML document with inline CSS.
pub fn export_html(report: &ResultReport) -> String {
    let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    let latency_cards: String = report
        .latencies
        .iter()
        .map(|m| {
            format!(
                "  <div class=\"stat-card {}\">\n    <div class=\"label\">{}</div>\n    \
                 <div class=\"value\">{}<span class=\"unit\">{}</span></div>\n  </div>",
                latency_css(m.class),
                html_escape(&m.label),
                html_escape(&m.duration.value),
                m.duration.unit,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let status_chips: String = report
        .status_codes
        .iter()
        .map(|e| {
            format!(
                "  <span class=\"chip {}\">{}: {}</span>",
                status_css(e.class),
                html_escape(&e.code),
                e.count
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let error_block = match &report.errors {
        Some(errors) => {
            let details = errors
                .details
                .as_deref()
                .map(|d| format!("\n<p class=\"details\">{}</p>", html_escape(d)))
                .unwrap_or_default();
            format!(
                "<h2 class=\"errors\">Errors ({})</h2>\n<p class=\"error-message\">{}</p>{}",
                errors.count,
                html_escape(&errors.message),
                details
            )
        }
        None => String::new(),
    };

    let t = &report.transfer;

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Load Test Results: {api_name}</title>
<style>
  *, *::before, *::after {{ box-sizing: border-box; }}
  body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0; padding: 2rem;
    background: #0f172a; color: #e2e8f0;
    line-height: 1.5;
  }}
  h1 {{ font-size: 1.75rem; font-weight: 700; color: #f1f5f9; margin: 0 0 0.25rem; }}
  h2 {{ font-size: 1.125rem; font-weight: 600; color: #94a3b8;
        text-transform: uppercase; letter-spacing: 0.05em;
        margin: 2rem 0 0.75rem; border-bottom: 1px solid #1e293b; padding-bottom: 0.5rem; }}
  h2.errors {{ color: #f87171; }}
  .badge {{ display: inline-block; padding: 0.125rem 0.625rem; border-radius: 9999px;
            font-size: 0.875rem; font-weight: 600; }}
  .badge.good {{ background: #064e3b; color: #34d399; }}
  .badge.bad {{ background: #7f1d1d; color: #fca5a5; }}
  .stats-grid {{
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(180px, 1fr));
    gap: 1rem; margin-bottom: 2rem;
  }}
  .stat-card {{
    background: #1e293b; border: 1px solid #334155;
    border-radius: 0.5rem; padding: 1rem 1.25rem;
  }}
  .stat-card .label {{
    font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em;
    color: #64748b; margin-bottom: 0.25rem;
  }}
  .stat-card .value {{
    font-size: 1.5rem; font-weight: 700; color: #f1f5f9;
  }}
  .stat-card .unit {{ font-size: 0.875rem; color: #94a3b8; margin-left: 0.2rem; }}
  .stat-card .sub {{ font-size: 0.75rem; color: #64748b; }}
  .stat-card.good .value {{ color: #34d399; }}
  .stat-card.warn .value {{ color: #fbbf24; }}
  .stat-card.bad  .value {{ color: #f87171; }}
  .chips {{ display: flex; flex-wrap: wrap; gap: 0.5rem; }}
  .chip {{ padding: 0.25rem 0.5rem; border-radius: 0.375rem; font-size: 0.875rem;
           font-weight: 500; border: 1px solid #334155; }}
  .chip.s2xx {{ background: #064e3b; color: #6ee7b7; }}
  .chip.s3xx {{ background: #1e3a8a; color: #93c5fd; }}
  .chip.s4xx {{ background: #713f12; color: #fde047; }}
  .chip.s5xx {{ background: #7f1d1d; color: #fca5a5; }}
  .error-message {{ color: #f87171; }}
  .details {{ color: #64748b; font-size: 0.75rem; }}
  footer {{
    margin-top: 3rem; padding-top: 1rem; border-top: 1px solid #1e293b;
    color: #475569; font-size: 0.8125rem;
  }}
</style>
</head>
<body>
<h1>{api_name}</h1>
<span class="badge {success_class}">{success_percent}% Success</span>

<h2>Summary</h2>
<div class="stats-grid">
  <div class="stat-card">
    <div class="label">Requests</div>
    <div class="value">{requests}</div>
  </div>
  <div class="stat-card">
    <div class="label">Throughput</div>
    <div class="value">{throughput}<span class="unit">/sec</span></div>
  </div>
  <div class="stat-card">
    <div class="label">Duration</div>
    <div class="value">{duration_value}<span class="unit">{duration_unit}</span></div>
  </div>
  <div class="stat-card">
    <div class="label">Avg Wait</div>
    <div class="value">{wait_value}<span class="unit">{wait_unit}</span></div>
  </div>
</div>

<h2>Response Times</h2>
<div class="stats-grid">
{latency_cards}
</div>

<h2>Status Codes</h2>
<div class="chips">
{status_chips}
</div>

<h2>Data Transfer</h2>
<div class="stats-grid">
  <div class="stat-card good">
    <div class="label">Downloaded</div>
    <div class="value">{downloaded_total}</div>
    <div class="sub">{downloaded_avg} avg/req</div>
  </div>
  <div class="stat-card bad">
    <div class="label">Uploaded</div>
    <div class="value">{uploaded_total}</div>
    <div class="sub">{uploaded_avg} avg/req</div>
  </div>
</div>

{error_block}

<footer>Generated by loadview &bull; {generated}</footer>
</body>
</html>
"#,
        api_name = html_escape(&report.api_name),
        success_class = if report.fully_successful { "good" } else { "bad" },
        success_percent = html_escape(&report.success_percent),
        requests = report.requests,
        throughput = html_escape(&report.throughput),
        duration_value = html_escape(&report.duration.value),
        duration_unit = report.duration.unit,
        wait_value = html_escape(&report.wait.value),
        wait_unit = report.wait.unit,
        latency_cards = latency_cards,
        status_chips = status_chips,
        downloaded_total = html_escape(&t.downloaded_total),
        downloaded_avg = html_escape(&t.downloaded_avg),
        uploaded_total = html_escape(&t.uploaded_total),
        uploaded_avg = html_escape(&t.uploaded_avg),
        error_block = error_block,
        generated = generated,
    )
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
