use std::path::Path;

use crate::error::LoadViewError;
use crate::summary::model::LoadTestSummary;

/// Read a load-test summary JSON document from disk.
pub async fn read_summary(path: impl AsRef<Path>) -> Result<LoadTestSummary, LoadViewError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "reading load-test summary");
    let content = tokio::fs::read_to_string(path).await?;
    parse_summary(&content)
}

/// Parse a load-test summary from JSON text.
pub fn parse_summary(content: &str) -> Result<LoadTestSummary, LoadViewError> {
    let summary: LoadTestSummary = serde_json::from_str(content)?;
    tracing::debug!(
        api_name = %summary.api_name,
        requests = summary.requests,
        "parsed load-test summary"
    );
    Ok(summary)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
