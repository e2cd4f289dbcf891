pub mod error;
pub mod interpret;
pub mod results;
pub mod summary;

pub use error::LoadViewError;
pub use interpret::{
    classify_latency, classify_status_code, format_byte_size, normalize_duration,
    normalize_duration_str, DurationUnit, LatencyClass, NormalizedDuration, StatusClass,
};
pub use results::ResultReport;
pub use summary::{LoadTestSummary, RawDuration};
