pub mod io;
pub mod model;
pub mod validation;

pub use io::{parse_summary, read_summary};
pub use model::{DataTransfer, Latencies, LoadTestSummary, RawDuration};
pub use validation::validate_summary;
