use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;

use loadview_core::results::export::{export, ExportFormat};
use loadview_core::summary::{parse_summary, read_summary, validate_summary};
use loadview_core::{
    classify_latency, classify_status_code, format_byte_size, normalize_duration_str,
    LoadTestSummary, LoadViewError, RawDuration, ResultReport,
};

#[derive(Debug, Parser)]
#[command(name = "loadview", version, about = "Interpret and render load-test summaries")]
struct Cli {
    /// Log filter directive, e.g. `debug` or `loadview_core=trace`.
    #[arg(long, global = true, env = "LOADVIEW_LOG", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render a summary JSON file (`-` reads stdin).
    Render {
        input: String,
        #[arg(short, long, env = "LOADVIEW_FORMAT", default_value = "text")]
        format: ExportFormat,
        /// Write to this file instead of stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on any validation finding instead of rendering anyway.
        #[arg(long)]
        strict: bool,
    },
    /// Normalize a duration value such as `250ms`, `1.5s` or `42`.
    Duration { raw: String },
    /// Classify a latency value.
    Latency { raw: String },
    /// Humanize a byte count.
    Bytes {
        #[arg(allow_negative_numbers = true)]
        bytes: f64,
    },
    /// Classify an HTTP status code.
    Status { code: String },
}

fn init_logging(filter: &str) {
    // stdout carries the rendered output; logs go to stderr.
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), LoadViewError> {
    match command {
        Command::Render {
            input,
            format,
            output,
            strict,
        } => {
            let summary = load_summary(&input).await?;
            let findings = validate_summary(&summary);
            if strict && !findings.is_empty() {
                return Err(LoadViewError::Validation(format!(
                    "{} finding(s) in '{input}'",
                    findings.len()
                )));
            }

            let report = ResultReport::from_summary(&summary);
            let rendered = export(&report, format)?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, rendered).await?;
                    tracing::info!(path = %path.display(), %format, "report written");
                }
                None => print!("{rendered}"),
            }
        }
        Command::Duration { raw } => {
            println!("{}", normalize_duration_str(&raw));
        }
        Command::Latency { raw } => {
            let raw = RawDuration::Text(raw);
            println!("{}", classify_latency(&raw));
        }
        Command::Bytes { bytes } => {
            println!("{}", format_byte_size(bytes));
        }
        Command::Status { code } => {
            println!("{}", classify_status_code(&code));
        }
    }
    Ok(())
}

async fn load_summary(input: &str) -> Result<LoadTestSummary, LoadViewError> {
    if input == "-" {
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        parse_summary(&content)
    } else {
        read_summary(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn render_defaults_to_text() {
        let cli = Cli::try_parse_from(["loadview", "render", "summary.json"])
            .expect("arguments should parse");
        match cli.command {
            Command::Render {
                input,
                format,
                output,
                strict,
            } => {
                assert_eq!(input, "summary.json");
                assert_eq!(format, ExportFormat::Text);
                assert!(output.is_none());
                assert!(!strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn render_accepts_format_output_and_strict() {
        let cli = Cli::try_parse_from([
            "loadview", "render", "-", "--format", "html", "-o", "out.html", "--strict",
        ])
        .expect("arguments should parse");
        match cli.command {
            Command::Render {
                input,
                format,
                output,
                strict,
            } => {
                assert_eq!(input, "-");
                assert_eq!(format, ExportFormat::Html);
                assert_eq!(output, Some(PathBuf::from("out.html")));
                assert!(strict);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let result = Cli::try_parse_from(["loadview", "render", "x.json", "--format", "pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn bytes_accepts_negative_numbers() {
        let cli = Cli::try_parse_from(["loadview", "bytes", "-5"]).expect("arguments should parse");
        assert!(matches!(cli.command, Command::Bytes { bytes } if bytes == -5.0));
    }

    #[tokio::test]
    async fn render_writes_output_file() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let input = dir.path().join("summary.json");
        let output = dir.path().join("report.csv");
        tokio::fs::write(
            &input,
            r#"{
                "api_name": "search", "requests": 4, "throughput": 2.0,
                "duration": "2s", "wait": "1ms",
                "latencies": { "mean": "90ms", "p50": "80ms", "p95": "120ms", "p99": "150ms" },
                "status_codes": { "200": 4 }, "success": 1
            }"#,
        )
        .await
        .expect("write input");

        run(Command::Render {
            input: input.display().to_string(),
            format: ExportFormat::Csv,
            output: Some(output.clone()),
            strict: true,
        })
        .await
        .expect("render should succeed");

        let csv = tokio::fs::read_to_string(&output).await.expect("read output");
        assert!(csv.contains("status,200,4,,success"));
    }

    #[tokio::test]
    async fn strict_render_fails_on_findings() {
        let dir = tempfile::tempdir().expect("tempdir should be created");
        let input = dir.path().join("summary.json");
        tokio::fs::write(
            &input,
            r#"{
                "api_name": "", "requests": 1, "throughput": 1.0,
                "duration": 1, "wait": 1,
                "latencies": { "mean": 1, "p50": 1, "p95": 1, "p99": 1 }, "success": 2
            }"#,
        )
        .await
        .expect("write input");

        let result = run(Command::Render {
            input: input.display().to_string(),
            format: ExportFormat::Text,
            output: None,
            strict: true,
        })
        .await;
        assert!(matches!(result, Err(LoadViewError::Validation(_))));
    }
}
