//! Follow a build's log until it closes or the pipeline fails.

use std::process::ExitCode;

use clap::Args;
use futures::StreamExt;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use cds_core::config::AppConfig;
use cds_core::error::{AppError, ErrorKind};
use cds_entity::log::{BuildKey, LATEST_BUILD, LogLine};
use cds_logstream::{StreamOutcome, classify};

const USAGE: &str =
    "cds logs <projectKey> <applicationName> <pipelineName> [envName] [buildID]";

/// Minimum cell width, as wide as a timestamp plus padding.
const MIN_COLUMN_WIDTH: usize = 27;
const COLUMN_PADDING: usize = 2;

/// Arguments for the logs command
#[derive(Debug, Args)]
pub struct LogsArgs {
    /// <projectKey> <applicationName> <pipelineName> [envName] [buildID]
    ///
    /// A numeric envName is read as the buildID.
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Which build to follow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub key: BuildKey,
    /// Environment as given, `None` when omitted.
    pub environment: Option<String>,
}

fn parse_build_number(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .ok()
        .filter(|n| *n >= 0)
        .ok_or_else(|| AppError::validation(format!("buildID '{raw}' is not a number")))
}

/// Resolve positional arguments.
///
/// A numeric fourth argument is the build number and any fifth argument is
/// ignored. Anything else names the environment, and a fifth argument must
/// then be the build number.
pub fn parse_target(args: &[String]) -> Result<LogTarget, AppError> {
    if !(3..=5).contains(&args.len()) {
        return Err(AppError::validation(format!("Wrong usage: {USAGE}")));
    }

    let (environment, build_number) = match &args[3..] {
        [] => (None, LATEST_BUILD),
        [fourth, ..] if fourth.parse::<i64>().is_ok() => (None, parse_build_number(fourth)?),
        [env] => (Some(env.clone()), LATEST_BUILD),
        [env, build, ..] => (Some(env.clone()), parse_build_number(build)?),
    };

    Ok(LogTarget {
        key: BuildKey::new(
            &args[0],
            &args[1],
            &args[2],
            environment.clone(),
            build_number,
        ),
        environment,
    })
}

/// Pad cells the way an elastic tab stop would.
fn format_row(cells: &[&str]) -> String {
    let mut row = String::new();
    let (last, leading) = match cells.split_last() {
        Some(split) => split,
        None => return row,
    };
    for cell in leading {
        let width = (cell.chars().count() + COLUMN_PADDING).max(MIN_COLUMN_WIDTH);
        row.push_str(&format!("{cell:<width$}"));
    }
    row.push_str(last);
    row
}

fn header() -> String {
    format_row(&["DATE", "ACTION", "LOG"])
}

fn render_line(line: &LogLine) -> String {
    let date = line.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
    format_row(&[&date, &line.step, line.value.trim_end_matches('\n')])
}

/// Split a complete line off the front of `buf`.
fn take_line(buf: &mut Vec<u8>) -> Option<Vec<u8>> {
    let pos = buf.iter().position(|b| *b == b'\n')?;
    let mut line: Vec<u8> = buf.drain(..=pos).collect();
    line.pop();
    Some(line)
}

/// Decode every complete NDJSON line buffered so far.
fn take_lines(buf: &mut Vec<u8>) -> Result<Vec<LogLine>, AppError> {
    let mut lines = Vec::new();
    while let Some(raw) = take_line(buf) {
        if raw.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        lines.push(serde_json::from_slice(&raw)?);
    }
    Ok(lines)
}

fn print_line(line: &LogLine, format: OutputFormat) {
    match format {
        OutputFormat::Table => println!("{}", render_line(line)),
        OutputFormat::Json => match serde_json::to_string(line) {
            Ok(json) => println!("{json}"),
            Err(e) => output::print_error(&format!("Cannot encode log line: {e}")),
        },
    }
}

/// Execute the logs command
pub async fn execute(
    args: &LogsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<ExitCode, AppError> {
    let target = parse_target(&args.args)?;
    let client = ApiClient::new(&config.cli)?;

    let response = client
        .stream_log(&target.key, target.environment.as_deref())
        .await
        .map_err(|e| AppError::new(e.kind, format!("Cannot retrieve logs: {}", e.message)))?;

    if format == OutputFormat::Table {
        println!("{}", header());
    }

    let mut stream = response.bytes_stream();
    let mut buf = Vec::new();
    loop {
        let chunk = stream.next().await;
        let closed = chunk.is_none();
        match chunk {
            Some(chunk) => buf.extend_from_slice(&chunk.map_err(|e| {
                AppError::with_source(ErrorKind::Internal, "Log stream interrupted", e)
            })?),
            None => buf.push(b'\n'),
        }

        let lines = take_lines(&mut buf)?;
        if let StreamOutcome::PipelineFailed(marker) =
            classify(lines, |line| print_line(&line, format))
        {
            print_line(&marker, format);
            return Ok(ExitCode::FAILURE);
        }
        if closed {
            return Ok(ExitCode::SUCCESS);
        }
    }
}
