//! Beanstalk text protocol: command encoding and response parsing.
//!
//! Only the producer-side subset is covered: `use`, `put` and `stats-job`.

use std::collections::HashMap;
use std::time::Duration;

use record_core::JobId;

use crate::QueueError;

/// Tube selected on a fresh connection.
pub const DEFAULT_TUBE: &str = "default";

const MAX_TUBE_NAME: usize = 200;

/// Largest response body accepted; `stats-job` replies are a few hundred bytes.
pub const MAX_BODY: usize = 64 * 1024;

/// A parsed response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Using(String),
    Inserted(JobId),
    /// Put succeeded but the server buried the job (out of memory).
    Buried(JobId),
    /// A body of the given length follows.
    Ok(usize),
    NotFound,
    /// One of the server's error keywords, e.g. `DRAINING` or `BAD_FORMAT`.
    Failure(String),
}

impl Response {
    /// Turn an unexpected response to `command` into an error.
    pub fn into_error(self, command: &str) -> QueueError {
        match self {
            Response::Failure(keyword) => QueueError::Rejected(format!("{command}: {keyword}")),
            other => QueueError::Protocol(format!("{command}: unexpected response {other:?}")),
        }
    }
}

const FAILURES: &[&str] = &[
    "OUT_OF_MEMORY",
    "INTERNAL_ERROR",
    "BAD_FORMAT",
    "UNKNOWN_COMMAND",
    "EXPECTED_CRLF",
    "JOB_TOO_BIG",
    "DRAINING",
];

/// Parse one response line, without its trailing CRLF.
pub fn parse_response(line: &str) -> Result<Response, QueueError> {
    let mut words = line.split_ascii_whitespace();
    let keyword = words.next().unwrap_or_default();
    let arg = words.next();

    let parse_id = |arg: Option<&str>| -> Result<JobId, QueueError> {
        arg.and_then(|a| JobId::parse(a).ok())
            .ok_or_else(|| QueueError::Protocol(format!("bad job id in {line:?}")))
    };

    match keyword {
        "USING" => arg
            .map(|tube| Response::Using(tube.to_string()))
            .ok_or_else(|| QueueError::Protocol(format!("missing tube in {line:?}"))),
        "INSERTED" => parse_id(arg).map(Response::Inserted),
        "BURIED" => parse_id(arg).map(Response::Buried),
        "OK" => {
            let len: usize = arg
                .and_then(|a| a.parse().ok())
                .ok_or_else(|| QueueError::Protocol(format!("bad body length in {line:?}")))?;
            if len > MAX_BODY {
                return Err(QueueError::Protocol(format!(
                    "body length {len} exceeds {MAX_BODY} bytes"
                )));
            }
            Ok(Response::Ok(len))
        }
        "NOT_FOUND" => Ok(Response::NotFound),
        k if FAILURES.contains(&k) => Ok(Response::Failure(k.to_string())),
        _ => Err(QueueError::Protocol(format!("unrecognized response {line:?}"))),
    }
}

/// Check a tube name against the server's naming rules.
pub fn validate_tube(tube: &str) -> Result<(), QueueError> {
    let allowed = |c: char| c.is_ascii_alphanumeric() || "-+/;.$_()".contains(c);

    if tube.is_empty()
        || tube.len() > MAX_TUBE_NAME
        || tube.starts_with('-')
        || !tube.chars().all(allowed)
    {
        return Err(QueueError::InvalidTube(tube.to_string()));
    }
    Ok(())
}

pub fn use_command(tube: &str) -> Vec<u8> {
    format!("use {tube}\r\n").into_bytes()
}

/// Encode a `put`; delay and TTR are sent as whole seconds.
pub fn put_command(body: &[u8], priority: u32, delay: Duration, ttr: Duration) -> Vec<u8> {
    let mut command = format!(
        "put {} {} {} {}\r\n",
        priority,
        delay.as_secs(),
        ttr.as_secs(),
        body.len()
    )
    .into_bytes();
    command.extend_from_slice(body);
    command.extend_from_slice(b"\r\n");
    command
}

pub fn stats_job_command(job_id: JobId) -> Vec<u8> {
    format!("stats-job {job_id}\r\n").into_bytes()
}

/// Parse the YAML dictionary returned by `stats-job`.
pub fn parse_stats(body: &[u8]) -> Result<HashMap<String, String>, QueueError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| QueueError::Protocol(format!("stats body is not UTF-8: {e}")))?;

    let mut stats = HashMap::new();
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() || line == "---" {
            continue;
        }
        let (key, value) = line
            .split_once(':')
            .ok_or_else(|| QueueError::Protocol(format!("bad stats line {line:?}")))?;
        let value = value.trim().trim_matches('"');
        stats.insert(key.trim().to_string(), value.to_string());
    }
    Ok(stats)
}
