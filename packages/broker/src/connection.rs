//! A single beanstalkd connection.

use std::collections::HashMap;
use std::io;
use std::time::Duration;

use record_core::JobId;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};

use crate::QueueError;
use crate::protocol::{self, DEFAULT_TUBE, Response};

/// An open connection, tracking which tube it is using.
pub struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    tube: String,
}

impl Connection {
    /// Connect to a beanstalkd server.
    pub async fn open(address: &str) -> Result<Self, QueueError> {
        let stream = TcpStream::connect(address).await?;
        stream.set_nodelay(true)?;
        let (reader, writer) = stream.into_split();

        tracing::debug!("Connected to beanstalkd at {}", address);

        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            tube: DEFAULT_TUBE.to_string(),
        })
    }

    /// Switch tubes; a no-op when already using `tube`.
    pub async fn use_tube(&mut self, tube: &str) -> Result<(), QueueError> {
        if self.tube == tube {
            return Ok(());
        }
        protocol::validate_tube(tube)?;

        match self.request(&protocol::use_command(tube)).await? {
            Response::Using(name) if name == tube => {
                self.tube = name;
                Ok(())
            }
            other => Err(other.into_error("use")),
        }
    }

    /// Put a job on `tube` and return its assigned id.
    pub async fn put(
        &mut self,
        tube: &str,
        body: &[u8],
        priority: u32,
        delay: Duration,
        ttr: Duration,
    ) -> Result<JobId, QueueError> {
        self.use_tube(tube).await?;

        let command = protocol::put_command(body, priority, delay, ttr);
        match self.request(&command).await? {
            Response::Inserted(id) => Ok(id),
            Response::Buried(id) => Err(QueueError::Rejected(format!(
                "put: job {id} buried, server out of memory"
            ))),
            other => Err(other.into_error("put")),
        }
    }

    /// Fetch the statistics dictionary for a job.
    pub async fn stats_job(&mut self, job_id: JobId) -> Result<HashMap<String, String>, QueueError> {
        match self.request(&protocol::stats_job_command(job_id)).await? {
            Response::Ok(len) => {
                let body = self.read_body(len).await?;
                protocol::parse_stats(&body)
            }
            Response::NotFound => Err(QueueError::NotFound(job_id)),
            other => Err(other.into_error("stats-job")),
        }
    }

    async fn request(&mut self, command: &[u8]) -> Result<Response, QueueError> {
        self.writer.write_all(command).await?;
        self.writer.flush().await?;

        let line = self.read_line().await?;
        protocol::parse_response(&line)
    }

    async fn read_line(&mut self) -> Result<String, QueueError> {
        let mut line = Vec::new();
        if self.reader.read_until(b'\n', &mut line).await? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "connection closed").into());
        }

        let line = line
            .strip_suffix(b"\r\n")
            .ok_or_else(|| QueueError::Protocol("response not terminated by CRLF".into()))?;

        String::from_utf8(line.to_vec())
            .map_err(|e| QueueError::Protocol(format!("response is not UTF-8: {e}")))
    }

    async fn read_body(&mut self, len: usize) -> Result<Vec<u8>, QueueError> {
        let framed = len
            .checked_add(2)
            .filter(|&n| n <= protocol::MAX_BODY + 2)
            .ok_or_else(|| QueueError::Protocol(format!("body length {len} too large")))?;
        let mut body = vec![0; framed];
        self.reader.read_exact(&mut body).await?;

        if !body.ends_with(b"\r\n") {
            return Err(QueueError::Protocol("body not terminated by CRLF".into()));
        }
        body.truncate(len);
        Ok(body)
    }
}
