#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

/// A job as received by the fake server.
#[derive(Debug, Clone)]
pub struct FakeJob {
    pub id: u64,
    pub tube: String,
    pub priority: u32,
    pub delay: u64,
    pub ttr: u64,
    pub body: Vec<u8>,
}

#[derive(Default)]
struct Shared {
    jobs: Mutex<Vec<FakeJob>>,
    uses: AtomicUsize,
    draining: AtomicBool,
    oversized_stats: AtomicBool,
    connections: AtomicUsize,
}

/// Just enough of beanstalkd to answer `use`, `put` and `stats-job`.
pub struct FakeBeanstalkd {
    pub address: String,
    shared: Arc<Shared>,
}

impl FakeBeanstalkd {
    pub async fn start() -> io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?.to_string();
        let shared = Arc::new(Shared::default());

        let accept_shared = shared.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let shared = accept_shared.clone();
                shared.connections.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(async move {
                    let _ = serve(stream, shared).await;
                });
            }
        });

        Ok(Self { address, shared })
    }

    pub async fn jobs(&self) -> Vec<FakeJob> {
        self.shared.jobs.lock().await.clone()
    }

    /// Number of `use` commands received.
    pub fn uses(&self) -> usize {
        self.shared.uses.load(Ordering::SeqCst)
    }

    pub fn set_draining(&self, draining: bool) {
        self.shared.draining.store(draining, Ordering::SeqCst);
    }

    /// Announce an absurd body length on `stats-job` and send no body.
    pub fn set_oversized_stats(&self, oversized: bool) {
        self.shared.oversized_stats.store(oversized, Ordering::SeqCst);
    }

    /// Number of connections accepted.
    pub fn connections(&self) -> usize {
        self.shared.connections.load(Ordering::SeqCst)
    }
}

async fn serve(stream: TcpStream, shared: Arc<Shared>) -> io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut tube = "default".to_string();

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(());
        }
        let words: Vec<&str> = line.trim_end().split(' ').collect();

        let reply = match words.as_slice() {
            ["use", name] => {
                shared.uses.fetch_add(1, Ordering::SeqCst);
                tube = name.to_string();
                format!("USING {name}\r\n")
            }
            ["put", pri, delay, ttr, len] => {
                let len: usize = len.parse().unwrap_or_default();
                let mut body = vec![0; len + 2];
                reader.read_exact(&mut body).await?;
                body.truncate(len);

                if shared.draining.load(Ordering::SeqCst) {
                    "DRAINING\r\n".to_string()
                } else {
                    let mut jobs = shared.jobs.lock().await;
                    let id = jobs.len() as u64 + 1;
                    jobs.push(FakeJob {
                        id,
                        tube: tube.clone(),
                        priority: pri.parse().unwrap_or_default(),
                        delay: delay.parse().unwrap_or_default(),
                        ttr: ttr.parse().unwrap_or_default(),
                        body,
                    });
                    format!("INSERTED {id}\r\n")
                }
            }
            ["stats-job", _] if shared.oversized_stats.load(Ordering::SeqCst) => {
                format!("OK {}\r\n", u64::MAX)
            }
            ["stats-job", id] => {
                let id: u64 = id.parse().unwrap_or_default();
                let jobs = shared.jobs.lock().await;
                match jobs.iter().find(|j| j.id == id) {
                    Some(job) => {
                        let yaml = format!(
                            "---\nid: {}\ntube: \"{}\"\nstate: ready\npri: {}\nttr: {}\n",
                            job.id, job.tube, job.priority, job.ttr
                        );
                        format!("OK {}\r\n{}\r\n", yaml.len(), yaml)
                    }
                    None => "NOT_FOUND\r\n".to_string(),
                }
            }
            _ => "UNKNOWN_COMMAND\r\n".to_string(),
        };

        writer.write_all(reply.as_bytes()).await?;
    }
}
