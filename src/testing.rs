// testing.rs
use std::collections::HashSet;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::{
    devices::{CommandRunner, Invocation},
    error::AppError,
    models::Device,
};

/// Fake control tool that records every argument vector it receives.
pub struct RecordingRunner {
    calls: Mutex<Vec<(Instant, Vec<String>)>>,
    failing_tokens: HashSet<String>,
    stderr: String,
    exit_code: Option<i32>,
    delay: Option<Duration>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failing_tokens: HashSet::new(),
            stderr: String::new(),
            exit_code: Some(0),
            delay: None,
        }
    }

    /// Devices with this token get an `Error:` marker on stderr.
    pub fn failing_token(mut self, token: &str) -> Self {
        self.failing_tokens.insert(token.to_string());
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, args)| args.clone())
            .collect()
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(at, _)| *at).collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, args: Vec<String>) -> Result<Invocation, AppError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let token = args.get(2).cloned().unwrap_or_default();
        self.calls.lock().unwrap().push((Instant::now(), args));

        if self.failing_tokens.contains(&token) {
            return Ok(Invocation {
                stdout: String::new(),
                stderr: "Error: Unable to discover the device".to_string(),
                exit_code: Some(0),
            });
        }

        Ok(Invocation {
            stdout: String::new(),
            stderr: self.stderr.clone(),
            exit_code: self.exit_code,
        })
    }

    fn program(&self) -> &str {
        "miiocli"
    }
}

pub fn bulb(name: &str, token: &str) -> Device {
    Device {
        name: name.to_string(),
        id: format!("id-{token}"),
        mac: "00:00:00:00:00:00".to_string(),
        local_ip: "10.0.0.1".to_string(),
        token: token.to_string(),
        model: "yeelink.light.color1".to_string(),
    }
}

pub fn vacuum(name: &str) -> Device {
    Device {
        name: name.to_string(),
        token: "vacuum-token".to_string(),
        model: "viomi.vacuum.v7".to_string(),
        ..Device::default()
    }
}

/// Tail of a `set_rgb` call as a hex string, `None` for other commands.
pub fn rgb_hex(args: &[String]) -> Option<String> {
    match args {
        [.., command, r, g, b] if command == "set_rgb" => {
            let channel = |s: &String| s.parse::<u8>().ok();
            Some(format!(
                "{:02X}{:02X}{:02X}",
                channel(r)?,
                channel(g)?,
                channel(b)?
            ))
        }
        _ => None,
    }
}

/// In-memory sink for formatted tracing output.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscriber(&self) -> impl tracing::Subscriber + Send + Sync + use<> {
        let sink = self.clone();
        tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_writer(move || sink.clone())
            .finish()
    }

    pub fn error_lines(&self) -> Vec<String> {
        let buffer = self.buffer.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .filter(|line| line.contains("ERROR"))
            .map(String::from)
            .collect()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
