//! Streaming loop with statum state machine
//!
//! ```text
//! Connected ──(send/refresh failure, stop request)──► Terminated
//! ```
//!
//! Each cycle runs strictly in this order on the calling thread:
//!
//! ```text
//! refresh (blocks) ──► map ──► encode ──► send (may block) ──► echo
//! ```
//!
//! There is no pacing of its own; the device refresh sets the cadence. A
//! failed send is final: no retry, no reconnect, nothing else is sent.

use crate::controller::{ControlSnapshot, DeviceError, StateSource};
use crate::link::{encode, CommandSink, LinkError};
use crate::mapping::{CommandMapper, ModeSelection};
use chrono::Local;
use statum::{machine, state};
use std::io::Write;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

// Streaming errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    #[error("Device error: {0}")]
    Device(#[from] DeviceError),

    #[error("Link error: {0}")]
    Link(#[from] LinkError),

    #[error("Failed to encode command: {0}")]
    Encode(String),
}

/// Why the loop left the Connected state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    Stopped,
    Failed(StreamError),
}

#[state]
#[derive(Debug, Clone)]
pub enum LinkState {
    Connected,
    Terminated(Termination),
}

#[machine]
pub struct CommandStreamer<S: LinkState> {
    source: Box<dyn StateSource>,
    sink: Box<dyn CommandSink>,
    mapper: CommandMapper,

    // Owned by the loop, lent to the source only during refresh
    snapshot: ControlSnapshot,

    // Terminal echo, best-effort
    echo: Option<Box<dyn Write>>,

    messages_sent: u64,

    // Last selection sent, only used to log changes
    mode: Option<ModeSelection>,
}

impl<S: LinkState> CommandStreamer<S> {
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent
    }

    pub fn mode(&self) -> Option<ModeSelection> {
        self.mode
    }

    pub fn snapshot(&self) -> &ControlSnapshot {
        &self.snapshot
    }
}

impl CommandStreamer<Connected> {
    pub fn connect(
        source: Box<dyn StateSource>,
        sink: Box<dyn CommandSink>,
        mapper: CommandMapper,
        echo: Option<Box<dyn Write>>,
    ) -> Self {
        info!("Command streamer connected");
        Self::new(source, sink, mapper, ControlSnapshot::default(), echo, 0, None)
    }

    /// Runs one refresh → map → encode → send → echo cycle and returns the
    /// payload that went out.
    pub fn cycle(&mut self) -> Result<String, StreamError> {
        self.source.refresh(&mut self.snapshot)?;

        let command = self.mapper.map(&self.snapshot);
        let payload = encode(&command).map_err(|e| StreamError::Encode(e.to_string()))?;

        self.sink.send(&payload)?;
        self.messages_sent += 1;

        if command.mode != self.mode {
            match command.mode {
                Some(selection) => info!("Mode selection: {}", selection),
                None => info!("Mode buttons released, sending without a mode block"),
            }
            self.mode = command.mode;
        }

        self.display(&payload);
        Ok(payload)
    }

    fn display(&mut self, payload: &str) {
        if let Some(echo) = self.echo.as_mut() {
            if let Err(e) = writeln!(echo, "{}", payload).and_then(|_| echo.flush()) {
                debug!("Echo failed, ignoring: {}", e);
            }
        }
    }

    /// Cycles until a refresh or send fails or `stop` is cancelled.
    ///
    /// The stop request is checked between cycles, so a cycle that already
    /// started always completes.
    pub fn run(mut self, stop: &CancellationToken) -> CommandStreamer<Terminated> {
        info!("Starting command stream");

        // For performance monitoring
        let mut cycle_count: u64 = 0;
        let mut last_log_time = Local::now();
        let log_interval = chrono::Duration::seconds(10);

        loop {
            if stop.is_cancelled() {
                info!(
                    "Stop requested, ending stream after {} messages",
                    self.messages_sent
                );
                return self.transition_with(Termination::Stopped);
            }

            if let Err(e) = self.cycle() {
                error!(
                    "Command stream terminated after {} messages: {}",
                    self.messages_sent, e
                );
                return self.transition_with(Termination::Failed(e));
            }
            cycle_count += 1;

            let now = Local::now();
            let elapsed = now - last_log_time;
            if elapsed > log_interval {
                info!(
                    "Command streamer stats: sent {} messages in last {:.1} seconds (avg {:.2}/sec)",
                    cycle_count,
                    elapsed.num_milliseconds() as f64 / 1000.0,
                    send_rate(cycle_count, elapsed)
                );
                cycle_count = 0;
                last_log_time = now;
            }
        }
    }
}

/// Messages per second over the measured window.
fn send_rate(count: u64, elapsed: chrono::Duration) -> f64 {
    let seconds = elapsed.num_milliseconds() as f64 / 1000.0;
    if seconds > 0.0 {
        count as f64 / seconds
    } else {
        0.0
    }
}

impl CommandStreamer<Terminated> {
    pub fn termination(&self) -> Option<&Termination> {
        self.get_state_data()
    }

    /// Number of messages sent, or the failure that ended the stream.
    pub fn into_result(self) -> Result<u64, StreamError> {
        match self.get_state_data() {
            Some(Termination::Failed(e)) => Err(e.clone()),
            _ => Ok(self.messages_sent),
        }
    }
}
