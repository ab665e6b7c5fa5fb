//! Outbound events and where they go.
//!
//! The worker never talks to the transport directly: it emits [`Event`]s
//! into an [`EventSink`] injected at construction. [`ChannelSink`] forwards
//! them to an async writer task; [`MemorySink`] collects them for tests.

use crate::report::Report;
use log::debug;
use parking_lot::Mutex;
use serde_json::json;
use tokio::sync::mpsc::UnboundedSender;

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Human-readable progress line.
    Log(String),
    /// Percentage of planned generations completed, `0..=100`.
    Progress(f64),
    /// Any failure reported to the client.
    Error(String),
    /// Terminal report of a run.
    Report(Report),
    /// End of a run; always the last event of it.
    Done,
}

impl Event {
    pub fn log(message: impl Into<String>) -> Self {
        Self::Log(message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Wire encoding: one JSON value, no trailing newline.
    pub fn to_frame(&self) -> String {
        match self {
            Self::Log(message) => json!({ "type": "log", "message": message }).to_string(),
            Self::Error(error) => json!({ "type": "error", "error": error }).to_string(),
            Self::Progress(pct) => json!({ "progress": pct }).to_string(),
            Self::Report(report) => match report.serialize() {
                Ok(frame) => frame,
                Err(e) => json!({ "type": "error", "error": e.to_string() }).to_string(),
            },
            Self::Done => json!("done").to_string(),
        }
    }

    /// Whether this event ends a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Destination for worker and session events.
///
/// Implementations must tolerate calls from the worker thread and the
/// foreground thread.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards events to a tokio channel drained by the connection writer.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: UnboundedSender<Event>,
}

impl ChannelSink {
    pub fn new(tx: UnboundedSender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: Event) {
        if let Err(e) = self.tx.send(event) {
            // The connection is gone; nobody is left to read the event.
            debug!("dropping event for closed connection: {:?}", e.0);
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }

    /// Number of progress events so far.
    pub fn progress_count(&self) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Progress(_)))
            .count()
    }

    /// Messages of every error event so far.
    pub fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|e| match e {
                Event::Error(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    /// The most recent report, if any.
    pub fn last_report(&self) -> Option<Report> {
        self.events.lock().iter().rev().find_map(|e| match e {
            Event::Report(r) => Some(r.clone()),
            _ => None,
        })
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use tokio::sync::mpsc;

    // ---- Frames ----

    #[test]
    fn test_frames() {
        assert_eq!(
            Event::log("hello").to_frame(),
            r#"{"message":"hello","type":"log"}"#
        );
        assert_eq!(
            Event::error("bad").to_frame(),
            r#"{"error":"bad","type":"error"}"#
        );
        assert_eq!(Event::Done.to_frame(), r#""done""#);

        let progress: Value = serde_json::from_str(&Event::Progress(42.5).to_frame()).unwrap();
        assert_eq!(progress["progress"], 42.5);
    }

    #[test]
    fn test_only_done_is_terminal() {
        assert!(Event::Done.is_terminal());
        assert!(!Event::log("x").is_terminal());
        assert!(!Event::Progress(100.0).is_terminal());
    }

    // ---- Sinks ----

    #[test]
    fn test_memory_sink_collects() {
        let sink = MemorySink::new();
        sink.emit(Event::log("a"));
        sink.emit(Event::Progress(10.0));
        sink.emit(Event::error("boom"));
        assert_eq!(sink.len(), 3);
        assert_eq!(sink.progress_count(), 1);
        assert_eq!(sink.errors(), vec!["boom".to_string()]);
        assert!(sink.last_report().is_none());
        sink.clear();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink = ChannelSink::new(tx);
        sink.emit(Event::log("a"));
        sink.emit(Event::Done);
        assert_eq!(rx.try_recv().ok(), Some(Event::log("a")));
        assert_eq!(rx.try_recv().ok(), Some(Event::Done));
    }

    #[test]
    fn test_channel_sink_ignores_closed_receiver() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        ChannelSink::new(tx).emit(Event::Done);
    }
}
