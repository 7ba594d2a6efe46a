//! Per-job live log streaming.
//!
//! One tokio broadcast channel per job id, created on demand by whoever
//! touches it first (publisher or subscriber). Subscribers only see
//! entries published after they join; there is no history replay. Slow
//! subscribers fall behind the bounded buffer and observe lag, which
//! drops entries for that subscriber only.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Which part of the pipeline spoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRole {
    Architect,
    Coder,
    Coach,
    Executor,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub role: LogRole,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(role: LogRole, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            role,
            level,
            message: message.into(),
        }
    }
}

pub struct LogStreamHub {
    channels: Mutex<HashMap<Uuid, broadcast::Sender<LogEntry>>>,
    capacity: usize,
}

impl LogStreamHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Mutex::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn sender(&self, job_id: Uuid) -> broadcast::Sender<LogEntry> {
        let mut channels = self.channels.lock().expect("log hub lock poisoned");
        channels
            .entry(job_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Publish an entry to the job's stream. A send with no subscribers
    /// is fine; live-only semantics mean nobody was listening.
    pub fn publish(&self, job_id: Uuid, entry: LogEntry) {
        let _ = self.sender(job_id).send(entry);
    }

    pub fn subscribe(&self, job_id: Uuid) -> broadcast::Receiver<LogEntry> {
        self.sender(job_id).subscribe()
    }

    /// Drop the job's channel. Existing receivers drain what they have
    /// buffered and then see `Closed`.
    pub fn close(&self, job_id: Uuid) {
        let mut channels = self.channels.lock().expect("log hub lock poisoned");
        channels.remove(&job_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[tokio::test]
    async fn test_subscriber_sees_entries_published_after_joining() {
        let hub = LogStreamHub::new(16);
        let job_id = Uuid::new_v4();

        hub.publish(job_id, LogEntry::new(LogRole::System, LogLevel::Info, "early"));
        let mut rx = hub.subscribe(job_id);
        hub.publish(job_id, LogEntry::new(LogRole::Coder, LogLevel::Info, "late"));

        let entry = rx.recv().await.unwrap();
        assert_eq!(entry.message, "late");
        // No replay of the pre-subscription entry.
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_close_ends_the_stream() {
        let hub = LogStreamHub::new(16);
        let job_id = Uuid::new_v4();

        let mut rx = hub.subscribe(job_id);
        hub.publish(job_id, LogEntry::new(LogRole::System, LogLevel::Success, "done"));
        hub.close(job_id);

        assert_eq!(rx.recv().await.unwrap().message, "done");
        assert!(matches!(rx.recv().await, Err(RecvError::Closed)));
    }

    #[tokio::test]
    async fn test_independent_jobs_do_not_cross_streams() {
        let hub = LogStreamHub::new(16);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let mut rx_a = hub.subscribe(a);
        hub.publish(b, LogEntry::new(LogRole::Coach, LogLevel::Warn, "other job"));
        assert!(matches!(rx_a.try_recv(), Err(TryRecvError::Empty)));
    }
}
