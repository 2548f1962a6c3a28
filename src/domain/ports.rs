use crate::domain::model::LogEntry;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Time source for the task runner. Injected so the gate logic can be driven
/// with deterministic timestamps in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Destination for error/critical log entries (webhook, test double).
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send(&self, entry: &LogEntry) -> Result<()>;
}
