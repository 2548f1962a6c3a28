use crate::core::fsops;
use crate::domain::model::{LogEntry, LogLevel, WIRE_TIME_FORMAT};
use crate::domain::ports::AlertSink;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

/// POSTs alert-level entries as JSON to a configured URL.
pub struct WebhookAlert {
    client: reqwest::Client,
    url: String,
}

impl WebhookAlert {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl AlertSink for WebhookAlert {
    async fn send(&self, entry: &LogEntry) -> Result<()> {
        self.client
            .post(&self.url)
            .json(entry)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

/// Category log files with daily naming and retention-based rotation.
///
/// Entries land in `<base>/<category>/YYYY-MM-DD.log` (no category: directly
/// under the base), one line each, plain text or JSON. Error and critical
/// entries are additionally delivered to the alert sink when one is set;
/// delivery failures are logged, never fatal.
pub struct LogBook {
    base_path: PathBuf,
    retention_days: u64,
    json_format: bool,
    console: bool,
    alert_sink: Option<Box<dyn AlertSink>>,
    buffered: AtomicBool,
    buffer: Mutex<Vec<(Option<String>, LogEntry)>>,
}

impl LogBook {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            retention_days: 30,
            json_format: false,
            console: false,
            alert_sink: None,
            buffered: AtomicBool::new(false),
            buffer: Mutex::new(Vec::new()),
        }
    }

    pub fn with_retention_days(mut self, days: u64) -> Self {
        self.retention_days = days.max(1);
        self
    }

    pub fn with_json_format(mut self, json: bool) -> Self {
        self.json_format = json;
        self
    }

    pub fn with_console(mut self, console: bool) -> Self {
        self.console = console;
        self
    }

    pub fn with_alert_sink(mut self, sink: Box<dyn AlertSink>) -> Self {
        self.alert_sink = Some(sink);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// While buffered, entries accumulate in memory until `flush`.
    pub fn set_buffered(&self, on: bool) {
        self.buffered.store(on, Ordering::SeqCst);
    }

    pub async fn write(
        &self,
        message: &str,
        level: LogLevel,
        category: Option<&str>,
        context: serde_json::Map<String, serde_json::Value>,
    ) -> Result<()> {
        let entry = LogEntry {
            time: Utc::now(),
            level,
            message: interpolate(message, &context),
            context,
        };

        if self.buffered.load(Ordering::SeqCst) {
            if let Ok(mut buffer) = self.buffer.lock() {
                buffer.push((category.map(str::to_string), entry));
            }
            return Ok(());
        }

        self.store(category, &entry).await
    }

    pub async fn debug(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Debug, None, Default::default()).await
    }

    pub async fn info(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Info, None, Default::default()).await
    }

    pub async fn success(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Success, None, Default::default()).await
    }

    pub async fn warning(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Warning, None, Default::default()).await
    }

    pub async fn error(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Error, None, Default::default()).await
    }

    pub async fn critical(&self, message: &str) -> Result<()> {
        self.write(message, LogLevel::Critical, None, Default::default()).await
    }

    /// Write out everything accumulated while buffered.
    pub async fn flush(&self) -> Result<()> {
        let drained = self
            .buffer
            .lock()
            .map(|mut buffer| std::mem::take(&mut *buffer))
            .unwrap_or_default();
        for (category, entry) in drained {
            self.store(category.as_deref(), &entry).await?;
        }
        Ok(())
    }

    /// Last `limit` lines of today's file for the category, newest first.
    pub fn recent(&self, category: Option<&str>, limit: usize) -> Result<Vec<String>> {
        let file = self
            .category_folder(category)
            .join(format!("{}.log", Utc::now().format("%Y-%m-%d")));
        if !file.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&file)?;
        Ok(content
            .lines()
            .filter(|line| !line.is_empty())
            .rev()
            .take(limit)
            .map(str::to_string)
            .collect())
    }

    async fn store(&self, category: Option<&str>, entry: &LogEntry) -> Result<()> {
        let folder = self.category_folder(category);
        fsops::ensure_directory(&folder)?;

        let file_path = folder.join(format!("{}.log", entry.time.format("%Y-%m-%d")));
        let line = if self.json_format {
            format!("{}\n", serde_json::to_string(entry)?)
        } else {
            format!(
                "[{}] [{}] {} {}\n",
                entry.time.format(WIRE_TIME_FORMAT),
                entry.level.as_str(),
                entry.message,
                serde_json::Value::Object(entry.context.clone())
            )
        };

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        file.write_all(line.as_bytes())?;

        self.rotate(&folder)?;

        if self.console {
            println!(
                "{}[{}] {}\x1b[0m",
                entry.level.ansi_color(),
                entry.level.as_str(),
                entry.message
            );
        }

        if entry.level.is_alert() {
            if let Some(sink) = &self.alert_sink {
                if let Err(e) = sink.send(entry).await {
                    tracing::warn!("Log alert delivery failed: {}", e);
                }
            }
        }

        Ok(())
    }

    fn category_folder(&self, category: Option<&str>) -> PathBuf {
        match category {
            Some(category) => self.base_path.join(category),
            None => self.base_path.clone(),
        }
    }

    // Drop daily files past the retention window.
    fn rotate(&self, folder: &Path) -> Result<()> {
        let cutoff = SystemTime::now() - Duration::from_secs(self.retention_days * 86_400);
        for file in fsops::list_files(folder, Some("*.log"))? {
            let Ok(meta) = fs::metadata(&file) else {
                continue;
            };
            if meta.modified().map(|mtime| mtime < cutoff).unwrap_or(false) {
                let _ = fs::remove_file(&file);
            }
        }
        Ok(())
    }
}

/// Replace `{key}` placeholders in the message with context values.
fn interpolate(message: &str, context: &serde_json::Map<String, serde_json::Value>) -> String {
    let mut result = message.to_string();
    for (key, value) in context {
        let placeholder = format!("{{{}}}", key);
        if !result.contains(&placeholder) {
            continue;
        }
        let rendered = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        result = result.replace(&placeholder, &rendered);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interpolate_scalars_and_json() {
        let mut context = serde_json::Map::new();
        context.insert("name".to_string(), serde_json::Value::String("Sam".into()));
        context.insert("count".to_string(), serde_json::json!(3));
        context.insert("tags".to_string(), serde_json::json!(["a", "b"]));

        assert_eq!(
            interpolate("User {name} ran {count} jobs: {tags}", &context),
            r#"User Sam ran 3 jobs: ["a","b"]"#
        );
    }

    #[test]
    fn test_interpolate_leaves_unknown_placeholders() {
        let context = serde_json::Map::new();
        assert_eq!(interpolate("hello {who}", &context), "hello {who}");
    }
}
