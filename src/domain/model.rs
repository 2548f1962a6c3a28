use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Timestamp format used in persisted task state and log lines.
pub const WIRE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// serde adapter for `DateTime<Utc>` in the wire format above.
pub mod wire_time {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(WIRE_TIME_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, WIRE_TIME_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}

/// serde adapter for `Option<DateTime<Utc>>` in the wire format.
pub mod wire_time_opt {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_str(&ts.format(WIRE_TIME_FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| {
            NaiveDateTime::parse_from_str(&s, WIRE_TIME_FORMAT)
                .map(|naive| naive.and_utc())
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

/// Persisted per-task record in the shared state file.
/// Wire format: `{"lastRun": "Y-m-d H:i:s", "count": n}` keyed by task name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskState {
    #[serde(
        rename = "lastRun",
        with = "wire_time_opt",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub last_run: Option<DateTime<Utc>>,
    pub count: u32,
}

/// What a `run_every` invocation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The callback ran; `count` is the new run count.
    Ran { count: u32 },
    /// The interval has not elapsed yet.
    Skipped { remaining_secs: u64 },
    /// The task hit its run limit and will never fire again.
    MaxRunsReached { max_runs: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
            LogLevel::Critical => "critical",
        }
    }

    /// Unknown names fall back to `Info`, matching the permissive input handling
    /// of the log surface.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "success" => LogLevel::Success,
            "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            "critical" => LogLevel::Critical,
            _ => LogLevel::Info,
        }
    }

    /// Levels that trigger webhook alerting.
    pub fn is_alert(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Critical)
    }

    pub fn ansi_color(&self) -> &'static str {
        match self {
            LogLevel::Debug => "\x1b[0;36m",
            LogLevel::Info => "\x1b[0;37m",
            LogLevel::Success => "\x1b[0;32m",
            LogLevel::Warning => "\x1b[1;33m",
            LogLevel::Error => "\x1b[0;31m",
            LogLevel::Critical => "\x1b[1;41m",
        }
    }
}

/// One record in a category log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(with = "wire_time")]
    pub time: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub context: serde_json::Map<String, serde_json::Value>,
}

/// Per-file row returned by directory inspection.
#[derive(Debug, Clone, Serialize)]
pub struct FileSummary {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size: String,
    #[serde(with = "wire_time")]
    pub modified: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    pub os: String,
    pub os_version: String,
    pub kernel: String,
    pub hostname: String,
    pub uptime_secs: u64,
    #[serde(with = "wire_time")]
    pub server_time: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    pub cpu_cores: usize,
    pub cpu_usage_percent: f32,
    pub cpu_load: [f64; 3],
    pub memory_total_mb: u64,
    pub memory_used_percent: f32,
    pub disk_total_gb: f64,
    pub disk_free_gb: f64,
    pub process_count: usize,
    pub temperature_c: Option<f32>,
    #[serde(with = "wire_time")]
    pub time: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "HIGH LOAD")]
    HighLoad,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    #[serde(with = "wire_time")]
    pub timestamp: DateTime<Utc>,
    pub details: SystemMetrics,
}

/// Header styling for XLSX export. Colors are RGB hex without the leading '#'.
#[derive(Debug, Clone)]
pub struct SheetStyle {
    pub sheet_name: String,
    pub header_bg: String,
    pub header_color: String,
}

impl Default for SheetStyle {
    fn default() -> Self {
        Self {
            sheet_name: "Data".to_string(),
            header_bg: "071E40".to_string(),
            header_color: "FFFFFF".to_string(),
        }
    }
}

/// Size delta from an in-place image re-encode.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ImageStats {
    pub bytes_before: u64,
    pub bytes_after: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_state_wire_format() {
        let state = TaskState {
            last_run: Some(
                NaiveDateTime::parse_from_str("2026-08-08 12:30:00", WIRE_TIME_FORMAT)
                    .unwrap()
                    .and_utc(),
            ),
            count: 3,
        };

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["lastRun"], "2026-08-08 12:30:00");
        assert_eq!(json["count"], 3);

        let back: TaskState = serde_json::from_value(json).unwrap();
        assert_eq!(back.count, 3);
        assert_eq!(back.last_run, state.last_run);
    }

    #[test]
    fn test_task_state_without_last_run() {
        let back: TaskState = serde_json::from_str(r#"{"count": 0}"#).unwrap();
        assert!(back.last_run.is_none());
        assert_eq!(back.count, 0);
    }

    #[test]
    fn test_log_level_from_name_falls_back_to_info() {
        assert_eq!(LogLevel::from_name("WARNING"), LogLevel::Warning);
        assert_eq!(LogLevel::from_name("verbose"), LogLevel::Info);
        assert_eq!(LogLevel::from_name(""), LogLevel::Info);
    }

    #[test]
    fn test_alert_levels() {
        assert!(LogLevel::Error.is_alert());
        assert!(LogLevel::Critical.is_alert());
        assert!(!LogLevel::Warning.is_alert());
    }
}
