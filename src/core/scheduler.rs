use crate::domain::model::{RunOutcome, TaskState};
use crate::domain::ports::{Clock, SystemClock};
use crate::utils::error::{Result, SysKitError};
use std::collections::BTreeMap;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Parse a human-readable interval like `"5 minutes"` into a duration.
/// Accepted units: second(s), minute(s), hour(s), day(s), case-insensitive.
pub fn parse_interval(interval: &str) -> Result<Duration> {
    let invalid = || SysKitError::InvalidIntervalError {
        input: interval.to_string(),
    };

    let mut parts = interval.split_whitespace();
    let (value, unit) = match (parts.next(), parts.next(), parts.next()) {
        (Some(value), Some(unit), None) => (value, unit),
        _ => return Err(invalid()),
    };
    let value: u64 = value.parse().map_err(|_| invalid())?;

    let seconds = match unit.to_ascii_lowercase().as_str() {
        "second" | "seconds" => value,
        "minute" | "minutes" => value * 60,
        "hour" | "hours" => value * 3_600,
        "day" | "days" => value * 86_400,
        _ => return Err(invalid()),
    };
    Ok(Duration::from_secs(seconds))
}

/// Gated periodic execution over a shared JSON state file.
///
/// Each task key carries `{lastRun, count}`; `run_every` fires its callback at
/// most once per interval per key and persists the new state only after the
/// callback succeeds, so a failing run does not consume a slot.
pub struct TaskRunner<C: Clock = SystemClock> {
    state_path: PathBuf,
    clock: C,
}

impl TaskRunner<SystemClock> {
    /// Runner over the default shared state file in the system temp directory.
    pub fn new() -> Self {
        Self::with_state_path(std::env::temp_dir().join("syskit_tasks.json"))
    }

    pub fn with_state_path(path: impl Into<PathBuf>) -> Self {
        Self {
            state_path: path.into(),
            clock: SystemClock,
        }
    }
}

impl Default for TaskRunner<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> TaskRunner<C> {
    pub fn with_clock(path: impl Into<PathBuf>, clock: C) -> Self {
        Self {
            state_path: path.into(),
            clock,
        }
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    /// Run `callback` if at least `interval` has elapsed since the last
    /// successful run of `key`. `max_runs` of 0 means unlimited.
    pub async fn run_every<F, Fut>(
        &self,
        interval: &str,
        key: &str,
        max_runs: u32,
        callback: F,
    ) -> Result<RunOutcome>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        let every = parse_interval(interval)?;
        let mut states = self.load_states()?;
        let state = states.get(key).cloned().unwrap_or_default();

        if max_runs > 0 && state.count >= max_runs {
            tracing::warn!("Task '{}' reached its run limit ({})", key, max_runs);
            return Ok(RunOutcome::MaxRunsReached { max_runs });
        }

        let now = self.clock.now();
        let interval_secs = every.as_secs() as i64;
        if let Some(last_run) = state.last_run {
            let elapsed = now.signed_duration_since(last_run).num_seconds();
            if elapsed < interval_secs {
                return Ok(RunOutcome::Skipped {
                    remaining_secs: (interval_secs - elapsed) as u64,
                });
            }
        }

        callback().await?;

        let count = state.count + 1;
        states.insert(
            key.to_string(),
            TaskState {
                last_run: Some(now),
                count,
            },
        );
        self.persist(&states)?;

        tracing::info!("Task '{}' executed (every {})", key, interval);
        Ok(RunOutcome::Ran { count })
    }

    /// Persisted state for a key, if any.
    pub fn state_of(&self, key: &str) -> Result<Option<TaskState>> {
        Ok(self.load_states()?.get(key).cloned())
    }

    fn load_states(&self) -> Result<BTreeMap<String, TaskState>> {
        if !self.state_path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.state_path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|source| SysKitError::StateFileError {
            path: self.state_path.display().to_string(),
            source,
        })
    }

    // Whole-file read-modify-write; the temp file + rename keeps a crash from
    // truncating the shared state. Cross-process locking is out of scope.
    fn persist(&self, states: &BTreeMap<String, TaskState>) -> Result<()> {
        if let Some(parent) = self.state_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(states)?;
        let tmp = self.state_path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.state_path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("30 seconds").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_interval("1 second").unwrap(), Duration::from_secs(1));
        assert_eq!(parse_interval("5 minutes").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("2 hours").unwrap(), Duration::from_secs(7_200));
        assert_eq!(parse_interval("1 day").unwrap(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_parse_interval_is_case_insensitive() {
        assert_eq!(parse_interval("5 Minutes").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_interval("1 HOUR").unwrap(), Duration::from_secs(3_600));
    }

    #[test]
    fn test_parse_interval_rejects_unknown_units() {
        assert!(parse_interval("5 fortnights").is_err());
        assert!(parse_interval("5 weeks").is_err());
    }

    #[test]
    fn test_parse_interval_rejects_malformed_input() {
        assert!(parse_interval("").is_err());
        assert!(parse_interval("minutes").is_err());
        assert!(parse_interval("five minutes").is_err());
        assert!(parse_interval("5 minutes extra").is_err());
        assert!(parse_interval("-5 minutes").is_err());
    }

    #[test]
    fn test_parse_interval_tolerates_whitespace() {
        assert_eq!(
            parse_interval("  10   seconds ").unwrap(),
            Duration::from_secs(10)
        );
    }
}
