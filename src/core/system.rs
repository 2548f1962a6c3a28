use crate::core::logbook::LogBook;
use crate::domain::model::{HealthReport, HealthStatus, LogLevel, SystemInfo, SystemMetrics};
use crate::utils::error::Result;
use chrono::Utc;
use std::sync::Mutex;
use sysinfo::{Components, Disks, System};

/// Host diagnostics over sysinfo: environment info, live metrics and a
/// coarse health verdict.
pub struct SystemReport {
    system: Mutex<System>,
    high_load_threshold: f32,
}

impl SystemReport {
    pub fn new() -> Self {
        let mut system = System::new_all();
        system.refresh_all();
        Self {
            system: Mutex::new(system),
            high_load_threshold: 80.0,
        }
    }

    /// CPU/memory percentage above which `health` reports high load.
    pub fn with_threshold(mut self, percent: f32) -> Self {
        self.high_load_threshold = percent;
        self
    }

    pub fn info(&self) -> SystemInfo {
        SystemInfo {
            os: System::name().unwrap_or_else(|| "unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "unknown".to_string()),
            kernel: System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            hostname: System::host_name().unwrap_or_else(|| "unknown".to_string()),
            uptime_secs: System::uptime(),
            server_time: Utc::now(),
        }
    }

    pub fn metrics(&self) -> SystemMetrics {
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        system.refresh_all();

        let memory_total = system.total_memory();
        let memory_used_percent = if memory_total > 0 {
            let available = system.available_memory();
            ((memory_total - available) as f32 / memory_total as f32) * 100.0
        } else {
            0.0
        };

        let disks = Disks::new_with_refreshed_list();
        let mut disk_total: u64 = 0;
        let mut disk_free: u64 = 0;
        for disk in disks.list() {
            disk_total += disk.total_space();
            disk_free += disk.available_space();
        }

        let load = System::load_average();

        SystemMetrics {
            cpu_cores: system.cpus().len(),
            cpu_usage_percent: system.global_cpu_usage(),
            cpu_load: [load.one, load.five, load.fifteen],
            memory_total_mb: memory_total / 1024 / 1024,
            memory_used_percent,
            disk_total_gb: disk_total as f64 / 1024.0 / 1024.0 / 1024.0,
            disk_free_gb: disk_free as f64 / 1024.0 / 1024.0 / 1024.0,
            process_count: system.processes().len(),
            temperature_c: max_component_temperature(),
            time: Utc::now(),
        }
    }

    /// Number of running processes whose name contains `name`.
    pub fn count_processes(&self, name: &str) -> usize {
        let mut system = self
            .system
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        system.refresh_all();
        system
            .processes()
            .values()
            .filter(|process| process.name().to_string_lossy().contains(name))
            .count()
    }

    pub fn health(&self) -> HealthReport {
        let details = self.metrics();
        let status = if details.cpu_usage_percent > self.high_load_threshold
            || details.memory_used_percent > self.high_load_threshold
        {
            HealthStatus::HighLoad
        } else {
            HealthStatus::Ok
        };
        HealthReport {
            status,
            timestamp: Utc::now(),
            details,
        }
    }

    /// Info plus metrics as pretty JSON.
    pub fn export(&self) -> Result<String> {
        let combined = serde_json::json!({
            "info": self.info(),
            "metrics": self.metrics(),
        });
        Ok(serde_json::to_string_pretty(&combined)?)
    }

    /// Snapshot the metrics into a log book under the `system` category.
    pub async fn log_status(&self, logbook: &LogBook) -> Result<()> {
        let context = match serde_json::to_value(self.metrics())? {
            serde_json::Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        logbook
            .write("System status", LogLevel::Info, Some("system"), context)
            .await
    }
}

impl Default for SystemReport {
    fn default() -> Self {
        Self::new()
    }
}

fn max_component_temperature() -> Option<f32> {
    Components::new_with_refreshed_list()
        .list()
        .iter()
        .filter_map(|component| component.temperature())
        .fold(None, |max, t| match max {
            Some(current) if current >= t => Some(current),
            _ => Some(t),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::HealthStatus;

    #[test]
    fn test_metrics_smoke() {
        let report = SystemReport::new();
        let metrics = report.metrics();

        assert!(metrics.cpu_cores > 0);
        assert!(metrics.memory_total_mb > 0);
        assert!(metrics.memory_used_percent >= 0.0 && metrics.memory_used_percent <= 100.0);
        assert!(metrics.process_count > 0);
    }

    #[test]
    fn test_count_processes_without_match_is_zero() {
        let report = SystemReport::new();
        assert_eq!(report.count_processes("syskit-no-such-process-name"), 0);
    }

    #[test]
    fn test_health_is_ok_below_an_unreachable_threshold() {
        // Usage percentages never exceed 100, so nothing can trip this.
        let report = SystemReport::new().with_threshold(100.0);
        assert_eq!(report.health().status, HealthStatus::Ok);
    }

    #[test]
    fn test_export_contains_both_sections() {
        let report = SystemReport::new();
        let exported = report.export().unwrap();
        let value: serde_json::Value = serde_json::from_str(&exported).unwrap();

        assert!(value["info"].is_object());
        assert!(value["metrics"].is_object());
        assert!(value["info"]["hostname"].is_string());
    }
}

