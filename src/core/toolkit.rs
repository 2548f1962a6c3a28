use crate::core::logbook::{LogBook, WebhookAlert};
use crate::core::scheduler::TaskRunner;
use crate::core::system::SystemReport;
use crate::core::{archive, excel, fsops, image_opt};
use crate::domain::model::{
    FileSummary, HealthReport, ImageStats, LogLevel, RunOutcome, SheetStyle, SystemInfo,
    SystemMetrics,
};
use crate::utils::error::Result;
use std::future::Future;
use std::path::{Path, PathBuf};

/// Everything the facade needs to wire its helpers together.
#[derive(Debug, Clone)]
pub struct ToolkitOptions {
    pub log_base_path: PathBuf,
    pub log_retention_days: u64,
    pub log_json_format: bool,
    pub log_console: bool,
    pub webhook_url: Option<String>,
    /// Task state file; `None` uses the shared file in the system temp dir.
    pub state_path: Option<PathBuf>,
    pub sheet_style: SheetStyle,
    pub image_quality: u8,
    pub high_load_threshold: f32,
}

impl Default for ToolkitOptions {
    fn default() -> Self {
        Self {
            log_base_path: PathBuf::from("./logs"),
            log_retention_days: 30,
            log_json_format: false,
            log_console: false,
            webhook_url: None,
            state_path: None,
            sheet_style: SheetStyle::default(),
            image_quality: 80,
            high_load_threshold: 80.0,
        }
    }
}

/// One entry point over every helper: backups, file maintenance, the log
/// book, the task runner, system diagnostics, exports and image re-encoding.
pub struct Toolkit {
    logbook: LogBook,
    runner: TaskRunner,
    system: SystemReport,
    sheet_style: SheetStyle,
    image_quality: u8,
}

impl Toolkit {
    pub fn new(options: ToolkitOptions) -> Self {
        let mut logbook = LogBook::new(options.log_base_path)
            .with_retention_days(options.log_retention_days)
            .with_json_format(options.log_json_format)
            .with_console(options.log_console);
        if let Some(url) = options.webhook_url {
            logbook = logbook.with_alert_sink(Box::new(WebhookAlert::new(url)));
        }

        let runner = match options.state_path {
            Some(path) => TaskRunner::with_state_path(path),
            None => TaskRunner::new(),
        };

        Self {
            logbook,
            runner,
            system: SystemReport::new().with_threshold(options.high_load_threshold),
            sheet_style: options.sheet_style,
            image_quality: options.image_quality,
        }
    }

    pub fn logbook(&self) -> &LogBook {
        &self.logbook
    }

    pub fn runner(&self) -> &TaskRunner {
        &self.runner
    }

    pub fn system(&self) -> &SystemReport {
        &self.system
    }

    // ---- backups ----

    /// Zip a folder or file into a backup archive.
    pub fn backup_folder(&self, source: &Path, destination: &Path, exclude: &[String]) -> Result<u64> {
        archive::zip_path(source, destination, &fsops::ExcludeSet::new(exclude))
    }

    /// Extract a backup archive.
    pub fn restore_backup(&self, archive_path: &Path, destination: &Path) -> Result<u64> {
        archive::unzip(archive_path, destination)
    }

    /// Zip the source and delete the original.
    pub fn archive_and_clean(&self, source: &Path, destination: &Path, exclude: &[String]) -> Result<u64> {
        archive::archive_and_clean(source, destination, &fsops::ExcludeSet::new(exclude))
    }

    // ---- file maintenance ----

    pub fn copy(&self, source: &Path, destination: &Path, exclude: &[String]) -> Result<u64> {
        fsops::copy_path(source, destination, &fsops::ExcludeSet::new(exclude))
    }

    pub fn move_path(&self, source: &Path, destination: &Path, exclude: &[String]) -> Result<u64> {
        fsops::move_path(source, destination, &fsops::ExcludeSet::new(exclude))
    }

    pub fn delete(&self, path: &Path) -> Result<()> {
        fsops::delete_path(path)
    }

    pub fn delete_old_files(&self, path: &Path, days: u64, options: &fsops::CleanupOptions) -> Result<u64> {
        fsops::delete_old_files(path, days, options)
    }

    pub fn keep_recent_files(&self, path: &Path, keep: usize, pattern: &str) -> Result<u64> {
        fsops::keep_recent_files(path, keep, pattern)
    }

    pub fn mirror(&self, source: &Path, destination: &Path, exclude: &[String]) -> Result<()> {
        fsops::mirror(source, destination, &fsops::ExcludeSet::new(exclude))
    }

    pub fn ensure_directory(&self, dir: &Path) -> Result<()> {
        fsops::ensure_directory(dir)
    }

    pub fn list_files(&self, dir: &Path, pattern: Option<&str>) -> Result<Vec<PathBuf>> {
        fsops::list_files(dir, pattern)
    }

    pub fn inspect(&self, dir: &Path, recursive: bool) -> Result<Vec<FileSummary>> {
        fsops::inspect(dir, recursive)
    }

    pub fn dir_size(&self, path: &Path) -> Result<u64> {
        fsops::dir_size(path)
    }

    pub fn dir_size_human(&self, path: &Path) -> Result<String> {
        Ok(fsops::human_size(fsops::dir_size(path)?))
    }

    // ---- logging ----

    /// Write to the log book; unknown level names fall back to info.
    pub async fn log(&self, message: &str, level: &str) -> Result<()> {
        self.logbook
            .write(message, LogLevel::from_name(level), None, Default::default())
            .await
    }

    // ---- periodic tasks ----

    /// Gated periodic execution; successful runs are recorded in the log book.
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
        let outcome = self.runner.run_every(interval, key, max_runs, callback).await?;
        match &outcome {
            RunOutcome::Ran { .. } => {
                self.logbook
                    .info(&format!("Task '{}' executed automatically (every {})", key, interval))
                    .await?;
            }
            RunOutcome::MaxRunsReached { max_runs } => {
                self.logbook
                    .warning(&format!("Task '{}' reached its run limit ({})", key, max_runs))
                    .await?;
            }
            RunOutcome::Skipped { .. } => {}
        }
        Ok(outcome)
    }

    // ---- exports / images ----

    pub fn export_xlsx(
        &self,
        path: &Path,
        records: &[serde_json::Map<String, serde_json::Value>],
        headers: Option<&[String]>,
    ) -> Result<()> {
        excel::export_records(path, records, headers, &self.sheet_style)
    }

    pub fn csv_to_xlsx(&self, csv_path: &Path, xlsx_path: &Path) -> Result<()> {
        excel::from_csv(csv_path, xlsx_path, &self.sheet_style)
    }

    pub fn optimize_image(&self, path: &Path, quality: Option<u8>) -> Result<ImageStats> {
        image_opt::optimize(path, quality.unwrap_or(self.image_quality))
    }

    // ---- system ----

    pub fn info(&self) -> SystemInfo {
        self.system.info()
    }

    pub fn monitor(&self) -> SystemMetrics {
        self.system.metrics()
    }

    pub fn health(&self) -> HealthReport {
        self.system.health()
    }

    pub fn export_system(&self) -> Result<String> {
        self.system.export()
    }

    pub async fn log_system_status(&self) -> Result<()> {
        self.system.log_status(&self.logbook).await
    }
}

impl Default for Toolkit {
    fn default() -> Self {
        Self::new(ToolkitOptions::default())
    }
}
