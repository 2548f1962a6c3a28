use crate::core::toolkit::ToolkitOptions;
use crate::domain::model::SheetStyle;
use crate::utils::error::{Result, SysKitError};
use crate::utils::validation::{
    validate_path, validate_positive_number, validate_range, validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub images: ImageConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_base_path")]
    pub base_path: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    #[serde(default)]
    pub json_format: bool,
    #[serde(default = "default_true")]
    pub console: bool,
    /// Error/critical entries are POSTed here when set.
    pub webhook_url: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            base_path: default_log_base_path(),
            retention_days: default_retention_days(),
            json_format: false,
            console: true,
            webhook_url: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Shared task state file. Defaults to the system temp directory.
    pub state_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Header cell colors, RGB hex without '#'.
    #[serde(default = "default_header_bg")]
    pub header_bg: String,
    #[serde(default = "default_header_color")]
    pub header_color: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: default_sheet_name(),
            header_bg: default_header_bg(),
            header_color: default_header_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    #[serde(default = "default_quality")]
    pub quality: u8,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            quality: default_quality(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    #[serde(default = "default_threshold")]
    pub high_load_threshold: f32,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            high_load_threshold: default_threshold(),
        }
    }
}

fn default_log_base_path() -> String {
    "./logs".to_string()
}

fn default_retention_days() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_sheet_name() -> String {
    "Data".to_string()
}

fn default_header_bg() -> String {
    "071E40".to_string()
}

fn default_header_color() -> String {
    "FFFFFF".to_string()
}

fn default_quality() -> u8 {
    80
}

fn default_threshold() -> f32 {
    80.0
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(SysKitError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SysKitError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Explicit path, else `syskit.toml` in the working directory, else
    /// built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new("syskit.toml");
                if fallback.exists() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Replace `${VAR_NAME}` references with environment values.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| SysKitError::ConfigValidationError {
            field: "env_substitution".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("logging.base_path", &self.logging.base_path)?;
        validate_positive_number(
            "logging.retention_days",
            self.logging.retention_days as usize,
            1,
        )?;

        if let Some(url) = &self.logging.webhook_url {
            validate_url("logging.webhook_url", url)?;
        }

        if let Some(state_path) = &self.scheduler.state_path {
            validate_path("scheduler.state_path", state_path)?;
        }

        validate_hex_color("export.header_bg", &self.export.header_bg)?;
        validate_hex_color("export.header_color", &self.export.header_color)?;
        validate_range("images.quality", self.images.quality, 1, 100)?;
        validate_range(
            "monitoring.high_load_threshold",
            self.monitoring.high_load_threshold,
            1.0,
            100.0,
        )?;

        Ok(())
    }

    pub fn sheet_style(&self) -> SheetStyle {
        SheetStyle {
            sheet_name: self.export.sheet_name.clone(),
            header_bg: self.export.header_bg.clone(),
            header_color: self.export.header_color.clone(),
        }
    }
}

fn validate_hex_color(field_name: &str, value: &str) -> Result<()> {
    let valid = value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(SysKitError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a 6-digit RGB hex color without '#'".to_string(),
        });
    }
    Ok(())
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

impl From<&TomlConfig> for ToolkitOptions {
    fn from(config: &TomlConfig) -> Self {
        Self {
            log_base_path: PathBuf::from(&config.logging.base_path),
            log_retention_days: config.logging.retention_days,
            log_json_format: config.logging.json_format,
            log_console: config.logging.console,
            webhook_url: config.logging.webhook_url.clone(),
            state_path: config.scheduler.state_path.as_ref().map(PathBuf::from),
            sheet_style: config.sheet_style(),
            image_quality: config.images.quality,
            high_load_threshold: config.monitoring.high_load_threshold,
        }
    }
}
