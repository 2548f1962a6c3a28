use thiserror::Error;

#[derive(Error, Debug)]
pub enum SysKitError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Image processing error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Invalid interval: {input}")]
    InvalidIntervalError { input: String },

    #[error("Invalid path {path}: {reason}")]
    InvalidPathError { path: String, reason: String },

    #[error("Task state file {path} is corrupt: {source}")]
    StateFileError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unsupported image format for {path}")]
    UnsupportedImageError { path: String },

    #[error("No data to export")]
    EmptyExportError,

    #[error("Task execution failed: {message}")]
    TaskError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Informational, the operation can be considered successful.
    Low,
    /// Transient, retrying may succeed.
    Medium,
    /// The requested operation failed.
    High,
    /// Environment or state problem, manual intervention needed.
    Critical,
}

impl SysKitError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SysKitError::HttpError(_) => ErrorSeverity::Medium,
            SysKitError::IoError(_)
            | SysKitError::ZipError(_)
            | SysKitError::StateFileError { .. } => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SysKitError::ZipError(_) => "Archive could not be read or written".to_string(),
            SysKitError::HttpError(_) => "A network request failed".to_string(),
            SysKitError::IoError(e) => format!("File system operation failed: {}", e),
            SysKitError::InvalidIntervalError { input } => {
                format!("'{}' is not a valid interval", input)
            }
            SysKitError::InvalidPathError { path, reason } => {
                format!("Path '{}' cannot be used: {}", path, reason)
            }
            SysKitError::StateFileError { path, .. } => {
                format!("Task state file '{}' could not be parsed", path)
            }
            SysKitError::UnsupportedImageError { path } => {
                format!("'{}' is not a JPEG, PNG or WebP image", path)
            }
            SysKitError::EmptyExportError => "There is no data to export".to_string(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SysKitError::ZipError(_) => "Check that the archive is a valid ZIP file",
            SysKitError::HttpError(_) => "Check network connectivity and the configured URL",
            SysKitError::IoError(_) => "Check that the path exists and permissions allow access",
            SysKitError::InvalidIntervalError { .. } => {
                "Use '<n> <unit>' with seconds, minutes, hours or days, e.g. '5 minutes'"
            }
            SysKitError::InvalidPathError { .. } => "Verify the source and destination paths",
            SysKitError::StateFileError { .. } => {
                "Remove or repair the state file, or point the scheduler at a fresh one"
            }
            SysKitError::UnsupportedImageError { .. } => {
                "Convert the image to JPEG, PNG or WebP first"
            }
            SysKitError::EmptyExportError => "Provide at least one row of data",
            SysKitError::ConfigValidationError { .. }
            | SysKitError::InvalidConfigValueError { .. } => {
                "Fix the configuration file and run again"
            }
            _ => "See the log output for details",
        }
    }
}

pub type Result<T> = std::result::Result<T, SysKitError>;
