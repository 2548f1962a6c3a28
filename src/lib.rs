pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::TomlConfig;
pub use core::logbook::LogBook;
pub use core::scheduler::TaskRunner;
pub use core::system::SystemReport;
pub use core::toolkit::{Toolkit, ToolkitOptions};
pub use domain::model::{LogLevel, RunOutcome, SheetStyle, TaskState};
pub use utils::error::{Result, SysKitError};
