pub mod archive;
pub mod excel;
pub mod fsops;
pub mod image_opt;
pub mod logbook;
pub mod scheduler;
pub mod system;
pub mod toolkit;

pub use crate::domain::model::{LogEntry, LogLevel, RunOutcome, SheetStyle, TaskState};
pub use crate::domain::ports::{AlertSink, Clock, SystemClock};
pub use crate::utils::error::Result;
