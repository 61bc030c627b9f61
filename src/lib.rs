pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod system;
