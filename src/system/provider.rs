//! Query interfaces the reporter reads from.
//!
//! Implementations return fresh data on every call and keep no state
//! between calls, so tests can swap in fixed fakes.

use super::snapshot::{CapacityInfo, CounterSnapshot, FilesystemInfo, OsIdentity, RuntimeStats};
use super::task::TaskInfo;
use crate::error::ProbeResult;

pub trait HardwareProvider: Send + Sync {
    fn processor_ticks(&self) -> ProbeResult<CounterSnapshot>;
    fn logical_processor_count(&self) -> ProbeResult<usize>;
    fn memory_capacity(&self) -> ProbeResult<CapacityInfo>;
}

pub trait OsProvider: Send + Sync {
    fn identity(&self) -> ProbeResult<OsIdentity>;
    fn filesystems(&self) -> ProbeResult<Vec<FilesystemInfo>>;
}

pub trait RuntimeProvider: Send + Sync {
    fn runtime_stats(&self) -> ProbeResult<RuntimeStats>;
}

pub trait TaskProvider: Send + Sync {
    fn active_tasks(&self) -> ProbeResult<Vec<TaskInfo>>;
}
