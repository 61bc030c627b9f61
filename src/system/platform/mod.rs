use crate::error::ProbeResult;
use crate::system::snapshot::CounterSnapshot;
use crate::system::task::TaskInfo;

pub trait PlatformCounters {
    fn processor_ticks() -> ProbeResult<CounterSnapshot>;
    fn current_tasks() -> ProbeResult<Vec<TaskInfo>>;
}

#[cfg(target_os = "linux")]
mod linux;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod unsupported;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(not(any(target_os = "linux", target_os = "windows")))]
use unsupported as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn processor_ticks() -> ProbeResult<CounterSnapshot> {
    platform_impl::Platform::processor_ticks()
}

pub fn current_tasks() -> ProbeResult<Vec<TaskInfo>> {
    platform_impl::Platform::current_tasks()
}
