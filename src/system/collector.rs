use std::time::{Duration, SystemTime};

use sysinfo::{CpuRefreshKind, Disks, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};
use tracing::debug;

use super::platform;
use super::provider::{HardwareProvider, OsProvider, RuntimeProvider, TaskProvider};
use super::snapshot::{CapacityInfo, CounterSnapshot, FilesystemInfo, OsIdentity, RuntimeStats};
use super::task::TaskInfo;
use crate::error::{ProbeError, ProbeResult};
use crate::runtime;

/// Provider backed by `sysinfo` and the platform counters.
///
/// Every query builds its own `System` with only the refresh it needs.
#[derive(Clone, Copy, Debug, Default)]
pub struct SysinfoProvider;

impl SysinfoProvider {
    pub fn new() -> Self {
        SysinfoProvider
    }
}

impl HardwareProvider for SysinfoProvider {
    fn processor_ticks(&self) -> ProbeResult<CounterSnapshot> {
        let ticks = platform::processor_ticks()?;
        debug!(?ticks, "read processor ticks");
        Ok(ticks)
    }

    fn logical_processor_count(&self) -> ProbeResult<usize> {
        let sys = System::new_with_specifics(
            RefreshKind::nothing().with_cpu(CpuRefreshKind::nothing()),
        );
        match sys.cpus().len() {
            0 => Err(ProbeError::unavailable("hardware", "no logical processors reported")),
            n => Ok(n),
        }
    }

    fn memory_capacity(&self) -> ProbeResult<CapacityInfo> {
        let mut sys = System::new();
        sys.refresh_memory();
        let capacity = CapacityInfo::new(sys.total_memory(), sys.available_memory());
        debug!(?capacity, "read memory capacity");
        Ok(capacity)
    }
}

impl OsProvider for SysinfoProvider {
    fn identity(&self) -> ProbeResult<OsIdentity> {
        let name = System::name()
            .ok_or_else(|| ProbeError::unavailable("os", "operating system name unknown"))?;
        let version = System::long_os_version().unwrap_or_else(|| name.clone());
        let descriptor = match System::kernel_version() {
            Some(kernel) => format!("{version} (kernel {kernel})"),
            None => version,
        };
        Ok(OsIdentity {
            name,
            architecture: std::env::consts::ARCH.to_string(),
            descriptor,
            host_name: System::host_name(),
        })
    }

    fn filesystems(&self) -> ProbeResult<Vec<FilesystemInfo>> {
        let disks = Disks::new_with_refreshed_list();
        let stores: Vec<FilesystemInfo> = disks
            .list()
            .iter()
            .map(|disk| FilesystemInfo {
                name: disk.name().to_string_lossy().to_string(),
                mount_point: disk.mount_point().display().to_string(),
                kind: disk.file_system().to_string_lossy().to_string(),
                capacity: CapacityInfo::new(disk.total_space(), disk.available_space()),
            })
            .collect();
        debug!(count = stores.len(), "listed filesystems");
        Ok(stores)
    }
}

impl RuntimeProvider for SysinfoProvider {
    fn runtime_stats(&self) -> ProbeResult<RuntimeStats> {
        let pid = sysinfo::get_current_pid().map_err(|e| ProbeError::unavailable("runtime", e))?;
        let mut sys = System::new();
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let process = sys
            .process(pid)
            .ok_or_else(|| ProbeError::unavailable("runtime", format!("pid {pid} not found")))?;

        Ok(RuntimeStats {
            resident: process.memory(),
            virtual_size: process.virtual_memory(),
            heap_in_use: runtime::heap_in_use(),
            heap_peak: runtime::heap_peak(),
            started_at: SystemTime::UNIX_EPOCH + Duration::from_secs(process.start_time()),
        })
    }
}

impl TaskProvider for SysinfoProvider {
    fn active_tasks(&self) -> ProbeResult<Vec<TaskInfo>> {
        platform::current_tasks()
    }
}
