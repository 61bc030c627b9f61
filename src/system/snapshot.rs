use std::time::SystemTime;

use serde::Serialize;

/// Aggregate processor tick counters read at one instant.
///
/// Counters a platform does not expose stay at zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CounterSnapshot {
    pub fn new(user: u64, system: u64, idle: u64) -> Self {
        CounterSnapshot {
            user,
            system,
            idle,
            ..Default::default()
        }
    }

    /// Named counters in a fixed order.
    pub fn counters(&self) -> [(&'static str, u64); 8] {
        [
            ("user", self.user),
            ("nice", self.nice),
            ("system", self.system),
            ("idle", self.idle),
            ("iowait", self.iowait),
            ("irq", self.irq),
            ("softirq", self.softirq),
            ("steal", self.steal),
        ]
    }
}

/// Total and currently available size of memory or a filesystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapacityInfo {
    pub total: u64,
    pub available: u64,
}

impl CapacityInfo {
    pub fn new(total: u64, available: u64) -> Self {
        CapacityInfo { total, available }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OsIdentity {
    pub name: String,
    pub architecture: String,
    pub descriptor: String,
    pub host_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FilesystemInfo {
    pub name: String,
    pub mount_point: String,
    pub kind: String,
    pub capacity: CapacityInfo,
}

/// Memory figures for the running process.
///
/// `heap_in_use` and `heap_peak` are `None` when the tracking allocator is
/// not installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeStats {
    pub resident: u64,
    pub virtual_size: u64,
    pub heap_in_use: Option<u64>,
    pub heap_peak: Option<u64>,
    pub started_at: SystemTime,
}
