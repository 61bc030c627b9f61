use super::PlatformCounters;
use crate::error::{ProbeError, ProbeResult};
use crate::system::snapshot::CounterSnapshot;
use crate::system::task::TaskInfo;

pub struct Platform;

impl PlatformCounters for Platform {
    fn processor_ticks() -> ProbeResult<CounterSnapshot> {
        Err(ProbeError::unavailable(
            "hardware",
            format!("raw tick counters are not supported on {}", std::env::consts::OS),
        ))
    }

    fn current_tasks() -> ProbeResult<Vec<TaskInfo>> {
        Err(ProbeError::unavailable(
            "task",
            format!("thread enumeration is not supported on {}", std::env::consts::OS),
        ))
    }
}
