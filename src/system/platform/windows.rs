use windows_sys::Win32::{Foundation::FILETIME, System::Threading::GetSystemTimes};

use super::PlatformCounters;
use crate::error::{ProbeError, ProbeResult};
use crate::system::snapshot::CounterSnapshot;
use crate::system::task::TaskInfo;

pub struct Platform;

fn filetime_ticks(ft: &FILETIME) -> u64 {
    (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
}

/// Split `GetSystemTimes` output into a snapshot. Kernel time includes idle
/// time, so kernel below idle is a contradictory reading.
fn snapshot_from_times(idle: u64, kernel: u64, user: u64) -> ProbeResult<CounterSnapshot> {
    let system = kernel.checked_sub(idle).ok_or_else(|| {
        ProbeError::anomalous(
            "system",
            format!("kernel time {kernel} is below idle time {idle}"),
        )
    })?;
    Ok(CounterSnapshot::new(user, system, idle))
}

impl PlatformCounters for Platform {
    fn processor_ticks() -> ProbeResult<CounterSnapshot> {
        let mut idle = unsafe { std::mem::zeroed::<FILETIME>() };
        let mut kernel = unsafe { std::mem::zeroed::<FILETIME>() };
        let mut user = unsafe { std::mem::zeroed::<FILETIME>() };
        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(ProbeError::unavailable(
                "hardware",
                format!("GetSystemTimes failed: {}", std::io::Error::last_os_error()),
            ));
        }
        snapshot_from_times(
            filetime_ticks(&idle),
            filetime_ticks(&kernel),
            filetime_ticks(&user),
        )
    }

    fn current_tasks() -> ProbeResult<Vec<TaskInfo>> {
        Err(ProbeError::unavailable(
            "task",
            "thread enumeration is not supported on windows",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_time_minus_idle_is_system() {
        let snap = snapshot_from_times(700, 1000, 400).unwrap();
        assert_eq!(snap, CounterSnapshot::new(400, 300, 700));
    }

    #[test]
    fn kernel_below_idle_is_anomalous() {
        let err = snapshot_from_times(1000, 700, 400).unwrap_err();
        assert!(err.is_anomaly());
    }

    #[test]
    fn filetime_halves_combine() {
        let ft = FILETIME {
            dwLowDateTime: 5,
            dwHighDateTime: 1,
        };
        assert_eq!(filetime_ticks(&ft), (1u64 << 32) + 5);
    }
}
