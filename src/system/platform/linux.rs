use std::fs;
use std::path::Path;

use super::PlatformCounters;
use crate::error::{ProbeError, ProbeResult};
use crate::system::snapshot::CounterSnapshot;
use crate::system::task::{TaskInfo, TaskState, sorted_tasks};

pub struct Platform;

impl PlatformCounters for Platform {
    fn processor_ticks() -> ProbeResult<CounterSnapshot> {
        let contents = fs::read_to_string("/proc/stat")
            .map_err(|e| ProbeError::unavailable("hardware", format!("/proc/stat: {e}")))?;
        parse_proc_stat(&contents)
    }

    fn current_tasks() -> ProbeResult<Vec<TaskInfo>> {
        let entries = fs::read_dir("/proc/self/task")
            .map_err(|e| ProbeError::unavailable("task", format!("/proc/self/task: {e}")))?;

        let mut tasks = Vec::new();
        for entry in entries.flatten() {
            let Some(id) = entry.file_name().to_str().and_then(|s| s.parse().ok()) else {
                continue;
            };
            // A thread can exit between listing and reading; skip it.
            if let Some(task) = read_task(&entry.path(), id) {
                tasks.push(task);
            }
        }
        Ok(sorted_tasks(tasks))
    }
}

fn read_task(dir: &Path, id: u64) -> Option<TaskInfo> {
    let stat = fs::read_to_string(dir.join("stat")).ok()?;
    let name = match fs::read_to_string(dir.join("comm")) {
        Ok(comm) => comm.trim_end().to_string(),
        Err(_) => comm_from_stat(&stat)?.to_string(),
    };
    Some(TaskInfo {
        id,
        name,
        state: state_from_stat(&stat)?,
    })
}

/// Parse the aggregate `cpu` line:
/// `cpu user nice system idle iowait irq softirq steal guest guest_nice`.
/// Kernels older than 2.6.11 omit the trailing fields; those read as zero.
pub(crate) fn parse_proc_stat(contents: &str) -> ProbeResult<CounterSnapshot> {
    let line = contents
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))
        .ok_or_else(|| ProbeError::unavailable("hardware", "no aggregate cpu line in /proc/stat"))?;

    let fields = line
        .split_whitespace()
        .skip(1)
        .map(str::parse::<u64>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ProbeError::unavailable("hardware", format!("bad /proc/stat field: {e}")))?;
    if fields.len() < 4 {
        return Err(ProbeError::unavailable(
            "hardware",
            format!("expected at least 4 cpu fields, got {}", fields.len()),
        ));
    }
    let field = |i: usize| fields.get(i).copied().unwrap_or(0);

    // guest and guest_nice are already counted in user and nice.
    Ok(CounterSnapshot {
        user: field(0),
        nice: field(1),
        system: field(2),
        idle: field(3),
        iowait: field(4),
        irq: field(5),
        softirq: field(6),
        steal: field(7),
    })
}

// comm may contain spaces and parens, so anchor on the last ')'.
fn comm_from_stat(stat: &str) -> Option<&str> {
    let open = stat.find('(')?;
    let close = stat.rfind(')')?;
    stat.get(open + 1..close)
}

fn state_from_stat(stat: &str) -> Option<TaskState> {
    let after_comm = stat.rfind(')')? + 1;
    let code = stat[after_comm..].split_whitespace().next()?.chars().next()?;
    Some(TaskState::from_proc_code(code))
}
