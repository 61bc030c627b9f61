use serde::Serialize;

use super::snapshot::CounterSnapshot;
use crate::error::{ProbeError, ProbeResult};

/// Processor utilization over one sampling interval, as fractions of the
/// total tick delta.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct UtilizationResult {
    pub user_fraction: f64,
    pub system_fraction: f64,
    pub idle_fraction: f64,
    pub total_fraction: f64,
}

/// Derive utilization from two snapshots taken in order.
///
/// Every counter must be non-decreasing between `prev` and `curr`. nice is
/// reported as user time, irq/softirq/steal as system time and iowait as
/// idle time, so the three fractions always sum to one.
pub fn compute_delta(
    prev: &CounterSnapshot,
    curr: &CounterSnapshot,
) -> ProbeResult<UtilizationResult> {
    let mut deltas = [0u64; 8];
    for (slot, ((name, before), (_, after))) in deltas
        .iter_mut()
        .zip(prev.counters().into_iter().zip(curr.counters()))
    {
        *slot = after.checked_sub(before).ok_or_else(|| {
            ProbeError::anomalous(name, format!("went backwards from {before} to {after}"))
        })?;
    }
    let [user, nice, system, idle, iowait, irq, softirq, steal] = deltas.map(u128::from);

    let total = user + nice + system + idle + iowait + irq + softirq + steal;
    if total == 0 {
        return Err(ProbeError::DivisionUndefined("processor tick delta"));
    }

    let total = total as f64;
    let idle_fraction = (idle + iowait) as f64 / total;
    Ok(UtilizationResult {
        user_fraction: (user + nice) as f64 / total,
        system_fraction: (system + irq + softirq + steal) as f64 / total,
        idle_fraction,
        total_fraction: 1.0 - idle_fraction,
    })
}
