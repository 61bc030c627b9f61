use super::snapshot::CapacityInfo;
use crate::error::{ProbeError, ProbeResult};

impl CapacityInfo {
    /// Bytes in use. Fails when the provider reports more available than
    /// total instead of clamping the difference away.
    pub fn used_bytes(&self) -> ProbeResult<u64> {
        self.total.checked_sub(self.available).ok_or_else(|| {
            ProbeError::anomalous(
                "available",
                format!(
                    "available {} exceeds total {}",
                    self.available, self.total
                ),
            )
        })
    }

    pub fn used_fraction(&self) -> ProbeResult<f64> {
        used_fraction(self.total, self.available)
    }
}

/// `(total - available) / total`.
pub fn used_fraction(total: u64, available: u64) -> ProbeResult<f64> {
    if total == 0 {
        return Err(ProbeError::DivisionUndefined("total capacity"));
    }
    let used = CapacityInfo::new(total, available).used_bytes()?;
    Ok(used as f64 / total as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fraction_of_used_capacity() {
        let fraction = used_fraction(100, 40).unwrap();
        assert!((fraction - 0.60).abs() < 1e-12);
    }

    #[test]
    fn memory_scenario() {
        let memory = CapacityInfo::new(8_000_000_000, 2_000_000_000);
        assert_eq!(memory.used_bytes().unwrap(), 6_000_000_000);
        assert!((memory.used_fraction().unwrap() - 0.75).abs() < 1e-12);
    }

    #[test]
    fn zero_total_is_undefined() {
        assert_eq!(
            used_fraction(0, 0),
            Err(ProbeError::DivisionUndefined("total capacity"))
        );
    }

    #[test]
    fn zero_total_takes_precedence_over_anomaly() {
        assert_eq!(
            used_fraction(0, 10),
            Err(ProbeError::DivisionUndefined("total capacity"))
        );
    }

    #[test]
    fn available_above_total_is_anomalous() {
        let info = CapacityInfo::new(100, 150);
        assert!(info.used_bytes().unwrap_err().is_anomaly());
        assert!(info.used_fraction().unwrap_err().is_anomaly());
    }

    #[test]
    fn full_and_empty_stores() {
        assert_eq!(used_fraction(500, 0).unwrap(), 1.0);
        assert_eq!(used_fraction(500, 500).unwrap(), 0.0);
    }
}
