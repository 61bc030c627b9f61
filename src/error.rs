use thiserror::Error;

/// Failures a single metric family can run into.
///
/// None of these abort the report: the reporter records them against the
/// family that produced them and moves on to the next one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    #[error("{provider} provider unavailable: {reason}")]
    ProviderUnavailable {
        provider: &'static str,
        reason: String,
    },

    #[error("ratio undefined: {0} is zero")]
    DivisionUndefined(&'static str),

    #[error("anomalous counter `{counter}`: {detail}")]
    AnomalousCounter {
        counter: &'static str,
        detail: String,
    },

    #[error("sampling wait interrupted: {0}")]
    InterruptedWait(String),
}

impl ProbeError {
    pub fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        ProbeError::ProviderUnavailable {
            provider,
            reason: reason.into(),
        }
    }

    pub fn anomalous(counter: &'static str, detail: impl Into<String>) -> Self {
        ProbeError::AnomalousCounter {
            counter,
            detail: detail.into(),
        }
    }

    pub fn is_anomaly(&self) -> bool {
        matches!(self, ProbeError::AnomalousCounter { .. })
    }
}

pub type ProbeResult<T> = std::result::Result<T, ProbeError>;
