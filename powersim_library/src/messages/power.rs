// Power estimation messages and service payloads.

use powersim_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Estimated instantaneous power draw, published once per estimator tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLoad {
    /// Estimated load in watts, clamped to the configured range
    pub watts: f64,
    /// Timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
}

impl PowerLoad {
    pub fn new(watts: f64) -> Self {
        Self {
            watts,
            timestamp_ns: super::timestamp_now(),
        }
    }
}

impl LogSummary for PowerLoad {
    fn log_summary(&self) -> String {
        format!("PowerLoad({:.3}W)", self.watts)
    }
}

/// Request payload for the battery model's set-power-load service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SetPowerLoadRequest {
    /// Load to apply to the battery model, in watts
    pub load: f64,
}

/// Request payload for the consumption-factor service.
///
/// The factor multiplies every future raw load computation; it must be
/// non-negative (zero is legal and floors the output at the minimum load).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionFactorRequest {
    pub factor: f64,
}

/// Generic success/failure acknowledgement for service calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAck {
    pub success: bool,
}

impl ServiceAck {
    pub fn ok() -> Self {
        Self { success: true }
    }

    pub fn rejected() -> Self {
        Self { success: false }
    }
}

impl LogSummary for ServiceAck {
    fn log_summary(&self) -> String {
        format!("ServiceAck(success={})", self.success)
    }
}
