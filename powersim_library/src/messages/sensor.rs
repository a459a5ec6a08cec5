// Sensor message types.

use powersim_core::LogSummary;
use serde::{Deserialize, Serialize};

/// Inertial measurement unit sample.
///
/// Power estimation only reads `linear_acceleration[0]` (forward axis);
/// the remaining fields are carried so the same message serves any other
/// consumer of the inertial channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Imu {
    /// Orientation as quaternion [x, y, z, w]
    pub orientation: [f64; 4],
    /// Angular velocity [x, y, z] in rad/s
    pub angular_velocity: [f64; 3],
    /// Linear acceleration [x, y, z] in m/s²
    pub linear_acceleration: [f64; 3],
    /// Timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
}

impl Imu {
    /// Create a new IMU message with identity orientation
    pub fn new() -> Self {
        Self {
            orientation: [0.0, 0.0, 0.0, 1.0],
            angular_velocity: [0.0; 3],
            linear_acceleration: [0.0; 3],
            timestamp_ns: super::timestamp_now(),
        }
    }

    /// Create an IMU message carrying only a forward acceleration
    pub fn with_forward_acceleration(accel: f64) -> Self {
        let mut imu = Self::new();
        imu.linear_acceleration[0] = accel;
        imu
    }

    /// Forward linear acceleration in m/s²
    pub fn forward_acceleration(&self) -> f64 {
        self.linear_acceleration[0]
    }

    /// Check if all values are finite
    pub fn is_valid(&self) -> bool {
        self.orientation.iter().all(|v| v.is_finite())
            && self.angular_velocity.iter().all(|v| v.is_finite())
            && self.linear_acceleration.iter().all(|v| v.is_finite())
    }
}

impl Default for Imu {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSummary for Imu {
    fn log_summary(&self) -> String {
        format!(
            "Imu(ax={:.2}, ay={:.2}, az={:.2})",
            self.linear_acceleration[0], self.linear_acceleration[1], self.linear_acceleration[2]
        )
    }
}

/// Battery status message published by the battery model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BatteryState {
    /// Voltage in volts
    pub voltage: f64,
    /// Remaining charge in watt-hours
    pub charge_wh: f64,
    /// Capacity in watt-hours
    pub capacity_wh: f64,
    /// Percentage charge (0-100)
    pub percentage: f64,
    /// Load currently being drawn, in watts
    pub power_load: f64,
    /// Timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
}

impl BatteryState {
    pub fn new(charge_wh: f64, capacity_wh: f64, power_load: f64) -> Self {
        let percentage = if capacity_wh > 0.0 {
            (charge_wh / capacity_wh * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };
        Self {
            voltage: 12.0,
            charge_wh,
            capacity_wh,
            percentage,
            power_load,
            timestamp_ns: super::timestamp_now(),
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.charge_wh <= 0.0
    }
}

impl LogSummary for BatteryState {
    fn log_summary(&self) -> String {
        format!(
            "BatteryState({:.1}%, load={:.2}W)",
            self.percentage, self.power_load
        )
    }
}
