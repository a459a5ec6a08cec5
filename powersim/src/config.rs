//! Configuration for the powersim nodes.
//!
//! Loaded from a YAML file with every key optional; missing keys take the
//! defaults below. Example:
//!
//! ```yaml
//! estimator:
//!   controller_frequency: 5.0
//!   max_power_load: 5.0
//!   odom_topic: odom
//! battery:
//!   capacity_wh: 32.0
//! ```

use std::path::Path;

use powersim_core::error::{PowerError, PowerResult};
use serde::{Deserialize, Serialize};

/// Configuration for the load estimator node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Tick rate in Hz
    pub controller_frequency: f64,
    /// Clamp floor for the published load
    pub min_power_load: f64,
    /// Clamp ceiling for the published load
    pub max_power_load: f64,
    /// Velocity coefficient (watts per m/s of peak velocity)
    pub const_linear_vel: f64,
    /// Acceleration coefficient (watts per m/s² of peak acceleration)
    pub const_acceleration: f64,
    /// Command-rate coefficient (watts per Hz of command traffic)
    pub const_frequency: f64,
    /// Fixed additive offset in watts
    pub additional_consumption: f64,
    /// Motion-state channel
    pub odom_topic: String,
    /// Inertial channel
    pub imu_topic: String,
    /// Command channel (only its arrival rate is used)
    pub cmd_vel_topic: String,
    /// Load output channel
    pub power_load_topic: String,
    /// Outbound battery-model service
    pub set_load_service: String,
    /// Exposed consumption-factor service
    pub consumption_service: String,
    /// Bound on each outbound service call, in milliseconds
    pub service_call_timeout_ms: u64,
    /// Startup wait for the battery service, in seconds; 0 waits forever
    pub service_wait_timeout_s: f64,
    /// Sliding window size for command-rate measurement
    pub rate_window: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            controller_frequency: 5.0,
            min_power_load: 0.2,
            max_power_load: 5.0,
            const_linear_vel: 1.3,
            const_acceleration: 0.1,
            const_frequency: 0.04,
            additional_consumption: 0.0,
            odom_topic: "odom".to_string(),
            imu_topic: "imu/data".to_string(),
            cmd_vel_topic: "cmd_vel".to_string(),
            power_load_topic: "power_load".to_string(),
            set_load_service: "battery_demo_model/set_power_load".to_string(),
            consumption_service: "increase_power_consumption".to_string(),
            service_call_timeout_ms: 250,
            service_wait_timeout_s: 0.0,
            rate_window: 100,
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> PowerResult<()> {
        if !(self.controller_frequency.is_finite() && self.controller_frequency > 0.0) {
            return Err(PowerError::config(format!(
                "controller_frequency must be positive, got {}",
                self.controller_frequency
            )));
        }
        if !(self.min_power_load.is_finite() && self.max_power_load.is_finite()) {
            return Err(PowerError::config("load bounds must be finite"));
        }
        if self.min_power_load > self.max_power_load {
            return Err(PowerError::config(format!(
                "min_power_load {} exceeds max_power_load {}",
                self.min_power_load, self.max_power_load
            )));
        }
        for (name, value) in [
            ("const_linear_vel", self.const_linear_vel),
            ("const_acceleration", self.const_acceleration),
            ("const_frequency", self.const_frequency),
            ("additional_consumption", self.additional_consumption),
        ] {
            if !value.is_finite() {
                return Err(PowerError::config(format!("{} must be finite", name)));
            }
        }
        if self.service_call_timeout_ms == 0 {
            return Err(PowerError::config("service_call_timeout_ms must be nonzero"));
        }
        if self.rate_window < 2 {
            return Err(PowerError::config("rate_window must be at least 2"));
        }
        Ok(())
    }
}

/// Configuration for the in-process battery model node.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatteryModelConfig {
    /// Battery capacity in watt-hours
    pub capacity_wh: f64,
    /// Initial charge as a fraction of capacity (0.0-1.0)
    pub initial_charge: f64,
    /// Battery state output channel
    pub battery_state_topic: String,
    /// Service name the model serves set-load requests on
    pub set_load_service: String,
    /// Publish rate in Hz
    pub model_frequency: f64,
}

impl Default for BatteryModelConfig {
    fn default() -> Self {
        Self {
            capacity_wh: 32.0,
            initial_charge: 1.0,
            battery_state_topic: "battery_state".to_string(),
            set_load_service: "battery_demo_model/set_power_load".to_string(),
            model_frequency: 1.0,
        }
    }
}

impl BatteryModelConfig {
    pub fn validate(&self) -> PowerResult<()> {
        if !(self.capacity_wh.is_finite() && self.capacity_wh > 0.0) {
            return Err(PowerError::config("capacity_wh must be positive"));
        }
        if !(0.0..=1.0).contains(&self.initial_charge) {
            return Err(PowerError::config(format!(
                "initial_charge must be within [0, 1], got {}",
                self.initial_charge
            )));
        }
        if !(self.model_frequency.is_finite() && self.model_frequency > 0.0) {
            return Err(PowerError::config("model_frequency must be positive"));
        }
        Ok(())
    }
}

/// Top-level configuration file contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PowersimConfig {
    pub estimator: EstimatorConfig,
    pub battery: BatteryModelConfig,
}

impl PowersimConfig {
    /// Load and validate a configuration file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> PowerResult<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_yaml::from_str(&contents)
            .map_err(|e| PowerError::config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PowerResult<()> {
        self.estimator.validate()?;
        self.battery.validate()
    }
}
