//! # powersim
//!
//! Battery load estimation for simulated robots. The
//! [`nodes::LoadEstimatorNode`] turns motion telemetry (odometry, IMU,
//! command traffic) into a clamped instantaneous power draw, pushes it to
//! a battery model service, and publishes it; the
//! [`nodes::BatteryModelNode`] is the in-process battery simulation used
//! by demos and tests.

pub mod config;
pub mod nodes;
pub mod signals;

pub use config::{BatteryModelConfig, EstimatorConfig, PowersimConfig};
pub use nodes::{BatteryModelNode, LoadEstimatorNode};
