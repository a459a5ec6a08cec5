//! # powersim_library
//!
//! Message types for the powersim battery load estimator:
//!
//! - **Telemetry**: [`messages::Odometry`], [`messages::Imu`],
//!   [`messages::CmdVel`]
//! - **Outputs**: [`messages::PowerLoad`], [`messages::BatteryState`]
//! - **Service payloads**: [`messages::SetPowerLoadRequest`],
//!   [`messages::ConsumptionFactorRequest`], [`messages::ServiceAck`]

pub mod messages;

pub use messages::{
    BatteryState, CmdVel, ConsumptionFactorRequest, Imu, Odometry, PowerLoad, ServiceAck,
    SetPowerLoadRequest, Twist, Vector3,
};
