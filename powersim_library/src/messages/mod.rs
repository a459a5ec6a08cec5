//! Message types exchanged between powersim nodes.

pub mod cmd_vel;
pub mod geometry;
pub mod nav;
pub mod power;
pub mod sensor;

pub use cmd_vel::CmdVel;
pub use geometry::{Twist, Vector3};
pub use nav::Odometry;
pub use power::{ConsumptionFactorRequest, PowerLoad, ServiceAck, SetPowerLoadRequest};
pub use sensor::{BatteryState, Imu};

/// Current time in nanoseconds since the Unix epoch.
pub fn timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64
}
