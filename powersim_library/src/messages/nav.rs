// Navigation message types.

use powersim_core::LogSummary;
use serde::{Deserialize, Serialize};

use crate::messages::geometry::Twist;

/// Odometry estimate combining a 2D pose and the body-frame velocity.
///
/// Typically computed from wheel encoders or visual odometry. Consumers
/// interested in power draw only read `twist.linear.x` (forward velocity).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct Odometry {
    /// Position x in meters (odom frame)
    pub x: f64,
    /// Position y in meters (odom frame)
    pub y: f64,
    /// Heading in radians
    pub theta: f64,
    /// Body-frame velocity estimate
    pub twist: Twist,
    /// Timestamp in nanoseconds since epoch
    pub timestamp_ns: u64,
}

impl Odometry {
    /// Create a new odometry message stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp_ns: super::timestamp_now(),
            ..Self::default()
        }
    }

    /// Create an odometry message carrying only a forward velocity
    pub fn with_forward_velocity(velocity: f64) -> Self {
        Self {
            twist: Twist::forward(velocity),
            timestamp_ns: super::timestamp_now(),
            ..Self::default()
        }
    }

    /// Forward linear velocity in m/s
    pub fn forward_velocity(&self) -> f64 {
        self.twist.linear.x
    }

    pub fn is_valid(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.theta.is_finite() && self.twist.is_valid()
    }
}

impl LogSummary for Odometry {
    fn log_summary(&self) -> String {
        format!(
            "Odometry(x={:.2}, y={:.2}, v={:.2})",
            self.x,
            self.y,
            self.forward_velocity()
        )
    }
}
