// Geometry primitives shared by the telemetry messages.

use serde::{Deserialize, Serialize};

/// 3D vector (meters or meters/second depending on context)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Euclidean norm
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Linear and angular velocity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Twist {
    /// Linear velocity in m/s (x = forward)
    pub linear: Vector3,
    /// Angular velocity in rad/s (z = yaw)
    pub angular: Vector3,
}

impl Twist {
    pub fn new(linear: Vector3, angular: Vector3) -> Self {
        Self { linear, angular }
    }

    /// Zero velocity (stopped)
    pub fn stop() -> Self {
        Self::default()
    }

    /// Pure forward motion at `speed` m/s
    pub fn forward(speed: f64) -> Self {
        Self {
            linear: Vector3::new(speed, 0.0, 0.0),
            angular: Vector3::zero(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.linear.is_finite() && self.angular.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_magnitude() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert_eq!(v.magnitude(), 5.0);
    }

    #[test]
    fn test_forward_twist() {
        let t = Twist::forward(1.5);
        assert_eq!(t.linear.x, 1.5);
        assert_eq!(t.linear.y, 0.0);
        assert_eq!(t.angular.z, 0.0);
    }

    #[test]
    fn test_nan_twist_invalid() {
        let mut t = Twist::stop();
        t.linear.x = f64::NAN;
        assert!(!t.is_valid());
    }
}
