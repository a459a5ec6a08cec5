//! The powersim nodes.

pub mod battery_model;
pub mod load_estimator;

pub use battery_model::BatteryModelNode;
pub use load_estimator::LoadEstimatorNode;
