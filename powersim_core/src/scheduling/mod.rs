//! Fixed-rate cooperative scheduling for powersim nodes.

pub mod scheduler;

pub use scheduler::Scheduler;
