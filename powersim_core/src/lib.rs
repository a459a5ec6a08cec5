//! # powersim_core
//!
//! Minimal node runtime for the powersim battery load estimator:
//! a `Node` trait with lifecycle and rate control, in-process typed
//! pub/sub topics, request/reply services with presence tracking, an
//! arrival-rate meter, and a cooperative fixed-rate scheduler.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use powersim_core::prelude::*;
//!
//! struct MyNode {
//!     output: Topic<f64>,
//! }
//!
//! impl Node for MyNode {
//!     fn name(&self) -> &str { "my_node" }
//!
//!     fn tick(&mut self) {
//!         let _ = self.output.send(1.0);
//!     }
//!
//!     fn rate_hz(&self) -> Option<f64> { Some(5.0) }
//! }
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

pub use crate::core::{LogSummary, Node, NodeInfo, NodeState, TopicMetadata};
pub use communication::{RateMeter, ServiceClient, ServiceServer, Topic};
pub use error::{PowerError, PowerResult};
pub use scheduling::Scheduler;

/// The powersim prelude — everything a node implementation needs.
pub mod prelude {
    pub use crate::communication::{
        service_available, RateMeter, RequestId, ServiceClient, ServiceServer, Topic,
    };
    pub use crate::core::{LogSummary, Node, NodeInfo, NodeState, TopicMetadata};
    pub use crate::error::{PowerError, PowerResult, Result};
    pub use crate::nlog;
    pub use crate::scheduling::Scheduler;
}
