//! Communication primitives: in-process typed topics, request/reply
//! services, and arrival-rate measurement.

pub mod rate;
pub mod service;
pub mod topic;

pub use rate::RateMeter;
pub use service::{
    service_available, RequestId, ServiceClient, ServicePresence, ServiceServer,
};
pub use topic::Topic;
