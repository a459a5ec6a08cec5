//! Core node abstractions: the `Node` trait, per-node bookkeeping, and the
//! `nlog!()` logging context.

pub mod nlog;
pub mod node;

pub use nlog::{clear_node_context, current_node_name, set_node_context, LogLevel};
pub use node::{LogSummary, Node, NodeInfo, NodeMetrics, NodeState, TopicMetadata};
