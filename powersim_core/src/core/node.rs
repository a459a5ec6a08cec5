use std::fmt;
use std::time::{Duration, Instant};

/// Trait for providing lightweight logging summaries of message types.
///
/// Small types can defer to Debug formatting; larger ones should only
/// include metadata.
pub trait LogSummary {
    /// Return a compact string representation suitable for logging
    fn log_summary(&self) -> String;
}

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    Running,
    Stopping,
    Stopped,
    Error(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Error(msg) => write!(f, "Error: {}", msg),
        }
    }
}

/// Performance metrics for node execution
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_ticks: u64,
    pub failed_ticks: u64,
    pub avg_tick_duration_ms: f64,
    pub max_tick_duration_ms: f64,
    pub last_tick_duration_ms: f64,
    pub errors_count: u64,
    pub uptime_seconds: f64,
}

/// Per-node bookkeeping owned by the scheduler: lifecycle state plus
/// tick timing metrics.
pub struct NodeInfo {
    name: String,
    state: NodeState,
    metrics: NodeMetrics,
    creation_time: Instant,
    tick_start_time: Option<Instant>,
}

impl NodeInfo {
    pub fn new(node_name: String) -> Self {
        Self {
            name: node_name,
            state: NodeState::Uninitialized,
            metrics: NodeMetrics::default(),
            creation_time: Instant::now(),
            tick_start_time: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            self.state = new_state;
        }
    }

    pub fn transition_to_error(&mut self, error_msg: String) {
        crate::nlog!(error, "{}", error_msg);
        self.metrics.errors_count += 1;
        self.set_state(NodeState::Error(error_msg));
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn uptime(&self) -> Duration {
        self.creation_time.elapsed()
    }

    pub fn start_tick(&mut self) {
        self.tick_start_time = Some(Instant::now());
    }

    /// Record a completed tick and fold its duration into the metrics.
    pub fn record_tick(&mut self) {
        if let Some(start_time) = self.tick_start_time.take() {
            let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

            self.metrics.total_ticks += 1;
            self.metrics.last_tick_duration_ms = duration_ms;
            if duration_ms > self.metrics.max_tick_duration_ms {
                self.metrics.max_tick_duration_ms = duration_ms;
            }

            let ticks = self.metrics.total_ticks as f64;
            self.metrics.avg_tick_duration_ms =
                (self.metrics.avg_tick_duration_ms * (ticks - 1.0) + duration_ms) / ticks;

            self.metrics.uptime_seconds = self.creation_time.elapsed().as_secs_f64();
        }
    }

    pub fn record_tick_failure(&mut self, error_msg: String) {
        self.metrics.total_ticks += 1;
        self.metrics.failed_ticks += 1;
        self.metrics.errors_count += 1;
        self.tick_start_time = None;
        crate::nlog!(error, "{}", error_msg);
    }
}

/// Topic metadata for monitoring and introspection
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TopicMetadata {
    pub topic_name: String,
    pub type_name: String,
}

/// Trait for powersim nodes with full lifecycle support.
///
/// Use the `nlog!()` macro for logging within any lifecycle method; the
/// scheduler sets the node context before each call.
pub trait Node: Send {
    /// Get the node's name (must be unique within a scheduler).
    ///
    /// Defaults to the struct's type name (e.g. `LoadEstimatorNode`).
    fn name(&self) -> &str {
        let full = std::any::type_name::<Self>();
        match full.rfind("::") {
            Some(pos) => &full[pos + 2..],
            None => full,
        }
    }

    /// Initialize the node (called once at startup).
    fn init(&mut self) -> crate::error::PowerResult<()> {
        Ok(())
    }

    /// Main execution loop (called repeatedly)
    fn tick(&mut self);

    /// Shutdown the node (called once at cleanup).
    fn shutdown(&mut self) -> crate::error::PowerResult<()> {
        Ok(())
    }

    /// Get list of publishers (topic metadata).
    ///
    /// Override this if your node publishes to any topics; the default
    /// returns empty, which may hide connectivity issues during debugging.
    fn publishers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    /// Get list of subscribers (topic metadata).
    fn subscribers(&self) -> Vec<TopicMetadata> {
        Vec::new()
    }

    /// Node's tick rate in Hz (optional).
    ///
    /// Returns `None` by default, meaning use the scheduler's sweep rate.
    /// Can be overridden at runtime via `Scheduler::set_node_rate()`.
    fn rate_hz(&self) -> Option<f64> {
        None
    }

    /// Health check (optional override)
    fn is_healthy(&self) -> bool {
        true
    }
}

// LogSummary implementations for primitive types
impl LogSummary for f32 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for f64 {
    fn log_summary(&self) -> String {
        format!("{:.3}", self)
    }
}

impl LogSummary for i32 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for i64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for u32 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for u64 {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for usize {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for bool {
    fn log_summary(&self) -> String {
        self.to_string()
    }
}

impl LogSummary for String {
    fn log_summary(&self) -> String {
        self.clone()
    }
}

impl<T: fmt::Debug> LogSummary for Vec<T> {
    fn log_summary(&self) -> String {
        format!("Vec[{} items]", self.len())
    }
}
