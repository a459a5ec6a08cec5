//! Cooperative fixed-rate scheduler.
//!
//! Owns a set of nodes, initializes them in priority order, then sweeps
//! them in a single-threaded loop. Each node ticks when its own rate says
//! it is due (nodes without a declared rate tick every sweep). A panicking
//! tick is caught and recorded; the node keeps its slot and is retried on
//! the next due tick.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::Colorize;

use crate::core::{clear_node_context, set_node_context, Node, NodeInfo, NodeState};
use crate::error::PowerResult;

struct RegisteredNode {
    node: Box<dyn Node>,
    priority: u32,
    initialized: bool,
    info: NodeInfo,
    rate_hz: Option<f64>,
    last_tick: Option<Instant>,
}

/// Single-threaded cooperative node scheduler.
pub struct Scheduler {
    scheduler_name: String,
    nodes: Vec<RegisteredNode>,
    running: Arc<AtomicBool>,
    /// Sleep between sweeps so an all-rated schedule doesn't spin.
    idle_sleep: Duration,
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            scheduler_name: "powersim".to_string(),
            nodes: Vec::new(),
            running: Arc::new(AtomicBool::new(false)),
            idle_sleep: Duration::from_micros(500),
        }
    }

    /// Set the scheduler name (chainable)
    pub fn name(mut self, name: &str) -> Self {
        self.scheduler_name = name.to_string();
        self
    }

    pub fn scheduler_name(&self) -> &str {
        &self.scheduler_name
    }

    /// Register a node. Lower priority values tick first within a sweep.
    /// The node's own `rate_hz()` (if any) becomes its tick rate.
    pub fn add<N: Node + 'static>(&mut self, node: N, priority: u32) -> &mut Self {
        let node_name = node.name().to_string();
        let rate_hz = node.rate_hz();

        self.nodes.push(RegisteredNode {
            node: Box::new(node),
            priority,
            initialized: false,
            info: NodeInfo::new(node_name.clone()),
            rate_hz,
            last_tick: None,
        });

        match rate_hz {
            Some(rate) => println!(
                "Added node '{}' with priority {} at {:.1}Hz",
                node_name.bold(),
                priority,
                rate
            ),
            None => println!(
                "Added node '{}' with priority {}",
                node_name.bold(),
                priority
            ),
        }
        self
    }

    /// Override a node's tick rate (chainable).
    pub fn set_node_rate(&mut self, name: &str, rate_hz: f64) -> &mut Self {
        for registered in self.nodes.iter_mut() {
            if registered.info.name() == name {
                registered.rate_hz = Some(rate_hz);
                registered.last_tick = None;
                break;
            }
        }
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Stop the scheduler from any thread (takes effect next sweep).
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Handle that can stop this scheduler from another thread.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }

    /// Main loop with signal handling; runs until stopped.
    pub fn run(&mut self) -> PowerResult<()> {
        self.run_with_limit(None)
    }

    /// Run all nodes for a bounded duration, then shut down gracefully.
    pub fn run_for(&mut self, duration: Duration) -> PowerResult<()> {
        self.run_with_limit(Some(duration))
    }

    fn run_with_limit(&mut self, duration: Option<Duration>) -> PowerResult<()> {
        self.running.store(true, Ordering::SeqCst);
        let start_time = Instant::now();

        // Ctrl+C flips the running flag; a second scheduler in the same
        // process cannot re-register the handler, which is fine.
        let running = self.running.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            eprintln!("\nCtrl+C received, shutting down scheduler...");
            running.store(false, Ordering::SeqCst);
        }) {
            println!("{} {}", "Warning: signal handler not installed:".yellow(), e);
        }

        self.nodes.sort_by_key(|r| r.priority);
        self.initialize_nodes();

        while self.is_running() {
            if let Some(max_duration) = duration {
                if start_time.elapsed() >= max_duration {
                    break;
                }
            }
            self.sweep();
            std::thread::sleep(self.idle_sleep);
        }

        self.shutdown_nodes();
        Ok(())
    }

    fn initialize_nodes(&mut self) {
        for registered in self.nodes.iter_mut() {
            if registered.initialized {
                continue;
            }
            let node_name = registered.info.name().to_string();
            registered.info.set_state(NodeState::Initializing);

            set_node_context(&node_name, 0);
            let init_result = registered.node.init();
            clear_node_context();

            match init_result {
                Ok(()) => {
                    registered.initialized = true;
                    registered.info.set_state(NodeState::Running);
                    println!("Initialized node '{}'", node_name.bold());
                }
                Err(e) => {
                    println!(
                        "{} '{}': {}",
                        "Failed to initialize node".red(),
                        node_name,
                        e
                    );
                    registered
                        .info
                        .transition_to_error(format!("Initialization failed: {}", e));
                }
            }
        }
    }

    fn sweep(&mut self) {
        let now = Instant::now();
        for registered in self.nodes.iter_mut() {
            if !registered.initialized {
                continue;
            }

            let due = match registered.rate_hz {
                Some(rate_hz) => match registered.last_tick {
                    Some(last_tick) => {
                        (now - last_tick).as_secs_f64() >= 1.0 / rate_hz
                    }
                    None => true,
                },
                None => true,
            };
            if !due {
                continue;
            }
            if registered.rate_hz.is_some() {
                registered.last_tick = Some(Instant::now());
            }

            let node_name = registered.info.name().to_string();
            let tick_number = registered.info.metrics().total_ticks;

            registered.info.start_tick();
            set_node_context(&node_name, tick_number);
            let result = panic::catch_unwind(AssertUnwindSafe(|| {
                registered.node.tick();
            }));
            clear_node_context();

            match result {
                Ok(()) => registered.info.record_tick(),
                Err(_) => registered
                    .info
                    .record_tick_failure(format!("Node '{}' panicked during tick", node_name)),
            }
        }
    }

    fn shutdown_nodes(&mut self) {
        for registered in self.nodes.iter_mut() {
            if !registered.initialized {
                continue;
            }
            let node_name = registered.info.name().to_string();
            registered.info.set_state(NodeState::Stopping);

            set_node_context(&node_name, registered.info.metrics().total_ticks);
            let shutdown_result = registered.node.shutdown();
            clear_node_context();

            if let Err(e) = shutdown_result {
                println!("{} '{}': {}", "Failed to shut down node".red(), node_name, e);
            }
            registered.info.set_state(NodeState::Stopped);

            let metrics = registered.info.metrics();
            println!(
                "Node '{}' stopped after {} ticks ({} failed, avg {:.2}ms)",
                node_name.bold(),
                metrics.total_ticks,
                metrics.failed_ticks,
                metrics.avg_tick_duration_ms
            );
        }
    }

    /// Metrics snapshot for a node, by name.
    pub fn node_metrics(&self, name: &str) -> Option<crate::core::NodeMetrics> {
        self.nodes
            .iter()
            .find(|r| r.info.name() == name)
            .map(|r| r.info.metrics().clone())
    }

    /// Current lifecycle state for a node, by name.
    pub fn node_state(&self, name: &str) -> Option<NodeState> {
        self.nodes
            .iter()
            .find(|r| r.info.name() == name)
            .map(|r| r.info.state().clone())
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
