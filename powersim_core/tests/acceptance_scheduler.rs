//! Acceptance tests for the cooperative scheduler

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use powersim_core::core::{Node, NodeState};
use powersim_core::error::{PowerError, PowerResult};
use powersim_core::scheduling::Scheduler;

struct CountingNode {
    name: String,
    ticks: Arc<AtomicU64>,
    rate: Option<f64>,
    shutdown_called: Arc<AtomicBool>,
}

impl CountingNode {
    fn new(name: &str, rate: Option<f64>) -> (Self, Arc<AtomicU64>, Arc<AtomicBool>) {
        let ticks = Arc::new(AtomicU64::new(0));
        let shutdown_called = Arc::new(AtomicBool::new(false));
        (
            Self {
                name: name.to_string(),
                ticks: ticks.clone(),
                rate,
                shutdown_called: shutdown_called.clone(),
            },
            ticks,
            shutdown_called,
        )
    }
}

impl Node for CountingNode {
    fn name(&self) -> &str {
        &self.name
    }

    fn tick(&mut self) {
        self.ticks.fetch_add(1, Ordering::SeqCst);
    }

    fn shutdown(&mut self) -> PowerResult<()> {
        self.shutdown_called.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn rate_hz(&self) -> Option<f64> {
        self.rate
    }
}

struct FailingInitNode;

impl Node for FailingInitNode {
    fn name(&self) -> &str {
        "failing_init"
    }

    fn init(&mut self) -> PowerResult<()> {
        Err(PowerError::node("failing_init", "refusing to start"))
    }

    fn tick(&mut self) {
        panic!("tick must never run after failed init");
    }
}

struct PanickingNode {
    attempts: Arc<AtomicU64>,
}

impl Node for PanickingNode {
    fn name(&self) -> &str {
        "panicking"
    }

    fn tick(&mut self) {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        panic!("deliberate test panic");
    }
}

#[test]
fn test_scenario_1_rated_node_ticks_near_rate() {
    // Scenario 1: Rate control
    // Given: A node declaring 50Hz
    // When: The scheduler runs for 500ms
    // Then: The node ticks roughly 25 times

    let (node, ticks, _) = CountingNode::new("rated_50hz", Some(50.0));
    let mut scheduler = Scheduler::new().name("test_rate");
    scheduler.add(node, 0);
    scheduler.run_for(Duration::from_millis(500)).unwrap();

    let count = ticks.load(Ordering::SeqCst);
    assert!(
        (10..=40).contains(&count),
        "Expected roughly 25 ticks at 50Hz over 500ms, got {}",
        count
    );
}

#[test]
fn test_scenario_2_failed_init_excludes_node() {
    // Scenario 2: Initialization failure
    // Given: A node whose init() fails and a healthy peer
    // When: The scheduler runs
    // Then: The failed node never ticks, is marked Errored, and the
    //       healthy node still runs

    let (healthy, ticks, _) = CountingNode::new("healthy_peer", Some(100.0));
    let mut scheduler = Scheduler::new().name("test_init_fail");
    scheduler.add(FailingInitNode, 0);
    scheduler.add(healthy, 1);
    scheduler.run_for(Duration::from_millis(100)).unwrap();

    assert!(ticks.load(Ordering::SeqCst) > 0, "Healthy node should tick");
    assert!(matches!(
        scheduler.node_state("failing_init"),
        Some(NodeState::Error(_))
    ));
}

#[test]
fn test_scenario_3_panicking_tick_is_contained() {
    // Scenario 3: Panic containment
    // Given: A node that panics every tick and a healthy peer
    // When: The scheduler runs
    // Then: Panics are recorded as failed ticks and the peer is unaffected

    let attempts = Arc::new(AtomicU64::new(0));
    let (healthy, healthy_ticks, _) = CountingNode::new("survivor", Some(100.0));

    let mut scheduler = Scheduler::new().name("test_panic");
    scheduler.add(
        PanickingNode {
            attempts: attempts.clone(),
        },
        0,
    );
    scheduler.set_node_rate("panicking", 100.0);
    scheduler.add(healthy, 1);
    scheduler.run_for(Duration::from_millis(100)).unwrap();

    assert!(attempts.load(Ordering::SeqCst) > 0);
    assert!(healthy_ticks.load(Ordering::SeqCst) > 0);

    let metrics = scheduler.node_metrics("panicking").unwrap();
    assert_eq!(metrics.total_ticks, metrics.failed_ticks);
    assert!(metrics.failed_ticks > 0);
}

#[test]
fn test_scenario_4_shutdown_runs_on_exit() {
    // Scenario 4: Graceful shutdown
    // Given: A running node
    // When: The bounded run ends
    // Then: The node's shutdown() has been invoked and it is Stopped

    let (node, _, shutdown_called) = CountingNode::new("graceful", Some(20.0));
    let mut scheduler = Scheduler::new().name("test_shutdown");
    scheduler.add(node, 0);
    scheduler.run_for(Duration::from_millis(100)).unwrap();

    assert!(shutdown_called.load(Ordering::SeqCst));
    assert_eq!(
        scheduler.node_state("graceful"),
        Some(NodeState::Stopped)
    );
}

#[test]
fn test_scenario_5_stop_flag_halts_run() {
    // Scenario 5: External stop
    // Given: A scheduler running without a duration bound
    // When: Another thread flips the stop flag
    // Then: run() returns

    let (node, _, _) = CountingNode::new("stoppable", Some(20.0));
    let mut scheduler = Scheduler::new().name("test_stop");
    scheduler.add(node, 0);

    let flag = scheduler.stop_flag();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(100));
        flag.store(false, Ordering::SeqCst);
    });

    scheduler.run().unwrap();
    stopper.join().unwrap();
}
