//! End-to-end run: battery model and load estimator under the scheduler,
//! with synthetic odometry streaming in from a side thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use powersim_core::communication::Topic;
use powersim_core::scheduling::Scheduler;
use powersim::config::{BatteryModelConfig, EstimatorConfig};
use powersim::nodes::{BatteryModelNode, LoadEstimatorNode};
use powersim_library::messages::{BatteryState, Odometry, PowerLoad};

#[test]
fn test_full_pipeline_under_scheduler() {
    let prefix = "pipeline";
    let estimator_config = EstimatorConfig {
        odom_topic: format!("{}/odom", prefix),
        imu_topic: format!("{}/imu", prefix),
        cmd_vel_topic: format!("{}/cmd_vel", prefix),
        power_load_topic: format!("{}/power_load", prefix),
        set_load_service: format!("{}/set_power_load", prefix),
        consumption_service: format!("{}/increase_power_consumption", prefix),
        ..EstimatorConfig::default()
    };
    let battery_config = BatteryModelConfig {
        set_load_service: format!("{}/set_power_load", prefix),
        battery_state_topic: format!("{}/battery_state", prefix),
        model_frequency: 5.0,
        ..BatteryModelConfig::default()
    };

    let min_load = estimator_config.min_power_load;
    let max_load = estimator_config.max_power_load;

    let load_out: Topic<PowerLoad> = Topic::new(&estimator_config.power_load_topic).unwrap();
    let battery_out: Topic<BatteryState> =
        Topic::new(&battery_config.battery_state_topic).unwrap();

    // Synthetic odometry at 20Hz while the scheduler runs
    let odom: Topic<Odometry> = Topic::new(&estimator_config.odom_topic).unwrap();
    let feeding = Arc::new(AtomicBool::new(true));
    let feeder_flag = feeding.clone();
    let feeder = std::thread::spawn(move || {
        while feeder_flag.load(Ordering::SeqCst) {
            odom.send(Odometry::with_forward_velocity(1.0)).unwrap();
            std::thread::sleep(Duration::from_millis(50));
        }
    });

    let mut scheduler = Scheduler::new().name("pipeline_test");
    scheduler.add(BatteryModelNode::new(battery_config).unwrap(), 10);
    scheduler.add(LoadEstimatorNode::new(estimator_config).unwrap(), 50);
    scheduler.run_for(Duration::from_millis(1500)).unwrap();

    feeding.store(false, Ordering::SeqCst);
    feeder.join().unwrap();

    // The estimator published every tick, always within the clamp range,
    // and with steady 1 m/s telemetry the steady-state value is 1.3
    let mut loads = Vec::new();
    while let Some(msg) = load_out.recv() {
        loads.push(msg.watts);
    }
    assert!(
        loads.len() >= 3,
        "expected several ticks over 1.5s at 5Hz, got {}",
        loads.len()
    );
    for load in &loads {
        assert!((min_load..=max_load).contains(load), "load {} out of range", load);
    }
    assert!(loads.iter().any(|l| (l - 1.3).abs() < 1e-9));

    // The battery model saw the pushed load and published its state
    let mut states = Vec::new();
    while let Some(state) = battery_out.recv() {
        states.push(state);
    }
    assert!(!states.is_empty(), "battery model must publish state");
    let last = states.last().unwrap();
    assert!(last.charge_wh <= last.capacity_wh);
    assert!(states.iter().any(|s| s.power_load > 0.0));
}
