//! Battery model node.
//!
//! In-process stand-in for the external battery simulation: serves the
//! set-power-load service, integrates charge drain from the applied load,
//! and publishes the battery state. The load estimator works against this
//! node in demos and tests exactly as it would against a remote battery
//! simulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use powersim_core::core::nlog::set_node_context;
use powersim_core::prelude::*;
use powersim_library::messages::{BatteryState, ServiceAck, SetPowerLoadRequest};

use crate::config::BatteryModelConfig;

#[derive(Debug)]
struct BatteryCell {
    charge_wh: f64,
    capacity_wh: f64,
    power_load: f64,
}

pub struct BatteryModelNode {
    config: BatteryModelConfig,
    cell: Arc<Mutex<BatteryCell>>,
    state_pub: Topic<BatteryState>,

    // The service is answered from its own thread so a client blocking on
    // a call never depends on this node's tick cadence.
    server: Option<ServiceServer<SetPowerLoadRequest, ServiceAck>>,
    serve_thread: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,

    last_update: Instant,
}

impl BatteryModelNode {
    pub fn new(config: BatteryModelConfig) -> PowerResult<Self> {
        config.validate()?;

        let cell = Arc::new(Mutex::new(BatteryCell {
            charge_wh: config.capacity_wh * config.initial_charge,
            capacity_wh: config.capacity_wh,
            power_load: 0.0,
        }));

        Ok(Self {
            cell,
            state_pub: Topic::new(&config.battery_state_topic)?,
            server: Some(ServiceServer::new(&config.set_load_service)?),
            serve_thread: None,
            stop: Arc::new(AtomicBool::new(false)),
            last_update: Instant::now(),
            config,
        })
    }

    fn spawn_server(&mut self) -> PowerResult<()> {
        let server = self.server.take().ok_or_else(|| {
            PowerError::node("battery_model", "service server already consumed")
        })?;
        let cell = self.cell.clone();
        let stop = self.stop.clone();

        self.serve_thread = Some(std::thread::spawn(move || {
            set_node_context("battery_model", 0);
            while !stop.load(Ordering::SeqCst) {
                while let Some((id, request)) = server.try_recv() {
                    let accepted = request.load.is_finite() && request.load >= 0.0;
                    if accepted {
                        cell.lock().power_load = request.load;
                    } else {
                        nlog!(warn, "Rejected set-load request: {:?}", request.load);
                    }
                    let ack = if accepted {
                        ServiceAck::ok()
                    } else {
                        ServiceAck::rejected()
                    };
                    if let Err(e) = server.respond(id, ack) {
                        nlog!(error, "Failed to acknowledge set-load request: {}", e);
                    }
                }
                std::thread::sleep(Duration::from_millis(1));
            }
            // Dropping the server here deregisters the service
        }));
        Ok(())
    }
}

impl Node for BatteryModelNode {
    fn name(&self) -> &str {
        "battery_model"
    }

    fn init(&mut self) -> PowerResult<()> {
        self.spawn_server()?;
        self.last_update = Instant::now();
        nlog!(
            info,
            "Battery model up: {:.1}Wh capacity, serving '{}'",
            self.config.capacity_wh,
            self.config.set_load_service
        );
        Ok(())
    }

    fn tick(&mut self) {
        let dt_hours = self.last_update.elapsed().as_secs_f64() / 3600.0;
        self.last_update = Instant::now();

        let state = {
            let mut cell = self.cell.lock();
            cell.charge_wh = (cell.charge_wh - cell.power_load * dt_hours).max(0.0);
            BatteryState::new(cell.charge_wh, cell.capacity_wh, cell.power_load)
        };

        if state.is_depleted() {
            nlog!(warn, "Battery depleted");
        }
        if let Err(e) = self.state_pub.send(state) {
            nlog!(error, "Failed to publish battery state: {}", e);
        }
    }

    fn shutdown(&mut self) -> PowerResult<()> {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.serve_thread.take() {
            let _ = handle.join();
        }
        nlog!(info, "battery_model shut down");
        Ok(())
    }

    fn rate_hz(&self) -> Option<f64> {
        Some(self.config.model_frequency)
    }

    fn publishers(&self) -> Vec<TopicMetadata> {
        vec![self.state_pub.metadata()]
    }
}

impl Drop for BatteryModelNode {
    fn drop(&mut self) {
        // Stop the serve thread even if shutdown() was never called
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.serve_thread.take() {
            let _ = handle.join();
        }
    }
}
