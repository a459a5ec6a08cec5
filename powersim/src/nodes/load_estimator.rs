//! Load estimator node.
//!
//! Estimates the robot's instantaneous power draw from motion telemetry
//! and pushes it to the battery model every tick:
//!
//! - folds odometry forward velocity and IMU forward acceleration into
//!   per-tick peak accumulators,
//! - measures the arrival rate of the command channel,
//! - combines the three signals linearly, scales by the externally
//!   settable consumption factor, clamps to the configured range,
//! - calls the battery model's set-load service (failures are logged and
//!   tolerated) and publishes the clamped value.

use std::time::Duration;

use powersim_core::prelude::*;
use powersim_library::messages::{
    CmdVel, ConsumptionFactorRequest, Imu, Odometry, PowerLoad, ServiceAck, SetPowerLoadRequest,
};

use crate::config::EstimatorConfig;
use crate::signals::SharedSignals;

pub struct LoadEstimatorNode {
    config: EstimatorConfig,
    signals: SharedSignals,
    rate_meter: RateMeter,

    odom_sub: Topic<Odometry>,
    imu_sub: Topic<Imu>,
    cmd_vel_sub: Topic<CmdVel>,
    load_pub: Topic<PowerLoad>,

    battery_client: ServiceClient<SetPowerLoadRequest, ServiceAck>,
    factor_server: ServiceServer<ConsumptionFactorRequest, ServiceAck>,

    /// Last value published, for health reporting
    power_load: f64,
}

impl LoadEstimatorNode {
    pub fn new(config: EstimatorConfig) -> PowerResult<Self> {
        config.validate()?;

        Ok(Self {
            signals: SharedSignals::new(),
            rate_meter: RateMeter::new(config.rate_window),
            odom_sub: Topic::new(&config.odom_topic)?,
            imu_sub: Topic::new(&config.imu_topic)?,
            cmd_vel_sub: Topic::new(&config.cmd_vel_topic)?,
            load_pub: Topic::new(&config.power_load_topic)?,
            battery_client: ServiceClient::new(&config.set_load_service)?,
            factor_server: ServiceServer::new(&config.consumption_service)?,
            power_load: 0.0,
            config,
        })
    }

    /// Handle pending consumption-factor requests.
    ///
    /// Negative factors are rejected with `success=false` and leave the
    /// state unchanged; anything non-negative (zero included) is stored.
    fn drain_factor_requests(&mut self) {
        while let Some((id, request)) = self.factor_server.try_recv() {
            let ack = match self.signals.set_factor(request.factor) {
                Ok(()) => {
                    nlog!(info, "Consumption factor set to {}", request.factor);
                    ServiceAck::ok()
                }
                Err(e) => {
                    nlog!(warn, "Rejected consumption factor request: {}", e);
                    ServiceAck::rejected()
                }
            };
            if let Err(e) = self.factor_server.respond(id, ack) {
                nlog!(error, "Failed to acknowledge factor request: {}", e);
            }
        }
    }

    /// Fold pending telemetry into the peak accumulators and rate meter.
    fn drain_telemetry(&mut self) {
        while let Some(odom) = self.odom_sub.recv() {
            self.signals.observe_velocity(odom.forward_velocity());
        }
        while let Some(imu) = self.imu_sub.recv() {
            self.signals.observe_acceleration(imu.forward_acceleration());
        }
        // Only arrival stamps matter on the command channel
        while let Some(cmd) = self.cmd_vel_sub.recv() {
            self.rate_meter.observe(cmd.stamp_nanos);
        }
    }

    /// Combine the tick inputs into the clamped load value.
    ///
    /// Taking the inputs resets both peaks for the next window.
    fn compute_load(&mut self) -> f64 {
        let inputs = self.signals.take_tick_inputs();
        let command_rate = self.rate_meter.rate_hz();

        let raw = inputs.velocity_peak * self.config.const_linear_vel
            + inputs.acceleration_peak * self.config.const_acceleration
            + command_rate * self.config.const_frequency
            + self.config.additional_consumption;

        (raw * inputs.factor).clamp(self.config.min_power_load, self.config.max_power_load)
    }

    /// Push the load to the battery model. Failure is logged, never
    /// propagated — the tick still publishes.
    fn push_to_battery(&self, load: f64) {
        let timeout = Duration::from_millis(self.config.service_call_timeout_ms);
        match self
            .battery_client
            .call(SetPowerLoadRequest { load }, timeout)
        {
            Ok(ack) if ack.success => {}
            Ok(_) => nlog!(error, "Battery model rejected load {:.3}", load),
            Err(e) => nlog!(error, "Set-load service call failed: {}", e),
        }
    }
}

impl Node for LoadEstimatorNode {
    fn name(&self) -> &str {
        "load_estimator"
    }

    fn init(&mut self) -> PowerResult<()> {
        nlog!(
            info,
            "Controller frequency: {} Hz, load range [{}, {}]",
            self.config.controller_frequency,
            self.config.min_power_load,
            self.config.max_power_load
        );

        nlog!(info, "Waiting for service '{}'...", self.config.set_load_service);
        let wait = if self.config.service_wait_timeout_s > 0.0 {
            Some(Duration::from_secs_f64(self.config.service_wait_timeout_s))
        } else {
            None
        };
        self.battery_client.wait_for_service(wait)?;

        nlog!(
            info,
            "Consumption factor service '{}' is now available",
            self.config.consumption_service
        );
        nlog!(info, "load_estimator initialization completed");
        Ok(())
    }

    fn tick(&mut self) {
        self.drain_factor_requests();
        self.drain_telemetry();

        let load = self.compute_load();
        self.power_load = load;

        self.push_to_battery(load);

        // Published exactly once per tick, regardless of the service call
        if let Err(e) = self.load_pub.send(PowerLoad::new(load)) {
            nlog!(error, "Failed to publish power load: {}", e);
        }
    }

    fn shutdown(&mut self) -> PowerResult<()> {
        nlog!(info, "load_estimator shutting down, last load {:.3}", self.power_load);
        Ok(())
    }

    fn rate_hz(&self) -> Option<f64> {
        Some(self.config.controller_frequency)
    }

    fn publishers(&self) -> Vec<TopicMetadata> {
        vec![self.load_pub.metadata()]
    }

    fn subscribers(&self) -> Vec<TopicMetadata> {
        vec![
            self.odom_sub.metadata(),
            self.imu_sub.metadata(),
            self.cmd_vel_sub.metadata(),
        ]
    }

    fn is_healthy(&self) -> bool {
        self.power_load.is_finite()
    }
}
