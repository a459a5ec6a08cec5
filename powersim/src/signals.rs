//! Shared telemetry state between the sample handlers and the tick.
//!
//! Sample folds and the per-tick take-and-reset must be mutually
//! exclusive; one mutex guards the two peak accumulators and the
//! consumption factor together.

use std::sync::Arc;

use parking_lot::Mutex;
use powersim_core::error::{PowerError, PowerResult};

/// Max accumulator reset each tick.
///
/// Only positive-going updates are accepted, so the peak is always
/// non-negative regardless of input sign.
#[derive(Debug, Default)]
pub struct PeakMeter {
    peak: f64,
}

impl PeakMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one sample into the running maximum.
    pub fn observe(&mut self, value: f64) {
        if value > self.peak {
            self.peak = value;
        }
    }

    /// Current peak without resetting.
    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Return the peak and zero it for the next window.
    pub fn take_and_reset(&mut self) -> f64 {
        std::mem::take(&mut self.peak)
    }
}

/// Inputs the tick consumes, captured in one locked read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickInputs {
    pub velocity_peak: f64,
    pub acceleration_peak: f64,
    pub factor: f64,
}

#[derive(Debug, Default)]
struct SignalsInner {
    velocity: PeakMeter,
    acceleration: PeakMeter,
    consumption_factor: f64,
}

/// Clonable handle onto the estimator's lock-guarded signal state.
#[derive(Clone)]
pub struct SharedSignals {
    inner: Arc<Mutex<SignalsInner>>,
}

impl SharedSignals {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SignalsInner {
                velocity: PeakMeter::new(),
                acceleration: PeakMeter::new(),
                consumption_factor: 1.0,
            })),
        }
    }

    /// Fold a forward-velocity sample into the velocity peak.
    pub fn observe_velocity(&self, value: f64) {
        self.inner.lock().velocity.observe(value);
    }

    /// Fold a forward-acceleration sample into the acceleration peak.
    pub fn observe_acceleration(&self, value: f64) {
        self.inner.lock().acceleration.observe(value);
    }

    /// Set the consumption factor. Negative or non-finite values are
    /// rejected and leave the state unchanged.
    pub fn set_factor(&self, factor: f64) -> PowerResult<()> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(PowerError::invalid_input(format!(
                "consumption factor must be a non-negative real, got {}",
                factor
            )));
        }
        self.inner.lock().consumption_factor = factor;
        Ok(())
    }

    pub fn factor(&self) -> f64 {
        self.inner.lock().consumption_factor
    }

    /// Take both peaks (resetting them) and read the factor, atomically
    /// with respect to concurrent sample folds.
    pub fn take_tick_inputs(&self) -> TickInputs {
        let mut inner = self.inner.lock();
        TickInputs {
            velocity_peak: inner.velocity.take_and_reset(),
            acceleration_peak: inner.acceleration.take_and_reset(),
            factor: inner.consumption_factor,
        }
    }
}

impl Default for SharedSignals {
    fn default() -> Self {
        Self::new()
    }
}
