//! Hardware adapters: bridge the peripheral drivers to the stage port
//! traits.
//!
//! These are the only types that touch actual hardware.  On non-espidf
//! targets the underlying drivers use cfg-gated simulation stubs.

use embedded_hal::pwm::SetDutyCycle;
use log::trace;

use crate::app::ports::{ActuatorSink, SignalSource};
use crate::drivers::adc::AdcReader;
use crate::error::{AcquisitionError, ActuationError};

// ── SignalSource implementation ───────────────────────────────

pub struct AdcSignalSource {
    adc: AdcReader,
}

impl AdcSignalSource {
    pub fn new(adc: AdcReader) -> Self {
        Self { adc }
    }
}

impl SignalSource for AdcSignalSource {
    fn sample(&mut self) -> Result<u16, AcquisitionError> {
        self.adc.read().map_err(AcquisitionError::ReadFailed)
    }
}

// ── ActuatorSink implementation ───────────────────────────────

/// Any `embedded-hal` PWM channel as a duty-cycle sink.
pub struct PwmActuator<P: SetDutyCycle> {
    pwm: P,
}

impl<P: SetDutyCycle> PwmActuator<P> {
    pub fn new(pwm: P) -> Self {
        Self { pwm }
    }
}

impl<P: SetDutyCycle> ActuatorSink for PwmActuator<P> {
    fn set_duty_cycle(&mut self, fraction: f32) -> Result<(), ActuationError> {
        let max = self.pwm.max_duty_cycle();
        let duty = (fraction.clamp(0.0, 1.0) * f32::from(max)).round() as u16;
        trace!("pwm: {:.3} -> {}/{}", fraction, duty, max);
        self.pwm
            .set_duty_cycle(duty)
            .map_err(|_| ActuationError::WriteFailed)
    }
}
