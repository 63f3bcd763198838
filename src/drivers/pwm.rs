//! LEDC channel exposed as an `embedded_hal::pwm::SetDutyCycle`.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: writes the duty register via hw_init helpers.
//! On host/test: tracks the last duty in a per-channel atomic.

use embedded_hal::pwm::{ErrorKind, ErrorType, SetDutyCycle};

#[cfg(target_os = "espidf")]
use crate::drivers::hw_init;
use crate::pins;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

/// `ESP_ERR_INVALID_ARG`, reported for a channel the sim does not have.
#[cfg(not(target_os = "espidf"))]
const SIM_ERR_INVALID_ARG: i32 = 0x102;

#[cfg(not(target_os = "espidf"))]
static SIM_LEDC_DUTY: [AtomicU16; 8] = [const { AtomicU16::new(0) }; 8];

/// Last duty written to `channel` (host only).
#[cfg(not(target_os = "espidf"))]
pub fn sim_ledc_duty(channel: u32) -> u16 {
    SIM_LEDC_DUTY
        .get(channel as usize)
        .map_or(0, |d| d.load(Ordering::Relaxed))
}

/// Raw ESP-IDF return code from a failed duty update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedcError(pub i32);

impl embedded_hal::pwm::Error for LedcError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

pub struct LedcPwm {
    channel: u32,
    max_duty: u16,
}

impl LedcPwm {
    /// A channel already configured by `hw_init::init_ledc`.
    pub fn new(channel: u32) -> Self {
        Self {
            channel,
            max_duty: ((1u32 << pins::PWM_RESOLUTION_BITS) - 1) as u16,
        }
    }
}

impl ErrorType for LedcPwm {
    type Error = LedcError;
}

impl SetDutyCycle for LedcPwm {
    fn max_duty_cycle(&self) -> u16 {
        self.max_duty
    }

    #[cfg(target_os = "espidf")]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        hw_init::ledc_set(self.channel, u32::from(duty.min(self.max_duty))).map_err(LedcError)
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let slot = SIM_LEDC_DUTY
            .get(self.channel as usize)
            .ok_or(LedcError(SIM_ERR_INVALID_ARG))?;
        slot.store(duty.min(self.max_duty), Ordering::Relaxed);
        Ok(())
    }
}
