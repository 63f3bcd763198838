//! ADC1 oneshot reader scaled to the configured resolution.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads the signal channel via the oneshot API (initialised by
//! hw_init) at 12 bits and shifts down to the configured width.
//! On host/test: reads from a static `AtomicU16` for injection, taken as
//! already at the configured width.

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

use crate::config::ADC_HW_BITS;

#[cfg(not(target_os = "espidf"))]
static SIM_SIGNAL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(target_os = "espidf"))]
pub fn sim_set_signal_adc(raw: u16) {
    SIM_SIGNAL_ADC.store(raw, Ordering::Relaxed);
}

pub struct AdcReader {
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    channel: u32,
    #[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
    shift: u8,
}

impl AdcReader {
    /// `resolution_bits` is clamped to the hardware width.
    pub fn new(channel: u32, resolution_bits: u8) -> Self {
        Self {
            channel,
            shift: ADC_HW_BITS.saturating_sub(resolution_bits),
        }
    }

    /// One reading at the configured width, or the driver's return code.
    #[cfg(target_os = "espidf")]
    pub fn read(&mut self) -> Result<u16, i32> {
        crate::drivers::hw_init::adc1_read(self.channel).map(|raw| raw >> self.shift)
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn read(&mut self) -> Result<u16, i32> {
        Ok(SIM_SIGNAL_ADC.load(Ordering::Relaxed))
    }
}
