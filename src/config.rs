//! Pipeline configuration parameters
//!
//! All tunable parameters for the control pipeline.  The supervisor refuses
//! to start unless [`PipelineConfig::validate`] passes.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hardware ADC width on the ESP32-S3 (SAR ADC1, oneshot mode).
pub const ADC_HW_BITS: u8 = 12;

/// How the filter stage separates outliers from the acquisition window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutlierPolicy {
    /// Drop the sample farthest from the mean until every survivor lies in
    /// the band around the survivors' own mean.
    Trimmed,
    /// One band around the mean of the whole window.
    SinglePass,
    /// `v < upper || v > lower` with strict bounds, as shipped on the
    /// first hardware revision.
    LiteralOr,
}

/// Core pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    // --- Head stage ---
    /// Head stage release period (milliseconds)
    pub head_period_ms: u32,
    /// Keep the selected route armed across activations
    pub route_latch: bool,

    // --- Acquisition ---
    /// Effective sampling resolution (bits)
    pub adc_resolution_bits: u8,

    // --- Manual mix ---
    /// Step applied per increase/decrease event
    pub level_step: u8,
    /// level + complement
    pub level_total: u8,
    /// Manual level at startup
    pub initial_level: u8,

    // --- Filter ---
    /// Half-width of the acceptance band, percent of the mean
    pub band_percent: u8,
    pub outlier_policy: OutlierPolicy,

    // --- Output ---
    /// LEDC output frequency (Hz)
    pub pwm_frequency_hz: u32,

    // --- Threads ---
    /// Scheduler priority shared by every stage
    pub stage_priority: u8,
    /// Stack per stage thread (KiB)
    pub stage_stack_kb: usize,

    // --- Telemetry ---
    /// Telemetry report interval (seconds)
    pub telemetry_interval_secs: u32,
}

/// Upper bound on the telemetry period; the main loop's watchdog timeout is
/// derived from it.
pub const MAX_TELEMETRY_INTERVAL_SECS: u32 = 3600;

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            // Head
            head_period_ms: 100, // 10 Hz
            route_latch: false,

            // Acquisition
            adc_resolution_bits: 10,

            // Manual mix
            level_step: 5,
            level_total: 100,
            initial_level: 0,

            // Filter
            band_percent: 10,
            outlier_policy: OutlierPolicy::Trimmed,

            // Output
            pwm_frequency_hz: 1_000, // 1 ms period

            // Threads
            stage_priority: 1,
            stage_stack_kb: 4,

            // Telemetry
            telemetry_interval_secs: 10,
        }
    }
}

impl PipelineConfig {
    /// Largest reading the acquisition stage accepts; anything above is
    /// coerced to the sentinel.
    pub fn resolution_max(&self) -> u16 {
        ((1u32 << self.adc_resolution_bits) - 1) as u16
    }

    /// Reject values that would break a stage invariant.
    pub fn validate(&self) -> Result<()> {
        if self.head_period_ms == 0 {
            return Err(Error::Config("head_period_ms must be non-zero"));
        }
        if self.adc_resolution_bits == 0 || self.adc_resolution_bits > ADC_HW_BITS {
            return Err(Error::Config("adc_resolution_bits must be 1..=12"));
        }
        if self.level_step == 0 {
            return Err(Error::Config("level_step must be non-zero"));
        }
        if self.level_step > self.level_total {
            return Err(Error::Config("level_step exceeds level_total"));
        }
        if self.initial_level > self.level_total {
            return Err(Error::Config("initial_level exceeds level_total"));
        }
        if self.band_percent > 100 {
            return Err(Error::Config("band_percent must be 0..=100"));
        }
        if self.pwm_frequency_hz == 0 {
            return Err(Error::Config("pwm_frequency_hz must be non-zero"));
        }
        if self.stage_stack_kb == 0 {
            return Err(Error::Config("stage_stack_kb must be non-zero"));
        }
        if self.telemetry_interval_secs == 0
            || self.telemetry_interval_secs > MAX_TELEMETRY_INTERVAL_SECS
        {
            return Err(Error::Config("telemetry_interval_secs must be 1..=3600"));
        }
        Ok(())
    }
}
