//! Pipeline controller firmware: main entry point.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                     │
//! │  AdcSignalSource   PwmActuator<LedcPwm>   LogEventSink       │
//! │  (SignalSource)    (ActuatorSink) ×2      (EventSink)        │
//! │  PRESS_FLAGS (InputSource, raised by 4 GPIO ISRs)            │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  Head ─▶ ManualAdjust ─▶ ManualOutput                        │
//! │      └─▶ Acquisition ─▶ Filter ─▶ AutoOutput                 │
//! │  (one thread each, chained by handoff semaphores)            │
//! └──────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::Result;
use log::{error, info};

use pipectl::adapters::hardware::{AdcSignalSource, PwmActuator};
use pipectl::adapters::log_sink::LogEventSink;
use pipectl::config::PipelineConfig;
use pipectl::drivers::adc::AdcReader;
use pipectl::drivers::hw_init;
use pipectl::drivers::pwm::LedcPwm;
use pipectl::drivers::watchdog::Watchdog;
use pipectl::error::{AcquisitionError, ActuationError};
use pipectl::events::PRESS_FLAGS;
use pipectl::pins;
use pipectl::supervisor::{Devices, PipelineSupervisor};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  PipeCtl v{}                         ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let config = PipelineConfig::default();
    info!("Config: {:?}", config);

    // ── 2. Bind peripherals (each independently) ──────────────
    let signal = hw_init::init_adc()
        .map(|()| {
            AdcSignalSource::new(AdcReader::new(
                pins::SIGNAL_ADC_CHANNEL,
                config.adc_resolution_bits,
            ))
        })
        .map_err(|e| {
            error!("ADC bind failed: {}", e);
            AcquisitionError::Unbound
        });

    if let Err(e) = hw_init::init_buttons() {
        // The pipeline still runs; no route is ever armed.
        error!("Button init failed: {}, continuing without input", e);
    }

    let pwm_ready = hw_init::init_ledc(config.pwm_frequency_hz).map_err(|e| {
        error!("PWM bind failed: {}", e);
        ActuationError::Unbound
    });
    // Both routes drive the same LED channel.
    let manual_out = pwm_ready.map(|()| PwmActuator::new(LedcPwm::new(pins::LED_LEDC_CHANNEL)));
    let auto_out = pwm_ready.map(|()| PwmActuator::new(LedcPwm::new(pins::LED_LEDC_CHANNEL)));

    // ── 3. Start the pipeline ─────────────────────────────────
    let supervisor = PipelineSupervisor::new(config, Arc::new(LogEventSink::new()));
    let running = supervisor.start(Devices {
        input: &PRESS_FLAGS,
        signal,
        manual_out,
        auto_out,
    })?;

    // ── 4. Supervise: telemetry + watchdog ────────────────────
    let interval = running.telemetry_interval();
    let watchdog = Watchdog::new(running.watchdog_timeout_ms());
    info!("System ready. Stages: {:?}", running.stages());

    loop {
        std::thread::sleep(interval);
        watchdog.feed();
        running.report_telemetry();
    }
}
