//! Pipeline controller firmware library.
//!
//! Six semaphore-chained stages behind port traits, plus the adapters and
//! drivers that bind them to ESP32-S3 peripherals.  All ESP-IDF-specific
//! code is guarded by `#[cfg(target_os = "espidf")]` within each module, so
//! the whole pipeline runs and is tested on the host.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod supervisor;
pub mod sync;

pub mod adapters;
pub mod drivers;
pub mod pins;

mod esp_link_shims;
