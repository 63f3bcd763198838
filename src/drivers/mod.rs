//! Peripheral drivers, hardware initialisation, and thread helpers.

pub mod adc;
pub mod hw_init;
pub mod pwm;
pub mod task_pin;
pub mod watchdog;
