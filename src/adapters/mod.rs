//! Adapters: concrete implementations of the stage port traits.
//!
//! | Adapter    | Implements     | Connects to            |
//! |------------|----------------|------------------------|
//! | `hardware` | SignalSource   | ESP32 ADC1 oneshot     |
//! |            | ActuatorSink   | any `SetDutyCycle` PWM |
//! | `log_sink` | EventSink      | Serial log output      |
//!
//! `InputSource` is implemented directly by
//! [`EdgeFlags`](crate::events::EdgeFlags).

pub mod hardware;
pub mod log_sink;
