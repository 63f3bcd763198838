//! Port traits: the boundary between the pipeline stages and the outside
//! world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Pipeline stage
//! ```
//!
//! Driven adapters (ADC, PWM, button flags, event sinks) implement these
//! traits.  Stages consume them via generics, so stage logic never touches
//! hardware directly and every stage runs against mocks on the host.

use std::sync::Arc;

use crate::error::{AcquisitionError, ActuationError};
use crate::events::Button;

use super::events::PipelineEvent;

// ───────────────────────────────────────────────────────────────
// Signal source (driven adapter: analog reader → acquisition stage)
// ───────────────────────────────────────────────────────────────

/// One raw reading per call, synchronous within the calling stage.
pub trait SignalSource {
    /// Raw reading, nominally in `0..=resolution_max`.  The caller clamps
    /// anything above that.
    fn sample(&mut self) -> Result<u16, AcquisitionError>;
}

// ───────────────────────────────────────────────────────────────
// Actuator sink (driven adapter: actuation stage → duty-cycle writer)
// ───────────────────────────────────────────────────────────────

pub trait ActuatorSink {
    /// Apply `fraction` (already clamped to `0.0..=1.0`).
    fn set_duty_cycle(&mut self, fraction: f32) -> Result<(), ActuationError>;
}

// ───────────────────────────────────────────────────────────────
// Input source (driven adapter: button ISRs → head / manual stage)
// ───────────────────────────────────────────────────────────────

/// Edge-triggered press events, one per physical control.
pub trait InputSource {
    /// `true` if `button` was pressed since the last call.  Consumes the
    /// event.
    fn take_press(&self, button: Button) -> bool;
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn take_press(&self, button: Button) -> bool {
        (**self).take_press(button)
    }
}

impl<T: InputSource + ?Sized> InputSource for Arc<T> {
    fn take_press(&self, button: Button) -> bool {
        (**self).take_press(button)
    }
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: stages → logging / telemetry)
// ───────────────────────────────────────────────────────────────

/// Stages report through this port from their own threads, so
/// implementations take `&self` and must be shareable.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &PipelineEvent);
}
