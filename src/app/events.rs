//! Outbound pipeline events.
//!
//! Stages emit these through the [`EventSink`](super::ports::EventSink)
//! port.  Adapters on the other side decide what to do with them (log to
//! serial, count them in a test).

use crate::error::Error;
use crate::pipeline::{Route, StageId};

/// Structured events emitted by the pipeline stages and supervisor.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// The supervisor spawned its stage threads.
    Started { stages: usize },

    /// The head stage released a route for this period.
    RouteArmed(Route),

    /// The manual stage wrote a new mix.
    LevelAdjusted { level: u8, complement: u8 },

    /// A reading above `resolution_max` was replaced by the sentinel.
    SampleOutOfRange { index: usize, raw: u16 },

    /// The acquisition stage published a full window.
    WindowAcquired { min: u16, max: u16 },

    /// The filter stage published a value.
    Filtered { value: u16, accepted: usize },

    /// An output stage applied a duty cycle.
    DutyApplied { route: Route, fraction: f32 },

    /// A stage skipped this cycle's output.
    StageFault { stage: StageId, error: Error },

    /// A stage was not started because its device failed to bind.
    StageDisabled { stage: StageId, error: Error },

    /// Periodic counters snapshot.
    Telemetry(TelemetryData),
}

/// Per-stage activation and fault counters, indexed by `StageId as usize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryData {
    pub activations: [u32; StageId::COUNT],
    pub faults: [u32; StageId::COUNT],
}

impl TelemetryData {
    pub fn activations_of(&self, stage: StageId) -> u32 {
        self.activations[stage as usize]
    }

    pub fn faults_of(&self, stage: StageId) -> u32 {
        self.faults[stage as usize]
    }
}
