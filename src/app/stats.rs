//! Lock-free stage counters and the reporting handle each stage carries.

use core::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::error::Error;
use crate::pipeline::StageId;

use super::events::{PipelineEvent, TelemetryData};
use super::ports::EventSink;

/// Activation and fault counters, one slot per stage.  Each slot is only
/// incremented by its own stage thread; the supervisor reads snapshots.
#[derive(Default)]
pub struct PipelineStats {
    activations: [AtomicU32; StageId::COUNT],
    faults: [AtomicU32; StageId::COUNT],
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_activation(&self, stage: StageId) {
        self.activations[stage as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fault(&self, stage: StageId) {
        self.faults[stage as usize].fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TelemetryData {
        let mut t = TelemetryData::default();
        for i in 0..StageId::COUNT {
            t.activations[i] = self.activations[i].load(Ordering::Relaxed);
            t.faults[i] = self.faults[i].load(Ordering::Relaxed);
        }
        t
    }
}

/// Event sink + counters, cloned into every stage at startup.
#[derive(Clone)]
pub struct StageContext {
    sink: Arc<dyn EventSink>,
    stats: Arc<PipelineStats>,
}

impl StageContext {
    pub fn new(sink: Arc<dyn EventSink>, stats: Arc<PipelineStats>) -> Self {
        Self { sink, stats }
    }

    pub fn emit(&self, event: &PipelineEvent) {
        self.sink.emit(event);
    }

    pub fn activated(&self, stage: StageId) {
        self.stats.record_activation(stage);
    }

    /// Count and report a per-cycle fault.  The caller then skips the rest
    /// of its cycle.  Logging is left to the sink.
    pub fn fault(&self, stage: StageId, error: impl Into<Error>) {
        let error = error.into();
        self.stats.record_fault(stage);
        self.sink.emit(&PipelineEvent::StageFault { stage, error });
    }

    pub fn stats(&self) -> &Arc<PipelineStats> {
        &self.stats
    }
}
