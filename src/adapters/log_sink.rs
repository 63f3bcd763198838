//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing pipeline events to the ESP-IDF
//! logger (UART / USB-CDC in production).  Per-period chatter goes out at
//! `debug`, faults at `warn`/`error`, lifecycle and telemetry at `info`.

use log::{debug, error, info, warn};

use crate::app::events::PipelineEvent;
use crate::app::ports::EventSink;
use crate::pipeline::StageId;

/// Adapter that logs every [`PipelineEvent`] to the serial console.
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Started { stages } => {
                info!("START | {} stage threads running", stages);
            }
            PipelineEvent::RouteArmed(route) => {
                debug!("ROUTE | {:?}", route);
            }
            PipelineEvent::LevelAdjusted { level, complement } => {
                debug!("MIX | level={} complement={}", level, complement);
            }
            PipelineEvent::SampleOutOfRange { index, raw } => {
                warn!("ACQ | sample {} out of range (raw={}), stored 0", index, raw);
            }
            PipelineEvent::WindowAcquired { min, max } => {
                debug!("ACQ | window min={} max={}", min, max);
            }
            PipelineEvent::Filtered { value, accepted } => {
                debug!("FILTER | value={} accepted={}", value, accepted);
            }
            PipelineEvent::DutyApplied { route, fraction } => {
                debug!("DUTY | {:?} {:.1}%", route, fraction * 100.0);
            }
            PipelineEvent::StageFault { stage, error } => {
                warn!("FAULT | {}: {}", stage.name(), error);
            }
            PipelineEvent::StageDisabled { stage, error } => {
                error!("FAULT | {} disabled: {}", stage.name(), error);
            }
            PipelineEvent::Telemetry(t) => {
                info!(
                    "TELEM | head={} man={}/{} acq={} filt={} auto={} | faults acq={} filt={} out={}",
                    t.activations_of(StageId::Head),
                    t.activations_of(StageId::ManualAdjust),
                    t.activations_of(StageId::ManualOutput),
                    t.activations_of(StageId::Acquisition),
                    t.activations_of(StageId::Filter),
                    t.activations_of(StageId::AutoOutput),
                    t.faults_of(StageId::Acquisition),
                    t.faults_of(StageId::Filter),
                    t.faults_of(StageId::ManualOutput) + t.faults_of(StageId::AutoOutput),
                );
            }
        }
    }
}
