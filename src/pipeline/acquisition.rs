//! Automatic route, first stage: a fixed burst of `SAMPLE_WINDOW` readings.
//!
//! The whole window is published at once, so the filter never sees a
//! partial burst.  Readings above `resolution_max` are coerced to
//! [`OUT_OF_RANGE_SENTINEL`].  A failed read abandons the burst: the
//! previous window stays in the buffer and the filter is not released.

use std::sync::Arc;

use log::debug;

use crate::app::StageContext;
use crate::app::events::PipelineEvent;
use crate::app::ports::SignalSource;
use crate::sync::{BufferWriter, HandoffSemaphore};

use super::StageId;

/// Readings per burst.
pub const SAMPLE_WINDOW: usize = 10;

/// Stored in place of a reading above `resolution_max`.
pub const OUT_OF_RANGE_SENTINEL: u16 = 0;

pub type SampleWindow = [u16; SAMPLE_WINDOW];

pub struct AcquisitionStage<S: SignalSource> {
    source: S,
    release: Arc<HandoffSemaphore>,
    out: BufferWriter<SampleWindow>,
    downstream: Arc<HandoffSemaphore>,
    resolution_max: u16,
    ctx: StageContext,
}

impl<S: SignalSource> AcquisitionStage<S> {
    pub fn new(
        source: S,
        release: Arc<HandoffSemaphore>,
        out: BufferWriter<SampleWindow>,
        downstream: Arc<HandoffSemaphore>,
        resolution_max: u16,
        ctx: StageContext,
    ) -> Self {
        Self {
            source,
            release,
            out,
            downstream,
            resolution_max,
            ctx,
        }
    }

    /// Take one burst.  Returns the published window, or `None` if a read
    /// failed and nothing was published.
    pub fn cycle(&mut self) -> Option<SampleWindow> {
        self.ctx.activated(StageId::Acquisition);

        let mut window = [OUT_OF_RANGE_SENTINEL; SAMPLE_WINDOW];
        for (index, slot) in window.iter_mut().enumerate() {
            let raw = match self.source.sample() {
                Ok(raw) => raw,
                Err(e) => {
                    self.ctx.fault(StageId::Acquisition, e);
                    return None;
                }
            };
            *slot = if raw > self.resolution_max {
                self.ctx
                    .emit(&PipelineEvent::SampleOutOfRange { index, raw });
                OUT_OF_RANGE_SENTINEL
            } else {
                raw
            };
        }

        debug!("{}: {:?}", StageId::Acquisition.name(), window);
        self.out.write(window);
        self.ctx.emit(&PipelineEvent::WindowAcquired {
            min: window.iter().copied().min().unwrap_or(0),
            max: window.iter().copied().max().unwrap_or(0),
        });
        self.downstream.signal();
        Some(window)
    }

    pub async fn run(mut self) {
        loop {
            self.release.wait().await;
            self.cycle();
        }
    }
}
