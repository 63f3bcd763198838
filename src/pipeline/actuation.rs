//! Output stages: turn the latest published value into a duty cycle.
//!
//! One generic stage serves both routes.  The manual route drives it with
//! a [`MixLevel`] (fraction of `level_total`), the automatic route with a
//! filtered reading (fraction of `resolution_max`).  A failed write is
//! reported and the cycle is skipped; the next release tries again with
//! whatever value is current by then.

use std::sync::Arc;

use crate::app::StageContext;
use crate::app::events::PipelineEvent;
use crate::app::ports::ActuatorSink;
use crate::sync::{BufferReader, HandoffSemaphore};

use super::manual::MixLevel;
use super::{Route, StageId};

/// A value that maps onto a duty cycle against some full scale.
pub trait DutySource: Copy + Send {
    /// Unclamped fraction of `full_scale`.
    fn duty_fraction(self, full_scale: u16) -> f32;
}

impl DutySource for MixLevel {
    fn duty_fraction(self, full_scale: u16) -> f32 {
        f32::from(self.level) / f32::from(full_scale.max(1))
    }
}

impl DutySource for u16 {
    fn duty_fraction(self, full_scale: u16) -> f32 {
        f32::from(self) / f32::from(full_scale.max(1))
    }
}

pub struct ActuationStage<A: ActuatorSink, T: DutySource> {
    route: Route,
    release: Arc<HandoffSemaphore>,
    input: BufferReader<T>,
    full_scale: u16,
    sink: A,
    ctx: StageContext,
}

impl<A: ActuatorSink, T: DutySource> ActuationStage<A, T> {
    pub fn new(
        route: Route,
        release: Arc<HandoffSemaphore>,
        input: BufferReader<T>,
        full_scale: u16,
        sink: A,
        ctx: StageContext,
    ) -> Self {
        Self {
            route,
            release,
            input,
            full_scale,
            sink,
            ctx,
        }
    }

    pub fn stage_id(&self) -> StageId {
        match self.route {
            Route::Manual => StageId::ManualOutput,
            Route::Automatic => StageId::AutoOutput,
        }
    }

    /// Apply the current value.  Returns the fraction written, or `None`
    /// if the actuator rejected it.
    pub fn cycle(&mut self) -> Option<f32> {
        let stage = self.stage_id();
        self.ctx.activated(stage);

        let fraction = self
            .input
            .read()
            .duty_fraction(self.full_scale)
            .clamp(0.0, 1.0);

        match self.sink.set_duty_cycle(fraction) {
            Ok(()) => {
                self.ctx.emit(&PipelineEvent::DutyApplied {
                    route: self.route,
                    fraction,
                });
                Some(fraction)
            }
            Err(e) => {
                self.ctx.fault(stage, e);
                None
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            self.release.wait().await;
            self.cycle();
        }
    }
}
