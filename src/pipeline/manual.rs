//! Manual route: step a level/complement mix with the two adjust buttons.
//!
//! `level + complement` is constant (`level_total`).  A decrease is applied
//! only while `level >= step`; an increase only while
//! `level <= total - step`, so the level never leaves `0..=total` however
//! long the burst of presses.  Both buttons are consumed on every release
//! whether or not their step was applied.

use std::sync::Arc;

use crate::app::StageContext;
use crate::app::events::PipelineEvent;
use crate::app::ports::InputSource;
use crate::events::Button;
use crate::sync::{BufferWriter, HandoffSemaphore};

use super::StageId;

/// Mix between two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MixLevel {
    pub level: u8,
    pub complement: u8,
}

impl MixLevel {
    /// `level` is clamped to `total`.
    pub fn new(level: u8, total: u8) -> Self {
        let level = level.min(total);
        Self {
            level,
            complement: total - level,
        }
    }

    pub fn total(self) -> u8 {
        self.level + self.complement
    }

    /// One step down, floor-guarded.  Returns whether the step applied.
    pub fn decrease(&mut self, step: u8) -> bool {
        if self.level < step {
            return false;
        }
        self.level -= step;
        self.complement += step;
        true
    }

    /// One step up, ceiling-guarded.  Returns whether the step applied.
    pub fn increase(&mut self, step: u8) -> bool {
        if self.complement < step {
            return false;
        }
        self.level += step;
        self.complement -= step;
        true
    }
}

pub struct ManualStage<I: InputSource> {
    input: I,
    release: Arc<HandoffSemaphore>,
    out: BufferWriter<MixLevel>,
    downstream: Arc<HandoffSemaphore>,
    mix: MixLevel,
    step: u8,
    ctx: StageContext,
}

impl<I: InputSource> ManualStage<I> {
    pub fn new(
        input: I,
        release: Arc<HandoffSemaphore>,
        mut out: BufferWriter<MixLevel>,
        downstream: Arc<HandoffSemaphore>,
        initial: MixLevel,
        step: u8,
        ctx: StageContext,
    ) -> Self {
        out.write(initial);
        Self {
            input,
            release,
            out,
            downstream,
            mix: initial,
            step,
            ctx,
        }
    }

    pub fn mix(&self) -> MixLevel {
        self.mix
    }

    /// Apply pending adjust presses, publish the mix, release the output
    /// stage.
    pub fn cycle(&mut self) -> MixLevel {
        self.ctx.activated(StageId::ManualAdjust);

        if self.input.take_press(Button::Decrease) {
            self.mix.decrease(self.step);
        }
        if self.input.take_press(Button::Increase) {
            self.mix.increase(self.step);
        }

        self.out.write(self.mix);
        self.ctx.emit(&PipelineEvent::LevelAdjusted {
            level: self.mix.level,
            complement: self.mix.complement,
        });
        self.downstream.signal();
        self.mix
    }

    pub async fn run(mut self) {
        loop {
            self.release.wait().await;
            self.cycle();
        }
    }
}
