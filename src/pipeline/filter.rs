//! Automatic route, second stage: outlier rejection and averaging.
//!
//! The acceptance band is `mean ± band_percent% of mean` in integer
//! arithmetic, bounds inclusive.  `LiteralOr` instead truncates
//! `mean ± mean·pct/100` toward zero, so any non-zero mean has a lower
//! bound strictly below it.
//! [`OutlierPolicy`] picks how the band is applied:
//!
//! | Policy       | Band centre                         | Test                    |
//! |--------------|-------------------------------------|-------------------------|
//! | `Trimmed`    | mean of the current survivors       | inside, farthest first  |
//! | `SinglePass` | mean of the whole window            | inside                  |
//! | `LiteralOr`  | mean of the whole window            | `v < upper \|\| v > lower` |
//!
//! `Trimmed` drops one sample at a time (the one farthest from the current
//! mean) until every survivor is inside its own band, so a single far
//! outlier cannot drag the band away from the cluster.  Zero survivors is a
//! [`DegenerateFilterError`]: the stage keeps its previous value and does
//! not release the output stage.

use std::sync::Arc;

use crate::app::StageContext;
use crate::app::events::PipelineEvent;
use crate::config::OutlierPolicy;
use crate::error::DegenerateFilterError;
use crate::sync::{BufferReader, BufferWriter, HandoffSemaphore};

use super::StageId;
use super::acquisition::{SAMPLE_WINDOW, SampleWindow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterOutcome {
    pub value: u16,
    /// Divisor of the final average.
    pub accepted: usize,
}

#[derive(Debug, Clone, Copy)]
struct Band {
    lower: u32,
    upper: u32,
}

impl Band {
    fn around(mean: u32, percent: u8) -> Self {
        let tol = mean * u32::from(percent) / 100;
        Self {
            lower: mean - tol,
            upper: mean + tol,
        }
    }

    /// Bounds of the fractional band truncated to integers.
    fn truncated(mean: u32, percent: u8) -> Self {
        let scaled = mean * u32::from(percent);
        Self {
            lower: mean - scaled.div_ceil(100),
            upper: mean + scaled / 100,
        }
    }

    fn contains(self, v: u32) -> bool {
        (self.lower..=self.upper).contains(&v)
    }

    fn literal_or(self, v: u32) -> bool {
        v < self.upper || v > self.lower
    }
}

fn mean(samples: &[u16]) -> u32 {
    let sum: u32 = samples.iter().map(|&v| u32::from(v)).sum();
    sum / samples.len().max(1) as u32
}

fn average_where(
    samples: &[u16],
    mean: u32,
    keep: impl Fn(u32) -> bool,
) -> Result<FilterOutcome, DegenerateFilterError> {
    let (sum, accepted) = samples
        .iter()
        .map(|&v| u32::from(v))
        .filter(|&v| keep(v))
        .fold((0u32, 0usize), |(s, c), v| (s + v, c + 1));

    if accepted == 0 {
        return Err(DegenerateFilterError {
            mean,
            window: samples.len(),
        });
    }
    Ok(FilterOutcome {
        value: (sum / accepted as u32) as u16,
        accepted,
    })
}

fn trimmed(window: &SampleWindow, percent: u8) -> Result<FilterOutcome, DegenerateFilterError> {
    let mut survivors: heapless::Vec<u16, SAMPLE_WINDOW> = window.iter().copied().collect();

    loop {
        let m = mean(&survivors);
        let band = Band::around(m, percent);

        let farthest_outside = survivors
            .iter()
            .enumerate()
            .filter(|&(_, &v)| !band.contains(u32::from(v)))
            .max_by_key(|&(_, &v)| u32::from(v).abs_diff(m))
            .map(|(i, _)| i);

        match farthest_outside {
            Some(i) => {
                survivors.swap_remove(i);
            }
            None => return average_where(&survivors, m, |_| true),
        }
    }
}

/// Reduce one acquisition window to a single filtered value.
pub fn filter_window(
    window: &SampleWindow,
    band_percent: u8,
    policy: OutlierPolicy,
) -> Result<FilterOutcome, DegenerateFilterError> {
    match policy {
        OutlierPolicy::Trimmed => trimmed(window, band_percent),
        OutlierPolicy::SinglePass => {
            let m = mean(window);
            let band = Band::around(m, band_percent);
            average_where(window, m, |v| band.contains(v))
        }
        OutlierPolicy::LiteralOr => {
            let m = mean(window);
            let band = Band::truncated(m, band_percent);
            average_where(window, m, |v| band.literal_or(v))
        }
    }
}

pub struct FilterStage {
    release: Arc<HandoffSemaphore>,
    input: BufferReader<SampleWindow>,
    out: BufferWriter<u16>,
    downstream: Arc<HandoffSemaphore>,
    band_percent: u8,
    policy: OutlierPolicy,
    ctx: StageContext,
}

impl FilterStage {
    pub fn new(
        release: Arc<HandoffSemaphore>,
        input: BufferReader<SampleWindow>,
        out: BufferWriter<u16>,
        downstream: Arc<HandoffSemaphore>,
        band_percent: u8,
        policy: OutlierPolicy,
        ctx: StageContext,
    ) -> Self {
        Self {
            release,
            input,
            out,
            downstream,
            band_percent,
            policy,
            ctx,
        }
    }

    /// Filter the current window.  `None` when the window was degenerate;
    /// the output buffer then still holds the last good value.
    pub fn cycle(&mut self) -> Option<FilterOutcome> {
        self.ctx.activated(StageId::Filter);

        let window = self.input.read();
        match filter_window(&window, self.band_percent, self.policy) {
            Ok(outcome) => {
                self.out.write(outcome.value);
                self.ctx.emit(&PipelineEvent::Filtered {
                    value: outcome.value,
                    accepted: outcome.accepted,
                });
                self.downstream.signal();
                Some(outcome)
            }
            Err(e) => {
                self.ctx.fault(StageId::Filter, e);
                None
            }
        }
    }

    /// Value held in the output buffer.
    pub fn last_value(&self) -> u16 {
        self.out.last()
    }

    pub async fn run(mut self) {
        loop {
            self.release.wait().await;
            self.cycle();
        }
    }
}
