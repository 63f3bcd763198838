//! Pipeline head: periodic route selection.
//!
//! ## Transition rule
//!
//! | Pending event  | Resulting state   |
//! |----------------|-------------------|
//! | `ManualSelect` | `ManualSelected`  |
//! | `AutoSelect`   | `AutoSelected`    |
//! | both           | `AutoSelected` (applied in that order) |
//! | none           | unchanged         |
//!
//! The armed route's handoff is signalled, then the state returns to
//! `Idle` unless `route_latch` is set.
//!
//! ## Periodicity
//!
//! The next deadline is always the previous deadline plus the period, so
//! execution jitter never accumulates as drift.  An overrun runs the next
//! activation immediately without a catch-up burst.

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::app::StageContext;
use crate::app::events::PipelineEvent;
use crate::app::ports::InputSource;
use crate::events::Button;
use crate::sync::HandoffSemaphore;

use super::{Route, StageId};

/// Route selection held between the two select buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Idle,
    ManualSelected,
    AutoSelected,
}

impl RouteState {
    pub fn route(self) -> Option<Route> {
        match self {
            Self::Idle => None,
            Self::ManualSelected => Some(Route::Manual),
            Self::AutoSelected => Some(Route::Automatic),
        }
    }
}

/// Drift-free deadline owned by a periodically released stage.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicRelease {
    next: Instant,
    period: Duration,
}

impl PeriodicRelease {
    /// First deadline is one period after `start`.
    pub fn starting_at(start: Instant, period: Duration) -> Self {
        Self {
            next: start + period,
            period,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.next
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Return the current deadline and move to the one after it.
    pub fn advance(&mut self) -> Instant {
        let due = self.next;
        self.next = due + self.period;
        due
    }
}

pub struct HeadStage<I: InputSource> {
    input: I,
    manual_release: Arc<HandoffSemaphore>,
    auto_release: Arc<HandoffSemaphore>,
    state: RouteState,
    latch: bool,
    ctx: StageContext,
}

impl<I: InputSource> HeadStage<I> {
    pub fn new(
        input: I,
        manual_release: Arc<HandoffSemaphore>,
        auto_release: Arc<HandoffSemaphore>,
        latch: bool,
        ctx: StageContext,
    ) -> Self {
        Self {
            input,
            manual_release,
            auto_release,
            state: RouteState::Idle,
            latch,
            ctx,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    /// One activation: poll the select buttons, apply the transition rule,
    /// release the armed route.  Returns the route released, if any.
    pub fn activate(&mut self) -> Option<Route> {
        self.ctx.activated(StageId::Head);

        if self.input.take_press(Button::ManualSelect) {
            self.state = RouteState::ManualSelected;
        }
        if self.input.take_press(Button::AutoSelect) {
            self.state = RouteState::AutoSelected;
        }

        let armed = self.state.route();
        match armed {
            Some(Route::Manual) => self.manual_release.signal(),
            Some(Route::Automatic) => self.auto_release.signal(),
            None => {}
        }
        if let Some(route) = armed {
            self.ctx.emit(&PipelineEvent::RouteArmed(route));
        }

        if !self.latch {
            self.state = RouteState::Idle;
        }
        armed
    }
}

impl<I: InputSource + Send + 'static> HeadStage<I> {
    /// Stage loop: activate, then sleep until the next deadline.
    pub async fn run(mut self, mut release: PeriodicRelease) {
        debug!("{}: period {:?}", StageId::Head.name(), release.period());
        loop {
            self.activate();

            let due = release.advance();
            let now = Instant::now();
            if now > due {
                warn!(
                    "{}: overrun by {:?}, releasing immediately",
                    StageId::Head.name(),
                    now - due
                );
            }
            async_io_mini::Timer::after(due.saturating_duration_since(now)).await;
        }
    }
}
