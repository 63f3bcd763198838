//! The six pipeline stages and their shared identifiers.
//!
//! ```text
//!              ┌─manual─▶ ManualAdjust ─mix─▶ ManualOutput
//! Head (T) ────┤
//!              └─auto───▶ Acquisition ─window─▶ Filter ─value─▶ AutoOutput
//! ```
//!
//! Every stage except [`head`] is purely reactive: its `run()` loop waits on
//! one [`HandoffSemaphore`](crate::sync::HandoffSemaphore) and then calls
//! `cycle()`.  `cycle()` holds all of the stage's logic and is what the
//! tests drive directly.

pub mod acquisition;
pub mod actuation;
pub mod filter;
pub mod head;
pub mod manual;

pub use acquisition::{AcquisitionStage, SAMPLE_WINDOW, SampleWindow};
pub use actuation::{ActuationStage, DutySource};
pub use filter::{FilterOutcome, FilterStage, filter_window};
pub use head::{HeadStage, PeriodicRelease, RouteState};
pub use manual::{ManualStage, MixLevel};

/// One of the two mutually exclusive data-flow paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Manual,
    Automatic,
}

/// Stage identity, used for thread names, counters and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StageId {
    Head = 0,
    ManualAdjust = 1,
    ManualOutput = 2,
    Acquisition = 3,
    Filter = 4,
    AutoOutput = 5,
}

impl StageId {
    pub const COUNT: usize = 6;

    pub const ALL: [StageId; Self::COUNT] = [
        Self::Head,
        Self::ManualAdjust,
        Self::ManualOutput,
        Self::Acquisition,
        Self::Filter,
        Self::AutoOutput,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::ManualAdjust => "manual-adjust",
            Self::ManualOutput => "manual-out",
            Self::Acquisition => "acquire",
            Self::Filter => "filter",
            Self::AutoOutput => "auto-out",
        }
    }

    /// NUL-terminated name for `esp_pthread_set_cfg`.
    pub fn thread_name(self) -> &'static str {
        match self {
            Self::Head => "head\0",
            Self::ManualAdjust => "manual-adjust\0",
            Self::ManualOutput => "manual-out\0",
            Self::Acquisition => "acquire\0",
            Self::Filter => "filter\0",
            Self::AutoOutput => "auto-out\0",
        }
    }
}
