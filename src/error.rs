//! Unified error types for the pipeline firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! supervisor's startup reporting uniform.  All variants are `Copy` so they
//! can travel inside [`PipelineEvent`](crate::app::events::PipelineEvent)s
//! without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The analog reader is unbound or a read failed.
    Acquisition(AcquisitionError),
    /// The duty-cycle writer is unbound or a write failed.
    Actuation(ActuationError),
    /// No sample survived outlier rejection.
    DegenerateFilter(DegenerateFilterError),
    /// Peripheral or thread bring-up failed.
    Init(&'static str),
    /// Configuration failed validation.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Acquisition(e) => write!(f, "acquisition: {e}"),
            Self::Actuation(e) => write!(f, "actuation: {e}"),
            Self::DegenerateFilter(e) => write!(f, "filter: {e}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Acquisition errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionError {
    /// The ADC was never bound (bring-up failed or not attempted).
    Unbound,
    /// The platform read call returned a non-zero code.
    ReadFailed(i32),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "ADC unbound"),
            Self::ReadFailed(rc) => write!(f, "ADC read failed (rc={rc})"),
        }
    }
}

impl From<AcquisitionError> for Error {
    fn from(e: AcquisitionError) -> Self {
        Self::Acquisition(e)
    }
}

// ---------------------------------------------------------------------------
// Actuation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActuationError {
    /// The PWM output was never bound.
    Unbound,
    /// PWM duty-cycle write failed.
    WriteFailed,
}

impl fmt::Display for ActuationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unbound => write!(f, "PWM unbound"),
            Self::WriteFailed => write!(f, "PWM write failed"),
        }
    }
}

impl From<ActuationError> for Error {
    fn from(e: ActuationError) -> Self {
        Self::Actuation(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Outlier rejection left nothing to average.  `mean` is the centre of the
/// band that rejected every sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegenerateFilterError {
    pub mean: u32,
    pub window: usize,
}

impl fmt::Display for DegenerateFilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no sample of {} within band around mean {}",
            self.window, self.mean
        )
    }
}

impl From<DegenerateFilterError> for Error {
    fn from(e: DegenerateFilterError) -> Self {
        Self::DegenerateFilter(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
