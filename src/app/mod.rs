//! Application boundary: port traits, outbound events and the shared
//! reporting context every stage carries.
//!
//! All interaction with hardware happens through the traits in [`ports`],
//! keeping the stages fully testable without real peripherals.

pub mod events;
pub mod ports;
pub mod stats;

pub use stats::{PipelineStats, StageContext};
