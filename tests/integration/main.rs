//! Integration test driver for `tests/integration/` submodule.
//!
//! Each `mod` below maps to a file that runs the full six-thread pipeline
//! against mock adapters.  All tests run on the host with no real hardware
//! required.

mod mock_hw;
mod pipeline_flow_tests;
mod supervisor_tests;
