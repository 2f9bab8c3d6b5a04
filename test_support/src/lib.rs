//! Test utilities for hwforge.
//!
//! [`RecordingExecutor`] stands in for the real tool runner in integration
//! tests, and [`fake_tool`] writes executable stubs for tests that drive the
//! binary.

mod exec;
mod recording;

pub use exec::{fake_tool, make_executable, utf8_tempdir};
pub use recording::RecordingExecutor;
