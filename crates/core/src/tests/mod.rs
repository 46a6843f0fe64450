//! Test doubles shared with downstream crates

pub mod navigation;

pub use navigation::RecordingNavigator;
