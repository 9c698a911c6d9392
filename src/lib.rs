//! SensorLink firmware library.
//!
//! Exposes the link core and its adapters for integration testing.  All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; the host build runs the same core over
//! `std::net` and simulated peripherals.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod error;
pub mod sensors;
