//! FireWatch station firmware library.
//!
//! Exposes the pure-logic modules for integration testing. All
//! ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module.

#![deny(unused_must_use)]

pub mod alarm;
pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod pins;
pub mod sensors;
pub mod telemetry;
pub mod weather;

pub mod adapters;
pub mod drivers;
