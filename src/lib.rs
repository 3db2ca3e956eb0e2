//! Live flight telemetry relay library crate.
//!
//! # Purpose
//! Exposes the relay's API surface, channel registry, configuration, and
//! planning-API proxy for use by the binary and tests.
//!
//! # Notes
//! The registry is the core of the system; everything else is request/
//! response glue around it.
pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod observability;
pub mod planning;
pub mod registry;
