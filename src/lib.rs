#![allow(clippy::module_name_repetitions)]
#![warn(clippy::shadow_reuse, clippy::shadow_same, clippy::builtin_type_shadow)]
//! Control core of an autonomous aerial vehicle.
//!
//! A [`Controller`](flight_control::Controller) owns the vehicle state and the
//! flight phase of one vehicle and is the only way to change either. Operator
//! commands and sensor readings go through it, the safety policy gets the
//! first word on every reading, and each call answers with a full
//! [`Snapshot`](flight_control::Snapshot).
//!
//! The [`session`] module hosts controllers on tokio tasks so several
//! vehicles can run in parallel while each one stays strictly serialized.

pub mod config;
pub mod flight_control;
mod logger;
pub mod session;
