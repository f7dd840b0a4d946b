//! Core library for the `resttest` CLI.
//!
//! `resttest` stresses a single HTTP endpoint with successive batches of
//! concurrent requests. Batch sizes grow along a linear (`lin[a,b]`) or
//! exponential (`exp[a,b]`) function, each request's time to first byte is
//! measured without the time spent on name resolution, and every completed
//! batch is summarized until the run's deadline passes or it is interrupted.
//!
//! The engine lives in [`stress`]; [`http`] provides the `reqwest` transport
//! and [`charts`] the PNG report.
mod adapters;
mod app;
pub mod args;
pub mod charts;
pub mod config;
mod entry;
pub mod error;
#[cfg(feature = "fuzzing")]
pub mod fuzzing;
pub mod http;
pub mod shutdown;
mod shutdown_handlers;
pub mod stress;
mod system;

pub use entry::run;
