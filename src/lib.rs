//! Core library for the `marionette-ctl` CLI.
//!
//! This crate provides the building blocks behind the binary: the service
//! configuration tree and its store, optimistic behaviour changes with full
//! resync on failure, service discovery, metric aggregation for charts, and
//! A/B test orchestration against the Marionette control plane. The primary
//! user-facing interface is the `marionette-ctl` command-line application;
//! library APIs may evolve as the CLI grows.
pub mod backend;
pub mod config;
pub mod discovery;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod orchestrator;
pub mod schedule;
pub mod session;
pub mod store;
pub mod sync;

mod app;
mod args;
mod entry;
mod system;

#[cfg(feature = "fuzzing")]
pub mod fuzzing;

/// Parse the command line, load configuration, and run one command.
///
/// # Errors
///
/// Returns an error when configuration is invalid or the command fails.
pub fn run() -> error::AppResult<()> {
    entry::run()
}
