//! Monte Carlo baseball game simulator producing a joint (away, home) final-score histogram.

pub mod cli;
pub mod config;
pub mod error;
pub mod export_csv;
pub mod ffi;
pub mod game;
pub mod histogram;
pub mod logging;
pub mod parallel;
pub mod server;
pub mod simulation;
pub mod slate;
pub mod statsapi;

pub use error::{Result, SimError};
