//! Command-line front end of oncomatch.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod types;
