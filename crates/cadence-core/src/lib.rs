//! Shared configuration, error and constant definitions for the Cadence workspace.

pub mod config;
pub mod constants;
pub mod error;
