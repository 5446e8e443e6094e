//! HTTP surface of the Cadence scheduling service.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway_handler;
