//! Core domain types and logic.

pub mod bar;
pub mod indicator;
pub mod signal;
pub mod gate;
pub mod engine;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
