//! Concrete adapters behind the port traits.

pub mod advisor_gate;
pub mod csv_adapter;
pub mod file_config_adapter;
