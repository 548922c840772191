//! Concrete adapter implementations for ports, plus table output.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod table_writer;
