//! Column engine, indicators and swing detection.

pub mod column;
pub mod config;
pub mod error;
pub mod indicator;
pub mod matrix;
pub mod ohlcv;
pub mod registry;
pub mod row;
pub mod swing;
pub mod window;
