//! barmatrix: column-oriented technical analysis over OHLCV bars.
//!
//! Hexagonal architecture: the column engine, indicators and swing detector
//! live in [`domain`], port traits in [`ports`], file I/O in [`adapters`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod cli;
