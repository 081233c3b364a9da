//! modelbench library — exposes internal modules for the modelbench binary.

pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod errors;
pub mod providers;
pub mod record;
pub mod suite;
