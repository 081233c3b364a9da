//! Configuration: schema and JSON load/save.

pub mod loader;
pub mod schema;
