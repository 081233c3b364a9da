//! Model invocation: wire formats, HTTP transport, quality judging.

pub mod format;
pub mod invoker;
pub mod judge;
