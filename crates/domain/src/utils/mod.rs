//! Domain utilities

pub mod time_span;
