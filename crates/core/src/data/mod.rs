//! Raw data payloads

pub mod payload;

pub use payload::decode_f64_payload;
