//! I/O utilities for file processing and data handling.
//!
//! Content batches are recorded and replayed as NDJSON files.

pub mod ndjson;

pub use ndjson::{append_ndjson_entry, parse_ndjson_file, write_ndjson_file, TimestampedEntry};
