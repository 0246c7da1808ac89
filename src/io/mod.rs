//! Series ingestion from text formats.

pub mod reader;

pub use reader::{load_series, read_multi_record, read_simple, InputFormat};
