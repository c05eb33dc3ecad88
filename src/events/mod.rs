//! Keyboard event ingestion: raw log records, timestamp parsing, merging

mod event;
mod ingest;
mod timestamp;

pub use event::{KeyEvent, KeyEventKind};
pub use ingest::{discover_logs, load_events, EventStream, IngestError, SourceError};
pub use timestamp::{parse_timestamp, RawTimestamp};
