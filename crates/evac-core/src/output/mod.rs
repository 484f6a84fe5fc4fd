//! Output Generation
//!
//! World snapshots for renderers and the JSONL stream they are written to.

pub mod snapshot;

pub use snapshot::*;
