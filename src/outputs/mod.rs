//! Output generation for file-based snapshot consumers.
//!
//! One canonical writer with a single configurable shape adapter: the
//! snapshot either serializes its events as a plain list or as a map keyed
//! by event id. Both carry the same run metadata (`generated_at`, `status`).
//!
//! ```text
//! output_dir/
//! └── latest.json    # fully replaced on every successful run
//! ```

pub mod json;

use clap::ValueEnum;

/// Shape of the serialized `events` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputShape {
    /// `events` is an ordered array of event records.
    List,
    /// `events` is a map of event id to record.
    Keyed,
}
