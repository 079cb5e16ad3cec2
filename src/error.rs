use std::io;
use thiserror::Error;

/// Type Alias: A rebranding of the `Result` enum from the standard library which focuses on errors
/// that may result from running a translation simulation.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the simulation can surface. None of them are retried; each one terminates the
/// run it occurs in.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to open address source '{path}': {source}")]
    InputSourceUnavailable { path: String, source: io::Error },

    #[error("unable to open backing store '{path}': {source}")]
    BackingStoreUnavailable { path: String, source: io::Error },

    #[error("unable to seek to page {page_number} in the backing store: {source}")]
    BackingStoreSeekFailed { page_number: u32, source: io::Error },

    #[error("short read while loading page {page_number} from the backing store: {source}")]
    BackingStoreReadShort { page_number: u32, source: io::Error },

    #[error("unable to open validation source '{path}': {source}")]
    ValidationSourceUnavailable { path: String, source: io::Error },

    #[error("malformed validation entry on line {line_number}: '{line}'")]
    MalformedValidation { line_number: u64, line: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed reading input: {0}")]
    Input(#[source] io::Error),

    #[error("failed writing output: {0}")]
    Output(#[source] io::Error),
}
