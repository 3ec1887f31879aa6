//! Types shared across the volusage workspace.

pub mod errors;

pub use errors::{VolusageError, VolusageResult};
