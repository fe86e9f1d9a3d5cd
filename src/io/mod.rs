//! Input/output helpers.
//!
//! - plate TSV ingest + validation (`ingest`)
//! - TSV report writers (`export`)
//! - JSON run summary (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
