//! db-builder: in-memory EPICS record database
//!
//! This crate provides the record and field model, the [`RecordBuilder`] trait used by
//! record generators, and a [`Database`] backend that stores created records and renders
//! them as `.db` text.

mod types;
pub use types::{FieldValue, Fields, Record, RecordType, Severity};

mod error;
pub use error::{BuildError, Result};

mod traits;
pub use traits::RecordBuilder;

mod database;
pub use database::{Database, MAX_NAME_LEN};
