use thiserror::Error;

pub type Result<T, E = BuildError> = core::result::Result<T, E>;

#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("duplicate record name: {0}")]
    DuplicateRecord(String),
    #[error("invalid record name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
    #[error("record {record}: invalid field name {field:?}")]
    InvalidField { record: String, field: String },
}
