use thiserror::Error;

/// Failure to bind an [`crate::ItemsRequest`] from query-string style parameters.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BindError {
    #[error("missing required parameter `startIndex`")]
    MissingStartIndex,

    #[error("`startIndex` is not a valid non-negative integer: {0:?}")]
    InvalidStartIndex(String),
}

/// A query that cannot run against a record type.
///
/// These indicate a programming error (a sort path that the record's field table does not
/// know), so they are reported before any record is touched instead of being dropped.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown sort field `{path}`")]
    UnknownField { path: String },
}
