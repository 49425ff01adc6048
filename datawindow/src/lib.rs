//! The request/response model and synchronous query machinery for incremental data loading.
//!
//! For the async side (single-flight incremental loading, debounced grid fetches), see the
//! `datawindow-loader` crate.
//!
//! A UI surface asks for "the next window of items" as an [`ItemsRequest`]: a start offset, an
//! optional count, an ordered list of [`SortKey`]s and a cancellation token. A data source
//! answers with an [`ItemsResult`]: the items of that window plus the size of the whole result.
//!
//! This crate provides:
//! - [`codec`]: the compact `[Path,Direction]` text encoding of sort keys
//! - [`ItemsRequest::bind`]: binding a request from query-string parameters
//! - [`FieldTable`]: per-record-type accessors for (dotted) property paths, and
//!   [`FieldTable::apply`], which sorts and windows any record collection
//! - [`PaginationState`]: page-oriented bookkeeping over the same window model
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod binder;
pub mod codec;
mod error;
mod fields;
mod pagination;
mod query;
mod types;

#[cfg(test)]
mod tests;

pub use binder::{COUNT_PARAM, SORT_PARAM, START_INDEX_PARAM};
pub use error::{BindError, QueryError};
pub use fields::{FieldAccessor, FieldTable, SortValue};
pub use pagination::PaginationState;
pub use query::{SortPlan, Windowed};
pub use types::{ItemsRequest, ItemsResult, SortDirection, SortKey};

pub use tokio_util::sync::CancellationToken;
