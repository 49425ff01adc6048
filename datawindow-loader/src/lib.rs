//! Async loading utilities for the `datawindow` crate.
//!
//! The `datawindow` crate holds the request/response model and the synchronous query
//! machinery. This crate drives an [`ItemsProvider`] (the host application's fetch capability)
//! on behalf of a UI surface:
//!
//! - [`IncrementalLoader`]: a single-flight, append-only buffer for infinite/incremental lists
//! - [`DebounceGateway`]: an adaptive-delay front for grids that request arbitrary row slices
//! - [`memory_provider`]: a provider over an in-memory collection
//!
//! Neither type holds UI objects or spawns tasks; they run on whatever tokio runtime drives
//! the calling future.
#![forbid(unsafe_code)]

#[macro_use]
mod macros;

mod gateway;
mod loader;
mod options;
mod provider;


pub use gateway::{DebounceGateway, DebounceState, RowItem};
pub use loader::{IncrementalLoader, LoadOutcome};
pub use options::{GatewayOptions, LoaderOptions, MoreAvailableCallback, TotalItemCountCallback};
pub use provider::{ItemsProvider, memory_provider, provider_fn};

pub use datawindow;
