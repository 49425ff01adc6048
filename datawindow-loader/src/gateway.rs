use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use datawindow::{ItemsRequest, ItemsResult};

use crate::{GatewayOptions, ItemsProvider};

/// An item tagged with its row index in the consuming grid.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowItem<T> {
    pub index: usize,
    pub item: T,
}

/// A snapshot of a gateway's adaptive state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DebounceState {
    pub current_delay_ms: u64,
    /// The total learned from the most recent completed fetch.
    pub total_item_count: Option<usize>,
}

/// A debouncing front for a provider that is called at a high rate, e.g. by a row-virtualized
/// grid asking for arbitrary row slices while the viewport scrolls or resizes.
///
/// Every call first waits the current delay. Each call that gets past its wait raises the delay
/// by `step_ms` (up to `ceiling_ms`), so sustained bursts wait longer and more of them are
/// cancelled by their callers before reaching the provider. A call that completes uncancelled
/// drops the delay back to `floor_ms`.
///
/// Overlapping calls are not merged: each one pays the delay on its own. Cancellation is
/// driven by each request's token; a cancelled call returns an empty result, never an error.
pub struct DebounceGateway<T, E> {
    provider: ItemsProvider<T, E>,
    options: GatewayOptions,
    state: Mutex<DebounceState>,
}

impl<T, E> DebounceGateway<T, E> {
    pub fn new(provider: ItemsProvider<T, E>, options: GatewayOptions) -> Self {
        dwdebug!(
            floor_ms = options.floor_ms,
            step_ms = options.step_ms,
            ceiling_ms = options.ceiling(),
            "DebounceGateway::new"
        );
        Self {
            provider,
            state: Mutex::new(DebounceState {
                current_delay_ms: options.floor_ms,
                total_item_count: None,
            }),
            options,
        }
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    fn lock(&self) -> MutexGuard<'_, DebounceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> DebounceState {
        *self.lock()
    }

    pub fn current_delay_ms(&self) -> u64 {
        self.lock().current_delay_ms
    }

    pub fn total_item_count(&self) -> Option<usize> {
        self.lock().total_item_count
    }

    /// Debounces `request`, then forwards it to the provider.
    ///
    /// `request.start_index` is in grid rows; the provider sees it shifted down by
    /// `leading_rows`. Each returned item is tagged with its grid row:
    /// `provider_start + leading_rows + position + index_offset`.
    pub async fn fetch(&self, request: ItemsRequest) -> Result<ItemsResult<RowItem<T>>, E> {
        let cancel = request.cancel.clone();
        if cancel.is_cancelled() {
            return Ok(ItemsResult::default());
        }

        let delay = self.current_delay_ms();
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                dwtrace!(delay_ms = delay, "gateway: cancelled while waiting");
                return Ok(ItemsResult::default());
            }
            () = tokio::time::sleep(Duration::from_millis(delay)) => {}
        }

        {
            let mut state = self.lock();
            state.current_delay_ms = state
                .current_delay_ms
                .saturating_add(self.options.step_ms)
                .min(self.options.ceiling());
            dwtrace!(delay_ms = state.current_delay_ms, "gateway: backoff");
        }

        let provider_start = request.start_index.saturating_sub(self.options.leading_rows);
        let provider_request = ItemsRequest {
            start_index: provider_start,
            ..request
        };
        let fetch = (self.provider)(provider_request);
        let result = tokio::select! {
            biased;
            () = cancel.cancelled() => None,
            result = fetch => Some(result),
        };
        let result = match result {
            Some(result) if !cancel.is_cancelled() => result,
            _ => {
                dwtrace!("gateway: cancelled during fetch");
                return Ok(ItemsResult::default());
            }
        };
        let page = result?;

        {
            let mut state = self.lock();
            state.current_delay_ms = self.options.floor_ms;
            state.total_item_count = Some(page.total_item_count);
        }
        if let Some(on_total_item_count) = &self.options.on_total_item_count {
            on_total_item_count(page.total_item_count);
        }

        let base = provider_start
            .saturating_add(self.options.leading_rows)
            .saturating_add(self.options.index_offset);
        let total_item_count = page.total_item_count;
        let items = page
            .items
            .into_iter()
            .enumerate()
            .map(|(position, item)| RowItem {
                index: base.saturating_add(position),
                item,
            })
            .collect();
        Ok(ItemsResult::new(items, total_item_count))
    }
}

impl<T, E> core::fmt::Debug for DebounceGateway<T, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DebounceGateway")
            .field("state", &self.state())
            .field("options", &self.options)
            .finish()
    }
}
