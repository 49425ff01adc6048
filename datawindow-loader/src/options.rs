use std::sync::Arc;

/// Fired after a non-terminal page was appended, so the trigger (e.g. a scroll sentinel
/// observer) can re-arm itself.
pub type MoreAvailableCallback = Arc<dyn Fn() + Send + Sync>;

/// Fired with the total item count learned from each successful gateway fetch.
pub type TotalItemCountCallback = Arc<dyn Fn(usize) + Send + Sync>;

/// Configuration for [`crate::IncrementalLoader`].
#[derive(Clone, Default)]
pub struct LoaderOptions {
    /// Items requested per page. `None` asks the provider for everything from the current
    /// buffer length onwards.
    pub page_size: Option<usize>,
    pub on_more_available: Option<MoreAvailableCallback>,
}

impl LoaderOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: Option<usize>) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_on_more_available(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_more_available = Some(Arc::new(f));
        self
    }
}

impl core::fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("page_size", &self.page_size)
            .field("on_more_available", &self.on_more_available.is_some())
            .finish()
    }
}

/// Configuration for [`crate::DebounceGateway`].
///
/// The delay starts at `floor_ms`, grows by `step_ms` (up to `ceiling_ms`) every time a call
/// gets past its wait, and drops back to `floor_ms` whenever a call completes uncancelled.
#[derive(Clone)]
pub struct GatewayOptions {
    pub floor_ms: u64,
    pub step_ms: u64,
    pub ceiling_ms: u64,
    /// Placeholder rows the grid reserves before the first item (e.g. a header row). Incoming
    /// start indexes are in grid rows and are shifted down by this amount for the provider.
    pub leading_rows: usize,
    /// Added to every returned row index, e.g. to produce 1-based row numbers.
    pub index_offset: usize,
    pub on_total_item_count: Option<TotalItemCountCallback>,
}

impl GatewayOptions {
    pub const DEFAULT_FLOOR_MS: u64 = 100;
    pub const DEFAULT_STEP_MS: u64 = 250;
    pub const DEFAULT_CEILING_MS: u64 = 2000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delays(mut self, floor_ms: u64, step_ms: u64, ceiling_ms: u64) -> Self {
        self.floor_ms = floor_ms;
        self.step_ms = step_ms;
        self.ceiling_ms = ceiling_ms;
        self
    }

    pub fn with_leading_rows(mut self, leading_rows: usize) -> Self {
        self.leading_rows = leading_rows;
        self
    }

    pub fn with_index_offset(mut self, index_offset: usize) -> Self {
        self.index_offset = index_offset;
        self
    }

    pub fn with_on_total_item_count(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_total_item_count = Some(Arc::new(f));
        self
    }

    /// The effective ceiling; never below the floor.
    pub(crate) fn ceiling(&self) -> u64 {
        self.ceiling_ms.max(self.floor_ms)
    }
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            floor_ms: Self::DEFAULT_FLOOR_MS,
            step_ms: Self::DEFAULT_STEP_MS,
            ceiling_ms: Self::DEFAULT_CEILING_MS,
            leading_rows: 0,
            index_offset: 0,
            on_total_item_count: None,
        }
    }
}

impl core::fmt::Debug for GatewayOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GatewayOptions")
            .field("floor_ms", &self.floor_ms)
            .field("step_ms", &self.step_ms)
            .field("ceiling_ms", &self.ceiling_ms)
            .field("leading_rows", &self.leading_rows)
            .field("index_offset", &self.index_offset)
            .field("on_total_item_count", &self.on_total_item_count.is_some())
            .finish()
    }
}
