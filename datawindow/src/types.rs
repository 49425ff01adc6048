use core::fmt;

use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    /// The literal wire token for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
        }
    }

    /// Parses a wire token. Anything other than the two literal tokens yields `None`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "Ascending" => Some(Self::Ascending),
            "Descending" => Some(Self::Descending),
            _ => None,
        }
    }

    pub fn apply(self, ordering: core::cmp::Ordering) -> core::cmp::Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ordering term: a (possibly dotted) property path plus a direction.
///
/// `Display` writes the single-group wire form, e.g. `[Details.Category,Descending]`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SortKey {
    pub path: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn new(path: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            path: path.into(),
            direction,
        }
    }

    pub fn ascending(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Ascending)
    }

    pub fn descending(path: impl Into<String>) -> Self {
        Self::new(path, SortDirection::Descending)
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.path, self.direction)
    }
}

/// A request for one window of items.
///
/// The value is immutable once built; the `with_*` helpers return a new request. Cloning a
/// request shares its cancellation token, so cancelling any clone cancels them all.
///
/// With `feature = "serde"`, the window and sort keys are serialized; the token is skipped and
/// a deserialized request gets a fresh one.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemsRequest {
    pub start_index: usize,
    /// `None` means "as many as are available from `start_index`".
    pub count: Option<usize>,
    pub sort_keys: Vec<SortKey>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub cancel: CancellationToken,
}

impl ItemsRequest {
    pub fn new(start_index: usize, count: Option<usize>) -> Self {
        Self {
            start_index,
            count,
            sort_keys: Vec::new(),
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_sort_keys(mut self, sort_keys: Vec<SortKey>) -> Self {
        self.sort_keys = sort_keys;
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Exclusive end of the requested window, if bounded.
    pub fn end_index(&self) -> Option<usize> {
        self.count.map(|c| self.start_index.saturating_add(c))
    }
}

impl PartialEq for ItemsRequest {
    fn eq(&self, other: &Self) -> bool {
        self.start_index == other.start_index
            && self.count == other.count
            && self.sort_keys == other.sort_keys
    }
}

/// The items for one requested window plus the size of the whole result set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemsResult<T> {
    pub items: Vec<T>,
    /// Count of every record matching the current query, independent of the window size.
    pub total_item_count: usize,
}

impl<T> ItemsResult<T> {
    pub fn new(items: Vec<T>, total_item_count: usize) -> Self {
        Self {
            items,
            total_item_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> ItemsResult<U> {
        ItemsResult {
            items: self.items.into_iter().map(f).collect(),
            total_item_count: self.total_item_count,
        }
    }
}

impl<T> Default for ItemsResult<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_item_count: 0,
        }
    }
}
