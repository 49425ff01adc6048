use crate::{BindError, ItemsRequest, codec};

pub const START_INDEX_PARAM: &str = "startIndex";
pub const COUNT_PARAM: &str = "count";
pub const SORT_PARAM: &str = "sortBy";

impl ItemsRequest {
    /// Binds a request from query-string style key/value pairs.
    ///
    /// Keys match ASCII case-insensitively and unknown keys are ignored.
    /// - `startIndex` is required and must be a non-negative integer.
    /// - `count` is optional; an unparsable value is treated as absent.
    /// - every `sortBy` value is kept, in order, and decoded with [`codec::parse_all`].
    ///
    /// When a key repeats, the last `startIndex`/`count` wins.
    pub fn bind<I, K, V>(pairs: I) -> Result<Self, BindError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut start_index = None;
        let mut count = None;
        let mut sort_values = Vec::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();
            if key.eq_ignore_ascii_case(START_INDEX_PARAM) {
                start_index = Some(value.to_owned());
            } else if key.eq_ignore_ascii_case(COUNT_PARAM) {
                count = value.trim().parse::<usize>().ok();
                if count.is_none() {
                    dwtrace!(value, "binder: ignoring unparsable count");
                }
            } else if key.eq_ignore_ascii_case(SORT_PARAM) {
                sort_values.push(value.to_owned());
            }
        }

        let raw = start_index.ok_or(BindError::MissingStartIndex)?;
        let start_index = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| BindError::InvalidStartIndex(raw.clone()))?;

        Ok(Self::new(start_index, count).with_sort_keys(codec::parse_all(sort_values)))
    }

    /// The inverse of [`ItemsRequest::bind`]: `startIndex`, then `count` (if set), then a single
    /// `sortBy` entry (if any keys are set).
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![(START_INDEX_PARAM, self.start_index.to_string())];
        if let Some(count) = self.count {
            pairs.push((COUNT_PARAM, count.to_string()));
        }
        if !self.sort_keys.is_empty() {
            pairs.push((SORT_PARAM, codec::serialize(&self.sort_keys)));
        }
        pairs
    }
}
