//! Text encoding for sort-key lists.
//!
//! A list is written as bracketed groups, `[Path,Direction]`, concatenated with no separator:
//! `[Age,Ascending][Details.Category,Descending]`. Parsing also accepts groups separated by
//! commas (`[A,Ascending],[B,Descending]`) and repeated raw values, which are joined in order
//! before splitting. Parsing is lenient: malformed groups are dropped rather than rejected.

use crate::{SortDirection, SortKey};

/// Parses a single raw sort-spec value.
pub fn parse(raw: &str) -> Vec<SortKey> {
    parse_all([raw])
}

/// Parses any number of raw sort-spec values (e.g. repeated query-string entries).
///
/// An empty iterator, or only blank values, yields an empty list.
pub fn parse_all<I, S>(values: I) -> Vec<SortKey>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut joined = String::new();
    for value in values {
        joined.push_str(value.as_ref());
    }

    let mut keys = Vec::new();
    if joined.trim().is_empty() {
        return keys;
    }

    for group in joined.split(']') {
        let body = group.trim().trim_start_matches(',').trim_start();
        let body = body.trim_start_matches('[');
        if body.trim().is_empty() {
            continue;
        }
        match parse_group(body) {
            Some(key) => keys.push(key),
            None => {
                dwtrace!(group = body, "codec: dropping malformed sort group");
            }
        }
    }
    keys
}

fn parse_group(body: &str) -> Option<SortKey> {
    let mut tokens = body.split(',').map(str::trim);
    let path = tokens.next()?;
    if path.is_empty() || path.contains('[') {
        return None;
    }
    let direction = tokens
        .last()
        .and_then(SortDirection::from_token)
        .unwrap_or_default();
    Some(SortKey::new(path, direction))
}

/// Writes `keys` in the canonical concatenated form.
pub fn serialize(keys: &[SortKey]) -> String {
    keys.iter().map(SortKey::to_string).collect()
}
