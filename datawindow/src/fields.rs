use core::cmp::Ordering;
use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

/// A comparable value extracted from a record for one sort path.
///
/// Variants order as `Null < Bool < numbers < Text`. `Int`, `UInt` and `Float` compare
/// numerically and exactly with each other; floats otherwise use IEEE total ordering (with
/// `-0.0 == 0.0`) so `NaN` sorts deterministically.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::UInt(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
        }
    }
}

fn cmp_int_uint(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

// 2^127, the first float past `i128::MAX`.
const I128_LIMIT: f64 = i128::MAX as f64;

/// Exact integer/float comparison. Casting the integer to `f64` would round above 2^53 and
/// break transitivity.
fn cmp_int_float(a: i128, b: f64) -> Ordering {
    if b.is_nan() {
        // Matches `f64::total_cmp`: negative NaN below everything, positive NaN above.
        return if b.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if b >= I128_LIMIT {
        return Ordering::Less;
    }
    if b < -I128_LIMIT {
        return Ordering::Greater;
    }
    let whole = b.trunc();
    match a.cmp(&(whole as i128)) {
        Ordering::Equal => whole.partial_cmp(&b).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

fn cmp_float(a: f64, b: f64) -> Ordering {
    // -0.0 and 0.0 both equal the integer zero, so they must equal each other.
    if a == b {
        Ordering::Equal
    } else {
        a.total_cmp(&b)
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortValue::*;
        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (UInt(a), UInt(b)) => a.cmp(b),
            (Int(a), UInt(b)) => cmp_int_uint(*a, *b),
            (UInt(a), Int(b)) => cmp_int_uint(*b, *a).reverse(),
            (Float(a), Float(b)) => cmp_float(*a, *b),
            (Int(a), Float(b)) => cmp_int_float(i128::from(*a), *b),
            (Float(a), Int(b)) => cmp_int_float(i128::from(*b), *a).reverse(),
            (UInt(a), Float(b)) => cmp_int_float(i128::from(*a), *b),
            (Float(a), UInt(b)) => cmp_int_float(i128::from(*b), *a).reverse(),
            (Text(a), Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

macro_rules! sort_value_from {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(impl From<$t> for SortValue {
            fn from(v: $t) -> Self {
                Self::$variant(v as $target)
            }
        })*
    };
}

sort_value_from!(Int as i64: i8, i16, i32, i64, isize);
sort_value_from!(UInt as u64: u8, u16, u32, u64, usize);
sort_value_from!(Float as f64: f32, f64);

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<&String> for SortValue {
    fn from(v: &String) -> Self {
        Self::Text(v.clone())
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Extracts the sort value for one path from a record.
pub type FieldAccessor<T> = Arc<dyn Fn(&T) -> SortValue + Send + Sync>;

/// A per-record-type table mapping property paths to accessors.
///
/// Build one table per record type at startup and share it (it is cheap to clone). Nested
/// structures are addressed with dotted paths registered through [`FieldTable::nested`]:
///
/// ```
/// use datawindow::FieldTable;
///
/// struct Details { category: String }
/// struct Product { name: String, details: Details }
///
/// let details = FieldTable::<Details>::new().field("Category", |d| d.category.as_str().into());
/// let products = FieldTable::<Product>::new()
///     .field("Name", |p| p.name.as_str().into())
///     .nested("Details", |p| &p.details, &details);
///
/// assert!(products.contains("Details.Category"));
/// ```
pub struct FieldTable<T> {
    fields: HashMap<String, FieldAccessor<T>>,
}

impl<T> FieldTable<T> {
    pub fn new() -> Self {
        Self {
            fields: HashMap::new(),
        }
    }

    /// Registers (or replaces) the accessor for `path`.
    pub fn field(
        mut self,
        path: impl Into<String>,
        accessor: impl Fn(&T) -> SortValue + Send + Sync + 'static,
    ) -> Self {
        self.fields.insert(path.into(), Arc::new(accessor));
        self
    }

    /// Registers every path of `inner` as `prefix.path`, reached through `project`.
    pub fn nested<U, P>(mut self, prefix: &str, project: P, inner: &FieldTable<U>) -> Self
    where
        T: 'static,
        U: 'static,
        P: Fn(&T) -> &U + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for (path, accessor) in &inner.fields {
            let project = Arc::clone(&project);
            let accessor = Arc::clone(accessor);
            self.fields.insert(
                format!("{prefix}.{path}"),
                Arc::new(move |record: &T| accessor(project(record))),
            );
        }
        self
    }

    /// Like [`FieldTable::nested`], for an optional nested structure. Every nested path
    /// resolves to [`SortValue::Null`] when the structure is absent.
    pub fn nested_opt<U, P>(mut self, prefix: &str, project: P, inner: &FieldTable<U>) -> Self
    where
        T: 'static,
        U: 'static,
        P: Fn(&T) -> Option<&U> + Send + Sync + 'static,
    {
        let project = Arc::new(project);
        for (path, accessor) in &inner.fields {
            let project = Arc::clone(&project);
            let accessor = Arc::clone(accessor);
            self.fields.insert(
                format!("{prefix}.{path}"),
                Arc::new(move |record: &T| {
                    project(record).map_or(SortValue::Null, |nested| accessor(nested))
                }),
            );
        }
        self
    }

    pub fn resolve(&self, path: &str) -> Option<&FieldAccessor<T>> {
        self.fields.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.fields.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FieldTable<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&str> = self.paths().collect();
        paths.sort_unstable();
        f.debug_struct("FieldTable").field("paths", &paths).finish()
    }
}
