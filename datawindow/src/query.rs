use core::borrow::Borrow;
use core::cmp::Ordering;
use core::iter::{Skip, Take};
use std::vec;

use crate::{
    FieldAccessor, FieldTable, ItemsRequest, QueryError, SortDirection, SortKey, SortValue,
};

/// Sort keys resolved against a [`FieldTable`], ready to order records.
pub struct SortPlan<'a, T> {
    terms: Vec<(&'a FieldAccessor<T>, SortDirection)>,
}

impl<'a, T> SortPlan<'a, T> {
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Compares two records term by term; each term's direction applies to that term only.
    pub fn compare(&self, a: &T, b: &T) -> Ordering {
        for (accessor, direction) in &self.terms {
            let ord = direction.apply(accessor(a).cmp(&accessor(b)));
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Stable-sorts `records`, extracting each term's value once per record.
    pub fn sort<R: Borrow<T>>(&self, records: Vec<R>) -> Vec<R> {
        if self.terms.is_empty() {
            return records;
        }

        let mut keyed: Vec<(Vec<SortValue>, R)> = records
            .into_iter()
            .map(|record| {
                let values = self
                    .terms
                    .iter()
                    .map(|(accessor, _)| accessor(Borrow::<T>::borrow(&record)))
                    .collect();
                (values, record)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            for ((va, vb), (_, direction)) in a.iter().zip(b).zip(&self.terms) {
                let ord = direction.apply(va.cmp(vb));
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        keyed.into_iter().map(|(_, record)| record).collect()
    }
}

impl<'a, T> core::fmt::Debug for SortPlan<'a, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let directions: Vec<SortDirection> = self.terms.iter().map(|(_, d)| *d).collect();
        f.debug_struct("SortPlan")
            .field("directions", &directions)
            .finish()
    }
}

impl<T> FieldTable<T> {
    /// Resolves `keys` into a [`SortPlan`].
    ///
    /// Fails on the first path that the table does not know.
    pub fn compile(&self, keys: &[SortKey]) -> Result<SortPlan<'_, T>, QueryError> {
        let mut terms = Vec::with_capacity(keys.len());
        for key in keys {
            let Some(accessor) = self.resolve(&key.path) else {
                dwwarn!(path = %key.path, "query: unknown sort field");
                return Err(QueryError::UnknownField {
                    path: key.path.clone(),
                });
            };
            terms.push((accessor, key.direction));
        }
        Ok(SortPlan { terms })
    }

    /// Sorts and windows `source` according to `request`.
    ///
    /// Every sort path is resolved before the source is touched. Without sort keys the source
    /// keeps its order and is consumed lazily; with sort keys it is collected and stable-sorted.
    /// The returned [`Windowed`] is an iterator, so further adapters can be chained before the
    /// window is consumed.
    ///
    /// `source` may yield owned records or anything that borrows as one (e.g. `&T` from a slice).
    pub fn apply<I>(
        &self,
        source: I,
        request: &ItemsRequest,
    ) -> Result<Windowed<I::IntoIter>, QueryError>
    where
        I: IntoIterator,
        I::Item: Borrow<T>,
    {
        let plan = self.compile(&request.sort_keys)?;
        let take = request.count.unwrap_or(usize::MAX);
        dwtrace!(
            start_index = request.start_index,
            count = ?request.count,
            sort_terms = plan.len(),
            "query: apply"
        );

        let inner = if plan.is_empty() {
            WindowedInner::Source(source.into_iter().skip(request.start_index).take(take))
        } else {
            let sorted = plan.sort(source.into_iter().collect());
            WindowedInner::Sorted(sorted.into_iter().skip(request.start_index).take(take))
        };
        Ok(Windowed { inner })
    }
}

/// The sorted, windowed result of [`FieldTable::apply`].
pub struct Windowed<I: Iterator> {
    inner: WindowedInner<I>,
}

enum WindowedInner<I: Iterator> {
    Source(Take<Skip<I>>),
    Sorted(Take<Skip<vec::IntoIter<I::Item>>>),
}

impl<I: Iterator> Iterator for Windowed<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            WindowedInner::Source(it) => it.next(),
            WindowedInner::Sorted(it) => it.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            WindowedInner::Source(it) => it.size_hint(),
            WindowedInner::Sorted(it) => it.size_hint(),
        }
    }
}

impl<I: Iterator> core::fmt::Debug for Windowed<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let sorted = matches!(self.inner, WindowedInner::Sorted(_));
        f.debug_struct("Windowed").field("sorted", &sorted).finish()
    }
}
