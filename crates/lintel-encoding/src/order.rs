//! Source order for unordered collections
//!
//! Object entries and set elements are stored in whatever order their
//! producer inserted them. Output must follow the order they were written
//! in, which is recovered from the key locations.

use std::cmp::Ordering;

use lintel_ast::SourceSpan;

/// Ascending by start position; located entries before unlocated ones
pub fn compare_locations(a: Option<&SourceSpan>, b: Option<&SourceSpan>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp_start(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Items of a collection, viewed in source order
pub enum SourceOrder<'a, T> {
    /// Storage order already was source order
    Stored(&'a [T]),
    Sorted(Vec<&'a T>),
}

impl<'a, T> SourceOrder<'a, T> {
    pub fn iter(&self) -> Box<dyn Iterator<Item = &'a T> + '_> {
        match self {
            SourceOrder::Stored(items) => {
                let items: &'a [T] = *items;
                Box::new(items.iter())
            }
            SourceOrder::Sorted(items) => Box::new(items.iter().copied()),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SourceOrder::Stored(items) => items.len(),
            SourceOrder::Sorted(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Order `items` by the location `key` extracts.
///
/// The sort is stable: entries with equal or missing locations keep their
/// stored relative order. Already ordered input is returned as is.
pub fn source_order<'a, T, K>(items: &'a [T], key: K) -> SourceOrder<'a, T>
where
    K: Fn(&T) -> Option<&SourceSpan>,
{
    let ordered = items
        .windows(2)
        .all(|pair| compare_locations(key(&pair[0]), key(&pair[1])) != Ordering::Greater);
    if ordered {
        return SourceOrder::Stored(items);
    }

    let mut sorted: Vec<&T> = items.iter().collect();
    sorted.sort_by(|a, b| compare_locations(key(*a), key(*b)));
    SourceOrder::Sorted(sorted)
}
