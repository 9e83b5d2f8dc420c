//! Ordering and merge helpers shared by the store collections.

use std::cmp::Ordering;

use super::organization::{Identified, Named};

/// Compare names alphabetically, ignoring case; case only breaks ties, with
/// lower case ordered first.
pub(crate) fn compare_names(left: &str, right: &str) -> Ordering {
    left.to_lowercase()
        .cmp(&right.to_lowercase())
        .then_with(|| right.cmp(left))
}

/// Sort by name with [`compare_names`]. The sort is stable.
pub(crate) fn sort_by_name<T: Named>(items: &mut [T]) {
    items.sort_by(|left, right| compare_names(left.name(), right.name()));
}

/// Replace the item with the same id, or append it.
pub(crate) fn upsert_by_id<T: Identified>(items: &mut Vec<T>, item: T) {
    match items.iter_mut().find(|existing| existing.id() == item.id()) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}

/// Remove every item with `id`, returning whether anything was removed.
pub(crate) fn remove_by_id<T: Identified>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|existing| existing.id() != id);
    items.len() != before
}

/// Clone the item with `id`, if present.
pub(crate) fn find_by_id<T: Identified + Clone>(items: &[T], id: &str) -> Option<T> {
    items.iter().find(|existing| existing.id() == id).cloned()
}
