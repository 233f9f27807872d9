//! Deterministic key ordering for multi-key writes.

/// Returns `keys` sorted ascending with duplicates removed.
///
/// Units that write several rows acquire them in this order. Two units that
/// overlap on any key therefore contend on the lowest shared key first and
/// cannot wait on each other in a cycle.
#[must_use]
pub fn lock_order<K>(keys: impl IntoIterator<Item = K>) -> Vec<K>
where
    K: Ord,
{
    let mut ordered: Vec<K> = keys.into_iter().collect();
    ordered.sort_unstable();
    ordered.dedup();
    ordered
}

/// Returns `items` stably sorted by the key extracted with `key`.
///
/// Unlike [`lock_order`] this keeps items with equal keys; callers validate
/// uniqueness before opening the unit.
#[must_use]
pub fn lock_order_by<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let mut ordered: Vec<T> = items.into_iter().collect();
    ordered.sort_by_key(key);
    ordered
}
