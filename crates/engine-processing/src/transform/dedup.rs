use std::collections::HashSet;

/// Keeps the first record seen for every key; later ones are dropped.
/// Records without a key are always kept. Returns the survivors in their
/// original order and the number dropped.
pub fn dedup_first_seen<T, F>(records: Vec<T>, key: F) -> (Vec<T>, usize)
where
    F: Fn(&T) -> Option<String>,
{
    let mut seen = HashSet::new();
    let before = records.len();
    let kept: Vec<T> = records
        .into_iter()
        .filter(|record| match key(record) {
            Some(k) => seen.insert(k),
            None => true,
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
