//! Helpers over host path strings.
//!
//! Paths are treated as `/`-separated strings exactly as the host hands them
//! over; nothing here normalizes case or separators.

use ahash::AHashMap;

/// Ancestor folders of `path`, nearest first.
///
/// `notes/sub/a.md` yields `notes/sub` then `notes`. A leading `/` does not
/// produce an empty root entry.
pub fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    let mut current = path.trim_end_matches('/');
    std::iter::from_fn(move || {
        let idx = current.rfind('/')?;
        current = &current[..idx];
        if current.is_empty() {
            None
        } else {
            Some(current)
        }
    })
}

/// Last segment of `path`.
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Whether `path` equals `root` or lies somewhere beneath it.
pub fn is_same_or_descendant(path: &str, root: &str) -> bool {
    let root = root.trim_end_matches('/');
    match path.strip_prefix(root) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

/// Move `path` from under `from` to under `to`, if it lies beneath `from`.
pub fn rebase(path: &str, from: &str, to: &str) -> Option<String> {
    if !is_same_or_descendant(path, from) {
        return None;
    }
    let rest = &path[from.trim_end_matches('/').len()..];
    Some(format!("{}{}", to.trim_end_matches('/'), rest))
}

/// Remove every key equal to or beneath `root`.
pub fn remove_tree_keys<V>(map: &mut AHashMap<String, V>, root: &str) -> usize {
    let before = map.len();
    map.retain(|path, _| !is_same_or_descendant(path, root));
    before - map.len()
}

/// Re-key every entry equal to or beneath `from` so it lies beneath `to`.
pub fn rename_tree_keys<V>(map: &mut AHashMap<String, V>, from: &str, to: &str) -> usize {
    let moved: Vec<String> = map
        .keys()
        .filter(|path| is_same_or_descendant(path, from))
        .cloned()
        .collect();

    let mut count = 0;
    for old in moved {
        if let (Some(new), Some(value)) = (rebase(&old, from, to), map.remove(&old)) {
            map.insert(new, value);
            count += 1;
        }
    }
    count
}
