//! Ordering of discovered content directories.
//!
//! Scans return an unordered set; setup screens want the most likely candidate
//! first. Ranking is a stable sort on three keys:
//!
//! 1. Basename in the preferred list (case-insensitive) before everything else
//! 2. Fewer path segments first
//! 3. Lexicographic path order
//!
//! An optional pin path is then moved to the front, whatever its rank was.

use crate::types::base_name;

/// Rank `paths` by preferred basename, then depth, then name.
///
/// `pin`, when present in the list, always ends up first. Absent pins are
/// ignored.
pub fn rank_paths<I, S>(paths: I, preferred: &[String], pin: Option<&str>) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let preferred: Vec<String> = preferred.iter().map(|p| p.to_lowercase()).collect();
    let mut ranked: Vec<String> = paths.into_iter().map(Into::into).collect();

    ranked.sort_by_cached_key(|path| {
        let not_preferred = !preferred.contains(&base_name(path).to_lowercase());
        (not_preferred, segment_count(path), path.clone())
    });

    if let Some(pin) = pin
        && let Some(pos) = ranked.iter().position(|p| p == pin)
        && pos > 0
    {
        let pinned = ranked.remove(pos);
        ranked.insert(0, pinned);
    }
    ranked
}

fn segment_count(path: &str) -> usize {
    path.split('/').filter(|s| !s.is_empty()).count()
}
