//! Version ordering and range enumeration.
//!
//! Trino releases are numbered with single integers (`401`, `402`, ...),
//! but ordering accepts any dot-delimited sequence of non-negative integers
//! so that `1.2` and `1.2.0` compare equal.

use std::cmp::Ordering;

/// Versions seeded into an empty version registry.
pub const KNOWN_VERSIONS: &[&str] = &[
    "401", "406", "414", "424", "438", "442", "446", "451", "458", "465", "473", "474",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("version '{0}' is not a release number")]
    NotNumeric(String),

    #[error("range {from}..{to} spans {count} releases, more than the limit of {max}")]
    TooLarge {
        from: String,
        to: String,
        count: u64,
        max: u64,
    },
}

fn parts(version: &str) -> Vec<u64> {
    version
        .trim()
        .split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}

/// Orders two version strings part by part. Missing trailing parts count
/// as `0`; a part that is not a number also counts as `0`.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a = parts(a);
    let b = parts(b);
    let len = a.len().max(b.len());
    for i in 0..len {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Returns `(from, to)` with the older version first.
pub fn chronological<'a>(from: &'a str, to: &'a str) -> (&'a str, &'a str) {
    if compare_versions(from, to) == Ordering::Greater {
        (to, from)
    } else {
        (from, to)
    }
}

fn release_number(version: &str) -> Result<u64, RangeError> {
    version
        .trim()
        .parse::<u64>()
        .map_err(|_| RangeError::NotNumeric(version.to_string()))
}

/// Enumerates every release in `(from, to]`.
///
/// The start version is excluded because each release's notes describe the
/// changes that release introduced. Both ends must be single release
/// numbers and `from` must not be newer than `to`.
pub fn versions_after(from: &str, to: &str, max: u64) -> Result<Vec<String>, RangeError> {
    let start = release_number(from)?;
    let end = release_number(to)?;
    if start >= end {
        return Ok(Vec::new());
    }
    let count = end - start;
    if count > max {
        return Err(RangeError::TooLarge {
            from: from.to_string(),
            to: to.to_string(),
            count,
            max,
        });
    }
    Ok((start + 1..=end).map(|v| v.to_string()).collect())
}

/// Sorts versions newest first.
pub fn sort_newest_first(versions: &mut [String]) {
    versions.sort_by(|a, b| compare_versions(b, a));
}
