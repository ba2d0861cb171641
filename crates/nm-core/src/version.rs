//! Version ordering for migration versions.
//!
//! Versions are dot-delimited (`_` is accepted as a substitute for `.`) and
//! compare component-wise as integers. Missing trailing components count as
//! zero, so `1.2` and `1.2.0` are order-equal even though they are distinct
//! identities. Callers that key maps by version must therefore use the raw
//! string, and only use [`compare_versions`] for sorting.

use std::cmp::Ordering;

/// Replace `_` separators with `.`.
pub fn normalize_version(raw: &str) -> String {
    raw.replace('_', ".")
}

/// A single version component.
///
/// Numeric components keep their digits with leading zeros stripped so that
/// arbitrarily long numbers compare correctly without overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Component<'a> {
    Numeric(&'a str),
    Text(&'a str),
}

impl Component<'_> {
    const ZERO: Component<'static> = Component::Numeric("");

    fn parse(raw: &str) -> Component<'_> {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            Component::Numeric(raw.trim_start_matches('0'))
        } else {
            Component::Text(raw)
        }
    }
}

impl Ord for Component<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Component::Numeric(a), Component::Numeric(b)) => {
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            // Non-numeric components only appear in hand-edited ledgers;
            // they sort after every number to keep the order total.
            (Component::Numeric(_), Component::Text(_)) => Ordering::Less,
            (Component::Text(_), Component::Numeric(_)) => Ordering::Greater,
            (Component::Text(a), Component::Text(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Component<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn components(version: &str) -> Vec<Component<'_>> {
    version.split(['.', '_']).map(Component::parse).collect()
}

/// Compare two version strings under the migration version order.
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let left = components(a);
    let right = components(b);
    let len = left.len().max(right.len());

    for i in 0..len {
        let l = left.get(i).copied().unwrap_or(Component::ZERO);
        let r = right.get(i).copied().unwrap_or(Component::ZERO);
        match l.cmp(&r) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

/// Compare versions, breaking order-ties by the raw string.
///
/// Use this wherever a deterministic total order over distinct identities is
/// needed (e.g. the union of local and remote versions).
pub fn compare_versions_strict(a: &str, b: &str) -> Ordering {
    compare_versions(a, b).then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
