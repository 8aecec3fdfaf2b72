//! Outcome of translating one reference.

use super::diagnostics::Issue;
use crate::base::Name;

/// Skip and flag are typed outcomes, not errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    Renamed(Name),
    /// Unresolved, or resolves to the same name.
    Unchanged,
    Flagged(Issue),
}

impl Resolution {
    pub fn renamed(&self) -> Option<&Name> {
        match self {
            Resolution::Renamed(name) => Some(name),
            _ => None,
        }
    }
}

/// Reconcile the translations of several candidates for one name.
///
/// Each entry is `(origin, resolved)` where `resolved` is the final spelling,
/// or `None` when the chain does not resolve that candidate. With
/// `require_all`, a partial resolution is ambiguous; otherwise unresolved
/// candidates are ignored. Resolved candidates must agree on one name.
pub fn reconcile(original: &str, results: Vec<(String, Option<Name>)>, require_all: bool) -> Resolution {
    let total = results.len();
    let resolved: Vec<(String, Name)> = results
        .into_iter()
        .filter_map(|(origin, name)| name.map(|n| (origin, n)))
        .collect();

    if resolved.is_empty() {
        return Resolution::Unchanged;
    }
    if require_all && resolved.len() != total {
        return Resolution::Flagged(Issue::AmbiguousOrigin {
            symbol: original.to_string(),
        });
    }

    let first = &resolved[0].1;
    if resolved.iter().any(|(_, name)| name != first) {
        return Resolution::Flagged(Issue::DivergentRename {
            candidates: resolved,
        });
    }
    if first == original {
        Resolution::Unchanged
    } else {
        Resolution::Renamed(first.clone())
    }
}
