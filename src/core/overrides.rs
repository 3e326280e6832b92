//! Per-prefix generator and plugin overrides.
//!
//! Built once from the configured rule list: every rule's prefix list is
//! flattened into individual index entries keyed by prefix, so lookup never
//! scans the rule list. A package matches the longest registered prefix on a
//! path-segment boundary: the lookup tries the package's own relative path,
//! then each ancestor path in turn. When two rules register the same prefix
//! the last one wins.

use super::types::OverrideRule;
use std::collections::HashMap;

/// The effective override for one prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Override {
    /// Replacement generator; empty or absent leaves the default untouched
    pub generator: Option<String>,
    /// Replacement plugins; `Some(vec![])` means "no plugins"
    pub plugins: Option<Vec<String>>,
}

/// Immutable prefix → override index.
#[derive(Debug, Default)]
pub struct OverrideIndex {
    by_prefix: HashMap<String, Override>,
}

impl OverrideIndex {
    /// Flatten the rule list into the index. Last rule wins on colliding
    /// prefixes.
    pub fn build(rules: &[OverrideRule]) -> Self {
        let mut by_prefix = HashMap::new();
        for rule in rules {
            for prefix in &rule.prefixes {
                by_prefix.insert(
                    prefix.clone(),
                    Override {
                        generator: rule.generator.clone(),
                        plugins: rule.plugins.clone(),
                    },
                );
            }
        }
        OverrideIndex { by_prefix }
    }

    /// Find the override for a package's path relative to the output root.
    ///
    /// Exact-key matches against the package path and each of its ancestor
    /// paths, nearest first, so the most specific registered prefix wins and
    /// `x/yz` never matches a prefix `x/y`.
    pub fn lookup(&self, relative_path: &str) -> Option<&Override> {
        let mut candidate = relative_path;
        loop {
            if let Some(hit) = self.by_prefix.get(candidate) {
                return Some(hit);
            }
            match candidate.rfind('/') {
                Some(cut) => candidate = &candidate[..cut],
                None => return None,
            }
        }
    }
}
