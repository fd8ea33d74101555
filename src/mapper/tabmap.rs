//! Tab-to-module resolution.
//!
//! The reference table maps human tab names to Log10 URLs; the module
//! identifier is the path segment after the operations base, e.g.
//! `https://log10-atlas.loadshare.net/operations/rto/dashboard` → `rto`.
//! Lookups fall back through two substring tiers so abbreviated labels still
//! resolve.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::tabular::Table;

/// Path segment preceding the module identifier in Log10 URLs.
const URL_ANCHOR_SEGMENT: &str = "operations";

/// Ordered (normalized tab → module) pairs. Insertion order is preserved so
/// substring-match ties resolve deterministically; keys are unique, lowercase
/// and trimmed.
#[derive(Debug, Clone, Default)]
pub struct TabMap {
    entries: Vec<(String, String)>,
}

impl TabMap {
    /// Build the map from (tab, url) rows. Rows whose URL lacks the
    /// operations anchor are discarded; duplicate tabs keep the last row.
    pub fn from_rows<I>(rows: I) -> TabMap
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = TabMap::default();
        for (tab, url) in rows {
            let tab = tab.trim().to_lowercase();
            if tab.is_empty() {
                continue;
            }
            let Some(module) = module_from_url(url.trim()) else {
                continue;
            };
            map.insert(tab, module);
        }
        map
    }

    /// Load the map from the reference CSV. A missing file yields an empty
    /// map: every lookup will miss and records get flagged for review.
    pub fn load(path: &Path) -> Result<TabMap> {
        if !path.exists() {
            warn!(
                "tab-url map not found at {}, url modules will be empty",
                path.display()
            );
            return Ok(TabMap::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read tab-url map {}", path.display()))?;
        let table = Table::parse(&text);
        let rows = table.rows.iter().filter_map(|row| {
            let tab = table.field(row, "tab")?;
            let url = table.field(row, "url")?;
            Some((tab.to_string(), url.to_string()))
        });
        let map = TabMap::from_rows(rows);
        info!("loaded {} tab-module mappings from {}", map.len(), path.display());
        Ok(map)
    }

    fn insert(&mut self, key: String, value: String) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Resolve a tab label to its module identifier.
    ///
    /// Match order, first success wins:
    /// 1. exact key match;
    /// 2. label contained in a key, longest key wins ("dashboard" inside
    ///    "sc-ops dashboard");
    /// 3. a key contained in the label, longest key wins.
    pub fn resolve(&self, label: &str) -> Option<&str> {
        let needle = label.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some((_, module)) = self.entries.iter().find(|(k, _)| *k == needle) {
            return Some(module);
        }

        // Strict > keeps the earliest-inserted key among equal lengths
        let mut best: Option<&str> = None;
        let mut best_len = 0;
        for (key, module) in &self.entries {
            if key.contains(&needle) && key.len() > best_len {
                best = Some(module);
                best_len = key.len();
            }
        }
        if best.is_some() {
            return best;
        }

        for (key, module) in &self.entries {
            if needle.contains(key.as_str()) && key.len() > best_len {
                best = Some(module);
                best_len = key.len();
            }
        }
        best
    }
}

/// Pull the module segment out of a Log10 URL: the path component right
/// after the operations anchor. Query strings are ignored.
fn module_from_url(url: &str) -> Option<String> {
    let path = url.split('?').next().unwrap_or(url);
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let anchor = parts.iter().position(|p| *p == URL_ANCHOR_SEGMENT)?;
    parts.get(anchor + 1).map(|s| s.to_string())
}

// ── Tests ──
