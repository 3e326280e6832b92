//! Descriptor-set aggregation — accumulate, dedup, merge, write.
//!
//! One `DescriptorSet` exists per configured path prefix. Every compiler invocation
//! whose package falls under the prefix feeds its parsed file entries in; the merged
//! output is deduplicated by file name with first-seen ordering and written once at
//! the end of the run.

use super::wire::{self, FileEntry};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::io::Write;
use std::path::Path;

/// Accumulated descriptors for one configured prefix.
///
/// Entries are keyed by file name. Re-adding a name replaces the content but keeps
/// the name's first-seen position, so merged output order is the order in which
/// distinct names were first observed — deterministic given deterministic package
/// discovery order.
pub struct DescriptorSet {
    ignore: HashSet<String>,
    entries: IndexMap<String, Vec<u8>>,
    well_known: FileEntry,
}

impl DescriptorSet {
    /// Create an empty set. `well_known` is the synthetic entry for the
    /// schema-description file itself, appended to every non-empty merge.
    pub fn new(ignore_files: &[String], well_known: FileEntry) -> Self {
        DescriptorSet {
            ignore: ignore_files.iter().cloned().collect(),
            entries: IndexMap::new(),
            well_known,
        }
    }

    /// Insert or replace entries from one invocation, in blob order.
    pub fn add<I>(&mut self, files: I)
    where
        I: IntoIterator<Item = FileEntry>,
    {
        for file in files {
            self.entries.insert(file.name, file.data);
        }
    }

    /// Fold the accumulated entries into the final output list: insertion order,
    /// ignore-list applied, synthetic schema-description entry appended last unless
    /// already present or itself ignored. An empty set merges to an empty list —
    /// the synthetic entry never makes one non-empty.
    pub fn merge(&self) -> Vec<FileEntry> {
        let mut merged: Vec<FileEntry> = self
            .entries
            .iter()
            .filter(|(name, _)| !self.ignore.contains(name.as_str()))
            .map(|(name, data)| FileEntry {
                name: name.clone(),
                data: data.clone(),
            })
            .collect();

        if !merged.is_empty()
            && !self.ignore.contains(&self.well_known.name)
            && !self.entries.contains_key(&self.well_known.name)
        {
            merged.push(self.well_known.clone());
        }

        merged
    }

    /// Serialize the merged list to a sink. Skips writing entirely when the merge
    /// is empty.
    pub fn marshal_to<W: Write>(&self, writer: &mut W) -> Result<(), String> {
        let merged = self.merge();
        if merged.is_empty() {
            return Ok(());
        }
        wire::write_set(&merged, writer)
    }

    /// Write the merged set to its target file. Returns `Ok(false)` without
    /// creating or truncating the file when the merge is empty.
    pub fn write_target(&self, path: &Path) -> Result<bool, String> {
        let merged = self.merge();
        if merged.is_empty() {
            return Ok(false);
        }

        let mut file = std::fs::File::create(path)
            .map_err(|e| format!("cannot create descriptor set {}: {}", path.display(), e))?;
        wire::write_set(&merged, &mut file)
            .map_err(|e| format!("cannot write descriptor set {}: {}", path.display(), e))?;
        Ok(true)
    }
}
