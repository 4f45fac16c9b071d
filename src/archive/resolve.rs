//! Path resolution inside an archive tree.

use super::{ArchiveNode, ArchiveTree, Folder, ObjectName};
use crate::wave::WaveRecord;

/// Look up one path segment, preferring the text key and falling back to
/// the byte-string key with the same spelling
fn lookup<'a>(folder: &'a Folder, segment: &str) -> Option<&'a ArchiveNode> {
    folder
        .get(&ObjectName::text(segment))
        .or_else(|| folder.get(&ObjectName::bytes(segment.as_bytes())))
}

fn descend<'a>(folder: &'a Folder, path: &str) -> Option<&'a ArchiveNode> {
    let (segment, rest) = match path.split_once('/') {
        Some((segment, rest)) => (segment, Some(rest)),
        None => (path, None),
    };
    if segment.is_empty() {
        // Leading, trailing or doubled slashes
        return match rest {
            Some(rest) => descend(folder, rest),
            None => None,
        };
    }

    let node = lookup(folder, segment)?;
    match rest.filter(|rest| !rest.trim_matches('/').is_empty()) {
        None => Some(node),
        Some(rest) => descend(node.as_folder()?, rest),
    }
}

impl ArchiveTree {
    /// Resolve a slash-delimited path to a folder or wave.
    ///
    /// Returns `None` when any segment is missing or a non-final segment
    /// names a wave.
    pub fn resolve(&self, path: &str) -> Option<&ArchiveNode> {
        descend(self.top(), path)
    }

    /// Resolve a slash-delimited path that must end at a wave
    pub fn resolve_wave(&self, path: &str) -> Option<&WaveRecord> {
        self.resolve(path)?.as_wave()
    }
}
