use std::collections::BTreeMap;
use std::fmt;

use crate::wave::WaveRecord;

/// Key of an object inside an archive folder.
///
/// Names read from the record stream are raw bytes; the synthetic top-level
/// `root` folder uses a text key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ObjectName {
    /// Text key
    Text(String),
    /// Raw byte-string key as stored in the container
    Bytes(Vec<u8>),
}

impl ObjectName {
    /// Byte-string key
    pub fn bytes(name: impl Into<Vec<u8>>) -> Self {
        ObjectName::Bytes(name.into())
    }

    /// Text key
    pub fn text(name: impl Into<String>) -> Self {
        ObjectName::Text(name.into())
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectName::Text(name) => f.write_str(name),
            ObjectName::Bytes(name) => write!(f, "{}", String::from_utf8_lossy(name)),
        }
    }
}

/// Node of the archive tree
#[derive(Debug, Clone, PartialEq)]
pub enum ArchiveNode {
    /// Data folder
    Folder(Folder),
    /// Wave leaf
    Wave(Box<WaveRecord>),
}

impl ArchiveNode {
    /// The wave, if this node is a wave leaf
    pub fn as_wave(&self) -> Option<&WaveRecord> {
        match self {
            ArchiveNode::Wave(wave) => Some(wave),
            ArchiveNode::Folder(_) => None,
        }
    }

    /// The folder, if this node is a folder
    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            ArchiveNode::Folder(folder) => Some(folder),
            ArchiveNode::Wave(_) => None,
        }
    }
}

/// Named children of a data folder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Folder {
    children: BTreeMap<ObjectName, ArchiveNode>,
}

impl Folder {
    /// Empty folder
    pub fn new() -> Self {
        Self::default()
    }

    /// Child stored under exactly `name`
    pub fn get(&self, name: &ObjectName) -> Option<&ArchiveNode> {
        self.children.get(name)
    }

    /// Insert a child; an existing child with the same name is replaced
    pub fn insert(&mut self, name: ObjectName, node: ArchiveNode) {
        self.children.insert(name, node);
    }

    /// Children in key order
    pub fn iter(&self) -> impl Iterator<Item = (&ObjectName, &ArchiveNode)> {
        self.children.iter()
    }

    /// Number of direct children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True if the folder has no children
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

/// Decoded packed experiment.
///
/// The top level holds a single text key `root`, the experiment's root
/// data folder, so configured paths read `root/<folder>/.../<wave>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArchiveTree {
    top: Folder,
}

impl ArchiveTree {
    /// Name of the experiment's root data folder
    pub const ROOT: &'static str = "root";

    /// Tree whose root data folder is `root`
    pub fn from_root(root: Folder) -> Self {
        let mut top = Folder::new();
        top.insert(ObjectName::text(Self::ROOT), ArchiveNode::Folder(root));
        Self { top }
    }

    /// Tree with an arbitrary top-level folder
    pub fn from_top(top: Folder) -> Self {
        Self { top }
    }

    /// Top-level folder
    pub fn top(&self) -> &Folder {
        &self.top
    }

    /// Number of waves anywhere in the tree
    pub fn wave_count(&self) -> usize {
        fn count(folder: &Folder) -> usize {
            folder
                .iter()
                .map(|(_, node)| match node {
                    ArchiveNode::Wave(_) => 1,
                    ArchiveNode::Folder(sub) => count(sub),
                })
                .sum()
        }
        count(&self.top)
    }
}
