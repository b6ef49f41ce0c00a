use std::fmt;
use std::path::PathBuf;

/// Path and basename every scan root is rendered as.
pub const ROOT_PATH: &str = "/";

/// Position of a node in the emission sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(pub usize);

impl NodeIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a resource node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Child indices, sorted by each child's full path
    Directory { children: Vec<NodeIndex> },
    /// Embedded bytes after preprocessing
    File { payload: Vec<u8> },
}

/// One file or directory entry of the embedded filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Position in the emission sequence
    pub index: NodeIndex,
    /// `/`-separated path relative to the scan root, `"/"` for the root
    pub path: String,
    /// Location on disk the node was read from
    pub source: PathBuf,
    pub kind: NodeKind,
    basename_offset: usize,
}

impl ResourceNode {
    pub fn file(index: NodeIndex, path: String, source: PathBuf, payload: Vec<u8>) -> Self {
        Self::new(index, path, source, NodeKind::File { payload })
    }

    pub fn directory(
        index: NodeIndex,
        path: String,
        source: PathBuf,
        children: Vec<NodeIndex>,
    ) -> Self {
        Self::new(index, path, source, NodeKind::Directory { children })
    }

    /// The scan root. Its path and basename are both `"/"`.
    pub fn root(index: NodeIndex, source: PathBuf, children: Vec<NodeIndex>) -> Self {
        Self {
            index,
            path: ROOT_PATH.to_string(),
            source,
            kind: NodeKind::Directory { children },
            basename_offset: 0,
        }
    }

    fn new(index: NodeIndex, path: String, source: PathBuf, kind: NodeKind) -> Self {
        let basename_offset = basename_offset(&path);
        Self {
            index,
            path,
            source,
            kind,
            basename_offset,
        }
    }

    /// Byte offset of the basename inside `path`.
    pub fn basename_offset(&self) -> usize {
        self.basename_offset
    }

    pub fn basename(&self) -> &str {
        &self.path[self.basename_offset..]
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT_PATH
    }

    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory { .. })
    }

    /// Child count for directories, payload length for files.
    pub fn size(&self) -> usize {
        match &self.kind {
            NodeKind::Directory { children } => children.len(),
            NodeKind::File { payload } => payload.len(),
        }
    }

    pub fn children(&self) -> &[NodeIndex] {
        match &self.kind {
            NodeKind::Directory { children } => children,
            NodeKind::File { .. } => &[],
        }
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match &self.kind {
            NodeKind::File { payload } => Some(payload),
            NodeKind::Directory { .. } => None,
        }
    }
}

/// First byte after the final `/` in `path`.
pub fn basename_offset(path: &str) -> usize {
    path.rfind('/').map(|pos| pos + 1).unwrap_or(0)
}
