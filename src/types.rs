/*!
 * Core types and data structures for pkm-manifest
 */

use std::path::PathBuf;

/// Represents a directory in the file system
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryNode {
    /// Directory name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// Directory contents, in walk order
    pub contents: Vec<Node>,
}

/// Represents an included text file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNode {
    /// File name
    pub name: String,
    /// Relative path from scan root
    pub path: PathBuf,
    /// Sanitized (and possibly truncated) file content
    pub content: String,
}

/// A generic filesystem node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Directory node
    Directory(DirectoryNode),
    /// Text file node
    File(FileNode),
}

impl DirectoryNode {
    /// Number of files anywhere below this directory
    pub fn file_count(&self) -> usize {
        self.contents
            .iter()
            .map(|node| match node {
                Node::Directory(dir) => dir.file_count(),
                Node::File(_) => 1,
            })
            .sum()
    }
}
