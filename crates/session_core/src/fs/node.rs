//! Filesystem node types shared across the engine and its persisted format.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Well-known id of the filesystem root folder.
pub const ROOT_ID: &str = "home";
/// Well-known id of the trash folder.
pub const TRASH_ID: &str = "trash";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Generates a fresh globally-unique id for a newly created node.
    pub fn fresh() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeKind {
    File {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        extension: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Folder {
        #[serde(default)]
        children: Vec<Rc<FsNode>>,
    },
}

/// A single file or folder in the virtual tree.
///
/// Children are held behind `Rc` so copy-on-write path rebuilds preserve the
/// identity of untouched subtrees; consumers may treat pointer equality of a
/// branch as proof that nothing under it changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FsNode {
    pub id: NodeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(default)]
    pub modified: String,
    #[serde(default)]
    pub is_system: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_parent_id: Option<NodeId>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl FsNode {
    pub fn folder(id: impl Into<String>, name: impl Into<String>, children: Vec<Rc<FsNode>>) -> Self {
        Self {
            id: NodeId::new(id),
            name: name.into(),
            size: None,
            modified: String::new(),
            is_system: false,
            original_parent_id: None,
            kind: NodeKind::Folder { children },
        }
    }

    pub fn file(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let extension = extension_of(&name).map(str::to_string);
        Self {
            id: NodeId::new(id),
            name,
            size: None,
            modified: String::new(),
            is_system: false,
            original_parent_id: None,
            kind: NodeKind::File {
                extension,
                content: None,
                url: None,
            },
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self.kind, NodeKind::Folder { .. })
    }

    pub fn is_file(&self) -> bool {
        !self.is_folder()
    }

    /// Child nodes; the empty slice for files.
    pub fn children(&self) -> &[Rc<FsNode>] {
        match &self.kind {
            NodeKind::Folder { children } => children,
            NodeKind::File { .. } => &[],
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { content, .. } => content.as_deref(),
            NodeKind::Folder { .. } => None,
        }
    }

    pub fn extension(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File { extension, .. } => extension.as_deref(),
            NodeKind::Folder { .. } => None,
        }
    }

    /// Copy of this folder with its child list replaced; files are returned
    /// unchanged.
    pub fn with_children(&self, children: Vec<Rc<FsNode>>) -> FsNode {
        let mut next = self.clone();
        if next.is_folder() {
            next.kind = NodeKind::Folder { children };
        }
        next
    }
}

/// Caller-supplied fields for `create_item`; everything else is derived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewItem {
    pub name: String,
    pub folder: bool,
    pub extension: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
}

impl NewItem {
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            folder: true,
            ..Self::default()
        }
    }
}

/// Final extension of a file name, if any (`archive.tar.gz` → `gz`).
pub fn extension_of(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

/// Formats a content byte length as the displayed size string.
pub fn format_display_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * 1024;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    }
}
