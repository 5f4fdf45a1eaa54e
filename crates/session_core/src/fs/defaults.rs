//! The canonical built-in filesystem seeded on first boot.

use std::rc::Rc;

use super::node::{FsNode, NodeKind, ROOT_ID, TRASH_ID};

fn folder(id: &str, name: &str, system: bool, children: Vec<Rc<FsNode>>) -> Rc<FsNode> {
    let mut node = FsNode::folder(id, name, children);
    node.is_system = system;
    Rc::new(node)
}

fn file(id: &str, name: &str, size: &str, modified: &str) -> Rc<FsNode> {
    let mut node = FsNode::file(id, name);
    node.size = Some(size.to_string());
    node.modified = modified.to_string();
    Rc::new(node)
}

fn link(id: &str, name: &str, url: &str, modified: &str) -> Rc<FsNode> {
    let mut node = FsNode::file(id, name);
    node.modified = modified.to_string();
    if let NodeKind::File { url: slot, .. } = &mut node.kind {
        *slot = Some(url.to_string());
    }
    Rc::new(node)
}

/// Builds the default tree: the `home` root, the standard user folders, and
/// the `trash` folder. Standard folders and the seeded resume are protected
/// against rename/delete.
pub fn default_file_system() -> Rc<FsNode> {
    let resume = {
        let mut node = FsNode::file("cv-pdf", "resume.pdf");
        node.size = Some("245 KB".to_string());
        node.modified = "2026-01-15".to_string();
        node.is_system = true;
        Rc::new(node)
    };

    folder(
        ROOT_ID,
        "Home",
        true,
        vec![
            folder("desktop", "Desktop", true, vec![resume]),
            folder(
                "documents",
                "Documents",
                true,
                vec![file("notes", "notes.txt", "12 KB", "2026-01-10")],
            ),
            folder(
                "projects",
                "Projects",
                true,
                vec![
                    folder(
                        "web-desktop",
                        "web-desktop",
                        false,
                        vec![
                            folder(
                                "web-desktop-src",
                                "src",
                                false,
                                vec![
                                    file("app-tsx", "App.tsx", "3 KB", "2026-02-04"),
                                    file("main-tsx", "main.tsx", "1 KB", "2026-02-04"),
                                ],
                            ),
                            file("package-json", "package.json", "2 KB", "2026-02-04"),
                        ],
                    ),
                    link(
                        "repo-link",
                        "web-desktop.url",
                        "https://github.com/example/web-desktop",
                        "2026-02-04",
                    ),
                ],
            ),
            folder(
                "downloads",
                "Downloads",
                true,
                vec![
                    file("installer", "editor-installer.deb", "89 MB", "2026-01-25"),
                    file("wallpaper", "wallpaper.png", "5 MB", "2026-01-22"),
                ],
            ),
            folder(
                "music",
                "Music",
                true,
                vec![file("song1", "ambient-coding.mp3", "8 MB", "2025-12-15")],
            ),
            folder(
                "pictures",
                "Pictures",
                true,
                vec![folder(
                    "screenshots",
                    "Screenshots",
                    false,
                    vec![file("ss1", "screenshot-2026-01-01.png", "2 MB", "2026-01-01")],
                )],
            ),
            folder(TRASH_ID, "Trash", true, Vec::new()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fs::tree::{find_node, find_parent};

    fn collect_ids(node: &Rc<FsNode>, ids: &mut Vec<String>) {
        ids.push(node.id.as_str().to_string());
        for child in node.children() {
            collect_ids(child, ids);
        }
    }

    #[test]
    fn root_and_trash_are_present_and_protected() {
        let root = default_file_system();
        assert_eq!(root.id.as_str(), ROOT_ID);
        assert!(root.is_system);

        let trash = find_node(&root, TRASH_ID).expect("trash exists");
        assert!(trash.is_system);
        assert!(trash.is_folder());
        assert!(trash.children().is_empty());
        assert_eq!(
            find_parent(&root, TRASH_ID).map(|p| p.id.as_str()),
            Some(ROOT_ID)
        );
    }

    #[test]
    fn default_ids_are_unique() {
        let root = default_file_system();
        let mut ids = Vec::new();
        collect_ids(&root, &mut ids);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn link_items_carry_urls() {
        let root = default_file_system();
        let repo = find_node(&root, "repo-link").expect("repo link");
        assert!(matches!(
            &repo.kind,
            NodeKind::File { url: Some(url), .. } if url.starts_with("https://")
        ));
    }

    #[test]
    fn standard_folders_are_system_items() {
        let root = default_file_system();
        for id in ["desktop", "documents", "projects", "downloads", "music", "pictures"] {
            let node = find_node(&root, id).unwrap_or_else(|| panic!("{id} exists"));
            assert!(node.is_system, "{id} should be protected");
        }
        let project = find_node(&root, "web-desktop").expect("sample project");
        assert!(!project.is_system);
    }
}
