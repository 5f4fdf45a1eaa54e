//! Depth-first lookup and copy-on-write editing over the node tree.
//!
//! Every structural edit rebuilds only the path from the root to the touched
//! node: ancestors on the path get new allocations, untouched sibling
//! subtrees keep their `Rc` identity. Node ids are unique across the tree, so
//! the first depth-first pre-order match is the only match.

use std::rc::Rc;

use super::node::FsNode;

/// Finds the node with `id`.
pub fn find_node<'a>(root: &'a Rc<FsNode>, id: &str) -> Option<&'a Rc<FsNode>> {
    if root.id.as_str() == id {
        return Some(root);
    }
    root.children().iter().find_map(|child| find_node(child, id))
}

/// Finds the folder whose child list contains the node with `id`.
pub fn find_parent<'a>(root: &'a Rc<FsNode>, id: &str) -> Option<&'a Rc<FsNode>> {
    if root.children().iter().any(|c| c.id.as_str() == id) {
        return Some(root);
    }
    root.children()
        .iter()
        .find_map(|child| find_parent(child, id))
}

/// Replaces the node with `id` by `edit(node)`, rebuilding the root→node path.
///
/// Returns `None` when `id` is absent, leaving no observable change.
pub fn update_node(
    root: &Rc<FsNode>,
    id: &str,
    edit: &dyn Fn(&FsNode) -> FsNode,
) -> Option<Rc<FsNode>> {
    if root.id.as_str() == id {
        return Some(Rc::new(edit(root)));
    }
    let children = root.children();
    for (index, child) in children.iter().enumerate() {
        if let Some(updated) = update_node(child, id, edit) {
            let mut next = children.to_vec();
            next[index] = updated;
            return Some(Rc::new(root.with_children(next)));
        }
    }
    None
}

/// Splices the node with `id` out of the tree.
///
/// Returns the new root and the removed node. `None` when `id` is absent or
/// names the root itself.
pub fn remove_node(root: &Rc<FsNode>, id: &str) -> Option<(Rc<FsNode>, Rc<FsNode>)> {
    let children = root.children();
    if let Some(index) = children.iter().position(|c| c.id.as_str() == id) {
        let removed = children[index].clone();
        let mut next = children.to_vec();
        next.remove(index);
        return Some((Rc::new(root.with_children(next)), removed));
    }
    for (index, child) in children.iter().enumerate() {
        if let Some((rebuilt, removed)) = remove_node(child, id) {
            let mut next = children.to_vec();
            next[index] = rebuilt;
            return Some((Rc::new(root.with_children(next)), removed));
        }
    }
    None
}

/// Appends `child` to the folder `parent_id`.
///
/// Returns `None` when the parent is missing or is a file.
pub fn insert_child(root: &Rc<FsNode>, parent_id: &str, child: Rc<FsNode>) -> Option<Rc<FsNode>> {
    let parent_is_folder = find_node(root, parent_id).is_some_and(|n| n.is_folder());
    if !parent_is_folder {
        return None;
    }
    update_node(root, parent_id, &move |parent| {
        let mut next = parent.children().to_vec();
        next.push(child.clone());
        parent.with_children(next)
    })
}

/// Returns `true` when `name` case-insensitively collides with a sibling,
/// optionally ignoring the node with `exclude_id` (for renames).
pub fn name_taken(siblings: &[Rc<FsNode>], name: &str, exclude_id: Option<&str>) -> bool {
    siblings.iter().any(|sibling| {
        exclude_id.map_or(true, |id| sibling.id.as_str() != id)
            && sibling.name.eq_ignore_ascii_case(name)
    })
}

/// Resolves a case-insensitive name collision among `siblings` by suffixing
/// the lowest unused `-N`; files keep their final extension
/// (`document.txt` → `document-1.txt`).
pub fn unique_child_name(siblings: &[Rc<FsNode>], desired: &str, folder: bool) -> String {
    if !name_taken(siblings, desired, None) {
        return desired.to_string();
    }
    let (stem, suffix) = if folder {
        (desired, String::new())
    } else {
        match desired.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, format!(".{ext}")),
            _ => (desired, String::new()),
        }
    };
    let mut n = 1usize;
    loop {
        let candidate = format!("{stem}-{n}{suffix}");
        if !name_taken(siblings, &candidate, None) {
            return candidate;
        }
        n += 1;
    }
}
