//! Text renderings of a [`Tree`] for display purposes.
//!
//! ```
//! use balanced_tree::{render, Tree};
//! let tree: Tree<i32> = [20, 10, 30, 25].into_iter().collect();
//! assert_eq!(render::nested(&tree), "20(10,30(25))");
//! assert_eq!(render::diagram(&tree), "20\n├─ 10\n└─ 30\n   ├─ 25\n   └─ ∅");
//! ```

use std::fmt::{self, Display, Write};

use super::{Node, Tree};

/// Renders the tree in nested set notation, `key(left,right)`.
///
/// A node with only a left child renders as `key(left)`, one with only a
/// right child as `key(,right)`. The empty tree renders as the empty string.
pub fn nested<K: Display>(tree: &Tree<K>) -> String {
    tree.to_string()
}

/// Groups the keys by depth, each level from left to right.
pub fn levels<K>(tree: &Tree<K>) -> Vec<Vec<&K>> {
    let mut levels: Vec<Vec<&K>> = Vec::with_capacity(tree.height());
    tree.traverse_level_order(|depth, key| {
        if depth == levels.len() {
            levels.push(Vec::new());
        }
        levels[depth].push(key);
    });
    levels
}

/// Renders the tree top down, one key per line, with connectors leading to
/// the children. A missing child is shown as `∅` if its sibling exists.
pub fn diagram<K: Display>(tree: &Tree<K>) -> String {
    let mut out = String::new();
    if let Some(root) = tree.root.as_deref() {
        out.push_str(&root.key.to_string());
        write_children(&mut out, root, "");
    }
    out
}

fn write_children<K: Display>(out: &mut String, node: &Node<K>, tab: &str) {
    if node.left.is_none() && node.right.is_none() {
        return;
    }
    let children = [node.left.as_deref(), node.right.as_deref()];
    for (i, child) in children.into_iter().enumerate() {
        let is_last = i == children.len() - 1;
        out.push('\n');
        out.push_str(tab);
        out.push_str(if is_last { "└─ " } else { "├─ " });
        match child {
            None => out.push('∅'),
            Some(child) => {
                out.push_str(&child.key.to_string());
                let child_tab = format!("{tab}{}  ", if is_last { " " } else { "│" });
                write_children(out, child, &child_tab);
            }
        }
    }
}

fn write_nested<K: Display>(f: &mut impl Write, node: &Node<K>) -> fmt::Result {
    write!(f, "{}", node.key)?;
    if node.left.is_none() && node.right.is_none() {
        return Ok(());
    }
    f.write_char('(')?;
    if let Some(left) = node.left.as_deref() {
        write_nested(f, left)?;
    }
    if let Some(right) = node.right.as_deref() {
        f.write_char(',')?;
        write_nested(f, right)?;
    }
    f.write_char(')')
}

impl<K: Display> Display for Tree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root.as_deref() {
            None => Ok(()),
            Some(root) => write_nested(f, root),
        }
    }
}
