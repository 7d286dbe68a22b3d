use std::alloc::{self, Layout};
use std::cmp::{self, Ordering};
use std::collections::VecDeque;
use std::fmt;
use std::iter::FusedIterator;
use std::ptr::NonNull;

use crate::error::TreeError;

pub mod render;

/// An ordered set of keys stored in an AVL tree.
///
/// Every node exclusively owns its two subtrees, there are no parent links.
/// After each public operation the keys are in search tree order and the
/// heights of the two subtrees of any node differ by at most one.
///
/// ```
/// use balanced_tree::{Order, Tree};
/// let mut tree = Tree::new();
/// tree.insert(10);
/// tree.insert(20);
/// tree.insert(30);
/// assert_eq!(tree.height(), 2);
/// let preorder: Vec<_> = tree.traverse(Order::PreOrder).copied().collect();
/// assert_eq!(preorder, [20, 10, 30]);
/// ```
#[derive(Clone)]
pub struct Tree<K> {
    root: Link<K>,
    num_nodes: usize,
}

/// Depth-first visiting order for [`Tree::traverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Node, then left subtree, then right subtree.
    PreOrder,
    /// Left subtree, then node, then right subtree. Yields keys ascending.
    InOrder,
    /// Left subtree, then right subtree, then node.
    PostOrder,
}

/// A lazy depth-first iterator over the keys of a tree.
///
/// This `struct` is created by the [`traverse`] and [`iter`] methods on [`Tree`].
///
/// [`traverse`]: Tree::traverse
/// [`iter`]: Tree::iter
pub struct Traverse<'a, K> {
    nodes: Nodes<'a, K>,
    remaining: usize,
}

type Link<K> = Option<Box<Node<K>>>;

#[derive(Clone)]
struct Node<K> {
    key: K,
    left: Link<K>,
    right: Link<K>,
    height: usize,
}

#[allow(clippy::enum_variant_names)]
#[derive(Clone, Copy)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

struct Nodes<'a, K> {
    order: Order,
    stack: Vec<(&'a Node<K>, Direction)>,
}

impl<K> Tree<K> {
    /// Creates an empty tree.
    /// No memory is allocated until the first key is inserted.
    pub fn new() -> Self {
        Self {
            root: None,
            num_nodes: 0,
        }
    }

    /// Returns true if the tree contains no keys.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of keys in the tree.
    pub fn len(&self) -> usize {
        self.num_nodes
    }

    /// Returns the height of the tree: 0 if empty, 1 for a single key.
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Removes all keys, deallocating every node before its parent.
    pub fn clear(&mut self) {
        let mut pending: Vec<Box<Node<K>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            if let Some(child) = node.left.take().or_else(|| node.right.take()) {
                pending.push(node);
                pending.push(child);
            }
        }
        self.num_nodes = 0;
    }

    /// Returns the smallest key in the tree.
    pub fn first(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(left) = node.left.as_deref() {
            node = left;
        }
        Some(&node.key)
    }

    /// Returns the largest key in the tree.
    pub fn last(&self) -> Option<&K> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.key)
    }

    /// Returns a lazy iterator visiting all keys in the given order.
    /// Each call starts over at the root.
    pub fn traverse(&self, order: Order) -> Traverse<'_, K> {
        Traverse {
            nodes: Nodes::new(self.root.as_deref(), order),
            remaining: self.num_nodes,
        }
    }

    /// Returns an iterator visiting all keys in ascending order.
    pub fn iter(&self) -> Traverse<'_, K> {
        self.traverse(Order::InOrder)
    }

    /// Visits all keys level by level, left to right.
    /// The closure receives the depth of the key (the root is at depth 0).
    pub fn traverse_level_order<'a, F: FnMut(usize, &'a K)>(&'a self, mut f: F) {
        let mut queue = VecDeque::new();
        if let Some(root) = self.root.as_deref() {
            queue.push_back((0, root));
        }
        while let Some((depth, node)) = queue.pop_front() {
            f(depth, &node.key);
            if let Some(left) = node.left.as_deref() {
                queue.push_back((depth + 1, left));
            }
            if let Some(right) = node.right.as_deref() {
                queue.push_back((depth + 1, right));
            }
        }
    }
}

impl<K: Ord> Tree<K> {
    /// Returns a reference to the key in the tree that is equal to the given key.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.find(key).map(|node| &node.key)
    }

    /// Returns true if the tree contains the given key.
    pub fn contains(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns the height of the left subtree minus the height of the right
    /// subtree of the node holding `key`.
    pub fn balance_factor(&self, key: &K) -> Option<isize> {
        self.find(key).map(Node::balance_factor)
    }

    /// Inserts a key into the tree.
    /// Returns false and leaves the tree unchanged if the key was already present.
    ///
    /// Aborts the process if a node cannot be allocated.
    pub fn insert(&mut self, key: K) -> bool {
        match self.try_insert(key) {
            Ok(inserted) => inserted,
            Err(_) => alloc::handle_alloc_error(Layout::new::<Node<K>>()),
        }
    }

    /// Inserts a key into the tree, reporting allocation failure to the caller.
    /// On error the tree is left exactly as it was.
    pub fn try_insert(&mut self, key: K) -> Result<bool, TreeError> {
        let inserted = Self::insert_into(&mut self.root, key)?;
        if inserted {
            self.num_nodes += 1;
        }
        Ok(inserted)
    }

    /// Removes a key from the tree.
    /// Returns whether the key was previously in the tree.
    pub fn remove(&mut self, key: &K) -> bool {
        let removed = Self::remove_from(&mut self.root, key);
        if removed {
            debug_assert!(self.num_nodes >= 1);
            self.num_nodes -= 1;
        }
        debug_assert!(self.get(key).is_none());
        removed
    }

    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check tree nodes
        let mut num_nodes = 0;
        for node in Nodes::new(self.root.as_deref(), Order::PreOrder) {
            let left_height = height(&node.left);
            let right_height = height(&node.right);

            // Check order against direct children
            if let Some(left) = node.left.as_deref() {
                assert!(left.key < node.key);
            }
            if let Some(right) = node.right.as_deref() {
                assert!(right.key > node.key);
            }

            // Check height
            assert_eq!(node.height, cmp::max(left_height, right_height) + 1);

            // Check AVL condition (nearly balance)
            assert!(left_height <= right_height + 1);
            assert!(right_height <= left_height + 1);

            num_nodes += 1;
        }

        // Check order across subtrees
        let keys: Vec<&K> = self.iter().collect();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));

        // Check number of nodes
        assert_eq!(num_nodes, self.num_nodes);
    }

    fn find(&self, key: &K) -> Option<&Node<K>> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match key.cmp(&node.key) {
                Ordering::Equal => break,
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
            };
        }
        current
    }

    fn insert_into(link: &mut Link<K>, key: K) -> Result<bool, TreeError> {
        let Some(node) = link.as_mut() else {
            *link = Some(Node::try_create(key)?);
            return Ok(true);
        };
        let inserted = match key.cmp(&node.key) {
            Ordering::Less => Self::insert_into(&mut node.left, key)?,
            Ordering::Greater => Self::insert_into(&mut node.right, key)?,
            Ordering::Equal => false,
        };
        if inserted {
            Self::rebalance_link(link);
        }
        Ok(inserted)
    }

    fn remove_from(link: &mut Link<K>, key: &K) -> bool {
        let Some(node) = link.as_mut() else {
            return false;
        };
        let removed = match key.cmp(&node.key) {
            Ordering::Less => Self::remove_from(&mut node.left, key),
            Ordering::Greater => Self::remove_from(&mut node.right, key),
            Ordering::Equal if node.left.is_some() && node.right.is_some() => {
                // Move successor key up, then unlink its node from the right subtree
                if let Some(successor) = Self::take_min(&mut node.right) {
                    node.key = successor;
                }
                true
            }
            Ordering::Equal => {
                // Node is stem or leaf, replace it by its only subtree
                if let Some(mut unlinked) = link.take() {
                    *link = unlinked.left.take().or_else(|| unlinked.right.take());
                }
                return true;
            }
        };
        if removed {
            Self::rebalance_link(link);
        }
        removed
    }

    // Unlinks the node with the smallest key below `link` and returns its key.
    // Every node on the way down is rebalanced on the way back up.
    fn take_min(link: &mut Link<K>) -> Option<K> {
        let node = link.as_mut()?;
        if node.left.is_some() {
            let key = Self::take_min(&mut node.left);
            Self::rebalance_link(link);
            key
        } else {
            let mut min = link.take()?;
            *link = min.right.take();
            let Node { key, .. } = *min;
            Some(key)
        }
    }

    fn rebalance_link(link: &mut Link<K>) {
        if let Some(node) = link.take() {
            *link = Some(Self::rebalance(node));
        }
    }

    /// Restores AVL condition (balance) at given node if necessary and adjusts height.
    /// Resulting balance will be +1, 0 or -1 height difference between left and right subtree.
    /// Initial balance must not exceed +2 or -2, which always holds after a single update.
    /// Returns the new root of the subtree.
    fn rebalance(mut node: Box<Node<K>>) -> Box<Node<K>> {
        node.adjust_height();
        let balance = node.balance_factor();
        debug_assert!((-2..=2).contains(&balance));
        if balance > 1 {
            // Left subtree too tall, straighten a left-right zig-zag first
            if node.left.as_deref().map_or(0, Node::balance_factor) < 0 {
                node.left = node.left.take().map(Self::rotate_left);
            }
            Self::rotate_right(node)
        } else if balance < -1 {
            // Right subtree too tall, straighten a right-left zig-zag first
            if node.right.as_deref().map_or(0, Node::balance_factor) > 0 {
                node.right = node.right.take().map(Self::rotate_right);
            }
            Self::rotate_left(node)
        } else {
            node
        }
    }

    fn rotate_left(mut node: Box<Node<K>>) -> Box<Node<K>> {
        let Some(mut right) = node.right.take() else {
            return node;
        };
        node.right = right.left.take();
        node.adjust_height();
        right.left = Some(node);
        right.adjust_height();
        right
    }

    fn rotate_right(mut node: Box<Node<K>>) -> Box<Node<K>> {
        let Some(mut left) = node.left.take() else {
            return node;
        };
        node.left = left.right.take();
        node.adjust_height();
        left.right = Some(node);
        left.adjust_height();
        left
    }
}

impl<K> Drop for Tree<K> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K> Default for Tree<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug> fmt::Debug for Tree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> FromIterator<K> for Tree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Tree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord> Extend<K> for Tree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a Tree<K> {
    type Item = &'a K;
    type IntoIter = Traverse<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K> Iterator for Traverse<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.next()?;
        self.remaining -= 1;
        Some(&node.key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Traverse<'_, K> {}

impl<K> FusedIterator for Traverse<'_, K> {}

impl<K> Clone for Traverse<'_, K> {
    fn clone(&self) -> Self {
        Self {
            nodes: Nodes {
                order: self.nodes.order,
                stack: self.nodes.stack.clone(),
            },
            remaining: self.remaining,
        }
    }
}

impl<'a, K> Nodes<'a, K> {
    fn new(root: Option<&'a Node<K>>, order: Order) -> Self {
        Self {
            order,
            stack: root
                .map(|node| (node, Direction::FromParent))
                .into_iter()
                .collect(),
        }
    }
}

impl<'a, K> Iterator for Nodes<'a, K> {
    type Item = &'a Node<K>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, dir)) = self.stack.pop() {
            match dir {
                Direction::FromParent => {
                    self.stack.push((node, Direction::FromLeft));
                    if let Some(left) = node.left.as_deref() {
                        self.stack.push((left, Direction::FromParent));
                    }
                    if self.order == Order::PreOrder {
                        return Some(node);
                    }
                }
                Direction::FromLeft => {
                    self.stack.push((node, Direction::FromRight));
                    if let Some(right) = node.right.as_deref() {
                        self.stack.push((right, Direction::FromParent));
                    }
                    if self.order == Order::InOrder {
                        return Some(node);
                    }
                }
                Direction::FromRight => {
                    if self.order == Order::PostOrder {
                        return Some(node);
                    }
                }
            }
        }
        None
    }
}

impl<K> Node<K> {
    fn try_create(key: K) -> Result<Box<Self>, TreeError> {
        let layout = Layout::new::<Self>();
        debug_assert!(layout.size() > 0);
        unsafe {
            let Some(node_ptr) = NonNull::new(alloc::alloc(layout).cast::<Self>()) else {
                return Err(TreeError::Alloc {
                    size: layout.size(),
                });
            };
            node_ptr.as_ptr().write(Node {
                key,
                left: None,
                right: None,
                height: 1,
            });
            Ok(Box::from_raw(node_ptr.as_ptr()))
        }
    }

    fn balance_factor(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }

    fn adjust_height(&mut self) {
        self.height = cmp::max(height(&self.left), height(&self.right)) + 1;
    }
}

fn height<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}
