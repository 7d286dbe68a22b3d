//! An ordered set of keys implemented with an AVL tree, plus the interactive
//! console used to explore it.
//!
//! ```
//! use balanced_tree::Tree;
//! let mut tree = Tree::new();
//! for key in [10, 20, 30, 40, 50, 25] {
//!     tree.insert(key);
//! }
//! tree.remove(&40);
//! assert!(!tree.contains(&40));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [10, 20, 25, 30, 50]);
//! ```

pub mod console;
mod error;
mod tree;

pub use error::{ConsoleError, TreeError};
pub use tree::{render, Order, Traverse, Tree};
