use std::io;

use thiserror::Error;

/// Failure of a mutating tree operation.
///
/// Inserting a present key or removing a missing one is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("failed to allocate a tree node of {size} bytes")]
    Alloc { size: usize },
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("console i/o failed")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Tree(#[from] TreeError),
}
