//! Interactive menu driving a [`Tree`] of integer keys.
//!
//! The console reads one answer per line and writes prompts and results to
//! its output. Malformed answers are reported and never reach the tree.

use std::fmt::Display;
use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};

use crate::error::{ConsoleError, TreeError};
use crate::tree::{render, Order, Tree};

/// Key type handled by the console.
pub type Key = i32;

/// Builds the startup tree, inserting every parsable argument in order.
/// Arguments that are not integers are skipped.
pub fn seed<I, S>(args: I) -> Result<Tree<Key>, TreeError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tree = Tree::new();
    for arg in args {
        let arg = arg.as_ref();
        match arg.trim().parse::<Key>() {
            Ok(key) => {
                if !tree.try_insert(key)? {
                    debug!(key, "duplicate startup key ignored");
                }
            }
            Err(err) => warn!(%arg, %err, "skipping startup argument that is not a key"),
        }
    }
    info!(len = tree.len(), height = tree.height(), "tree seeded");
    Ok(tree)
}

/// Writes every rendering of the tree, its traversals and its height.
pub fn write_report<K: Display, W: Write>(out: &mut W, tree: &Tree<K>) -> io::Result<()> {
    write_renderings(out, tree)?;
    writeln!(out)?;
    write_traversals(out, tree)?;
    writeln!(out, "Height: {}", tree.height())
}

fn write_renderings<K: Display, W: Write>(out: &mut W, tree: &Tree<K>) -> io::Result<()> {
    if tree.is_empty() {
        return writeln!(out, "(empty tree)");
    }
    writeln!(out, "Nested: {}", render::nested(tree))?;
    writeln!(out)?;
    writeln!(out, "Levels:")?;
    for level in render::levels(tree) {
        writeln!(out, "{}", join(level))?;
    }
    writeln!(out)?;
    writeln!(out, "Diagram:")?;
    writeln!(out, "{}", render::diagram(tree))
}

fn write_traversals<K: Display, W: Write>(out: &mut W, tree: &Tree<K>) -> io::Result<()> {
    writeln!(out, "Pre-order: {}", join(tree.traverse(Order::PreOrder)))?;
    writeln!(out, "In-order: {}", join(tree.traverse(Order::InOrder)))?;
    writeln!(out, "Post-order: {}", join(tree.traverse(Order::PostOrder)))
}

fn join<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Command {
    Insert,
    Remove,
    Print,
    Traverse,
    Height,
    Search,
    Exit,
}

impl Command {
    fn parse(answer: &str) -> Option<Self> {
        match answer.trim().parse::<u8>().ok()? {
            1 => Some(Self::Insert),
            2 => Some(Self::Remove),
            3 => Some(Self::Print),
            4 => Some(Self::Traverse),
            5 => Some(Self::Height),
            6 => Some(Self::Search),
            7 => Some(Self::Exit),
            _ => None,
        }
    }
}

const MENU: &str = "\
MENU
1. Insert
2. Delete
3. Print
4. Traversals
5. Height
6. Search
7. Exit
";

/// Menu loop owning the tree it operates on.
pub struct Console<R, W> {
    input: R,
    output: W,
    tree: Tree<Key>,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Creates a console over an empty tree.
    pub fn new(input: R, output: W) -> Self {
        Self::with_tree(input, output, Tree::new())
    }

    /// Creates a console over an existing, possibly seeded, tree.
    pub fn with_tree(input: R, output: W, tree: Tree<Key>) -> Self {
        Self {
            input,
            output,
            tree,
        }
    }

    /// Returns the tree the console operates on.
    pub fn tree(&self) -> &Tree<Key> {
        &self.tree
    }

    /// Consumes the console, handing back its tree.
    pub fn into_tree(self) -> Tree<Key> {
        self.tree
    }

    /// Runs the menu until Exit is chosen or the input ends.
    /// The tree is cleared on the way out.
    pub fn run(&mut self) -> Result<(), ConsoleError> {
        loop {
            write!(self.output, "\n{MENU}\nOption: ")?;
            self.output.flush()?;
            let Some(answer) = self.read_line()? else {
                debug!("input closed");
                break;
            };
            match Command::parse(&answer) {
                Some(Command::Insert) => self.insert()?,
                Some(Command::Remove) => self.remove()?,
                Some(Command::Print) => write_renderings(&mut self.output, &self.tree)?,
                Some(Command::Traverse) => write_traversals(&mut self.output, &self.tree)?,
                Some(Command::Height) => writeln!(self.output, "Height: {}", self.tree.height())?,
                Some(Command::Search) => self.search()?,
                Some(Command::Exit) => break,
                None => writeln!(self.output, "Invalid option")?,
            }
        }
        self.tree.clear();
        self.output.flush()?;
        Ok(())
    }

    fn insert(&mut self) -> Result<(), ConsoleError> {
        let Some(key) = self.prompt_key("Key to insert: ")? else {
            return Ok(());
        };
        if self.tree.try_insert(key)? {
            debug!(key, height = self.tree.height(), "inserted");
            writeln!(self.output, "Inserted {key}")?;
        } else {
            writeln!(self.output, "Key {key} already present")?;
        }
        Ok(())
    }

    fn remove(&mut self) -> Result<(), ConsoleError> {
        let Some(key) = self.prompt_key("Key to delete: ")? else {
            return Ok(());
        };
        if self.tree.remove(&key) {
            debug!(key, height = self.tree.height(), "removed");
            writeln!(self.output, "Deleted {key}")?;
        } else {
            writeln!(self.output, "Key {key} not found")?;
        }
        Ok(())
    }

    fn search(&mut self) -> Result<(), ConsoleError> {
        let Some(key) = self.prompt_key("Key to search: ")? else {
            return Ok(());
        };
        match self.tree.get(&key) {
            Some(found) => writeln!(self.output, "Found {found}")?,
            None => writeln!(self.output, "Not found")?,
        }
        Ok(())
    }

    fn prompt_key(&mut self, prompt: &str) -> Result<Option<Key>, ConsoleError> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let Some(answer) = self.read_line()? else {
            return Ok(None);
        };
        match answer.trim().parse::<Key>() {
            Ok(key) => Ok(Some(key)),
            Err(err) => {
                debug!(answer = answer.trim(), %err, "rejected key");
                writeln!(self.output, "Invalid key")?;
                Ok(None)
            }
        }
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LogBuffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn run_session(tree: Tree<Key>, input: &str) -> (String, Tree<Key>) {
        let mut output = Vec::new();
        let mut console = Console::with_tree(Cursor::new(input), &mut output, tree);
        console.run().unwrap();
        let tree = console.into_tree();
        (String::from_utf8(output).unwrap(), tree)
    }

    #[test]
    fn test_seed() {
        let tree = seed(["30", "abc", "10", " 20 ", "10", "-5"]).unwrap();
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [-5, 10, 20, 30]);
        tree.check_consistency();
    }

    #[test]
    fn test_insert_and_traverse() {
        let (output, tree) = run_session(Tree::new(), "1\n10\n1\n20\n1\n30\n4\n5\n7\n");
        assert!(output.contains("Inserted 30"));
        assert!(output.contains("Pre-order: 20 10 30"));
        assert!(output.contains("In-order: 10 20 30"));
        assert!(output.contains("Post-order: 10 30 20"));
        assert!(output.contains("Height: 2"));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_and_search() {
        let tree = seed(["10", "20", "30", "40", "50", "25"]).unwrap();
        let (output, _) = run_session(tree, "2\n40\n2\n40\n6\n25\n6\n40\n4\n7\n");
        assert!(output.contains("Deleted 40"));
        assert!(output.contains("Key 40 not found"));
        assert!(output.contains("Found 25"));
        assert!(output.contains("Not found"));
        assert!(output.contains("In-order: 10 20 25 30 50"));
    }

    #[test]
    fn test_print() {
        let tree = seed(["20", "10", "30"]).unwrap();
        let (output, _) = run_session(tree, "3\n7\n");
        assert!(output.contains("Nested: 20(10,30)"));
        assert!(output.contains("Levels:\n20\n10 30\n"));
        assert!(output.contains("Diagram:\n20\n├─ 10\n└─ 30\n"));

        let (output, _) = run_session(Tree::new(), "3\n7\n");
        assert!(output.contains("(empty tree)"));
    }

    #[test]
    fn test_invalid_input() {
        let tree = seed(["1"]).unwrap();
        let (output, _) = run_session(tree, "x\n9\n1\nfoo\n2\n\n5\n7\n");
        assert_eq!(output.matches("Invalid option").count(), 2);
        assert_eq!(output.matches("Invalid key").count(), 2);
        assert!(output.contains("Height: 1"));
    }

    #[test]
    fn test_duplicate_insert() {
        let tree = seed(["7"]).unwrap();
        let (output, _) = run_session(tree, "1\n7\n5\n7\n");
        assert!(output.contains("Key 7 already present"));
        assert!(output.contains("Height: 1"));
    }

    #[test]
    fn test_end_of_input() {
        let (output, tree) = run_session(Tree::new(), "1\n5\n");
        assert!(output.contains("Inserted 5"));
        assert!(tree.is_empty());

        let (_, tree) = run_session(Tree::new(), "1\n");
        assert!(tree.is_empty());
    }

    #[test]
    fn test_report() {
        let tree = seed(["30", "10", "20"]).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &tree).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("Nested: 20(10,30)\n"));
        assert!(out.contains("In-order: 10 20 30\n"));
        assert!(out.ends_with("Height: 2\n"));
    }

    #[test]
    fn test_mutations_are_logged() {
        let logs = LogBuffer::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            run_session(Tree::new(), "1\n10\n1\n20\n2\n10\n2\n99\n6\n20\n7\n");
        });

        let logs = logs.contents();
        assert!(logs.contains("inserted key=10 height=1"));
        assert!(logs.contains("inserted key=20 height=2"));
        assert!(logs.contains("removed key=10 height=1"));
        assert_eq!(logs.matches("inserted").count(), 2);
        assert_eq!(logs.matches("removed").count(), 1);
    }
}
