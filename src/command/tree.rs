//! command::tree
//!
//! Command tree preparation and token matching.
//!
//! # Matching
//!
//! Starting at the root, a first token naming the root itself is dropped.
//! Then each next token is compared, case-insensitively, against the current
//! node's children and their aliases; a hit descends, a miss stops. There is
//! no backtracking. The deepest node reached and the unconsumed tokens form
//! the [`CommandMatch`].
//!
//! # Invariants
//!
//! - `prepare` is idempotent and is the only operation that mutates nodes
//! - Sibling names and aliases are unique after normalization
//! - Every prepared node carries a `help`/`h` boolean flag
//! - `match_tokens` is deterministic and does not touch the tree

use thiserror::Error;
use tracing::debug;

use super::Command;
use crate::core::flags::{Flag, FlagError};

/// Errors from building or walking the command tree.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("command '{parent}' has two children named '{name}'")]
    DuplicateCommand { parent: String, name: String },

    #[error("unknown command \"{command}\" for \"{parent}\"")]
    UnknownCommand { command: String, parent: String },

    #[error("command '{0}' has nothing to run")]
    NoRunHandler(String),

    #[error("failed to prepare command '{path}': {source}")]
    Flag {
        path: String,
        #[source]
        source: FlagError,
    },
}

/// Result of walking the tree with a token list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatch {
    /// Child indices from the root to the matched node.
    pub indices: Vec<usize>,
    /// Tokens left after matching, in order.
    pub remaining: Vec<String>,
}

impl CommandMatch {
    /// Number of command names consumed below the root.
    pub fn depth(&self) -> usize {
        self.indices.len()
    }

    pub fn is_root(&self) -> bool {
        self.indices.is_empty()
    }
}

/// An application's command hierarchy.
#[derive(Debug, Clone)]
pub struct CommandTree {
    root: Command,
    prepared: bool,
}

impl CommandTree {
    pub fn new(root: Command) -> Self {
        Self {
            root,
            prepared: false,
        }
    }

    pub fn root(&self) -> &Command {
        &self.root
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Wire paths, build child name indexes, and inject help flags.
    ///
    /// Calling it again after success is a no-op.
    pub fn prepare(&mut self) -> Result<(), TreeError> {
        if self.prepared {
            return Ok(());
        }
        prepare_node(&mut self.root, &[])?;
        self.prepared = true;
        debug!(root = self.root.name(), "command tree prepared");
        Ok(())
    }

    /// Walk the tree with `tokens`.
    pub fn match_tokens(&self, tokens: &[String]) -> CommandMatch {
        let mut rest = tokens;
        if rest
            .first()
            .is_some_and(|first| first.to_lowercase() == self.root.name.to_lowercase())
        {
            rest = &rest[1..];
        }

        let mut node = &self.root;
        let mut indices = Vec::new();
        while let Some(token) = rest.first() {
            let Some(i) = node.find_child(token) else {
                break;
            };
            indices.push(i);
            node = &node.children[i];
            rest = &rest[1..];
        }

        CommandMatch {
            indices,
            remaining: rest.to_vec(),
        }
    }

    /// The node a match points at.
    pub fn command(&self, m: &CommandMatch) -> &Command {
        self.command_at(&m.indices)
    }

    /// The node at a child-index path. Out-of-range indices stop the walk.
    pub fn command_at(&self, indices: &[usize]) -> &Command {
        let mut node = &self.root;
        for &i in indices {
            match node.children.get(i) {
                Some(child) => node = child,
                None => break,
            }
        }
        node
    }

    /// Look up a node by its canonical names below the root.
    pub fn find(&self, names: &[&str]) -> Option<&Command> {
        let mut node = &self.root;
        for name in names {
            let i = node.find_child(name)?;
            node = &node.children[i];
        }
        Some(node)
    }
}

fn prepare_node(node: &mut Command, parent_path: &[String]) -> Result<(), TreeError> {
    let mut path = parent_path.to_vec();
    path.push(node.name.clone());
    node.path = path;

    if !node.flags.contains("help") {
        let mut help = Flag::bool("help").usage(format!("help for {}", node.name));
        if !node.flags.has_short('h') {
            help = help.short('h');
        }
        node.flags
            .register(help)
            .map_err(|source| TreeError::Flag {
                path: node.path(),
                source,
            })?;
    }

    node.index.clear();
    for (i, child) in node.children.iter().enumerate() {
        for key in std::iter::once(&child.name).chain(child.aliases.iter()) {
            let key = key.to_lowercase();
            if node.index.insert(key.clone(), i).is_some_and(|prev| prev != i) {
                return Err(TreeError::DuplicateCommand {
                    parent: node.path(),
                    name: key,
                });
            }
        }
    }

    let path = node.path.clone();
    for child in &mut node.children {
        prepare_node(child, &path)?;
    }
    Ok(())
}
