//! Store handle for the inventory data directory.
//!
//! A Store is the logical container for the inventory database and its
//! mutation audit log. Every handler receives one and resolves paths from it.

use crate::core::schemas;
use std::path::{Path, PathBuf};

/// Store handle representing an inventory data directory.
#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute or working-directory-relative path to the data directory
    pub root: PathBuf,
}

impl Store {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(schemas::INVENTORY_DB_NAME)
    }

    pub fn events_path(&self) -> PathBuf {
        self.root.join(schemas::INVENTORY_EVENTS_NAME)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
