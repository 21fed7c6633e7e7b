//! Store lifecycle.
//!
//! A store is a directory holding the SQLite database (`draftmark.db`) and
//! the teacher-editable `config.toml`. `init` creates a fresh store; `open`
//! attaches to an existing one.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::{StoreConfig, CONFIG_FILE};
use crate::db::{Database, DB_FILE};
use crate::error::{DraftmarkError, Result};

#[derive(Debug)]
pub struct Store {
    root: PathBuf,
    config: StoreConfig,
    db: Database,
}

impl Store {
    /// Create a new store at `root`, writing the default `config.toml` and
    /// an empty database with the current schema.
    pub fn init(root: &Path) -> Result<Self> {
        if root.join(DB_FILE).exists() {
            return Err(DraftmarkError::StoreAlreadyExists {
                path: root.to_path_buf(),
            });
        }
        fs::create_dir_all(root)?;

        let config = StoreConfig::default();
        config.save(&root.join(CONFIG_FILE))?;

        let db = Database::open(root)?;
        debug!(root = %root.display(), "initialized store");

        Ok(Self {
            root: root.to_path_buf(),
            config,
            db,
        })
    }

    /// Open an existing store. A missing `config.toml` is tolerated (defaults
    /// apply); a missing database is not.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.join(DB_FILE).exists() {
            return Err(DraftmarkError::StoreNotFound {
                search_root: root.to_path_buf(),
            });
        }

        let config_path = root.join(CONFIG_FILE);
        let config = if config_path.exists() {
            StoreConfig::load(&config_path)?
        } else {
            StoreConfig::default()
        };

        let db = Database::open(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
            db,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}
