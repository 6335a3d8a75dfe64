//! Shared application state.
//!
//! `CoreState` holds configuration and the classifier handle only. Every
//! request opens its own SQLite connection, so nothing mutable is shared
//! between requests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;

use crate::config::ServerConfig;
use crate::db;
use crate::workflow::submissions::{Classifier, MockClassifier};

#[derive(Clone)]
pub struct CoreState {
    db_path: PathBuf,
    jwt_secret: String,
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for CoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreState")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl CoreState {
    pub fn new(db_path: impl Into<PathBuf>, jwt_secret: impl Into<String>) -> Self {
        Self {
            db_path: db_path.into(),
            jwt_secret: jwt_secret.into(),
            classifier: Arc::new(MockClassifier),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(config.db_path.clone(), config.jwt_secret.clone())
    }

    /// Replace the image classifier.
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Create the data directory, apply migrations and drop stale revocations.
    pub fn initialize(&self) -> Result<(), CoreError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::DataDir {
                path: parent.to_path_buf(),
                reason: e.to_string(),
            })?;
        }
        let conn = self.open_db()?;
        let purged = db::purge_expired_revocations(&conn, &db::now_timestamp())?;
        tracing::info!(path = %self.db_path.display(), purged, "Database ready");
        Ok(())
    }

    /// Open a request-scoped connection.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        Ok(db::open_database(&self.db_path)?)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DatabaseError),
    #[error("Cannot create data directory {path:?}: {reason}")]
    DataDir { path: PathBuf, reason: String },
}
