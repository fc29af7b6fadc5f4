//! Shared application state for HTTP handlers.
//!
//! One SQLite connection sits behind a mutex; every request locks it on the
//! blocking pool, so store work is serialized per process.

use crate::http_error::HttpError;
use nodetree_core::{SqliteNodeRepository, TreeService, TreeServiceError, TreeServiceResult};
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one tree operation against the shared connection.
    pub async fn with_tree<T, F>(&self, op: F) -> Result<T, HttpError>
    where
        T: Send + 'static,
        F: for<'conn> FnOnce(&TreeService<SqliteNodeRepository<'conn>>) -> TreeServiceResult<T>
            + Send
            + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db
                .lock()
                .map_err(|_| HttpError::internal("database connection lock poisoned"))?;
            let repo = SqliteNodeRepository::try_new(&conn).map_err(TreeServiceError::from)?;
            let service = TreeService::new(repo);
            op(&service).map_err(HttpError::from)
        })
        .await
        .map_err(|err| HttpError::internal(format!("tree task failed: {err}")))?
    }
}
