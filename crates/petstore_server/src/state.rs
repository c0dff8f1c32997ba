//! Shared handler state.
//!
//! The SQLite connection is the only shared mutable resource. It lives behind
//! a mutex and is only touched from the blocking thread pool.

use std::sync::{Arc, Mutex};
#[cfg(test)]
use std::sync::MutexGuard;

use petstore_core::{PetService, RepoResult, SqlitePetRepository};
use rusqlite::Connection;

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    conn: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Wraps a connection returned by `petstore_core::db::open_db*`.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Runs one use case against the store on the blocking pool.
    pub async fn with_service<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: for<'c> FnOnce(&PetService<SqlitePetRepository<'c>>) -> RepoResult<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| ApiError::Internal("database connection lock poisoned".to_string()))?;
            let service = PetService::new(SqlitePetRepository::new(&guard));
            op(&service).map_err(ApiError::from)
        })
        .await
        .map_err(|err| ApiError::Internal(format!("storage task failed: {err}")))?
    }

    /// Blocks every store operation while the guard lives.
    #[cfg(test)]
    pub(crate) fn hold_connection(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("store lock poisoned")
    }
}
