//! `SQLite` adapters for task workflow persistence.

pub(crate) mod ddl;
pub(crate) mod models;
pub(crate) mod schema;
mod store;

pub use store::SqliteTaskStore;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::sqlite::SqliteConnection;
use diesel::{Connection, ConnectionError, QueryResult};

/// `SQLite` connection pool type used by task adapters.
pub type TaskSqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// Session pragmas applied to every connection.
///
/// `foreign_keys` defaults to off in `SQLite`; cascade deletes and
/// referential enforcement depend on it. The busy timeout covers pool
/// contention on the single database file.
const SESSION_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;";

/// Applies [`SESSION_PRAGMAS`] to each pooled connection on acquisition.
#[derive(Debug, Clone, Copy)]
struct SessionPragmas;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SessionPragmas {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(SESSION_PRAGMAS)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for the given database path or URL.
///
/// # Errors
///
/// Returns a [`PoolError`] when the database cannot be opened.
pub fn connect_pool(database_url: &str) -> Result<TaskSqlitePool, PoolError> {
    Pool::builder()
        .connection_customizer(Box::new(SessionPragmas))
        .build(ConnectionManager::new(database_url))
}

/// Opens a single pragma-configured connection, as used by the one-shot
/// migration.
///
/// # Errors
///
/// Returns a [`ConnectionError`] when the database cannot be opened or the
/// session pragmas cannot be applied.
pub fn connect(database_url: &str) -> Result<SqliteConnection, ConnectionError> {
    let mut conn = SqliteConnection::establish(database_url)?;
    conn.batch_execute(SESSION_PRAGMAS)
        .map_err(ConnectionError::CouldntSetupConfiguration)?;
    Ok(conn)
}

/// Creates the three-table schema and its indexes when absent.
///
/// Fresh installations call this instead of the legacy migration; both paths
/// produce byte-identical DDL.
///
/// # Errors
///
/// Returns the underlying Diesel error when a statement fails.
pub fn bootstrap_schema(conn: &mut SqliteConnection) -> QueryResult<()> {
    conn.batch_execute(ddl::CREATE_TASKS)?;
    conn.batch_execute(ddl::CREATE_WORKBENCH)?;
    conn.batch_execute(ddl::CREATE_TODOS)?;
    conn.batch_execute(ddl::CREATE_INDEXES)?;
    Ok(())
}
