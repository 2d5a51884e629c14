//! Database Connection and Setup
//!
//! Manages the SQLite connection, migrations and transaction scoping.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef};
use rusqlite::{Connection, ToSql, Transaction, TransactionBehavior};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, Priority};

/// Connection handle shared by every repository
pub type SharedConnection = Arc<Mutex<Connection>>;

/// Database state wrapper
#[derive(Clone)]
pub struct DbState {
    conn: SharedConnection,
    path: PathBuf,
}

impl DbState {
    pub fn connection(&self) -> SharedConnection {
        self.conn.clone()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl From<rusqlite::Error> for DomainError {
    fn from(e: rusqlite::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

impl ToSql for Priority {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Priority {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Priority::parse(text).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// Initialize database with path (`:memory:` for a private in-memory db)
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let in_memory = db_path == Path::new(":memory:");

    let conn = if in_memory {
        Connection::open_in_memory()?
    } else {
        if let Some(dir) = db_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .map_err(|e| DomainError::Internal(format!("Failed to create db dir: {}", e)))?;
        }
        Connection::open(db_path)?
    };

    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_secs(5))?;
    if !in_memory {
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        log::debug!("journal_mode = {}", mode);
    }

    run_migrations(&conn)?;
    log::info!("Database ready at {}", db_path.display());

    Ok(DbState {
        conn: Arc::new(Mutex::new(conn)),
        path: db_path.to_path_buf(),
    })
}

/// Run `f` inside one `BEGIN IMMEDIATE` transaction
///
/// The write lock is taken up front, so the read-then-shift sequence of an
/// ordering operation cannot interleave with another writer. Returning an
/// error drops the transaction, which rolls every statement back.
pub async fn with_transaction<T, F>(conn: &SharedConnection, f: F) -> DomainResult<T>
where
    F: FnOnce(&Transaction<'_>) -> DomainResult<T>,
{
    let mut guard = conn.lock().await;
    let tx = guard.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let value = f(&tx)?;
    tx.commit()?;
    Ok(value)
}

/// Run a read-only closure against the connection
pub async fn with_connection<T, F>(conn: &SharedConnection, f: F) -> DomainResult<T>
where
    F: FnOnce(&Connection) -> DomainResult<T>,
{
    let guard = conn.lock().await;
    f(&guard)
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS boards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS lists (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            "order" INTEGER NOT NULL,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cards (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT,
            priority TEXT NOT NULL DEFAULT 'MEDIUM',
            due_date TEXT,
            is_completed INTEGER NOT NULL DEFAULT 0,
            "order" INTEGER NOT NULL,
            list_id INTEGER NOT NULL REFERENCES lists(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS checklist_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            priority TEXT NOT NULL DEFAULT 'MEDIUM',
            is_completed INTEGER NOT NULL DEFAULT 0,
            due_date TEXT,
            "order" INTEGER NOT NULL,
            card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS labels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            board_id INTEGER NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS card_labels (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            card_id INTEGER NOT NULL REFERENCES cards(id) ON DELETE CASCADE,
            label_id INTEGER NOT NULL REFERENCES labels(id) ON DELETE CASCADE,
            UNIQUE (card_id, label_id)
        );

        CREATE INDEX IF NOT EXISTS idx_lists_board ON lists(board_id, "order");
        CREATE INDEX IF NOT EXISTS idx_cards_list ON cards(list_id, "order");
        CREATE INDEX IF NOT EXISTS idx_checklist_items_card ON checklist_items(card_id, "order");
        CREATE INDEX IF NOT EXISTS idx_labels_board ON labels(board_id);
        CREATE INDEX IF NOT EXISTS idx_card_labels_label ON card_labels(label_id);
        "#,
    )?;

    Ok(())
}
