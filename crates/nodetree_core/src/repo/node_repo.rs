//! Node tree repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for the parent-pointer node table.
//! - Keep SQL details and ordering bookkeeping inside the repository boundary.
//!
//! # Invariants
//! - Child listing is deterministic: `ordering ASC, id ASC`.
//! - New and moved nodes get `max(sibling ordering) + 1`, or 1.
//! - Subtree deletion removes the node and every descendant atomically.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::node::{Node, NodeId};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type used by node repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors from node repository operations.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target node does not exist.
    NodeNotFound(NodeId),
    /// Sibling group under this parent already holds `i64::MAX` ordering.
    OrderingExhausted(NodeId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NodeNotFound(id) => write!(f, "node not found: {id}"),
            Self::OrderingExhausted(parent_id) => write!(
                f,
                "no ordering value left after the last child of {parent_id}"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "node repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "node repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "node repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for node tree operations.
pub trait NodeRepository {
    /// Loads one node by id.
    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>>;
    /// Lists children of one parent in sibling order.
    fn list_children(&self, parent_id: NodeId) -> RepoResult<Vec<Node>>;
    /// Lists every node, grouped by parent and in sibling order.
    fn list_all(&self) -> RepoResult<Vec<Node>>;
    /// Inserts one node at the end of its sibling group.
    fn create_node(&self, parent_id: NodeId, title: &str) -> RepoResult<Node>;
    /// Updates the title of one node.
    fn rename_node(&self, id: NodeId, title: &str) -> RepoResult<()>;
    /// Deletes one node and all of its descendants; returns removed row count.
    fn delete_subtree(&self, id: NodeId) -> RepoResult<usize>;
    /// Reparents one node to the end of the new sibling group.
    fn move_node(&self, id: NodeId, new_parent_id: NodeId) -> RepoResult<Node>;
    /// Sets the ordering value of one node as given.
    fn set_ordering(&self, id: NodeId, ordering: i64) -> RepoResult<()>;
}

/// SQLite-backed node repository.
pub struct SqliteNodeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNodeRepository<'conn> {
    /// Creates repository from migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_node_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

const NODE_COLUMNS: &str = "id, parentId, title, ordering";

impl NodeRepository for SqliteNodeRepository<'_> {
    fn get_node(&self, id: NodeId) -> RepoResult<Option<Node>> {
        load_node(self.conn, id)
    }

    fn list_children(&self, parent_id: NodeId) -> RepoResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NODE_COLUMNS}
             FROM nodes
             WHERE parentId = ?1
             ORDER BY ordering ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([parent_id])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_node_row(row)?);
        }
        Ok(items)
    }

    fn list_all(&self) -> RepoResult<Vec<Node>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {NODE_COLUMNS}
             FROM nodes
             ORDER BY parentId ASC, ordering ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_node_row(row)?);
        }
        Ok(items)
    }

    fn create_node(&self, parent_id: NodeId, title: &str) -> RepoResult<Node> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ordering = next_ordering(&tx, parent_id)?;
        tx.execute(
            "INSERT INTO nodes (parentId, title, ordering) VALUES (?1, ?2, ?3);",
            params![parent_id, title, ordering],
        )?;
        let id = tx.last_insert_rowid();
        let node = load_node(&tx, id)?.ok_or(RepoError::NodeNotFound(id))?;
        tx.commit()?;
        Ok(node)
    }

    fn rename_node(&self, id: NodeId, title: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes SET title = ?2 WHERE id = ?1;",
            params![id, title],
        )?;
        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        Ok(())
    }

    fn delete_subtree(&self, id: NodeId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        // UNION (not UNION ALL) keeps the closure finite even on corrupt cyclic data.
        let removed = tx.execute(
            "WITH RECURSIVE subtree(id) AS (
                SELECT id FROM nodes WHERE id = ?1
                UNION
                SELECT child.id
                FROM nodes child
                INNER JOIN subtree parent ON child.parentId = parent.id
            )
            DELETE FROM nodes WHERE id IN (SELECT id FROM subtree);",
            [id],
        )?;
        if removed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        tx.commit()?;
        Ok(removed)
    }

    fn move_node(&self, id: NodeId, new_parent_id: NodeId) -> RepoResult<Node> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let ordering = next_ordering(&tx, new_parent_id)?;
        let changed = tx.execute(
            "UPDATE nodes SET parentId = ?2, ordering = ?3 WHERE id = ?1;",
            params![id, new_parent_id, ordering],
        )?;
        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        let node = load_node(&tx, id)?.ok_or(RepoError::NodeNotFound(id))?;
        tx.commit()?;
        Ok(node)
    }

    fn set_ordering(&self, id: NodeId, ordering: i64) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE nodes SET ordering = ?2 WHERE id = ?1;",
            params![id, ordering],
        )?;
        if changed == 0 {
            return Err(RepoError::NodeNotFound(id));
        }
        Ok(())
    }
}

fn load_node(conn: &Connection, id: NodeId) -> RepoResult<Option<Node>> {
    let node = conn
        .query_row(
            &format!("SELECT {NODE_COLUMNS} FROM nodes WHERE id = ?1;"),
            [id],
            parse_node_row,
        )
        .optional()?;
    Ok(node)
}

fn next_ordering(conn: &Connection, parent_id: NodeId) -> RepoResult<i64> {
    // Increment in Rust: SQLite turns an overflowing `MAX + 1` into a REAL.
    let max: Option<i64> = conn.query_row(
        "SELECT MAX(ordering)
         FROM nodes
         WHERE parentId = ?1;",
        [parent_id],
        |row| row.get(0),
    )?;
    match max {
        None => Ok(1),
        Some(max) => max
            .checked_add(1)
            .ok_or(RepoError::OrderingExhausted(parent_id)),
    }
}

fn parse_node_row(row: &Row<'_>) -> rusqlite::Result<Node> {
    Ok(Node {
        id: row.get("id")?,
        parent_id: row.get("parentId")?,
        title: row.get("title")?,
        ordering: row.get("ordering")?,
    })
}

fn ensure_node_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "nodes")? {
        return Err(RepoError::MissingRequiredTable("nodes"));
    }

    for column in ["id", "parentId", "title", "ordering"] {
        if !table_has_column(conn, "nodes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "nodes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
