//! SQLite document store
//!
//! Features:
//! - WAL mode so readers don't block the writer
//! - Compare-and-swap replace in a single `UPDATE ... WHERE revision = ?`

use async_trait::async_trait;
use kshelf_core::Package;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use std::path::Path;
use tokio::sync::Mutex;

use super::{PackageStore, Revision, StoredPackage, choose_id};
use crate::error::{StoreError, StoreResult as Result};

/// SQLite-backed package store
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open or create a store at a specific path
    pub fn open_at(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        Self::init(conn)
    }

    /// Open in-memory store (for testing)
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    /// Initialize database schema
    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS packages (
                id INTEGER PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                revision INTEGER NOT NULL,
                document TEXT NOT NULL
            );
            "#,
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn decode(revision: i64, document: &str) -> Result<StoredPackage> {
    Ok(StoredPackage {
        revision: Revision(revision as u64),
        package: serde_json::from_str(document)?,
    })
}

#[async_trait]
impl PackageStore for SqliteStore {
    async fn find_by_name(&self, name: &str) -> Result<StoredPackage> {
        let conn = self.conn.lock().await;
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT revision, document FROM packages WHERE name = ?1",
                [name],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((revision, document)) => decode(revision, &document),
            None => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn find_all(&self) -> Result<Vec<Package>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare("SELECT document FROM packages ORDER BY name")?;
        let documents = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        documents
            .iter()
            .map(|doc| serde_json::from_str(doc).map_err(StoreError::from))
            .collect()
    }

    async fn insert(&self, package: &Package) -> Result<StoredPackage> {
        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;

        let taken: Option<i64> = tx
            .query_row(
                "SELECT id FROM packages WHERE name = ?1",
                [&package.name],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(StoreError::DuplicateKey {
                name: package.name.clone(),
            });
        }

        let ids = {
            let mut stmt = tx.prepare("SELECT id FROM packages")?;
            let ids = stmt
                .query_map([], |row| row.get::<_, i64>(0))?
                .map(|id| id.map(|id| id as u64))
                .collect::<std::result::Result<Vec<u64>, _>>()?;
            ids
        };
        let mut package = package.clone();
        package.id = choose_id(package.id, &ids)?;

        // choose_id keeps ids within i64 range
        tx.execute(
            "INSERT INTO packages (id, name, revision, document) VALUES (?1, ?2, ?3, ?4)",
            params![
                package.id as i64,
                package.name,
                Revision::INITIAL.0 as i64,
                serde_json::to_string(&package)?
            ],
        )?;
        tx.commit()?;

        Ok(StoredPackage {
            revision: Revision::INITIAL,
            package,
        })
    }

    async fn replace_by_name(
        &self,
        name: &str,
        package: &Package,
        expected: Revision,
    ) -> Result<Revision> {
        let conn = self.conn.lock().await;

        let mut package = package.clone();
        package.name = name.to_string();
        let updated = conn.execute(
            "UPDATE packages SET document = ?1, revision = revision + 1 \
             WHERE name = ?2 AND revision = ?3",
            params![serde_json::to_string(&package)?, name, expected.0 as i64],
        )?;

        if updated == 1 {
            return Ok(expected.next());
        }

        let actual: Option<i64> = conn
            .query_row(
                "SELECT revision FROM packages WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .optional()?;

        match actual {
            Some(actual) => Err(StoreError::Conflict {
                name: name.to_string(),
                expected,
                actual: Revision(actual as u64),
            }),
            None => Err(StoreError::NotFound {
                name: name.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::conformance;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_insert_and_find() {
        conformance::insert_and_find(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_assigns_distinct_ids() {
        conformance::assigns_distinct_ids(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_rejects_taken_and_out_of_range_ids() {
        let store = SqliteStore::open_memory().unwrap();
        conformance::rejects_taken_and_out_of_range_ids(&store).await;
    }

    #[tokio::test]
    async fn test_rejects_duplicate_names() {
        conformance::rejects_duplicate_names(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_find_all_sorted() {
        conformance::find_all_sorted(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_replace_with_current_revision() {
        conformance::replace_with_current_revision(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_stale_replace_conflicts() {
        conformance::stale_replace_conflicts(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_replace_missing_is_not_found() {
        conformance::replace_missing_is_not_found(&SqliteStore::open_memory().unwrap()).await;
    }

    #[tokio::test]
    async fn test_open_at_persists() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("db").join("registry.db");
        {
            let store = SqliteStore::open_at(&path).unwrap();
            store.insert(&Package::new("persisted")).await.unwrap();
        }

        let reopened = SqliteStore::open_at(&path).unwrap();
        let found = reopened.find_by_name("persisted").await.unwrap();
        assert_eq!(found.package.id, 1);
    }
}
