//! SQLite-backed library store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::{CatalogEntry, CatalogProvider, EntityKind, EntityStore, Image, StoreError, Studio};

/// SQLite-backed store for every catalog kind plus images.
pub struct SqliteLibrary {
    conn: Mutex<Connection>,
}

impl SqliteLibrary {
    /// Open (or create) a library database at `path`.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory library (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        let mut sql = String::new();
        for kind in EntityKind::ALL {
            sql.push_str(&format!(
                r#"
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                aliases TEXT NOT NULL DEFAULT '[]',
                added_on INTEGER NOT NULL
            );
            "#,
                table = table_name(kind)
            ));
        }
        sql.push_str(
            r#"
            CREATE TABLE IF NOT EXISTS images (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                path TEXT,
                added_on INTEGER NOT NULL
            );
            "#,
        );

        conn.execute_batch(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|e| StoreError::Internal(format!("connection lock poisoned: {}", e)))
    }

    /// Insert or replace a catalog entry of `kind`.
    pub fn insert_entry(&self, kind: EntityKind, entry: &CatalogEntry) -> Result<(), StoreError> {
        let aliases = serde_json::to_string(&entry.aliases)
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (id, name, aliases, added_on) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, aliases = excluded.aliases",
                table_name(kind)
            ),
            params![
                entry.id,
                entry.name,
                aliases,
                Utc::now().timestamp_millis()
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// Fetch a studio by id.
    pub fn get_studio(&self, id: &str) -> Result<Studio, StoreError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT id, name, aliases, added_on FROM studios WHERE id = ?",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let (id, name, aliases, added_on) =
            row.ok_or_else(|| StoreError::NotFound(format!("studio {}", id)))?;
        Ok(Studio {
            id,
            name,
            aliases: parse_aliases(&aliases)?,
            added_on,
        })
    }

    /// Fetch an image by id.
    pub fn get_image(&self, id: &str) -> Result<Image, StoreError> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT id, name, path, added_on FROM images WHERE id = ?",
            params![id],
            |row| {
                Ok(Image {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    path: row.get(2)?,
                    added_on: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(|e| StoreError::Database(e.to_string()))?
        .ok_or_else(|| StoreError::NotFound(format!("image {}", id)))
    }

    fn load_entries(conn: &Connection, kind: EntityKind) -> Result<Vec<CatalogEntry>, StoreError> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT id, name, aliases FROM {} ORDER BY rowid",
                table_name(kind)
            ))
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut entries = Vec::new();
        for row in rows {
            let (id, name, aliases) = row.map_err(|e| StoreError::Database(e.to_string()))?;
            entries.push(CatalogEntry {
                id,
                name,
                aliases: parse_aliases(&aliases)?,
            });
        }
        Ok(entries)
    }
}

fn table_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Actor => "actors",
        EntityKind::Studio => "studios",
        EntityKind::Label => "labels",
        EntityKind::Scene => "scenes",
        EntityKind::Movie => "movies",
        EntityKind::CustomField => "custom_fields",
    }
}

fn parse_aliases(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw)
        .map_err(|e| StoreError::Database(format!("malformed aliases column: {}", e)))
}

#[async_trait]
impl CatalogProvider for SqliteLibrary {
    async fn get_all(&self, kind: EntityKind) -> Result<Vec<CatalogEntry>, StoreError> {
        let conn = self.lock()?;
        Self::load_entries(&conn, kind)
    }
}

#[async_trait]
impl EntityStore for SqliteLibrary {
    async fn upsert_studio(&self, studio: &Studio) -> Result<(), StoreError> {
        let aliases = serde_json::to_string(&studio.aliases)
            .map_err(|e| StoreError::Internal(e.to_string()))?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO studios (id, name, aliases, added_on) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, aliases = excluded.aliases",
            params![studio.id, studio.name, aliases, studio.added_on],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_image(&self, image: &Image) -> Result<(), StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO images (id, name, path, added_on) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET name = excluded.name, path = excluded.path",
            params![image.id, image.name, image.path, image.added_on],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }
}
