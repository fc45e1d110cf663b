mod path;
mod schema;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::cell::RefCell;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::error::StoreError;
use crate::session::Session;

pub(crate) use path::{user_root, Collection, CollectionPath, DocPath};

/// A stored document: its id inside the collection plus the JSON body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Document {
    pub id: String,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeKind {
    Added,
    Modified,
    Removed,
}

/// Pushed to every live watcher of the touched collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Change {
    pub collection: String,
    pub doc_id: String,
    pub kind: ChangeKind,
}

struct Watcher {
    collection: String,
    tx: Sender<Change>,
}

/// The signed-in user persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoredSession {
    pub user_id: String,
    pub anonymous: bool,
}

type StoreResult<T> = std::result::Result<T, StoreError>;

/// Per-user JSON document store with live change notifications.
///
/// Documents are addressed by `artifacts/{appId}/users/{userId}/{collection}/{id}`.
/// Every read, write and watch is checked against the caller's session; a
/// session may only touch paths under its own user root. Writes overwrite
/// (last write wins) and notify watchers synchronously.
pub(crate) struct Database {
    conn: Connection,
    watchers: RefCell<Vec<Watcher>>,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .context("Failed to set database pragmas")?;
        let mut db = Self {
            conn,
            watchers: RefCell::new(Vec::new()),
        };
        db.migrate().context("Database migration failed")?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let mut db = Self {
            conn,
            watchers: RefCell::new(Vec::new()),
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::debug!(version = schema::CURRENT_VERSION, "created schema");
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
            tracing::info!(from = current, to = schema::CURRENT_VERSION, "migrated schema");
        }

        Ok(())
    }

    fn check_access(&self, caller: &Session, collection: &CollectionPath) -> StoreResult<()> {
        if caller.can_access(collection) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied(format!(
                "user '{}' cannot access {collection}",
                caller.user_id()
            )))
        }
    }

    fn notify(&self, collection: &CollectionPath, doc_id: &str, kind: ChangeKind) {
        let change = Change {
            collection: collection.as_str().to_string(),
            doc_id: doc_id.to_string(),
            kind,
        };
        // A failed send means the receiver was dropped; the watcher goes with it.
        self.watchers
            .borrow_mut()
            .retain(|w| w.collection != change.collection || w.tx.send(change.clone()).is_ok());
    }

    // ── Subscriptions ─────────────────────────────────────────

    /// Start watching a collection. Dropping the receiver unsubscribes.
    pub(crate) fn watch(
        &self,
        caller: &Session,
        collection: &CollectionPath,
    ) -> StoreResult<Receiver<Change>> {
        self.check_access(caller, collection)?;
        let (tx, rx) = channel();
        self.watchers.borrow_mut().push(Watcher {
            collection: collection.as_str().to_string(),
            tx,
        });
        Ok(rx)
    }

    #[cfg(test)]
    pub(crate) fn watcher_count(&self) -> usize {
        self.watchers.borrow().len()
    }

    // ── Reads ─────────────────────────────────────────────────

    /// All documents in a collection, in insertion order.
    pub(crate) fn list(
        &self,
        caller: &Session,
        collection: &CollectionPath,
    ) -> StoreResult<Vec<Document>> {
        self.check_access(caller, collection)?;
        let mut stmt = self
            .conn
            .prepare("SELECT doc_id, data FROM documents WHERE collection = ?1 ORDER BY rowid")?;
        let rows = stmt.query_map(params![collection.as_str()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        let mut docs = Vec::new();
        for row in rows {
            let (id, raw) = row?;
            match serde_json::from_str(&raw) {
                Ok(data) => docs.push(Document { id, data }),
                Err(err) => tracing::warn!(
                    collection = %collection,
                    doc_id = %id,
                    "skipping unreadable document: {err}"
                ),
            }
        }
        Ok(docs)
    }

    pub(crate) fn get(&self, caller: &Session, doc: &DocPath) -> StoreResult<Option<Document>> {
        self.check_access(caller, &doc.collection)?;
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![doc.collection.as_str(), doc.id],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(Document {
                id: doc.id.clone(),
                data: serde_json::from_str(&raw)?,
            })),
            None => Ok(None),
        }
    }

    // ── Writes ────────────────────────────────────────────────

    /// Insert a document under a fresh id and return that id.
    pub(crate) fn add(
        &self,
        caller: &Session,
        collection: &CollectionPath,
        data: &Value,
    ) -> StoreResult<String> {
        self.check_access(caller, collection)?;
        let id = new_doc_id();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            params![collection.as_str(), id, serde_json::to_string(data)?, now],
        )?;
        tracing::debug!(%collection, doc_id = %id, "added document");
        self.notify(collection, &id, ChangeKind::Added);
        Ok(id)
    }

    /// Insert several documents in one transaction. Watchers see one change per document
    /// only after the whole batch committed.
    pub(crate) fn add_batch(
        &self,
        caller: &Session,
        collection: &CollectionPath,
        items: &[Value],
    ) -> StoreResult<Vec<String>> {
        self.check_access(caller, collection)?;
        let now = chrono::Utc::now().to_rfc3339();
        let tx = self.conn.unchecked_transaction()?;
        let mut ids = Vec::with_capacity(items.len());
        for data in items {
            let id = new_doc_id();
            tx.execute(
                "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![collection.as_str(), id, serde_json::to_string(data)?, now],
            )?;
            ids.push(id);
        }
        tx.commit()?;
        tracing::debug!(%collection, count = ids.len(), "committed batch");
        for id in &ids {
            self.notify(collection, id, ChangeKind::Added);
        }
        Ok(ids)
    }

    /// Create or overwrite a document. With `merge`, top-level fields of an existing
    /// object are kept unless `data` sets them.
    pub(crate) fn set(
        &self,
        caller: &Session,
        doc: &DocPath,
        data: &Value,
        merge: bool,
    ) -> StoreResult<()> {
        self.check_access(caller, &doc.collection)?;
        let existing = self.get(caller, doc)?;
        let body = match (merge, existing.as_ref().map(|d| &d.data), data) {
            (true, Some(Value::Object(old)), Value::Object(new)) => {
                let mut merged = old.clone();
                for (k, v) in new {
                    merged.insert(k.clone(), v.clone());
                }
                Value::Object(merged)
            }
            _ => data.clone(),
        };
        let now = chrono::Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?4)
             ON CONFLICT(collection, doc_id) DO UPDATE SET data = ?3, updated_at = ?4",
            params![doc.collection.as_str(), doc.id, serde_json::to_string(&body)?, now],
        )?;
        let kind = if existing.is_some() {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        self.notify(&doc.collection, &doc.id, kind);
        Ok(())
    }

    /// Overwrite an existing document. Fails with `NotFound` if it is gone.
    pub(crate) fn update(&self, caller: &Session, doc: &DocPath, data: &Value) -> StoreResult<()> {
        if self.get(caller, doc)?.is_none() {
            return Err(StoreError::NotFound(doc.to_string()));
        }
        self.set(caller, doc, data, false)
    }

    /// Returns whether a document was removed.
    pub(crate) fn delete(&self, caller: &Session, doc: &DocPath) -> StoreResult<bool> {
        self.check_access(caller, &doc.collection)?;
        let n = self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2",
            params![doc.collection.as_str(), doc.id],
        )?;
        if n > 0 {
            self.notify(&doc.collection, &doc.id, ChangeKind::Removed);
        }
        Ok(n > 0)
    }

    /// Delete every document whose top-level string `field` equals `value`.
    /// Returns the number of documents removed.
    pub(crate) fn delete_where(
        &self,
        caller: &Session,
        collection: &CollectionPath,
        field: &str,
        value: &str,
    ) -> StoreResult<usize> {
        let victims: Vec<String> = self
            .list(caller, collection)?
            .into_iter()
            .filter(|d| d.data.get(field).and_then(Value::as_str) == Some(value))
            .map(|d| d.id)
            .collect();
        for id in &victims {
            self.delete(caller, &collection.doc(id))?;
        }
        Ok(victims.len())
    }

    // ── Session ───────────────────────────────────────────────

    pub(crate) fn get_session(&self) -> Result<Option<StoredSession>> {
        Ok(self
            .conn
            .query_row(
                "SELECT user_id, anonymous FROM session WHERE id = 1",
                [],
                |row| {
                    Ok(StoredSession {
                        user_id: row.get(0)?,
                        anonymous: row.get(1)?,
                    })
                },
            )
            .optional()?)
    }

    pub(crate) fn save_session(&self, session: &StoredSession) -> Result<()> {
        self.conn.execute(
            "INSERT INTO session (id, user_id, anonymous, signed_in_at) VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET user_id = ?1, anonymous = ?2, signed_in_at = ?3",
            params![
                session.user_id,
                session.anonymous,
                chrono::Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    pub(crate) fn clear_session(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session", [])?;
        Ok(())
    }
}

fn new_doc_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
