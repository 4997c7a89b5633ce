//! Database initialization, table definitions and the record store
//!
//! This module handles the setup of the embedded redb database and exposes
//! [`Store`], the only way the rest of the application reads or writes
//! records. Every mutation runs inside a single write transaction, so the
//! ownership and uniqueness checks see the same snapshot the write is applied to.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::access::{can_access, find_user_by_email};
use crate::keygen::{generate_short_key, try_generate_short_key};
use crate::model::{UrlRecord, UserRecord, VisitEvent};

/// Table of short URLs
///
/// Key: short key (e.g., "b2xVn2")
/// Value: JSON-serialized UrlRecord
pub const TABLE_URLS: TableDefinition<&str, &str> = TableDefinition::new("urls_v1");

/// Table of registered users
///
/// Key: user id
/// Value: JSON-serialized UserRecord
pub const TABLE_USERS: TableDefinition<&str, &str> = TableDefinition::new("users_v1");

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Initializes the embedded database and creates required tables
///
/// # Arguments
///
/// * `db_path` - File path where the database should be stored (e.g., "data.db")
///
/// # Example
///
/// ```no_run
/// # use tinylink::database::init_db;
/// let db = init_db("data.db").expect("Failed to initialize database");
/// ```
pub fn init_db(db_path: &str) -> Result<Database, redb::Error> {
    let db = Database::create(db_path)?;

    let write_txn = db.begin_write()?;
    {
        write_txn.open_table(TABLE_URLS)?;
        write_txn.open_table(TABLE_USERS)?;
    }
    write_txn.commit()?;

    Ok(db)
}

/// Repository over the URL and user tables
#[derive(Clone)]
pub struct Store {
    db: Arc<Database>,
}

impl Store {
    pub fn new(db: Database) -> Self {
        Self { db: Arc::new(db) }
    }

    /// Snapshot of every URL record, keyed by short key
    pub fn urls(&self) -> Result<BTreeMap<String, UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_URLS)?;
        collect_records(&table)
    }

    pub fn url(&self, key: &str) -> Result<Option<UrlRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_URLS)?;
        let record = match table.get(key)? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(record)
    }

    /// Stores `record` under a freshly generated short key and returns the key
    pub fn create_url(&self, record: &UrlRecord) -> Result<String, StoreError> {
        let record_json = serde_json::to_string(record)?;

        let write_txn = self.db.begin_write()?;
        let key = {
            let mut table = write_txn.open_table(TABLE_URLS)?;
            let key = try_generate_short_key(|candidate| {
                table.get(candidate).map(|found| found.is_some())
            })?;
            table.insert(key.as_str(), record_json.as_str())?;
            key
        };
        write_txn.commit()?;

        tracing::debug!(key = %key, owner = %record.owner_user_id, "url stored");
        Ok(key)
    }

    /// Replaces the long URL of `key` if `user_id` owns it
    ///
    /// Returns `false`, and writes nothing, when the user may not access the record.
    pub fn update_owned_url(
        &self,
        user_id: &str,
        key: &str,
        long_url: &str,
    ) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut table = write_txn.open_table(TABLE_URLS)?;
            let mut urls: BTreeMap<String, UrlRecord> = collect_records(&table)?;
            let allowed = can_access(user_id, key, &urls);

            match urls.remove(key) {
                Some(mut record) if allowed => {
                    record.long_url = long_url.to_string();
                    let record_json = serde_json::to_string(&record)?;
                    table.insert(key, record_json.as_str())?;
                    true
                }
                _ => false,
            }
        };
        finish(write_txn, updated)
    }

    /// Removes `key` if `user_id` owns it
    pub fn delete_owned_url(&self, user_id: &str, key: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let deleted = {
            let mut table = write_txn.open_table(TABLE_URLS)?;
            let urls: BTreeMap<String, UrlRecord> = collect_records(&table)?;

            if can_access(user_id, key, &urls) {
                table.remove(key)?;
                true
            } else {
                false
            }
        };
        finish(write_txn, deleted)
    }

    /// Appends a visit to `key` and returns its long URL, or `None` for an unknown key
    pub fn record_visit(&self, key: &str, visit: VisitEvent) -> Result<Option<String>, StoreError> {
        let write_txn = self.db.begin_write()?;
        let long_url = {
            let mut table = write_txn.open_table(TABLE_URLS)?;
            let existing: Option<UrlRecord> = match table.get(key)? {
                Some(value) => Some(serde_json::from_str(value.value())?),
                None => None,
            };

            match existing {
                Some(mut record) => {
                    record.visit_histories.push(visit);
                    let record_json = serde_json::to_string(&record)?;
                    table.insert(key, record_json.as_str())?;
                    Some(record.long_url)
                }
                None => None,
            }
        };

        if long_url.is_some() {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(long_url)
    }

    /// Snapshot of every user, keyed by id
    pub fn users(&self) -> Result<BTreeMap<String, UserRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_USERS)?;
        collect_records(&table)
    }

    pub fn user(&self, id: &str) -> Result<Option<UserRecord>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TABLE_USERS)?;
        let user = match table.get(id)? {
            Some(value) => Some(serde_json::from_str(value.value())?),
            None => None,
        };
        Ok(user)
    }

    pub fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut users = self.users()?;
        let id = find_user_by_email(email, &users).map(str::to_string);
        Ok(id.and_then(|id| users.remove(&id)))
    }

    /// Creates a user unless `email` is already registered
    ///
    /// Returns `None` when the email is taken.
    pub fn register_user(
        &self,
        email: &str,
        password_hash: String,
    ) -> Result<Option<UserRecord>, StoreError> {
        let write_txn = self.db.begin_write()?;
        let created = {
            let mut table = write_txn.open_table(TABLE_USERS)?;
            let users: BTreeMap<String, UserRecord> = collect_records(&table)?;

            if find_user_by_email(email, &users).is_some() {
                None
            } else {
                let user = UserRecord {
                    id: generate_short_key(&users),
                    email: email.to_string(),
                    password_hash,
                };
                let user_json = serde_json::to_string(&user)?;
                table.insert(user.id.as_str(), user_json.as_str())?;
                Some(user)
            }
        };

        if created.is_some() {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(created)
    }
}

fn collect_records<T, R>(table: &T) -> Result<BTreeMap<String, R>, StoreError>
where
    T: ReadableTable<&'static str, &'static str>,
    R: DeserializeOwned,
{
    let mut records = BTreeMap::new();
    for entry in table.iter()? {
        let (key, value) = entry?;
        records.insert(key.value().to_string(), serde_json::from_str(value.value())?);
    }
    Ok(records)
}

fn finish(write_txn: WriteTransaction, changed: bool) -> Result<bool, StoreError> {
    if changed {
        write_txn.commit()?;
    } else {
        write_txn.abort()?;
    }
    Ok(changed)
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Store,

    /// Key used to sign the session cookie
    pub cookie_key: Key,

    /// Max-Age of the session cookie
    pub session_max_age: time::Duration,
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
