use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::AppConfig;

pub mod memory;
pub mod rest;
pub mod sql;

pub use memory::MemoryStore;
pub use rest::RestStore;
pub use sql::SqlStore;

pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Table {
    Categories,
    Products,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Categories => "categories",
            Table::Products => "products",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Follows `foreign_key` on the selected table to `table.id` and attaches the
/// listed columns as a nested object under the key `table.name()`, or `null`
/// when no row matches.
#[derive(Debug, Clone)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct SelectQuery {
    pub table: Table,
    pub filters: Vec<(String, Value)>,
    pub order: Option<(String, Direction)>,
    pub embed: Option<Embed>,
}

impl SelectQuery {
    pub fn from(table: Table) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            embed: None,
        }
    }

    pub fn eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filters.push((column.to_string(), value.into()));
        self
    }

    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some((column.to_string(), direction));
        self
    }

    pub fn embed(mut self, table: Table, foreign_key: &str, columns: &[&str]) -> Self {
        self.embed = Some(Embed {
            table,
            foreign_key: foreign_key.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{message} (SQLSTATE {code})")]
    Database { code: String, message: String },

    #[error("HTTP {status}: {message}")]
    Http {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("connection: {0}")]
    Connection(String),

    #[error("decode: {0}")]
    Decode(String),

    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn code(&self) -> Option<&str> {
        match self {
            StoreError::Database { code, .. } => Some(code),
            StoreError::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub fn http_status(&self) -> Option<u16> {
        match self {
            StoreError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[async_trait]
pub trait TableStore: Send + Sync {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError>;

    async fn insert(&self, table: Table, values: Record) -> Result<Record, StoreError>;

    async fn update(&self, table: Table, id: i64, changes: Record)
    -> Result<Vec<Record>, StoreError>;

    async fn delete(&self, table: Table, id: i64) -> Result<Vec<Record>, StoreError>;
}

// postgres:// -> SqlStore, http(s):// -> RestStore (PostgREST), memory:// -> MemoryStore
pub async fn connect(url: &str, key: &str) -> Result<Arc<dyn TableStore>, StoreError> {
    let scheme = url.split("://").next().unwrap_or_default().to_ascii_lowercase();
    let store: Arc<dyn TableStore> = match scheme.as_str() {
        "postgres" | "postgresql" => Arc::new(SqlStore::connect(url, key).await?),
        "http" | "https" => Arc::new(RestStore::new(url, key)?),
        "memory" => Arc::new(MemoryStore::new()),
        other => {
            return Err(StoreError::Connection(format!(
                "unsupported store scheme '{other}' in STORE_URL"
            )));
        }
    };
    tracing::info!(backend = %scheme, "store connection established");
    Ok(store)
}

#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<HandleInner>,
}

struct HandleInner {
    url: String,
    key: String,
    store: OnceCell<Arc<dyn TableStore>>,
}

impl StoreHandle {
    pub fn lazy(config: &AppConfig) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                url: config.store_url.clone(),
                key: config.store_key.clone(),
                store: OnceCell::new(),
            }),
        }
    }

    pub fn ready(store: Arc<dyn TableStore>) -> Self {
        Self {
            inner: Arc::new(HandleInner {
                url: String::new(),
                key: String::new(),
                store: OnceCell::from(store),
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.store.initialized()
    }

    pub async fn get(&self) -> Result<Arc<dyn TableStore>, StoreError> {
        let store = self
            .inner
            .store
            .get_or_try_init(|| connect(&self.inner.url, &self.inner.key))
            .await?;
        Ok(Arc::clone(store))
    }
}

#[async_trait]
impl TableStore for StoreHandle {
    async fn select(&self, query: &SelectQuery) -> Result<Vec<Record>, StoreError> {
        self.get().await?.select(query).await
    }

    async fn insert(&self, table: Table, values: Record) -> Result<Record, StoreError> {
        self.get().await?.insert(table, values).await
    }

    async fn update(
        &self,
        table: Table,
        id: i64,
        changes: Record,
    ) -> Result<Vec<Record>, StoreError> {
        self.get().await?.update(table, id, changes).await
    }

    async fn delete(&self, table: Table, id: i64) -> Result<Vec<Record>, StoreError> {
        self.get().await?.delete(table, id).await
    }
}

pub(crate) fn check_identifier(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::Other(format!("invalid column name '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lazy_handle_connects_once() {
        let config = AppConfig {
            store_url: "memory://".into(),
            store_key: "unused".into(),
            host: "127.0.0.1".into(),
            port: 0,
        };
        let handle = StoreHandle::lazy(&config);
        assert!(!handle.is_connected());

        let first = handle.get().await.unwrap();
        let second = handle.clone().get().await.unwrap();
        assert!(handle.is_connected());
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn unknown_scheme_is_a_connection_error() {
        let err = connect("ftp://example.com", "k").await.err().unwrap();
        assert!(matches!(err, StoreError::Connection(_)));
    }

    #[test]
    fn identifiers_are_checked() {
        assert!(check_identifier("category_id").is_ok());
        assert!(check_identifier("name; drop table").is_err());
        assert!(check_identifier("").is_err());
    }
}
