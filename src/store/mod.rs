//! Table-addressed record store.
//!
//! Every coupon and referral lives in an external store that is reached by
//! table name. The services never talk to a concrete backend; they receive an
//! `Arc<dyn RecordStore>` at construction time.

use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod memory;
pub mod postgrest;

pub use memory::InMemoryStore;
pub use postgrest::PostgrestStore;

pub type Record = Map<String, Value>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Store replied with HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Unique constraint violated on {table}: {message}")]
    Conflict { table: String, message: String },
    #[error("Failed to decode store record: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Store returned no record for {0}")]
    MissingRecord(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single-field equality filter, the only predicate the services issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub value: String,
}

impl Filter {
    pub fn eq(field: &str, value: impl ToString) -> Self {
        Self {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub descending: bool,
}

impl Order {
    pub fn desc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: true,
        }
    }

    pub fn asc(column: &str) -> Self {
        Self {
            column: column.to_string(),
            descending: false,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Inserts one record and returns it as stored, id included.
    async fn insert(&self, table: &str, record: Record) -> StoreResult<Record>;

    async fn select(&self, table: &str, filter: Option<Filter>, order: Option<Order>) -> StoreResult<Vec<Record>>;

    /// Applies `fields` to every record matching `filter` and returns the affected records.
    async fn update(&self, table: &str, filter: Filter, fields: Record) -> StoreResult<Vec<Record>>;

    /// Removes every record matching `filter` and returns what was removed.
    async fn delete(&self, table: &str, filter: Filter) -> StoreResult<Vec<Record>>;
}

/// Renders a JSON scalar the way equality filters compare it.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_text_unquotes_strings() {
        assert_eq!(scalar_text(&json!("ABC123")), "ABC123");
        assert_eq!(scalar_text(&json!(true)), "true");
        assert_eq!(scalar_text(&json!(10.5)), "10.5");
        assert_eq!(scalar_text(&Value::Null), "null");
    }

    #[test]
    fn test_filter_eq_stringifies_value() {
        let filter = Filter::eq("is_used", false);
        assert_eq!(filter.field, "is_used");
        assert_eq!(filter.value, "false");
    }
}
