use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{scalar_text, Filter, Order, Record, RecordStore, StoreError, StoreResult};

/// Process-local store with the same contract as the hosted one.
///
/// Unique columns are enforced per table so that duplicate coupon codes are
/// rejected at insert time exactly like the database constraint would.
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<HashMap<String, Vec<Record>>>,
    unique_columns: Vec<(String, String)>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::with_unique_columns(&[("coupons", "code"), ("coupon_usage_tracking", "coupon_code")])
    }

    pub fn with_unique_columns(columns: &[(&str, &str)]) -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            unique_columns: columns
                .iter()
                .map(|(table, column)| (table.to_string(), column.to_string()))
                .collect(),
        }
    }

    fn matches(record: &Record, filter: &Filter) -> bool {
        record
            .get(&filter.field)
            .map(|value| scalar_text(value) == filter.value)
            .unwrap_or(false)
    }

    fn unique_violation(&self, table: &str, rows: &[Record], candidate: &Record, skip: Option<usize>) -> Option<String> {
        for (unique_table, column) in &self.unique_columns {
            if unique_table != table {
                continue;
            }
            let Some(value) = candidate.get(column).filter(|v| !v.is_null()) else {
                continue;
            };
            let clash = rows
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .any(|(_, row)| row.get(column) == Some(value));
            if clash {
                return Some(format!("duplicate key value for {} = {}", column, scalar_text(value)));
            }
        }
        None
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, table: &str, mut record: Record) -> StoreResult<Record> {
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        if record.get("id").map_or(true, Value::is_null) {
            record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
        }

        if let Some(message) = self.unique_violation(table, rows, &record, None) {
            return Err(StoreError::Conflict {
                table: table.to_string(),
                message,
            });
        }

        rows.push(record.clone());
        Ok(record)
    }

    async fn select(&self, table: &str, filter: Option<Filter>, order: Option<Order>) -> StoreResult<Vec<Record>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Record> = tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| filter.as_ref().map_or(true, |f| Self::matches(row, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = order {
            rows.sort_by(|a, b| {
                let left = a.get(&order.column).map(scalar_text).unwrap_or_default();
                let right = b.get(&order.column).map(scalar_text).unwrap_or_default();
                if order.descending {
                    right.cmp(&left)
                } else {
                    left.cmp(&right)
                }
            });
        }

        Ok(rows)
    }

    async fn update(&self, table: &str, filter: Filter, fields: Record) -> StoreResult<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let targets: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| Self::matches(row, &filter))
            .map(|(index, _)| index)
            .collect();

        for &index in &targets {
            let mut candidate = rows[index].clone();
            candidate.extend(fields.clone());
            if let Some(message) = self.unique_violation(table, rows, &candidate, Some(index)) {
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                    message,
                });
            }
        }

        let mut affected = Vec::with_capacity(targets.len());
        for index in targets {
            rows[index].extend(fields.clone());
            affected.push(rows[index].clone());
        }

        Ok(affected)
    }

    async fn delete(&self, table: &str, filter: Filter) -> StoreResult<Vec<Record>> {
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(table) else {
            return Ok(Vec::new());
        };

        let (removed, kept): (Vec<Record>, Vec<Record>) =
            rows.drain(..).partition(|row| Self::matches(row, &filter));
        *rows = kept;

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_id_when_missing() {
        let store = InMemoryStore::new();

        let stored = store
            .insert("referrals", record(json!({"referrer_email": "a@x.com"})))
            .await
            .unwrap();

        let id = stored.get("id").and_then(Value::as_str).unwrap();
        assert!(Uuid::parse_str(id).is_ok());
    }

    #[tokio::test]
    async fn test_insert_rejects_duplicate_coupon_code() {
        let store = InMemoryStore::new();
        store.insert("coupons", record(json!({"code": "SAVE10"}))).await.unwrap();

        let result = store.insert("coupons", record(json!({"code": "SAVE10"}))).await;

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        let rows = store.select("coupons", None, None).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_select_filters_on_non_string_values() {
        let store = InMemoryStore::new();
        store
            .insert("coupons", record(json!({"code": "A1", "is_used": true})))
            .await
            .unwrap();
        store
            .insert("coupons", record(json!({"code": "B2", "is_used": false})))
            .await
            .unwrap();

        let used = store
            .select("coupons", Some(Filter::eq("is_used", true)), None)
            .await
            .unwrap();

        assert_eq!(used.len(), 1);
        assert_eq!(used[0]["code"], json!("A1"));
    }

    #[tokio::test]
    async fn test_select_orders_descending() {
        let store = InMemoryStore::new();
        for (code, created) in [("A", "2024-01-01"), ("B", "2024-03-01"), ("C", "2024-02-01")] {
            store
                .insert("coupons", record(json!({"code": code, "created_at": created})))
                .await
                .unwrap();
        }

        let rows = store
            .select("coupons", None, Some(Order::desc("created_at")))
            .await
            .unwrap();

        let codes: Vec<&str> = rows.iter().map(|r| r["code"].as_str().unwrap()).collect();
        assert_eq!(codes, vec!["B", "C", "A"]);
    }

    #[tokio::test]
    async fn test_update_merges_fields_and_returns_affected() {
        let store = InMemoryStore::new();
        store
            .insert("coupons", record(json!({"id": "c1", "code": "A", "is_used": false})))
            .await
            .unwrap();

        let affected = store
            .update("coupons", Filter::eq("id", "c1"), record(json!({"is_used": true})))
            .await
            .unwrap();

        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0]["is_used"], json!(true));
        assert_eq!(affected[0]["code"], json!("A"));

        let missing = store
            .update("coupons", Filter::eq("id", "nope"), record(json!({"is_used": true})))
            .await
            .unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_code_collision() {
        let store = InMemoryStore::new();
        store.insert("coupons", record(json!({"id": "c1", "code": "A"}))).await.unwrap();
        store.insert("coupons", record(json!({"id": "c2", "code": "B"}))).await.unwrap();

        let result = store
            .update("coupons", Filter::eq("id", "c2"), record(json!({"code": "A"})))
            .await;

        assert!(matches!(result, Err(StoreError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_delete_removes_only_matching_rows() {
        let store = InMemoryStore::new();
        store.insert("coupons", record(json!({"id": "c1", "code": "A"}))).await.unwrap();
        store.insert("coupons", record(json!({"id": "c2", "code": "B"}))).await.unwrap();

        let removed = store.delete("coupons", Filter::eq("id", "c1")).await.unwrap();
        assert_eq!(removed.len(), 1);

        let remaining = store.select("coupons", None, None).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0]["id"], json!("c2"));

        let removed_again = store.delete("coupons", Filter::eq("id", "c1")).await.unwrap();
        assert!(removed_again.is_empty());
    }
}
