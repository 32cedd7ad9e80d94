use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use crate::{
    config::StoreConfig,
    metrics::track_store_call,
    store::{Filter, Order, Record, RecordStore, StoreError, StoreResult},
};

/// Postgres error code for unique violations, as echoed by PostgREST.
const UNIQUE_VIOLATION: &str = "23505";

/// Record store backed by a hosted Postgres exposed through PostgREST.
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl PostgrestStore {
    pub fn new(config: &StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Prefer", "return=representation")
    }

    fn filter_query(filter: &Filter) -> (String, String) {
        (filter.field.clone(), format!("eq.{}", filter.value))
    }

    async fn read_records(table: &str, response: Response) -> StoreResult<Vec<Record>> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            let unique_violation = match error_code(&message) {
                Some(code) => code == UNIQUE_VIOLATION,
                None => status.as_u16() == 409,
            };
            if unique_violation {
                return Err(StoreError::Conflict {
                    table: table.to_string(),
                    message,
                });
            }
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let records: Vec<Record> = serde_json::from_str(&body)?;
        Ok(records)
    }
}

/// Postgres error code from a PostgREST error body, when the body is JSON.
fn error_code(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value.get("code")?.as_str().map(str::to_string)
}

#[async_trait]
impl RecordStore for PostgrestStore {
    async fn insert(&self, table: &str, record: Record) -> StoreResult<Record> {
        track_store_call(table, "insert", async {
            debug!("Inserting into {}", table);
            let response = self.request(Method::POST, table).json(&Value::Object(record)).send().await?;

            Self::read_records(table, response)
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::MissingRecord(table.to_string()))
        })
        .await
    }

    async fn select(&self, table: &str, filter: Option<Filter>, order: Option<Order>) -> StoreResult<Vec<Record>> {
        track_store_call(table, "select", async {
            let mut query = vec![("select".to_string(), "*".to_string())];
            if let Some(filter) = &filter {
                query.push(Self::filter_query(filter));
            }
            if let Some(order) = &order {
                let direction = if order.descending { "desc" } else { "asc" };
                query.push(("order".to_string(), format!("{}.{}", order.column, direction)));
            }

            debug!("Selecting from {} with {:?}", table, query);
            let response = self.request(Method::GET, table).query(&query).send().await?;

            Self::read_records(table, response).await
        })
        .await
    }

    async fn update(&self, table: &str, filter: Filter, fields: Record) -> StoreResult<Vec<Record>> {
        track_store_call(table, "update", async {
            debug!("Updating {} where {} = {}", table, filter.field, filter.value);
            let response = self
                .request(Method::PATCH, table)
                .query(&[Self::filter_query(&filter)])
                .json(&Value::Object(fields))
                .send()
                .await?;

            Self::read_records(table, response).await
        })
        .await
    }

    async fn delete(&self, table: &str, filter: Filter) -> StoreResult<Vec<Record>> {
        track_store_call(table, "delete", async {
            debug!("Deleting from {} where {} = {}", table, filter.field, filter.value);
            let response = self
                .request(Method::DELETE, table)
                .query(&[Self::filter_query(&filter)])
                .send()
                .await?;

            Self::read_records(table, response).await
        })
        .await
    }
}
