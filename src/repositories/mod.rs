use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::store::{Record, StoreError, StoreResult};

pub type DbResult<T> = StoreResult<T>;

pub mod coupon;
pub mod referral;
pub mod usage;

pub(crate) fn to_record<T: Serialize>(entity: &T) -> DbResult<Record> {
    match serde_json::to_value(entity)? {
        Value::Object(record) => Ok(record),
        other => Err(StoreError::Decode(serde::de::Error::custom(format!(
            "expected an object, got {}",
            other
        )))),
    }
}

pub(crate) fn from_record<T: DeserializeOwned>(record: Record) -> DbResult<T> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

pub(crate) fn from_records<T: DeserializeOwned>(records: Vec<Record>) -> DbResult<Vec<T>> {
    records.into_iter().map(from_record).collect()
}

/// Builds a partial record from a `json!` object literal.
pub(crate) fn fields(value: Value) -> Record {
    match value {
        Value::Object(record) => record,
        _ => Record::new(),
    }
}
