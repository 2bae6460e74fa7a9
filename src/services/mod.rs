use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::store::{Record, StoreError, Table};

pub mod category_service;
pub mod data_error;
pub mod product_service;
pub mod stock;

pub use data_error::{DataError, DataErrorKind};

pub type DataResult<T> = Result<T, DataError>;

fn failure(operation: &'static str, table: Table, err: StoreError) -> DataError {
    let classified = DataError::classify(table, &err);
    tracing::warn!(
        operation,
        table = table.name(),
        kind = ?classified.kind(),
        error = %err,
        "store request failed"
    );
    classified
}

fn decode<T: DeserializeOwned>(table: Table, record: Record) -> DataResult<T> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        tracing::warn!(table = table.name(), error = %e, "unreadable row");
        DataError::Unknown {
            detail: format!("unreadable {} row: {e}", table.name()),
        }
    })
}
