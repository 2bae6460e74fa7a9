use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::{StoreError, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DataErrorKind {
    PermissionDenied,
    SchemaMismatch,
    NotFound,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataError {
    #[error(
        "permission denied: the store refused access to table '{table}'. Check its row-level security policies"
    )]
    PermissionDenied { table: &'static str },

    #[error("schema mismatch: a referenced table or column does not exist in the store ({detail})")]
    SchemaMismatch { detail: String },

    #[error("not found: no row with id {id} in table '{table}'")]
    NotFound { table: &'static str, id: i64 },

    #[error("unexpected store error: {detail}")]
    Unknown { detail: String },
}

impl DataError {
    pub fn kind(&self) -> DataErrorKind {
        match self {
            DataError::PermissionDenied { .. } => DataErrorKind::PermissionDenied,
            DataError::SchemaMismatch { .. } => DataErrorKind::SchemaMismatch,
            DataError::NotFound { .. } => DataErrorKind::NotFound,
            DataError::Unknown { .. } => DataErrorKind::Unknown,
        }
    }

    pub fn not_found(table: Table, id: i64) -> Self {
        DataError::NotFound {
            table: table.name(),
            id,
        }
    }

    /// Classifies a raw store fault raised while working on `table`.
    pub fn classify(table: Table, err: &StoreError) -> Self {
        let detail = err.to_string();
        let lowered = detail.to_ascii_lowercase();

        let permission = DataError::PermissionDenied {
            table: table.name(),
        };
        let schema = DataError::SchemaMismatch {
            detail: detail.clone(),
        };

        match err.code() {
            Some("42501") => return permission,
            // undefined table / column; PostgREST schema-cache misses
            Some("42P01" | "42703" | "PGRST204" | "PGRST205" | "PGRST200") => return schema,
            _ => {}
        }
        match err.http_status() {
            Some(401 | 403) => return permission,
            Some(404) => return schema,
            _ => {}
        }
        if lowered.contains("permission denied") || lowered.contains("row-level security") {
            return permission;
        }
        if lowered.contains("does not exist") {
            return schema;
        }
        DataError::Unknown { detail }
    }
}
