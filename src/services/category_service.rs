use serde_json::Value;

use crate::{
    models::{Category, Name},
    state::AppState,
    store::{Direction, Record, SelectQuery, Table, TableStore},
};

use super::{DataError, DataResult, decode, failure};

pub async fn list_categories(state: &AppState) -> DataResult<Vec<Category>> {
    let query = SelectQuery::from(Table::Categories).order_by("name", Direction::Asc);
    let rows = state
        .store
        .select(&query)
        .await
        .map_err(|e| failure("list_categories", Table::Categories, e))?;

    rows.into_iter()
        .map(|row| decode(Table::Categories, row))
        .collect()
}

pub async fn add_category(state: &AppState, name: &Name) -> DataResult<Category> {
    let mut values = Record::new();
    values.insert("name".into(), Value::from(name.as_str()));

    let row = state
        .store
        .insert(Table::Categories, values)
        .await
        .map_err(|e| failure("add_category", Table::Categories, e))?;
    let category: Category = decode(Table::Categories, row)?;
    tracing::info!(id = category.id, name = %category.name, "category added");
    Ok(category)
}

pub async fn delete_category(state: &AppState, id: i64) -> DataResult<()> {
    let deleted = state
        .store
        .delete(Table::Categories, id)
        .await
        .map_err(|e| failure("delete_category", Table::Categories, e))?;
    if deleted.is_empty() {
        return Err(DataError::not_found(Table::Categories, id));
    }
    tracing::info!(id, "category deleted");
    Ok(())
}
