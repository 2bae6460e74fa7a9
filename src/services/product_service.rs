use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::Value;

use crate::{
    models::{
        InventorySummary, MISSING_CATEGORY, NewProduct, Price, Product, ProductColumns,
        ProductListing,
    },
    routes::params::{ProductQuery, ProductSortBy, SortOrder},
    state::AppState,
    store::{Direction, Record, SelectQuery, Table, TableStore},
};

use super::{DataError, DataResult, decode, failure};

pub async fn list_products(state: &AppState) -> DataResult<ProductListing> {
    let query = SelectQuery::from(Table::Products)
        .order_by("id", Direction::Desc)
        .embed(Table::Categories, "category_id", &["name"]);
    let rows = state
        .store
        .select(&query)
        .await
        .map_err(|e| failure("list_products", Table::Products, e))?;

    let columns = detect_columns(&rows);
    let items = rows
        .into_iter()
        .map(flatten_product)
        .collect::<DataResult<Vec<_>>>()?;
    Ok(ProductListing { items, columns })
}

pub async fn add_product(state: &AppState, product: &NewProduct) -> DataResult<i64> {
    let mut values = Record::new();
    values.insert("name".into(), Value::from(product.name.as_str()));
    values.insert("price".into(), price_value(product.price));
    values.insert("quantity".into(), Value::from(product.quantity));
    // Left out when blank so the column default applies.
    if let Some(description) = product
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        values.insert("description".into(), Value::from(description));
    }
    values.insert("category_id".into(), Value::from(product.category_id));

    let row = state
        .store
        .insert(Table::Products, values)
        .await
        .map_err(|e| failure("add_product", Table::Products, e))?;
    let id = row
        .get("id")
        .and_then(Value::as_i64)
        .ok_or_else(|| DataError::Unknown {
            detail: "inserted product row has no id".into(),
        })?;
    tracing::info!(id, name = %product.name.as_str(), "product added");
    Ok(id)
}

pub async fn update_product_quantity(state: &AppState, id: i64, quantity: u32) -> DataResult<()> {
    let mut changes = Record::new();
    changes.insert("quantity".into(), Value::from(quantity));
    update_one(state, "update_product_quantity", id, changes).await?;
    tracing::info!(id, quantity, "product quantity updated");
    Ok(())
}

pub async fn update_product_price(state: &AppState, id: i64, price: Price) -> DataResult<()> {
    let mut changes = Record::new();
    changes.insert("price".into(), price_value(price));
    update_one(state, "update_product_price", id, changes).await?;
    tracing::info!(id, price = %price.value(), "product price updated");
    Ok(())
}

pub async fn delete_product(state: &AppState, id: i64) -> DataResult<()> {
    let deleted = state
        .store
        .delete(Table::Products, id)
        .await
        .map_err(|e| failure("delete_product", Table::Products, e))?;
    if deleted.is_empty() {
        return Err(DataError::not_found(Table::Products, id));
    }
    tracing::info!(id, "product deleted");
    Ok(())
}

/// Count, units on hand and Σ price × quantity over `products`.
pub fn summarize(products: &[Product]) -> DataResult<InventorySummary> {
    let total_value = products
        .iter()
        .try_fold(Decimal::ZERO, |total, p| {
            p.stock_value().and_then(|value| total.checked_add(value))
        })
        .ok_or_else(|| {
            tracing::warn!(products = products.len(), "inventory value overflowed");
            DataError::Unknown {
                detail: "total inventory value is too large to compute".into(),
            }
        })?;
    Ok(InventorySummary {
        products: products.len(),
        units: products.iter().map(|p| u64::from(p.on_hand())).sum(),
        total_value,
    })
}

pub fn apply_query(items: &[Product], query: &ProductQuery) -> Vec<Product> {
    let needle = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);

    let mut selected: Vec<Product> = items
        .iter()
        .filter(|p| {
            needle
                .as_deref()
                .is_none_or(|n| p.name.to_lowercase().contains(n))
        })
        .filter(|p| {
            query
                .category_id
                .is_none_or(|id| p.category_id == Some(id))
        })
        .cloned()
        .collect();

    if let Some(sort_by) = query.sort_by {
        let order = query.sort_order.unwrap_or(SortOrder::Asc);
        selected.sort_by(|a, b| {
            let ord = compare_by(sort_by, a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        });
    }
    selected
}

fn compare_by(sort_by: ProductSortBy, a: &Product, b: &Product) -> Ordering {
    match sort_by {
        ProductSortBy::Id => a.id.cmp(&b.id),
        ProductSortBy::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
        ProductSortBy::Price => a.price.cmp(&b.price),
        ProductSortBy::Quantity => a.quantity.cmp(&b.quantity),
        ProductSortBy::Category => a
            .category_name
            .to_lowercase()
            .cmp(&b.category_name.to_lowercase()),
    }
}

async fn update_one(
    state: &AppState,
    operation: &'static str,
    id: i64,
    changes: Record,
) -> DataResult<()> {
    let updated = state
        .store
        .update(Table::Products, id, changes)
        .await
        .map_err(|e| failure(operation, Table::Products, e))?;
    if updated.is_empty() {
        return Err(DataError::not_found(Table::Products, id));
    }
    Ok(())
}

fn price_value(price: Price) -> Value {
    price
        .value()
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn detect_columns(rows: &[Record]) -> ProductColumns {
    match rows.first() {
        Some(row) => ProductColumns {
            quantity: row.contains_key("quantity"),
            description: row.contains_key("description"),
        },
        None => ProductColumns::default(),
    }
}

/// Replaces the embedded category object with a flat `category_name`.
pub fn flatten_product(mut row: Record) -> DataResult<Product> {
    let category_name = row
        .remove(Table::Categories.name())
        .and_then(|nested| {
            nested
                .get("name")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| MISSING_CATEGORY.to_string());
    row.insert("category_name".into(), Value::from(category_name));
    decode(Table::Products, row)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use serde_json::json;

    use super::*;

    fn row(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn product(id: i64, name: &str, price: &str, quantity: Option<i32>, category: &str) -> Product {
        Product {
            id,
            name: name.into(),
            price: Decimal::from_str(price).unwrap(),
            quantity,
            description: None,
            category_id: Some(1),
            category_name: category.into(),
        }
    }

    #[test]
    fn flattens_joined_category_name() {
        let p = flatten_product(row(json!({
            "id": 7, "name": "Lamp", "price": "15.00", "quantity": 3,
            "description": "desk lamp", "category_id": 2,
            "categories": { "name": "Lighting" }
        })))
        .unwrap();
        assert_eq!(p.category_name, "Lighting");
        assert_eq!(p.quantity, Some(3));
    }

    #[test]
    fn missing_category_uses_placeholder() {
        let p = flatten_product(row(json!({
            "id": 7, "name": "Lamp", "price": 15, "category_id": null, "categories": null
        })))
        .unwrap();
        assert_eq!(p.category_name, MISSING_CATEGORY);
        assert_eq!(p.quantity, None);
        assert_eq!(p.description, None);
    }

    #[test]
    fn columns_follow_first_row() {
        let rows = vec![row(json!({ "id": 1, "name": "a", "price": 1, "category_id": 1 }))];
        assert_eq!(
            detect_columns(&rows),
            ProductColumns {
                quantity: false,
                description: false
            }
        );
        assert_eq!(detect_columns(&[]), ProductColumns::default());
    }

    #[test]
    fn summary_sums_price_times_quantity() {
        let items = vec![
            product(1, "a", "2.50", Some(4), "x"),
            product(2, "b", "10", Some(1), "x"),
            product(3, "c", "99", None, "x"),
        ];
        let summary = summarize(&items).unwrap();
        assert_eq!(summary.products, 3);
        assert_eq!(summary.units, 5);
        assert_eq!(summary.total_value, Decimal::from(20));
    }

    #[test]
    fn summary_reports_overflow() {
        let items = vec![
            product(1, "a", "70000000000000000000000000000", Some(1), "x"),
            product(2, "b", "70000000000000000000000000000", Some(1), "x"),
        ];
        let err = summarize(&items).unwrap_err();
        assert_eq!(err.kind(), crate::services::DataErrorKind::Unknown);
    }

    #[test]
    fn query_filters_and_sorts() {
        let items = vec![
            product(1, "Cable", "5", Some(10), "Electronics"),
            product(2, "apple", "1", Some(3), "Food"),
            product(3, "Charger", "20", Some(1), "Electronics"),
        ];
        let query = ProductQuery {
            q: Some("c".into()),
            category_id: None,
            sort_by: Some(ProductSortBy::Price),
            sort_order: Some(SortOrder::Desc),
        };
        let names: Vec<_> = apply_query(&items, &query)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["Charger", "Cable"]);

        let by_name = ProductQuery {
            sort_by: Some(ProductSortBy::Name),
            ..ProductQuery::default()
        };
        let names: Vec<_> = apply_query(&items, &by_name)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, ["apple", "Cable", "Charger"]);
    }
}
