use std::sync::Arc;

use inventory_panel::{
    models::{Name, NewProduct, Price},
    services::{DataError, DataErrorKind, category_service, product_service},
    state::AppState,
    store::{MemoryStore, Table},
};
use rust_decimal::Decimal;

fn state_with(store: MemoryStore) -> AppState {
    AppState::with_store(Arc::new(store))
}

#[tokio::test]
async fn categories_are_listed_by_name() -> anyhow::Result<()> {
    let state = state_with(MemoryStore::new());
    for name in ["Garden", "books", "Electronics"] {
        category_service::add_category(&state, &Name::parse(name)?).await?;
    }

    let names: Vec<String> = category_service::list_categories(&state)
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, ["Electronics", "Garden", "books"]);
    Ok(())
}

#[tokio::test]
async fn add_category_returns_stored_row() -> anyhow::Result<()> {
    let state = state_with(MemoryStore::new());
    let created = category_service::add_category(&state, &Name::parse("  Tools ")?).await?;
    assert_eq!(created.name, "Tools");

    let listed = category_service::list_categories(&state).await?;
    assert_eq!(listed, vec![created]);
    Ok(())
}

#[tokio::test]
async fn deleting_twice_reports_not_found() -> anyhow::Result<()> {
    let state = state_with(MemoryStore::new());
    let category = category_service::add_category(&state, &Name::parse("Toys")?).await?;

    category_service::delete_category(&state, category.id).await?;
    let err = category_service::delete_category(&state, category.id)
        .await
        .unwrap_err();
    assert_eq!(err, DataError::not_found(Table::Categories, category.id));
    assert!(category_service::list_categories(&state).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn referenced_category_cannot_be_deleted() -> anyhow::Result<()> {
    let state = state_with(MemoryStore::new());
    let category = category_service::add_category(&state, &Name::parse("Books")?).await?;
    let product = NewProduct {
        name: Name::parse("Atlas")?,
        price: Price::parse(Decimal::new(2500, 2))?,
        quantity: 1,
        description: None,
        category_id: category.id,
    };
    product_service::add_product(&state, &product).await?;

    let err = category_service::delete_category(&state, category.id)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::Unknown);
    assert_eq!(category_service::list_categories(&state).await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn denied_table_is_a_permission_error() {
    let state = state_with(MemoryStore::new().deny(Table::Categories));

    let err = category_service::list_categories(&state).await.unwrap_err();
    assert_eq!(
        err,
        DataError::PermissionDenied {
            table: "categories"
        }
    );

    let err = category_service::add_category(&state, &Name::parse("Books").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), DataErrorKind::PermissionDenied);
}
