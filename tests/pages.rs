use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use inventory_panel::{
    models::{Name, NewProduct, Price},
    routes::create_router,
    services::{category_service, product_service},
    state::AppState,
    store::{MemoryStore, Table, TableStore},
};
use rust_decimal::Decimal;
use tower::ServiceExt;

fn app(store: Arc<MemoryStore>) -> (Router, AppState) {
    let state = AppState::with_store(store);
    (create_router().with_state(state.clone()), state)
}

async fn get_html(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_form(app: &Router, uri: &str, form: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(form.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &str) -> StatusCode {
    app.clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
        .status()
}

async fn stocked_product(state: &AppState, cents: i64, quantity: u32) -> i64 {
    let category = category_service::add_category(state, &Name::parse("Hardware").unwrap())
        .await
        .unwrap();
    let product = NewProduct {
        name: Name::parse("Hammer").unwrap(),
        price: Price::parse(Decimal::new(cents, 2)).unwrap(),
        quantity,
        description: None,
        category_id: category.id,
    };
    product_service::add_product(state, &product).await.unwrap()
}

#[tokio::test]
async fn products_page_without_categories_shows_warning() {
    let (app, _) = app(Arc::new(MemoryStore::new()));
    let (status, html) = get_html(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("id=\"no-categories\""));
    assert!(!html.contains("id=\"create-product\""));
}

#[tokio::test]
async fn products_page_offers_existing_categories() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let category = category_service::add_category(&state, &Name::parse("Electronics").unwrap())
        .await
        .unwrap();

    let (_, html) = get_html(&app, "/products").await;
    assert!(html.contains("id=\"create-product\""));
    assert!(html.contains(&format!(
        "<option value=\"{}\">Electronics</option>",
        category.id
    )));
}

#[tokio::test]
async fn created_product_appears_after_redirect() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let category = category_service::add_category(&state, &Name::parse("Books").unwrap())
        .await
        .unwrap();

    let location = post_form(
        &app,
        "/products",
        &format!(
            "name=Field+Guide&category_id={}&price=18.5&quantity=3&description=",
            category.id
        ),
    )
    .await;
    assert!(location.starts_with("/products?level=success"));

    let (_, html) = get_html(&app, &location).await;
    assert!(html.contains("Product added: Field Guide"));
    assert!(html.contains("<td>Field Guide</td><td>18.50</td>"));
    assert!(html.contains("<td>Books</td>"));
    assert!(html.contains("<strong>55.50</strong>"));
}

#[tokio::test]
async fn rejected_form_never_reaches_the_store() {
    let store = Arc::new(MemoryStore::new());
    let (app, state) = app(Arc::clone(&store));
    category_service::add_category(&state, &Name::parse("Tools").unwrap())
        .await
        .unwrap();
    let before = store.calls();

    let location = post_form(
        &app,
        "/products/1/quantity",
        "movement=decrement&amount=5&on_hand=2",
    )
    .await;
    assert!(location.starts_with("/products?level=warning"));
    assert!(location.contains("insufficient+stock"));

    let location = post_form(&app, "/products", "name=++&category_id=1&price=1&quantity=1").await;
    assert!(location.starts_with("/products?level=warning"));

    assert_eq!(store.calls(), before);
}

#[tokio::test]
async fn deleting_a_category_twice_reports_not_found() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let category = category_service::add_category(&state, &Name::parse("Garden").unwrap())
        .await
        .unwrap();
    let uri = format!("/categories/{}/delete", category.id);

    let first = post_form(&app, &uri, "").await;
    assert!(first.starts_with("/categories?level=success"));
    let second = post_form(&app, &uri, "").await;
    assert!(second.starts_with("/categories?level=error"));
    assert!(second.contains("not+found"));
}

#[tokio::test]
async fn unreadable_table_renders_an_error_notice() {
    let (app, _) = app(Arc::new(MemoryStore::new().deny(Table::Products)));
    let (status, html) = get_html(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("notice error"));
    assert!(html.contains("permission denied"));
    assert!(html.contains("id=\"no-products\""));
}

#[tokio::test]
async fn root_redirects_to_products() {
    let (app, _) = app(Arc::new(MemoryStore::new()));
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/products");
}

#[tokio::test]
async fn api_reports_error_kinds() {
    let (app, _) = app(Arc::new(MemoryStore::new()));
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/categories")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"Audio"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/products/42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["kind"], "not_found");
}

#[tokio::test]
async fn quantity_forms_write_the_new_stock() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let id = stocked_product(&state, 400, 3).await;
    let uri = format!("/products/{id}/quantity");

    let location = post_form(&app, &uri, "movement=decrement&amount=3&on_hand=3").await;
    assert!(location.starts_with("/products?level=success"));
    let listing = product_service::list_products(&state).await.unwrap();
    assert_eq!(listing.items[0].quantity, Some(0));
    let (_, html) = get_html(&app, &location).await;
    assert!(html.contains("Quantity set to 0."));
    assert!(html.contains("id=\"metric-value\"><strong>0.00</strong>"));

    let location = post_form(&app, &uri, "movement=increment&amount=5&on_hand=0").await;
    assert!(location.starts_with("/products?level=success"));
    let listing = product_service::list_products(&state).await.unwrap();
    assert_eq!(listing.items[0].quantity, Some(5));
    let (_, html) = get_html(&app, "/products").await;
    assert!(html.contains("id=\"metric-value\"><strong>20.00</strong>"));
}

#[tokio::test]
async fn oversized_price_is_rejected() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let category = category_service::add_category(&state, &Name::parse("Bulk").unwrap())
        .await
        .unwrap();
    let body = format!(
        r#"{{"name":"Vault","price":"50000000000000000000","quantity":2000000000,"category_id":{}}}"#,
        category.id
    );
    assert_eq!(
        send_json(&app, "POST", "/api/products", &body).await,
        StatusCode::BAD_REQUEST
    );
    assert!(product_service::list_products(&state).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn overflowing_stock_value_degrades_to_a_notice() {
    let (app, state) = app(Arc::new(MemoryStore::new()));
    let category = category_service::add_category(&state, &Name::parse("Bulk").unwrap())
        .await
        .unwrap();
    let row = serde_json::json!({
        "name": "Vault", "price": 5e19, "quantity": 2_000_000_000,
        "category_id": category.id
    });
    state
        .store
        .insert(Table::Products, row.as_object().cloned().unwrap())
        .await
        .unwrap();

    let (status, html) = get_html(&app, "/products").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("notice error"));
    assert!(html.contains("too large to compute"));
    assert!(html.contains("<td>Vault</td>"));

    assert_eq!(
        send_json(&app, "GET", "/api/summary", "").await,
        StatusCode::BAD_GATEWAY
    );
}

#[tokio::test]
async fn malformed_query_parameters_are_ignored() {
    let (app, _) = app(Arc::new(MemoryStore::new()));

    let (status, html) = get_html(&app, "/products?level=bogus&notice=hi&sort_by=colour").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("notice warning"));
    assert!(html.contains("Ignored invalid query parameters"));
    assert!(html.contains("id=\"listing-controls\""));

    let (status, html) = get_html(&app, "/categories?level=bogus").await;
    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("Ignored invalid query parameters"));
}
