use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, patch},
};

use crate::{
    dto::products::{
        CreateProductRequest, CreatedProduct, ProductList, UpdatePriceRequest,
        UpdateQuantityRequest,
    },
    error::AppResult,
    models::{InventorySummary, Price},
    response::{ApiResponse, Meta},
    routes::params::ProductQuery,
    services::{product_service, stock::check_quantity},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/{id}", delete(delete_product))
        .route("/{id}/quantity", patch(update_quantity))
        .route("/{id}/price", patch(update_price))
}

#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products with their category names", body = ApiResponse<ProductList>),
        (status = 403, description = "Table not readable with the configured key"),
        (status = 500, description = "Store schema does not match"),
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<ApiResponse<ProductList>>> {
    let listing = product_service::list_products(&state).await?;
    let items = product_service::apply_query(&listing.items, &query);
    let meta = Meta::total(items.len());
    let data = ProductList {
        items,
        columns: listing.columns,
    };
    Ok(Json(ApiResponse::success("Products", data, Some(meta))))
}

#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = ApiResponse<CreatedProduct>),
        (status = 400, description = "Invalid field"),
    ),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<CreatedProduct>>)> {
    let product = payload.validate()?;
    let id = product_service::add_product(&state, &product).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "Product created",
            CreatedProduct { id },
            None,
        )),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product deleted"),
        (status = 404, description = "No product with that id"),
    ),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    product_service::delete_product(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Product deleted",
        serde_json::json!({ "id": id }),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/quantity",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdateQuantityRequest,
    responses(
        (status = 200, description = "Quantity replaced"),
        (status = 400, description = "Negative or oversized quantity"),
        (status = 404, description = "No product with that id"),
    ),
    tag = "Products"
)]
pub async fn update_quantity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let quantity = check_quantity(payload.quantity)?;
    product_service::update_product_quantity(&state, id, quantity).await?;
    Ok(Json(ApiResponse::success(
        "Quantity updated",
        serde_json::json!({ "id": id, "quantity": quantity }),
        None,
    )))
}

#[utoipa::path(
    patch,
    path = "/api/products/{id}/price",
    params(
        ("id" = i64, Path, description = "Product ID")
    ),
    request_body = UpdatePriceRequest,
    responses(
        (status = 200, description = "Price replaced"),
        (status = 400, description = "Negative price"),
        (status = 404, description = "No product with that id"),
    ),
    tag = "Products"
)]
pub async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePriceRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let price = Price::parse(payload.price)?;
    product_service::update_product_price(&state, id, price).await?;
    Ok(Json(ApiResponse::success(
        "Price updated",
        serde_json::json!({ "id": id, "price": price.value().to_string() }),
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/summary",
    responses(
        (status = 200, description = "Product count, units on hand and stock value", body = ApiResponse<InventorySummary>),
    ),
    tag = "Products"
)]
pub async fn inventory_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<InventorySummary>>> {
    let listing = product_service::list_products(&state).await?;
    let summary = product_service::summarize(&listing.items)?;
    Ok(Json(ApiResponse::success("Inventory summary", summary, None)))
}
