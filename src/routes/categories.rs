use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};

use crate::{
    dto::categories::{CategoryList, CreateCategoryRequest},
    error::AppResult,
    models::Category,
    response::{ApiResponse, Meta},
    services::category_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/{id}", delete(delete_category))
}

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Categories ordered by name", body = ApiResponse<CategoryList>),
        (status = 403, description = "Table not readable with the configured key"),
    ),
    tag = "Categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<CategoryList>>> {
    let items = category_service::list_categories(&state).await?;
    let meta = Meta::total(items.len());
    Ok(Json(ApiResponse::success(
        "Categories",
        CategoryList { items },
        Some(meta),
    )))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = ApiResponse<Category>),
        (status = 400, description = "Blank name"),
    ),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Category>>)> {
    let name = payload.validate()?;
    let category = category_service::add_category(&state, &name).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Category created", category, None)),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(
        ("id" = i64, Path, description = "Category ID")
    ),
    responses(
        (status = 200, description = "Category deleted"),
        (status = 404, description = "No category with that id"),
    ),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    category_service::delete_category(&state, id).await?;
    Ok(Json(ApiResponse::success(
        "Category deleted",
        serde_json::json!({ "id": id }),
        None,
    )))
}
