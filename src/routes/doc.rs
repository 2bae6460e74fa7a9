use utoipa::{OpenApi, openapi::OpenApi as OpenApiSpec};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        categories::{CategoryList, CreateCategoryRequest},
        products::{
            CreateProductRequest, CreatedProduct, ProductList, UpdatePriceRequest,
            UpdateQuantityRequest,
        },
    },
    models::{Category, InventorySummary, Product, ProductColumns},
    response::{ApiResponse, Meta},
    routes::{categories, health, params, products},
    services::DataErrorKind,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        categories::list_categories,
        categories::create_category,
        categories::delete_category,
        products::list_products,
        products::create_product,
        products::delete_product,
        products::update_quantity,
        products::update_price,
        products::inventory_summary,
    ),
    components(
        schemas(
            Category,
            Product,
            ProductColumns,
            InventorySummary,
            CategoryList,
            CreateCategoryRequest,
            CreateProductRequest,
            CreatedProduct,
            ProductList,
            UpdateQuantityRequest,
            UpdatePriceRequest,
            DataErrorKind,
            params::ProductSortBy,
            params::SortOrder,
            health::HealthData,
            Meta,
            ApiResponse<Category>,
            ApiResponse<CategoryList>,
            ApiResponse<ProductList>,
            ApiResponse<CreatedProduct>,
            ApiResponse<InventorySummary>,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Categories", description = "Category endpoints"),
        (name = "Products", description = "Product and stock endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
