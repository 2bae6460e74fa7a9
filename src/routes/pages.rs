use std::str::FromStr;

use axum::{
    Form, Router,
    extract::{Path, Query, State, rejection::QueryRejection},
    response::{Html, Redirect},
    routing::{get, post},
};
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::{Category, Name, NewProduct, Price, ProductListing, ValidationError},
    routes::params::ProductQuery,
    services::{
        category_service, product_service,
        stock::{Adjustment, Movement, check_quantity},
    },
    state::AppState,
    views::{self, Level, Notice, Notices, products::ProductsView},
};

const PRODUCTS: &str = "/products";
const CATEGORIES: &str = "/categories";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to(PRODUCTS) }))
        .route(PRODUCTS, get(products_page).post(create_product))
        .route("/products/delete", post(delete_product))
        .route("/products/{id}/quantity", post(adjust_quantity))
        .route("/products/{id}/price", post(update_price))
        .route(CATEGORIES, get(categories_page).post(create_category))
        .route("/categories/{id}/delete", post(delete_category))
}

#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub level: Option<Level>,
    pub notice: Option<String>,
}

impl FlashQuery {
    fn into_notices(self) -> Notices {
        let mut notices = Notices::default();
        if let Some(text) = self.notice.filter(|t| !t.is_empty()) {
            notices.push(Notice::new(self.level.unwrap_or(Level::Info), text));
        }
        notices
    }
}

fn lenient<T: Default>(query: Result<Query<T>, QueryRejection>, notices: &mut Notices) -> T {
    match query {
        Ok(Query(value)) => value,
        Err(rejection) => {
            notices.push(Notice::new(
                Level::Warning,
                format!("Ignored invalid query parameters: {}", rejection.body_text()),
            ));
            T::default()
        }
    }
}

#[derive(Debug, Default)]
pub struct Snapshot {
    pub categories: Vec<Category>,
    pub products: ProductListing,
}

// A failed read leaves that part empty and adds a notice.
pub async fn reload(state: &AppState, notices: &mut Notices) -> Snapshot {
    let categories = notices.recover(category_service::list_categories(state).await);
    let products = notices.recover(product_service::list_products(state).await);
    Snapshot {
        categories,
        products,
    }
}

async fn products_page(
    State(state): State<AppState>,
    query: Result<Query<ProductQuery>, QueryRejection>,
    flash: Result<Query<FlashQuery>, QueryRejection>,
) -> Html<String> {
    let mut warnings = Notices::default();
    let flash = lenient(flash, &mut warnings);
    let query = lenient(query, &mut warnings);
    let mut notices = flash.into_notices();
    notices.extend(warnings);
    let snapshot = reload(&state, &mut notices).await;

    let summary = notices.recover(product_service::summarize(&snapshot.products.items));
    let visible = product_service::apply_query(&snapshot.products.items, &query);
    let view = ProductsView {
        categories: &snapshot.categories,
        products: &snapshot.products.items,
        visible: &visible,
        columns: snapshot.products.columns,
        summary: &summary,
        query: &query,
    };
    Html(views::products::render(&view, &notices))
}

async fn categories_page(
    State(state): State<AppState>,
    flash: Result<Query<FlashQuery>, QueryRejection>,
) -> Html<String> {
    let mut warnings = Notices::default();
    let mut notices = lenient(flash, &mut warnings).into_notices();
    notices.extend(warnings);
    let snapshot = reload(&state, &mut notices).await;
    Html(views::categories::render(&snapshot.categories, &notices))
}

#[derive(Debug, Deserialize)]
pub struct CategoryForm {
    #[serde(default)]
    pub name: String,
}

async fn create_category(State(state): State<AppState>, Form(form): Form<CategoryForm>) -> Redirect {
    let outcome = async {
        let name = Name::parse(&form.name)?;
        let category = category_service::add_category(&state, &name).await?;
        Ok::<_, AppError>(format!("Category added: {}", category.name))
    }
    .await;
    finish(CATEGORIES, outcome)
}

async fn delete_category(State(state): State<AppState>, Path(id): Path<i64>) -> Redirect {
    let outcome = category_service::delete_category(&state, id)
        .await
        .map(|()| "Category deleted.".to_string())
        .map_err(AppError::from);
    finish(CATEGORIES, outcome)
}

#[derive(Debug, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category_id: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub description: String,
}

impl ProductForm {
    pub fn validate(&self) -> Result<NewProduct, ValidationError> {
        let name = Name::parse(&self.name)?;
        let category_id = match self.category_id.trim() {
            "" => return Err(ValidationError::MissingCategory),
            raw => parse_number::<i64>("category", raw)?,
        };
        let price = Price::parse(parse_number::<Decimal>("price", &self.price)?)?;
        let quantity = check_quantity(parse_number::<i64>("quantity", &self.quantity)?)?;
        let description = Some(self.description.trim().to_string()).filter(|d| !d.is_empty());
        Ok(NewProduct {
            name,
            price,
            quantity,
            description,
            category_id,
        })
    }
}

async fn create_product(State(state): State<AppState>, Form(form): Form<ProductForm>) -> Redirect {
    let outcome = async {
        let product = form.validate()?;
        product_service::add_product(&state, &product).await?;
        Ok::<_, AppError>(format!("Product added: {}", product.name.as_str()))
    }
    .await;
    finish(PRODUCTS, outcome)
}

#[derive(Debug, Deserialize)]
pub struct DeleteProductForm {
    #[serde(default)]
    pub product_id: String,
}

async fn delete_product(
    State(state): State<AppState>,
    Form(form): Form<DeleteProductForm>,
) -> Redirect {
    let outcome = async {
        let id = parse_number::<i64>("product", &form.product_id)?;
        product_service::delete_product(&state, id).await?;
        Ok::<_, AppError>("Product deleted.".to_string())
    }
    .await;
    finish(PRODUCTS, outcome)
}

#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub movement: Movement,
    #[serde(default)]
    pub amount: String,
    /// Quantity the user saw when submitting.
    #[serde(default)]
    pub on_hand: String,
}

impl QuantityForm {
    pub fn target(&self) -> Result<u32, ValidationError> {
        let amount = parse_number::<u32>("amount", &self.amount)?;
        let on_hand = parse_number::<u32>("quantity", &self.on_hand)?;
        let adjustment = match self.movement {
            Movement::Increment => Adjustment::increment(amount),
            Movement::Decrement => Adjustment::decrement(amount),
        };
        adjustment.apply(on_hand)
    }
}

async fn adjust_quantity(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    let outcome = async {
        let quantity = form.target()?;
        product_service::update_product_quantity(&state, id, quantity).await?;
        Ok::<_, AppError>(format!("Quantity set to {quantity}."))
    }
    .await;
    finish(PRODUCTS, outcome)
}

#[derive(Debug, Deserialize)]
pub struct PriceForm {
    #[serde(default)]
    pub price: String,
}

async fn update_price(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<PriceForm>,
) -> Redirect {
    let outcome = async {
        let price = Price::parse(parse_number::<Decimal>("price", &form.price)?)?;
        product_service::update_product_price(&state, id, price).await?;
        Ok::<_, AppError>(format!("Price set to {:.2}.", price.value()))
    }
    .await;
    finish(PRODUCTS, outcome)
}

fn parse_number<T: FromStr>(field: &'static str, raw: &str) -> Result<T, ValidationError> {
    raw.trim()
        .parse()
        .map_err(|_| ValidationError::NotANumber(field))
}

fn finish(path: &str, outcome: Result<String, AppError>) -> Redirect {
    let notice = match outcome {
        Ok(message) => Notice::new(Level::Success, message),
        Err(AppError::Invalid(err)) => Notice::new(Level::Warning, err.to_string()),
        Err(err) => Notice::new(Level::Error, err.to_string()),
    };
    Redirect::to(&flash_location(path, &notice))
}

pub fn flash_location(path: &str, notice: &Notice) -> String {
    let Ok(mut url) = Url::parse("http://panel.local") else {
        return path.to_string();
    };
    url.set_path(path);
    url.query_pairs_mut()
        .append_pair("level", notice.level.as_str())
        .append_pair("notice", &notice.text);
    match url.query() {
        Some(query) => format!("{path}?{query}"),
        None => path.to_string(),
    }
}
