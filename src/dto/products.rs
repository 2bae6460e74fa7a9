use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    models::{Name, NewProduct, Price, Product, ProductColumns, ValidationError},
    services::stock::check_quantity,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    pub description: Option<String>,
    pub category_id: i64,
}

fn default_quantity() -> i64 {
    1
}

impl CreateProductRequest {
    pub fn validate(self) -> Result<NewProduct, ValidationError> {
        Ok(NewProduct {
            name: Name::parse(&self.name)?,
            price: Price::parse(self.price)?,
            quantity: check_quantity(self.quantity)?,
            description: self.description,
            category_id: self.category_id,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateQuantityRequest {
    pub quantity: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePriceRequest {
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
}

#[derive(Serialize, ToSchema)]
pub struct ProductList {
    pub items: Vec<Product>,
    pub columns: ProductColumns,
}

#[derive(Serialize, ToSchema)]
pub struct CreatedProduct {
    pub id: i64,
}
