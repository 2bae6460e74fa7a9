use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub const MISSING_CATEGORY: &str = "---";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[schema(value_type = String, example = "19.99")]
    pub price: Decimal,
    pub quantity: Option<i32>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
    pub category_name: String,
}

impl Product {
    pub fn on_hand(&self) -> u32 {
        self.quantity.map_or(0, |q| q.max(0) as u32)
    }

    /// `None` when price × quantity does not fit a `Decimal`.
    pub fn stock_value(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.on_hand()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct ProductColumns {
    pub quantity: bool,
    pub description: bool,
}

impl Default for ProductColumns {
    fn default() -> Self {
        Self {
            quantity: true,
            description: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ProductListing {
    pub items: Vec<Product>,
    pub columns: ProductColumns,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct InventorySummary {
    pub products: usize,
    pub units: u64,
    #[schema(value_type = String, example = "1250.00")]
    pub total_value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("price must not be negative")]
    NegativePrice,

    #[error("price must be below 10000000000.00")]
    PriceTooLarge,

    #[error("quantity must not be negative")]
    NegativeQuantity,

    #[error("quantity is too large")]
    QuantityTooLarge,

    #[error("amount must be greater than 0")]
    ZeroAmount,

    #[error("{0} must be a number")]
    NotANumber(&'static str),

    #[error("a category must be selected")]
    MissingCategory,

    #[error("insufficient stock: {requested} requested but only {on_hand} on hand")]
    InsufficientStock { on_hand: u32, requested: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Name(String);

impl Name {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Upper bound of the `NUMERIC(12, 2)` price column.
pub const MAX_PRICE: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 2); // 1_000_000_000_000 at scale 2

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Price(Decimal);

impl Price {
    pub fn parse(value: Decimal) -> Result<Self, ValidationError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(ValidationError::NegativePrice);
        }
        let rounded = value.round_dp(2);
        if rounded >= MAX_PRICE {
            return Err(ValidationError::PriceTooLarge);
        }
        Ok(Self(rounded))
    }

    pub fn value(self) -> Decimal {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: Name,
    pub price: Price,
    pub quantity: u32,
    pub description: Option<String>,
    pub category_id: i64,
}
