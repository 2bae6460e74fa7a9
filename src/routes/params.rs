use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Deserializer};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("unknown sort order '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortBy {
    Id,
    Name,
    Price,
    Quantity,
    Category,
}

impl ProductSortBy {
    pub const ALL: [ProductSortBy; 5] = [
        ProductSortBy::Id,
        ProductSortBy::Name,
        ProductSortBy::Price,
        ProductSortBy::Quantity,
        ProductSortBy::Category,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductSortBy::Id => "id",
            ProductSortBy::Name => "name",
            ProductSortBy::Price => "price",
            ProductSortBy::Quantity => "quantity",
            ProductSortBy::Category => "category",
        }
    }
}

impl FromStr for ProductSortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProductSortBy::ALL
            .into_iter()
            .find(|by| by.as_str() == s)
            .ok_or_else(|| format!("unknown sort column '{s}'"))
    }
}

/// Blank values (as sent by an untouched HTML select) mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    #[serde(default, deserialize_with = "blank_as_none")]
    pub q: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub category_id: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_by: Option<ProductSortBy>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub sort_order: Option<SortOrder>,
}

fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
