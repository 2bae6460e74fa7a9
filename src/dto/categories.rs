use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Category, Name, ValidationError};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<Name, ValidationError> {
        Name::parse(&self.name)
    }
}

#[derive(Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
}
