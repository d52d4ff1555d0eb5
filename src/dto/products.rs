use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::Product, validation::Validator};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    pub slug: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl CreateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .required("name", &self.name)
            .max_len("name", &self.name, 255)
            .non_negative("price", self.price);
        if let Some(sale) = self.sale_price {
            validator.non_negative("sale_price", sale);
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub sku: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub content: Option<Option<String>>,
    pub price: Option<i64>,
    /// `null` clears the sale price.
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i64>)]
    pub sale_price: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    /// When present the whole image set is replaced.
    pub images: Option<Vec<String>>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl UpdateProductRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator.not_blank("name", self.name.as_deref());
        if let Some(price) = self.price {
            validator.non_negative("price", price);
        }
        if let Some(Some(sale)) = self.sale_price {
            validator.non_negative("sale_price", sale);
        }
        validator.finish()
    }
}

#[derive(Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<Product>)]
    pub items: Vec<Product>,
}
