//! Request bodies for repair services, news and static pages.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{NewsArticle, Page, RepairService},
    validation::Validator,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateServiceRequest {
    pub name: String,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub price_from: Option<i64>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl CreateServiceRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator.required("name", &self.name);
        if let Some(price) = self.price_from {
            validator.non_negative("price_from", price);
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub content: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<i64>)]
    pub price_from: Option<Option<i64>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
}

impl UpdateServiceRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator.not_blank("name", self.name.as_deref());
        if let Some(Some(price)) = self.price_from {
            validator.non_negative("price_from", price);
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateNewsRequest {
    pub title: String,
    pub slug: Option<String>,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub is_featured: bool,
}

impl CreateNewsRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("title", &self.title)
            .required("content", &self.content)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub summary: Option<Option<String>>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub category_id: Option<Option<Uuid>>,
    pub is_published: Option<bool>,
    pub is_featured: Option<bool>,
}

impl UpdateNewsRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("title", self.title.as_deref())
            .not_blank("content", self.content.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePageRequest {
    pub title: String,
    pub slug: Option<String>,
    pub content: String,
    pub is_active: Option<bool>,
}

impl CreatePageRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("title", &self.title)
            .required("content", &self.content)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub content: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePageRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("title", self.title.as_deref())
            .not_blank("content", self.content.as_deref())
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ServiceList {
    #[schema(value_type = Vec<RepairService>)]
    pub items: Vec<RepairService>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct NewsList {
    #[schema(value_type = Vec<NewsArticle>)]
    pub items: Vec<NewsArticle>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PageList {
    #[schema(value_type = Vec<Page>)]
    pub items: Vec<Page>,
}
