use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Product,
    Service,
    News,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Product => "product",
            CategoryKind::Service => "service",
            CategoryKind::News => "news",
        }
    }
}

impl FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "product" => Ok(CategoryKind::Product),
            "service" => Ok(CategoryKind::Service),
            "news" => Ok(CategoryKind::News),
            other => Err(format!("unknown category kind `{other}`")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct CategoryNode {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub kind: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub sort_order: i32,
    #[schema(no_recursion)]
    pub children: Vec<CategoryNode>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub price: i64,
    pub sale_price: Option<i64>,
    /// Price a cart would capture right now.
    pub effective_price: i64,
    pub category_id: Option<Uuid>,
    pub image_url: Option<String>,
    pub images: Vec<String>,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct RepairService {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub price_from: Option<i64>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort_order: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub summary: Option<String>,
    pub content: String,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
    pub is_published: bool,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Page {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Slider {
    pub id: Uuid,
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Testimonial {
    pub id: Uuid,
    pub customer_name: String,
    pub content: String,
    pub rating: i32,
    pub avatar_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Partner {
    pub id: Uuid,
    pub name: String,
    pub logo_url: String,
    pub website_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Faq {
    pub id: Uuid,
    pub question: String,
    pub answer: String,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct TeamMember {
    pub id: Uuid,
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub sort_order: i32,
    pub is_active: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct StoreSettings {
    pub store_name: String,
    pub phone: String,
    pub hotline: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub working_hours: Option<String>,
    pub facebook_url: Option<String>,
    pub zalo_url: Option<String>,
    pub map_embed_url: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            store_name: "Hoàng Trí Moto".to_string(),
            phone: String::new(),
            hotline: None,
            email: None,
            address: None,
            working_hours: None,
            facebook_url: None,
            zalo_url: None,
            map_embed_url: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Contact {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub service_id: Option<Uuid>,
    pub handled: bool,
    pub handled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Address {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub ward: String,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Lifecycle of a cart. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    Active,
    Checkout,
    Completed,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "ACTIVE",
            CartStatus::Checkout => "CHECKOUT",
            CartStatus::Completed => "COMPLETED",
        }
    }

    pub fn can_transition_to(self, next: CartStatus) -> bool {
        matches!(
            (self, next),
            (CartStatus::Active, CartStatus::Checkout)
                | (CartStatus::Checkout, CartStatus::Completed)
        )
    }
}

impl fmt::Display for CartStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CartStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ACTIVE" => Ok(CartStatus::Active),
            "CHECKOUT" => Ok(CartStatus::Checkout),
            "COMPLETED" => Ok(CartStatus::Completed),
            other => Err(format!("unknown cart status `{other}`")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CartLine {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_slug: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    /// Unit price captured when the line was added.
    pub price: i64,
    pub line_total: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct Cart {
    pub id: Option<Uuid>,
    pub session_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub status: CartStatus,
    pub total: i64,
    pub item_count: i32,
    pub items: Vec<CartLine>,
    pub address: Option<Address>,
    pub note: Option<String>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Cart {
    /// Shape returned when the visitor has not created a cart yet.
    pub fn empty(session_id: Option<String>, user_id: Option<Uuid>) -> Self {
        Self {
            id: None,
            session_id,
            user_id,
            status: CartStatus::Active,
            total: 0,
            item_count: 0,
            items: Vec::new(),
            address: None,
            note: None,
            checked_out_at: None,
            created_at: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    /// Actor's current username; `None` once the account is deleted.
    pub username: Option<String>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_status_only_moves_forward() {
        assert!(CartStatus::Active.can_transition_to(CartStatus::Checkout));
        assert!(CartStatus::Checkout.can_transition_to(CartStatus::Completed));
        assert!(!CartStatus::Active.can_transition_to(CartStatus::Completed));
        assert!(!CartStatus::Completed.can_transition_to(CartStatus::Active));
        assert!(!CartStatus::Checkout.can_transition_to(CartStatus::Checkout));
    }

    #[test]
    fn cart_status_round_trips_through_storage_strings() {
        for status in [CartStatus::Active, CartStatus::Checkout, CartStatus::Completed] {
            assert_eq!(status.as_str().parse::<CartStatus>(), Ok(status));
        }
        assert_eq!("checkout".parse::<CartStatus>(), Ok(CartStatus::Checkout));
        assert!("shipped".parse::<CartStatus>().is_err());
    }

    #[test]
    fn cart_status_serializes_uppercase() {
        let json = serde_json::to_string(&CartStatus::Checkout).unwrap_or_default();
        assert_eq!(json, "\"CHECKOUT\"");
    }

    #[test]
    fn category_kind_parses_known_values() {
        assert_eq!("service".parse::<CategoryKind>(), Ok(CategoryKind::Service));
        assert!("brand".parse::<CategoryKind>().is_err());
    }
}
