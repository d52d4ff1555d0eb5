use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{AuditEntry, Cart, CartStatus, User},
    validation::Validator,
};

use super::auth::MIN_PASSWORD_LEN;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartStatusRequest {
    pub status: CartStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub role: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .required("username", &self.username)
            .max_len("username", &self.username, 64)
            .min_len("password", &self.password, MIN_PASSWORD_LEN)
            .email("email", self.email.as_deref());
        if let Some(role) = self.role.as_deref() {
            if !matches!(role, "admin" | "user") {
                validator.add("role", "must be `admin` or `user`");
            }
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

impl ResetPasswordRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .min_len("new_password", &self.new_password, MIN_PASSWORD_LEN)
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct UserList {
    #[schema(value_type = Vec<User>)]
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AuditLogList {
    #[schema(value_type = Vec<AuditEntry>)]
    pub items: Vec<AuditEntry>,
}

#[derive(Debug, Serialize, ToSchema, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub active: i64,
    pub checkout: i64,
    pub completed: i64,
}

#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub active_products: i64,
    pub active_services: i64,
    pub published_news: i64,
    pub open_contacts: i64,
    pub users: i64,
    pub carts: StatusCounts,
    /// Sum of completed order totals.
    pub revenue: i64,
    /// Sum of submitted but not yet completed order totals.
    pub pending_revenue: i64,
    pub recent_orders: Vec<Cart>,
    pub top_products: Vec<TopProduct>,
}
