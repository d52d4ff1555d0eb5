use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::Cart, validation::Validator};

#[derive(Debug, Deserialize, ToSchema, Clone)]
pub struct CheckoutItem {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
    /// Price the client displayed. Advisory only.
    pub price: Option<i64>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct CheckoutRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub district: String,
    #[serde(default)]
    pub ward: String,
    pub note: Option<String>,
    /// Reuse one of the signed-in user's saved addresses.
    pub address_id: Option<Uuid>,
    pub items: Option<Vec<CheckoutItem>>,
    /// Total the client displayed. Advisory only.
    pub total: Option<i64>,
}

impl CheckoutRequest {
    pub fn validate_shipping(&self) -> AppResult<()> {
        Validator::new()
            .required("name", &self.name)
            .required("phone", &self.phone)
            .phone("phone", &self.phone)
            .required("address", &self.address)
            .required("city", &self.city)
            .required("district", &self.district)
            .required("ward", &self.ward)
            .finish()
    }

    pub fn validate_items(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        for (idx, item) in self.items.iter().flatten().enumerate() {
            if item.quantity <= 0 {
                validator.add(&format!("items[{idx}].quantity"), "must be greater than 0");
            }
        }
        validator.finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub success: bool,
    pub cart: Cart,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct OrderList {
    #[schema(value_type = Vec<Cart>)]
    pub items: Vec<Cart>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn fields(result: AppResult<()>) -> Vec<String> {
        match result {
            Err(AppError::Validation(errors)) => errors.into_iter().map(|e| e.field).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn shipping_fields_are_required() {
        let fields = fields(CheckoutRequest::default().validate_shipping());
        assert_eq!(fields, vec!["name", "phone", "address", "city", "district", "ward"]);
    }

    #[test]
    fn item_quantities_must_be_positive() {
        let req = CheckoutRequest {
            items: Some(vec![
                CheckoutItem { product_id: Uuid::new_v4(), quantity: 1, price: None },
                CheckoutItem { product_id: Uuid::new_v4(), quantity: 0, price: None },
            ]),
            ..Default::default()
        };
        assert_eq!(fields(req.validate_items()), vec!["items[1].quantity"]);
    }

    #[test]
    fn items_accept_camel_case_product_id() {
        let id = Uuid::new_v4();
        let body = format!(
            r#"{{"name":"A","items":[{{"productId":"{id}","quantity":2,"price":100000}},{{"product_id":"{id}","quantity":1}}]}}"#
        );
        let req: CheckoutRequest = serde_json::from_str(&body).unwrap();
        let items = req.items.unwrap();
        assert_eq!(items[0].product_id, id);
        assert_eq!(items[0].price, Some(100_000));
        assert_eq!(items[1].product_id, id);
    }
}
