use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, pricing::QuantityMode, validation::Validator};

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    #[serde(alias = "productId")]
    pub product_id: Uuid,
    pub quantity: i32,
    /// `increment` (default) adds to the existing line, `set` overwrites it.
    #[serde(default)]
    pub mode: QuantityMode,
}

impl AddToCartRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .positive("quantity", i64::from(self.quantity))
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_accepts_both_spellings() {
        let id = Uuid::new_v4();
        let camel: AddToCartRequest =
            serde_json::from_str(&format!(r#"{{"productId":"{id}","quantity":2}}"#)).unwrap();
        let snake: AddToCartRequest =
            serde_json::from_str(&format!(r#"{{"product_id":"{id}","quantity":2,"mode":"set"}}"#))
                .unwrap();
        assert_eq!(camel.product_id, id);
        assert_eq!(camel.mode, QuantityMode::Increment);
        assert_eq!(snake.product_id, id);
        assert_eq!(snake.mode, QuantityMode::Set);
    }
}
