use serde::Deserialize;
use utoipa::ToSchema;

use crate::{error::AppResult, validation::Validator};

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateSettingsRequest {
    pub store_name: String,
    pub phone: String,
    pub hotline: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub working_hours: Option<String>,
    pub facebook_url: Option<String>,
    pub zalo_url: Option<String>,
    pub map_embed_url: Option<String>,
}

impl UpdateSettingsRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .required("store_name", &self.store_name)
            .required("phone", &self.phone)
            .phone("phone", &self.phone)
            .email("email", self.email.as_deref());
        if let Some(hotline) = &self.hotline {
            validator.phone("hotline", hotline);
        }
        validator.finish()
    }
}
