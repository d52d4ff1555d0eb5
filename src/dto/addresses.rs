use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{error::AppResult, models::Address, validation::Validator};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAddressRequest {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub district: String,
    pub ward: String,
    #[serde(default)]
    pub is_default: bool,
}

impl CreateAddressRequest {
    pub fn validate(&self) -> AppResult<()> {
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
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAddressRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
    pub is_default: Option<bool>,
}

impl UpdateAddressRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .not_blank("name", self.name.as_deref())
            .not_blank("phone", self.phone.as_deref())
            .not_blank("address", self.address.as_deref())
            .not_blank("city", self.city.as_deref())
            .not_blank("district", self.district.as_deref())
            .not_blank("ward", self.ward.as_deref());
        if let Some(phone) = &self.phone {
            validator.phone("phone", phone);
        }
        validator.finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct AddressList {
    #[schema(value_type = Vec<Address>)]
    pub items: Vec<Address>,
}
