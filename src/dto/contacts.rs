use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{error::AppResult, models::Contact, validation::Validator};

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct CreateContactRequest {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    /// Service the visitor is asking about, if any.
    pub service_id: Option<Uuid>,
}

impl CreateContactRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("name", &self.name)
            .max_len("name", &self.name, 255)
            .required("phone", &self.phone)
            .phone("phone", &self.phone)
            .email("email", self.email.as_deref())
            .required("message", &self.message)
            .max_len("message", &self.message, 5000)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateContactRequest {
    pub handled: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ContactList {
    #[schema(value_type = Vec<Contact>)]
    pub items: Vec<Contact>,
}
