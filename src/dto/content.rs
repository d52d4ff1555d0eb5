//! Request bodies for the ordered homepage collections.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::{Faq, Partner, Slider, TeamMember, Testimonial},
    validation::Validator,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateSliderRequest {
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: String,
    pub link_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateSliderRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("title", &self.title)
            .required("image_url", &self.image_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateSliderRequest {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub subtitle: Option<Option<String>>,
    pub image_url: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub link_url: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateSliderRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("title", self.title.as_deref())
            .not_blank("image_url", self.image_url.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTestimonialRequest {
    pub customer_name: String,
    pub content: String,
    pub rating: Option<i32>,
    pub avatar_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateTestimonialRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .required("customer_name", &self.customer_name)
            .required("content", &self.content);
        if let Some(rating) = self.rating {
            validator.range("rating", i64::from(rating), 1, 5);
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateTestimonialRequest {
    pub customer_name: Option<String>,
    pub content: Option<String>,
    pub rating: Option<i32>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateTestimonialRequest {
    pub fn validate(&self) -> AppResult<()> {
        let mut validator = Validator::new();
        validator
            .not_blank("customer_name", self.customer_name.as_deref())
            .not_blank("content", self.content.as_deref());
        if let Some(rating) = self.rating {
            validator.range("rating", i64::from(rating), 1, 5);
        }
        validator.finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreatePartnerRequest {
    pub name: String,
    pub logo_url: String,
    pub website_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreatePartnerRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("name", &self.name)
            .required("logo_url", &self.logo_url)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdatePartnerRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub website_url: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdatePartnerRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("name", self.name.as_deref())
            .not_blank("logo_url", self.logo_url.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateFaqRequest {
    pub question: String,
    pub answer: String,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateFaqRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("question", &self.question)
            .required("answer", &self.answer)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateFaqRequest {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateFaqRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("question", self.question.as_deref())
            .not_blank("answer", self.answer.as_deref())
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTeamMemberRequest {
    pub name: String,
    pub position: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl CreateTeamMemberRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .required("name", &self.name)
            .required("position", &self.position)
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct UpdateTeamMemberRequest {
    pub name: Option<String>,
    pub position: Option<String>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub bio: Option<Option<String>>,
    #[serde(default, deserialize_with = "super::double_option")]
    #[schema(value_type = Option<String>)]
    pub avatar_url: Option<Option<String>>,
    pub sort_order: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdateTeamMemberRequest {
    pub fn validate(&self) -> AppResult<()> {
        Validator::new()
            .not_blank("name", self.name.as_deref())
            .not_blank("position", self.position.as_deref())
            .finish()
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct SliderList {
    #[schema(value_type = Vec<Slider>)]
    pub items: Vec<Slider>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TestimonialList {
    #[schema(value_type = Vec<Testimonial>)]
    pub items: Vec<Testimonial>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct PartnerList {
    #[schema(value_type = Vec<Partner>)]
    pub items: Vec<Partner>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct FaqList {
    #[schema(value_type = Vec<Faq>)]
    pub items: Vec<Faq>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct TeamMemberList {
    #[schema(value_type = Vec<TeamMember>)]
    pub items: Vec<TeamMember>,
}
