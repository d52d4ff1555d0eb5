//! Ordered homepage collections: sliders, testimonials, partners, FAQs and team members.

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::content::{
        CreateFaqRequest, CreatePartnerRequest, CreateSliderRequest, CreateTeamMemberRequest,
        CreateTestimonialRequest, FaqList, PartnerList, SliderList, TeamMemberList,
        TestimonialList, UpdateFaqRequest, UpdatePartnerRequest, UpdateSliderRequest,
        UpdateTeamMemberRequest, UpdateTestimonialRequest,
    },
    entity::{faqs, partners, sliders, team_members, testimonials},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Faq, Partner, Slider, TeamMember, Testimonial},
    response::{ApiResponse, Meta},
    state::AppState,
};

const DEFAULT_RATING: i32 = 5;

fn list_meta(len: usize) -> Option<Meta> {
    let total = len as i64;
    Some(Meta::new(1, total, total))
}

async fn delete_row<E>(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    resource: &str,
) -> AppResult<ApiResponse<serde_json::Value>>
where
    E: EntityTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
{
    ensure_admin(user)?;
    let result = E::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        &format!("{resource}_delete"),
        resource,
        serde_json::json!({ "id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

// Sliders

pub async fn list_sliders(state: &AppState) -> AppResult<ApiResponse<SliderList>> {
    load_sliders(state, true).await
}

pub async fn admin_list_sliders(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<SliderList>> {
    ensure_admin(user)?;
    load_sliders(state, false).await
}

async fn load_sliders(state: &AppState, active_only: bool) -> AppResult<ApiResponse<SliderList>> {
    let mut select = sliders::Entity::find();
    if active_only {
        select = select.filter(sliders::Column::IsActive.eq(true));
    }
    let items: Vec<Slider> = select
        .order_by_asc(sliders::Column::SortOrder)
        .order_by_asc(sliders::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(slider_from_entity)
        .collect();
    let meta = list_meta(items.len());
    Ok(ApiResponse::success("Sliders", SliderList { items }, meta))
}

pub async fn create_slider(
    state: &AppState,
    user: &AuthUser,
    payload: CreateSliderRequest,
) -> AppResult<ApiResponse<Slider>> {
    ensure_admin(user)?;
    payload.validate()?;
    let model = sliders::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(payload.title.trim().to_string()),
        subtitle: Set(payload.subtitle),
        image_url: Set(payload.image_url.trim().to_string()),
        link_url: Set(payload.link_url),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "Slider created",
        slider_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_slider(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateSliderRequest,
) -> AppResult<ApiResponse<Slider>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = sliders::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: sliders::ActiveModel = existing.into();
    if let Some(title) = payload.title {
        active.title = Set(title.trim().to_string());
    }
    if let Some(subtitle) = payload.subtitle {
        active.subtitle = Set(subtitle);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url.trim().to_string());
    }
    if let Some(link_url) = payload.link_url {
        active.link_url = Set(link_url);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        slider_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_slider(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    delete_row::<sliders::Entity>(state, user, id, "sliders").await
}

fn slider_from_entity(model: sliders::Model) -> Slider {
    Slider {
        id: model.id,
        title: model.title,
        subtitle: model.subtitle,
        image_url: model.image_url,
        link_url: model.link_url,
        sort_order: model.sort_order,
        is_active: model.is_active,
    }
}

// Testimonials

pub async fn list_testimonials(state: &AppState) -> AppResult<ApiResponse<TestimonialList>> {
    load_testimonials(state, true).await
}

pub async fn admin_list_testimonials(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<TestimonialList>> {
    ensure_admin(user)?;
    load_testimonials(state, false).await
}

async fn load_testimonials(
    state: &AppState,
    active_only: bool,
) -> AppResult<ApiResponse<TestimonialList>> {
    let mut select = testimonials::Entity::find();
    if active_only {
        select = select.filter(testimonials::Column::IsActive.eq(true));
    }
    let items: Vec<Testimonial> = select
        .order_by_asc(testimonials::Column::SortOrder)
        .order_by_desc(testimonials::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(testimonial_from_entity)
        .collect();
    let meta = list_meta(items.len());
    Ok(ApiResponse::success("Testimonials", TestimonialList { items }, meta))
}

pub async fn create_testimonial(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    ensure_admin(user)?;
    payload.validate()?;
    let model = testimonials::ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_name: Set(payload.customer_name.trim().to_string()),
        content: Set(payload.content),
        rating: Set(payload.rating.unwrap_or(DEFAULT_RATING)),
        avatar_url: Set(payload.avatar_url),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "Testimonial created",
        testimonial_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTestimonialRequest,
) -> AppResult<ApiResponse<Testimonial>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = testimonials::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: testimonials::ActiveModel = existing.into();
    if let Some(customer_name) = payload.customer_name {
        active.customer_name = Set(customer_name.trim().to_string());
    }
    if let Some(content) = payload.content {
        active.content = Set(content);
    }
    if let Some(rating) = payload.rating {
        active.rating = Set(rating);
    }
    if let Some(avatar_url) = payload.avatar_url {
        active.avatar_url = Set(avatar_url);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        testimonial_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_testimonial(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    delete_row::<testimonials::Entity>(state, user, id, "testimonials").await
}

fn testimonial_from_entity(model: testimonials::Model) -> Testimonial {
    Testimonial {
        id: model.id,
        customer_name: model.customer_name,
        content: model.content,
        rating: model.rating,
        avatar_url: model.avatar_url,
        sort_order: model.sort_order,
        is_active: model.is_active,
    }
}

// Partners

pub async fn list_partners(state: &AppState) -> AppResult<ApiResponse<PartnerList>> {
    load_partners(state, true).await
}

pub async fn admin_list_partners(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<PartnerList>> {
    ensure_admin(user)?;
    load_partners(state, false).await
}

async fn load_partners(state: &AppState, active_only: bool) -> AppResult<ApiResponse<PartnerList>> {
    let mut select = partners::Entity::find();
    if active_only {
        select = select.filter(partners::Column::IsActive.eq(true));
    }
    let items: Vec<Partner> = select
        .order_by_asc(partners::Column::SortOrder)
        .order_by_asc(partners::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(partner_from_entity)
        .collect();
    let meta = list_meta(items.len());
    Ok(ApiResponse::success("Partners", PartnerList { items }, meta))
}

pub async fn create_partner(
    state: &AppState,
    user: &AuthUser,
    payload: CreatePartnerRequest,
) -> AppResult<ApiResponse<Partner>> {
    ensure_admin(user)?;
    payload.validate()?;
    let model = partners::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        logo_url: Set(payload.logo_url.trim().to_string()),
        website_url: Set(payload.website_url),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "Partner created",
        partner_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_partner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdatePartnerRequest,
) -> AppResult<ApiResponse<Partner>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = partners::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: partners::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(logo_url) = payload.logo_url {
        active.logo_url = Set(logo_url.trim().to_string());
    }
    if let Some(website_url) = payload.website_url {
        active.website_url = Set(website_url);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        partner_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_partner(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    delete_row::<partners::Entity>(state, user, id, "partners").await
}

fn partner_from_entity(model: partners::Model) -> Partner {
    Partner {
        id: model.id,
        name: model.name,
        logo_url: model.logo_url,
        website_url: model.website_url,
        sort_order: model.sort_order,
        is_active: model.is_active,
    }
}

// FAQs

pub async fn list_faqs(state: &AppState) -> AppResult<ApiResponse<FaqList>> {
    load_faqs(state, true).await
}

pub async fn admin_list_faqs(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<FaqList>> {
    ensure_admin(user)?;
    load_faqs(state, false).await
}

async fn load_faqs(state: &AppState, active_only: bool) -> AppResult<ApiResponse<FaqList>> {
    let mut select = faqs::Entity::find();
    if active_only {
        select = select.filter(faqs::Column::IsActive.eq(true));
    }
    let items: Vec<Faq> = select
        .order_by_asc(faqs::Column::SortOrder)
        .order_by_asc(faqs::Column::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(faq_from_entity)
        .collect();
    let meta = list_meta(items.len());
    Ok(ApiResponse::success("FAQs", FaqList { items }, meta))
}

pub async fn create_faq(
    state: &AppState,
    user: &AuthUser,
    payload: CreateFaqRequest,
) -> AppResult<ApiResponse<Faq>> {
    ensure_admin(user)?;
    payload.validate()?;
    let model = faqs::ActiveModel {
        id: Set(Uuid::new_v4()),
        question: Set(payload.question.trim().to_string()),
        answer: Set(payload.answer),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "FAQ created",
        faq_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_faq(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateFaqRequest,
) -> AppResult<ApiResponse<Faq>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = faqs::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: faqs::ActiveModel = existing.into();
    if let Some(question) = payload.question {
        active.question = Set(question.trim().to_string());
    }
    if let Some(answer) = payload.answer {
        active.answer = Set(answer);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        faq_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_faq(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    delete_row::<faqs::Entity>(state, user, id, "faqs").await
}

fn faq_from_entity(model: faqs::Model) -> Faq {
    Faq {
        id: model.id,
        question: model.question,
        answer: model.answer,
        sort_order: model.sort_order,
        is_active: model.is_active,
    }
}

// Team members

pub async fn list_team_members(state: &AppState) -> AppResult<ApiResponse<TeamMemberList>> {
    load_team_members(state, true).await
}

pub async fn admin_list_team_members(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<TeamMemberList>> {
    ensure_admin(user)?;
    load_team_members(state, false).await
}

async fn load_team_members(
    state: &AppState,
    active_only: bool,
) -> AppResult<ApiResponse<TeamMemberList>> {
    let mut select = team_members::Entity::find();
    if active_only {
        select = select.filter(team_members::Column::IsActive.eq(true));
    }
    let items: Vec<TeamMember> = select
        .order_by_asc(team_members::Column::SortOrder)
        .order_by_asc(team_members::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(team_member_from_entity)
        .collect();
    let meta = list_meta(items.len());
    Ok(ApiResponse::success("Team members", TeamMemberList { items }, meta))
}

pub async fn create_team_member(
    state: &AppState,
    user: &AuthUser,
    payload: CreateTeamMemberRequest,
) -> AppResult<ApiResponse<TeamMember>> {
    ensure_admin(user)?;
    payload.validate()?;
    let model = team_members::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        position: Set(payload.position.trim().to_string()),
        bio: Set(payload.bio),
        avatar_url: Set(payload.avatar_url),
        sort_order: Set(payload.sort_order.unwrap_or(0)),
        is_active: Set(payload.is_active.unwrap_or(true)),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&state.orm)
    .await?;
    Ok(ApiResponse::success(
        "Team member created",
        team_member_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn update_team_member(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateTeamMemberRequest,
) -> AppResult<ApiResponse<TeamMember>> {
    ensure_admin(user)?;
    payload.validate()?;
    let existing = team_members::Entity::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: team_members::ActiveModel = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(position) = payload.position {
        active.position = Set(position.trim().to_string());
    }
    if let Some(bio) = payload.bio {
        active.bio = Set(bio);
    }
    if let Some(avatar_url) = payload.avatar_url {
        active.avatar_url = Set(avatar_url);
    }
    if let Some(sort_order) = payload.sort_order {
        active.sort_order = Set(sort_order);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    active.updated_at = Set(Utc::now().into());
    let model = active.update(&state.orm).await?;
    Ok(ApiResponse::success(
        "Updated",
        team_member_from_entity(model),
        Some(Meta::empty()),
    ))
}

pub async fn delete_team_member(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    delete_row::<team_members::Entity>(state, user, id, "team_members").await
}

fn team_member_from_entity(model: team_members::Model) -> TeamMember {
    TeamMember {
        id: model.id,
        name: model.name,
        position: model.position,
        bio: model.bio,
        avatar_url: model.avatar_url,
        sort_order: model.sort_order,
        is_active: model.is_active,
    }
}
