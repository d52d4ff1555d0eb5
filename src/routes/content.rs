//! Homepage content blocks: sliders, testimonials, partners, FAQs and team members.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, put},
};
use uuid::Uuid;

use crate::{
    dto::content::{
        CreateFaqRequest, CreatePartnerRequest, CreateSliderRequest, CreateTeamMemberRequest,
        CreateTestimonialRequest, FaqList, PartnerList, SliderList, TeamMemberList,
        TestimonialList, UpdateFaqRequest, UpdatePartnerRequest, UpdateSliderRequest,
        UpdateTeamMemberRequest, UpdateTestimonialRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    middleware::json::Json,
    models::{Faq, Partner, Slider, TeamMember, Testimonial},
    response::ApiResponse,
    services::content_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sliders", get(list_sliders))
        .route("/testimonials", get(list_testimonials))
        .route("/partners", get(list_partners))
        .route("/faqs", get(list_faqs))
        .route("/team-members", get(list_team_members))
}

pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/sliders", get(admin_list_sliders).post(create_slider))
        .route("/sliders/{id}", put(update_slider).delete(delete_slider))
        .route(
            "/testimonials",
            get(admin_list_testimonials).post(create_testimonial),
        )
        .route(
            "/testimonials/{id}",
            put(update_testimonial).delete(delete_testimonial),
        )
        .route("/partners", get(admin_list_partners).post(create_partner))
        .route("/partners/{id}", put(update_partner).delete(delete_partner))
        .route("/faqs", get(admin_list_faqs).post(create_faq))
        .route("/faqs/{id}", put(update_faq).delete(delete_faq))
        .route(
            "/team-members",
            get(admin_list_team_members).post(create_team_member),
        )
        .route(
            "/team-members/{id}",
            put(update_team_member).delete(delete_team_member),
        )
}

#[utoipa::path(
    get,
    path = "/api/sliders",
    responses(
        (status = 200, description = "Active sliders, in display order", body = ApiResponse<SliderList>)
    ),
    tag = "Content"
)]
pub async fn list_sliders(State(state): State<AppState>) -> AppResult<Json<ApiResponse<SliderList>>> {
    let resp = content_service::list_sliders(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/sliders",
    responses(
        (status = 200, description = "All sliders", body = ApiResponse<SliderList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_sliders(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<SliderList>>> {
    let resp = content_service::admin_list_sliders(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/sliders",
    request_body = CreateSliderRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<Slider>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_slider(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateSliderRequest>,
) -> AppResult<Json<ApiResponse<Slider>>> {
    let resp = content_service::create_slider(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/sliders/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = UpdateSliderRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Slider>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_slider(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSliderRequest>,
) -> AppResult<Json<ApiResponse<Slider>>> {
    let resp = content_service::update_slider(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/sliders/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_slider(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_slider(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/testimonials",
    responses(
        (status = 200, description = "Active testimonials, in display order", body = ApiResponse<TestimonialList>)
    ),
    tag = "Content"
)]
pub async fn list_testimonials(State(state): State<AppState>) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = content_service::list_testimonials(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/testimonials",
    responses(
        (status = 200, description = "All testimonials", body = ApiResponse<TestimonialList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_testimonials(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TestimonialList>>> {
    let resp = content_service::admin_list_testimonials(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/testimonials",
    request_body = CreateTestimonialRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<Testimonial>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = content_service::create_testimonial(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = UpdateTestimonialRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Testimonial>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTestimonialRequest>,
) -> AppResult<Json<ApiResponse<Testimonial>>> {
    let resp = content_service::update_testimonial(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/testimonials/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_testimonial(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_testimonial(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/partners",
    responses(
        (status = 200, description = "Active partners, in display order", body = ApiResponse<PartnerList>)
    ),
    tag = "Content"
)]
pub async fn list_partners(State(state): State<AppState>) -> AppResult<Json<ApiResponse<PartnerList>>> {
    let resp = content_service::list_partners(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/partners",
    responses(
        (status = 200, description = "All partners", body = ApiResponse<PartnerList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_partners(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<PartnerList>>> {
    let resp = content_service::admin_list_partners(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/partners",
    request_body = CreatePartnerRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<Partner>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_partner(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreatePartnerRequest>,
) -> AppResult<Json<ApiResponse<Partner>>> {
    let resp = content_service::create_partner(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/partners/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = UpdatePartnerRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Partner>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_partner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePartnerRequest>,
) -> AppResult<Json<ApiResponse<Partner>>> {
    let resp = content_service::update_partner(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/partners/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_partner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_partner(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/faqs",
    responses(
        (status = 200, description = "Active FAQs, in display order", body = ApiResponse<FaqList>)
    ),
    tag = "Content"
)]
pub async fn list_faqs(State(state): State<AppState>) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = content_service::list_faqs(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/faqs",
    responses(
        (status = 200, description = "All FAQs", body = ApiResponse<FaqList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_faqs(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<FaqList>>> {
    let resp = content_service::admin_list_faqs(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/faqs",
    request_body = CreateFaqRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<Faq>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateFaqRequest>,
) -> AppResult<Json<ApiResponse<Faq>>> {
    let resp = content_service::create_faq(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/faqs/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = UpdateFaqRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<Faq>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateFaqRequest>,
) -> AppResult<Json<ApiResponse<Faq>>> {
    let resp = content_service::update_faq(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/faqs/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_faq(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_faq(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/team-members",
    responses(
        (status = 200, description = "Active team members, in display order", body = ApiResponse<TeamMemberList>)
    ),
    tag = "Content"
)]
pub async fn list_team_members(State(state): State<AppState>) -> AppResult<Json<ApiResponse<TeamMemberList>>> {
    let resp = content_service::list_team_members(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/team-members",
    responses(
        (status = 200, description = "All team members", body = ApiResponse<TeamMemberList>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn admin_list_team_members(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<TeamMemberList>>> {
    let resp = content_service::admin_list_team_members(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/team-members",
    request_body = CreateTeamMemberRequest,
    responses(
        (status = 200, description = "Created", body = ApiResponse<TeamMember>),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateTeamMemberRequest>,
) -> AppResult<Json<ApiResponse<TeamMember>>> {
    let resp = content_service::create_team_member(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/team-members/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    request_body = UpdateTeamMemberRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<TeamMember>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTeamMemberRequest>,
) -> AppResult<Json<ApiResponse<TeamMember>>> {
    let resp = content_service::update_team_member(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/admin/team-members/{id}",
    params(
        ("id" = Uuid, Path, description = "Row ID")
    ),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Not Found")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_team_member(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = content_service::delete_team_member(&state, &user, id).await?;
    Ok(Json(resp))
}
