use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit,
    dto::contacts::{ContactList, CreateContactRequest, UpdateContactRequest},
    entity::{
        contacts::{ActiveModel, Column, Entity as Contacts, Model as ContactModel},
        services::Entity as Services,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Contact,
    response::{ApiResponse, Meta},
    routes::params::ContactQuery,
    state::AppState,
};

/// Store a contact form submission from the public site.
pub async fn submit_contact(
    state: &AppState,
    payload: CreateContactRequest,
) -> AppResult<ApiResponse<Contact>> {
    payload.validate()?;

    if let Some(service_id) = payload.service_id {
        Services::find_by_id(service_id)
            .one(&state.orm)
            .await?
            .ok_or(AppError::NotFound)?;
    }

    let contact = ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        email: Set(payload.email.filter(|e| !e.trim().is_empty())),
        subject: Set(payload.subject.filter(|s| !s.trim().is_empty())),
        message: Set(payload.message.trim().to_string()),
        service_id: Set(payload.service_id),
        handled: Set(false),
        handled_at: Set(None),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(contact_id = %contact.id, "contact form received");
    Ok(ApiResponse::success(
        "Thank you, we will get back to you soon",
        contact_from_entity(contact),
        Some(Meta::empty()),
    ))
}

pub async fn list_contacts(
    state: &AppState,
    user: &AuthUser,
    query: ContactQuery,
) -> AppResult<ApiResponse<ContactList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut finder = Contacts::find();
    if let Some(handled) = query.handled {
        finder = finder.filter(Column::Handled.eq(handled));
    }
    let finder = finder.order_by_desc(Column::CreatedAt);

    let total = finder.clone().count(&state.orm).await? as i64;
    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(contact_from_entity)
        .collect();

    Ok(ApiResponse::success(
        "Contacts",
        ContactList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

pub async fn update_contact(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateContactRequest,
) -> AppResult<ApiResponse<Contact>> {
    ensure_admin(user)?;
    let existing = Contacts::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let handled_at = match (payload.handled, existing.handled_at) {
        (true, Some(at)) => Some(at),
        (true, None) => Some(Utc::now().into()),
        (false, _) => None,
    };

    let mut active: ActiveModel = existing.into();
    active.handled = Set(payload.handled);
    active.handled_at = Set(handled_at);
    let contact = active.update(&state.orm).await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "contact_update",
        "contacts",
        serde_json::json!({ "contact_id": contact.id, "handled": contact.handled }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        contact_from_entity(contact),
        Some(Meta::empty()),
    ))
}

pub async fn delete_contact(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Contacts::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.pool,
        Some(user.user_id),
        "contact_delete",
        "contacts",
        serde_json::json!({ "contact_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

fn contact_from_entity(model: ContactModel) -> Contact {
    Contact {
        id: model.id,
        name: model.name,
        phone: model.phone,
        email: model.email,
        subject: model.subject,
        message: model.message,
        service_id: model.service_id,
        handled: model.handled,
        handled_at: model.handled_at.map(|dt| dt.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
    }
}
