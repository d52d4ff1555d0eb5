use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::NotSet, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use sea_orm::sea_query::Expr;
use uuid::Uuid;

use crate::{
    audit,
    dto::addresses::{AddressList, CreateAddressRequest, UpdateAddressRequest},
    entity::addresses::{
        ActiveModel as AddressActive, Column as AddressCol, Entity as Addresses,
        Model as AddressModel,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Address,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn list_addresses(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<AddressList>> {
    let items = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .order_by_desc(AddressCol::IsDefault)
        .order_by_desc(AddressCol::CreatedAt)
        .all(&state.orm)
        .await?;
    let total = items.len() as i64;

    Ok(ApiResponse::success(
        "Addresses",
        AddressList {
            items: items.into_iter().map(address_from_entity).collect(),
        },
        Some(Meta::new(1, total, total)),
    ))
}

pub async fn create_address(
    state: &AppState,
    user: &AuthUser,
    payload: CreateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let existing = Addresses::find()
        .filter(AddressCol::UserId.eq(user.user_id))
        .count(&txn)
        .await?;
    // The first address is always the default.
    let is_default = payload.is_default || existing == 0;
    if is_default {
        unset_default(&txn, user.user_id).await?;
    }

    let address = AddressActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user.user_id)),
        name: Set(payload.name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        address: Set(payload.address.trim().to_string()),
        city: Set(payload.city.trim().to_string()),
        district: Set(payload.district.trim().to_string()),
        ward: Set(payload.ward.trim().to_string()),
        is_default: Set(is_default),
        created_at: NotSet,
        updated_at: NotSet,
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_create",
        "addresses",
        serde_json::json!({ "address_id": address.id, "is_default": is_default }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address created",
        address_from_entity(address),
        Some(Meta::empty()),
    ))
}

pub async fn update_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateAddressRequest,
) -> AppResult<ApiResponse<Address>> {
    payload.validate()?;

    let txn = state.orm.begin().await?;
    let model = find_owned(&txn, user.user_id, id).await?;
    let make_default = payload.is_default == Some(true) && !model.is_default;
    if make_default {
        unset_default(&txn, user.user_id).await?;
    }

    let mut active: AddressActive = model.into();
    if let Some(name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone.trim().to_string());
    }
    if let Some(address) = payload.address {
        active.address = Set(address.trim().to_string());
    }
    if let Some(city) = payload.city {
        active.city = Set(city.trim().to_string());
    }
    if let Some(district) = payload.district {
        active.district = Set(district.trim().to_string());
    }
    if let Some(ward) = payload.ward {
        active.ward = Set(ward.trim().to_string());
    }
    if make_default {
        active.is_default = Set(true);
    }
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    Ok(ApiResponse::success(
        "Address updated",
        address_from_entity(updated),
        Some(Meta::empty()),
    ))
}

pub async fn set_default(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<Address>> {
    let txn = state.orm.begin().await?;
    let model = find_owned(&txn, user.user_id, id).await?;
    unset_default(&txn, user.user_id).await?;

    let mut active: AddressActive = model.into();
    active.is_default = Set(true);
    active.updated_at = Set(Utc::now().into());
    let updated = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(user_id = %user.user_id, address_id = %id, "default address changed");
    Ok(ApiResponse::success(
        "Default address set",
        address_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Delete an address. When the default goes, the newest remaining address takes over.
pub async fn delete_address(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let txn = state.orm.begin().await?;
    let model = find_owned(&txn, user.user_id, id).await?;
    let was_default = model.is_default;
    Addresses::delete_by_id(model.id).exec(&txn).await?;

    if was_default {
        let next = Addresses::find()
            .filter(AddressCol::UserId.eq(user.user_id))
            .order_by_desc(AddressCol::CreatedAt)
            .one(&txn)
            .await?;
        if let Some(next) = next {
            let mut active: AddressActive = next.into();
            active.is_default = Set(true);
            active.update(&txn).await?;
        }
    }
    txn.commit().await?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "address_delete",
        "addresses",
        serde_json::json!({ "address_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Address deleted",
        serde_json::json!({ "id": id }),
        Some(Meta::empty()),
    ))
}

pub async fn find_owned<C>(conn: &C, user_id: Uuid, id: Uuid) -> AppResult<AddressModel>
where
    C: ConnectionTrait,
{
    Addresses::find_by_id(id)
        .filter(AddressCol::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)
}

async fn unset_default<C>(conn: &C, user_id: Uuid) -> AppResult<()>
where
    C: ConnectionTrait,
{
    Addresses::update_many()
        .col_expr(AddressCol::IsDefault, Expr::value(false))
        .filter(AddressCol::UserId.eq(user_id))
        .filter(AddressCol::IsDefault.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}

pub(crate) fn address_from_entity(model: AddressModel) -> Address {
    Address {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        phone: model.phone,
        address: model.address,
        city: model.city,
        district: model.district,
        ward: model.ward,
        is_default: model.is_default,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
