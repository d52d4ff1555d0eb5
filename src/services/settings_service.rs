use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{EntityTrait, Set};

use crate::{
    audit,
    dto::settings::UpdateSettingsRequest,
    entity::store_settings::{
        ActiveModel as SettingsActive, Column as SettingsCol, Entity as StoreSettingsEntity,
        Model as SettingsModel,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::StoreSettings,
    response::{ApiResponse, Meta},
    state::AppState,
};

const SETTINGS_ROW_ID: i32 = 1;

/// Current store settings, or the built-in defaults before anything was saved.
pub async fn get_settings(state: &AppState) -> AppResult<ApiResponse<StoreSettings>> {
    let settings = StoreSettingsEntity::find_by_id(SETTINGS_ROW_ID)
        .one(&state.orm)
        .await?
        .map(settings_from_entity)
        .unwrap_or_default();
    Ok(ApiResponse::success("Settings", settings, None))
}

pub async fn update_settings(
    state: &AppState,
    user: &AuthUser,
    payload: UpdateSettingsRequest,
) -> AppResult<ApiResponse<StoreSettings>> {
    ensure_admin(user)?;
    payload.validate()?;

    let row = SettingsActive {
        id: Set(SETTINGS_ROW_ID),
        store_name: Set(payload.store_name.trim().to_string()),
        phone: Set(payload.phone.trim().to_string()),
        hotline: Set(blank_to_none(payload.hotline)),
        email: Set(blank_to_none(payload.email)),
        address: Set(blank_to_none(payload.address)),
        working_hours: Set(blank_to_none(payload.working_hours)),
        facebook_url: Set(blank_to_none(payload.facebook_url)),
        zalo_url: Set(blank_to_none(payload.zalo_url)),
        map_embed_url: Set(blank_to_none(payload.map_embed_url)),
        updated_at: Set(Utc::now().into()),
    };

    StoreSettingsEntity::insert(row)
        .on_conflict(
            OnConflict::column(SettingsCol::Id)
                .update_columns([
                    SettingsCol::StoreName,
                    SettingsCol::Phone,
                    SettingsCol::Hotline,
                    SettingsCol::Email,
                    SettingsCol::Address,
                    SettingsCol::WorkingHours,
                    SettingsCol::FacebookUrl,
                    SettingsCol::ZaloUrl,
                    SettingsCol::MapEmbedUrl,
                    SettingsCol::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&state.orm)
        .await?;

    let saved = StoreSettingsEntity::find_by_id(SETTINGS_ROW_ID)
        .one(&state.orm)
        .await?
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("settings row missing after upsert")))?;

    audit::record(
        &state.pool,
        Some(user.user_id),
        "settings_update",
        "store_settings",
        serde_json::json!({ "store_name": saved.store_name }),
    )
    .await;

    Ok(ApiResponse::success(
        "Settings saved",
        settings_from_entity(saved),
        Some(Meta::empty()),
    ))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn settings_from_entity(model: SettingsModel) -> StoreSettings {
    StoreSettings {
        store_name: model.store_name,
        phone: model.phone,
        hotline: model.hotline,
        email: model.email,
        address: model.address,
        working_hours: model.working_hours,
        facebook_url: model.facebook_url,
        zalo_url: model.zalo_url,
        map_embed_url: model.map_embed_url,
        updated_at: Some(model.updated_at.with_timezone(&Utc)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_are_dropped() {
        assert_eq!(blank_to_none(Some("  ".into())), None);
        assert_eq!(blank_to_none(Some(" 0909 ".into())), Some("0909".into()));
        assert_eq!(blank_to_none(None), None);
    }

    #[test]
    fn defaults_name_the_store() {
        let settings = StoreSettings::default();
        assert_eq!(settings.store_name, "Hoàng Trí Moto");
        assert!(settings.updated_at.is_none());
    }
}
