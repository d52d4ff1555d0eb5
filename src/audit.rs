//! Append-only trail of account and back-office actions.

use chrono::Utc;
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entity::{
        audit_logs::{Column as AuditCol, Entity as AuditLogs, Model as AuditModel},
        users::{Entity as Users, Model as UserModel},
    },
    error::AppResult,
    models::AuditEntry,
    routes::params::AuditLogQuery,
};

/// Append an audit row. A failed write is logged and never fails the caller.
pub async fn record(
    pool: &DbPool,
    user_id: Option<Uuid>,
    action: &str,
    resource: &str,
    metadata: Value,
) {
    let result = sqlx::query(
        r#"
        INSERT INTO audit_logs (id, user_id, action, resource, metadata)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(action)
    .bind(resource)
    .bind(metadata)
    .execute(pool)
    .await;

    if let Err(err) = result {
        tracing::warn!(error = %err, action, resource, "audit log failed");
    }
}

/// Newest entries first, optionally narrowed to one action or actor.
/// Returns the page together with the unpaginated count.
pub async fn recent<C>(conn: &C, query: &AuditLogQuery) -> AppResult<(Vec<AuditEntry>, i64)>
where
    C: ConnectionTrait,
{
    let (_, limit, offset) = query.pagination().normalize();

    let mut finder = AuditLogs::find();
    if let Some(action) = query.action.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        finder = finder.filter(AuditCol::Action.eq(action));
    }
    if let Some(user_id) = query.user_id {
        finder = finder.filter(AuditCol::UserId.eq(user_id));
    }
    let finder = finder.order_by_desc(AuditCol::CreatedAt);

    let total = finder.clone().count(conn).await? as i64;
    let entries = finder
        .find_also_related(Users)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(conn)
        .await?
        .into_iter()
        .map(|(entry, user)| entry_from_entity(entry, user))
        .collect();

    Ok((entries, total))
}

fn entry_from_entity(model: AuditModel, user: Option<UserModel>) -> AuditEntry {
    AuditEntry {
        id: model.id,
        user_id: model.user_id,
        username: user.map(|u| u.username),
        action: model.action,
        resource: model.resource,
        metadata: model.metadata,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_keeps_actor_name_when_user_exists() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let model = AuditModel {
            id: Uuid::new_v4(),
            user_id: Some(user_id),
            action: "order_status_update".into(),
            resource: Some("carts".into()),
            metadata: Some(serde_json::json!({ "status": "COMPLETED" })),
            created_at: now.into(),
        };
        let user = UserModel {
            id: user_id,
            username: "quanly".into(),
            email: None,
            full_name: None,
            password_hash: String::new(),
            role: "admin".into(),
            created_at: now.into(),
            updated_at: now.into(),
        };

        let entry = entry_from_entity(model.clone(), Some(user));
        assert_eq!(entry.username.as_deref(), Some("quanly"));
        assert_eq!(entry.resource.as_deref(), Some("carts"));

        let orphan = entry_from_entity(model, None);
        assert!(orphan.username.is_none());
        assert_eq!(orphan.user_id, Some(user_id));
    }
}
