//! Role lookups.

use sqlx::PgPool;

use crate::{DbError, models::RoleRow};

/// Role name granting ownership of a resource.
pub const OWNER_ROLE: &str = "owner";
/// Role name granting edit access to a shared workflow.
pub const EDITOR_ROLE: &str = "editor";
/// Scope of roles that apply to a single workflow.
pub const WORKFLOW_SCOPE: &str = "workflow";

/// Look up a role by name and scope; `None` if it does not exist.
pub async fn find_role(pool: &PgPool, name: &str, scope: &str) -> Result<Option<RoleRow>, DbError> {
    let row = sqlx::query_as::<_, RoleRow>(
        "SELECT id, name, scope, created_at FROM role WHERE name = $1 AND scope = $2",
    )
    .bind(name)
    .bind(scope)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// The `owner` role at `workflow` scope, seeded by the initial migration.
pub async fn get_workflow_owner_role(pool: &PgPool) -> Result<RoleRow, DbError> {
    find_role(pool, OWNER_ROLE, WORKFLOW_SCOPE)
        .await?
        .ok_or(DbError::NotFound("workflow owner role"))
}
