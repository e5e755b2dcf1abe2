//! Sharing queries over the `shared_workflow` join table.
//!
//! Every read applies the same visibility rule: rows are restricted to the
//! caller's own `user_id` unless the caller's global role grants the scope
//! in question, in which case other users' sharings are visible too.
//!
//! Queries are assembled with [`QueryBuilder`] by small `*_query` functions
//! so the exact predicate set can be checked without a database.

use std::collections::HashSet;
use std::ops::BitOr;

use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::{
    DbError,
    models::{
        RoleRow, SharedWorkflow, SharedWorkflowProjection, SharedWorkflowRow, UserRow, WorkflowRow,
    },
    repository::roles::{OWNER_ROLE, WORKFLOW_SCOPE},
    scope::{GlobalRole, Scope},
};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Related rows to join and return alongside each sharing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relations {
    pub workflow: bool,
    pub user: bool,
    pub role: bool,
}

impl Relations {
    pub const NONE: Self = Self { workflow: false, user: false, role: false };
    pub const WORKFLOW: Self = Self { workflow: true, user: false, role: false };
    pub const USER: Self = Self { workflow: false, user: true, role: false };
    pub const ROLE: Self = Self { workflow: false, user: false, role: true };
}

impl BitOr for Relations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            workflow: self.workflow || rhs.workflow,
            user: self.user || rhs.user,
            role: self.role || rhs.role,
        }
    }
}

/// Extra filters for [`find_sharing`].
#[derive(Debug, Clone, Default)]
pub struct FindSharingOptions {
    /// Only match sharings whose role name is in this list.
    pub roles: Option<Vec<String>>,
    /// Relations to expand on top of workflow and role.
    pub extra_relations: Relations,
}

/// Whether [`get_sharing`] may look past the caller's own sharings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetSharingOptions {
    /// Drop the user filter if the caller holds this scope globally.
    AllowGlobalScope(Scope),
    /// Always restrict to the caller's own sharing.
    OwnSharingOnly,
}

/// Filters for [`get_shared_workflows`].
#[derive(Debug, Clone, Default)]
pub struct SharedWorkflowsOptions {
    pub relations: Relations,
    pub workflow_ids: Option<Vec<Uuid>>,
}

/// Filters for [`find_workflow_ids_by_user`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowIdsOptions {
    /// Only count sharings whose workflow-scoped role name is in this list.
    pub roles: Option<Vec<String>>,
}

/// Column selectable through [`find_with_fields`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharedWorkflowField {
    WorkflowId,
    UserId,
    RoleId,
    CreatedAt,
    UpdatedAt,
}

impl SharedWorkflowField {
    pub const ALL: &'static [Self] = &[
        Self::WorkflowId,
        Self::UserId,
        Self::RoleId,
        Self::CreatedAt,
        Self::UpdatedAt,
    ];

    fn column(self) -> &'static str {
        match self {
            Self::WorkflowId => "workflow_id",
            Self::UserId => "user_id",
            Self::RoleId => "role_id",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }
}

// ---------------------------------------------------------------------------
// Query assembly helpers
// ---------------------------------------------------------------------------

const SHARING_COLUMNS: &str =
    "sw.workflow_id, sw.user_id, sw.role_id, sw.created_at, sw.updated_at";

/// Emits `WHERE` before the first condition and `AND` before the rest.
struct Filter<'a, 'args> {
    qb: &'a mut QueryBuilder<'args, Postgres>,
    started: bool,
}

impl<'a, 'args> Filter<'a, 'args> {
    fn new(qb: &'a mut QueryBuilder<'args, Postgres>) -> Self {
        Self { qb, started: false }
    }

    fn and(&mut self) -> &mut QueryBuilder<'args, Postgres> {
        self.qb.push(if self.started { " AND " } else { " WHERE " });
        self.started = true;
        &mut *self.qb
    }
}

/// `SELECT … FROM shared_workflow sw` plus the joins `relations` asks for.
fn select_sharings(relations: Relations) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    qb.push(SHARING_COLUMNS);
    if relations.workflow {
        qb.push(
            ", w.id AS w_id, w.name AS w_name, w.active AS w_active, \
             w.created_at AS w_created_at, w.updated_at AS w_updated_at",
        );
    }
    if relations.user {
        qb.push(
            ", u.id AS u_id, u.email AS u_email, u.first_name AS u_first_name, \
             u.last_name AS u_last_name, u.password_hash AS u_password_hash, \
             u.global_role AS u_global_role, u.created_at AS u_created_at",
        );
    }
    if relations.role {
        qb.push(
            ", r.id AS r_id, r.name AS r_name, r.scope AS r_scope, r.created_at AS r_created_at",
        );
    }
    qb.push(" FROM shared_workflow sw");
    if relations.workflow {
        qb.push(" INNER JOIN workflow_entity w ON w.id = sw.workflow_id");
    }
    if relations.user {
        qb.push(" INNER JOIN users u ON u.id = sw.user_id");
    }
    if relations.role {
        qb.push(" INNER JOIN role r ON r.id = sw.role_id");
    }
    qb
}

fn decode_sharing(row: &PgRow, relations: Relations) -> Result<SharedWorkflow, sqlx::Error> {
    let sharing = SharedWorkflowRow::from_row(row)?;

    let workflow = if relations.workflow {
        Some(WorkflowRow {
            id: row.try_get("w_id")?,
            name: row.try_get("w_name")?,
            active: row.try_get("w_active")?,
            created_at: row.try_get("w_created_at")?,
            updated_at: row.try_get("w_updated_at")?,
        })
    } else {
        None
    };

    let user = if relations.user {
        Some(UserRow {
            id: row.try_get("u_id")?,
            email: row.try_get("u_email")?,
            first_name: row.try_get("u_first_name")?,
            last_name: row.try_get("u_last_name")?,
            password_hash: row.try_get("u_password_hash")?,
            global_role: row.try_get("u_global_role")?,
            created_at: row.try_get("u_created_at")?,
        })
    } else {
        None
    };

    let role = if relations.role {
        Some(RoleRow {
            id: row.try_get("r_id")?,
            name: row.try_get("r_name")?,
            scope: row.try_get("r_scope")?,
            created_at: row.try_get("r_created_at")?,
        })
    } else {
        None
    };

    Ok(SharedWorkflow { sharing, workflow, user, role })
}

fn decode_projection(
    row: &PgRow,
    fields: &[SharedWorkflowField],
) -> Result<SharedWorkflowProjection, sqlx::Error> {
    let mut out = SharedWorkflowProjection::default();
    for field in fields {
        let column = field.column();
        match field {
            SharedWorkflowField::WorkflowId => out.workflow_id = Some(row.try_get(column)?),
            SharedWorkflowField::UserId => out.user_id = Some(row.try_get(column)?),
            SharedWorkflowField::RoleId => out.role_id = Some(row.try_get(column)?),
            SharedWorkflowField::CreatedAt => out.created_at = Some(row.try_get(column)?),
            SharedWorkflowField::UpdatedAt => out.updated_at = Some(row.try_get(column)?),
        }
    }
    Ok(out)
}

/// Users that can receive a sharing, first occurrence only. Pending users
/// are dropped silently.
fn shareable_users(users: &[UserRow]) -> impl Iterator<Item = &UserRow> {
    let mut seen = HashSet::new();
    users
        .iter()
        .filter(|user| !user.is_pending())
        .filter(move |user| seen.insert(user.id))
}

/// Owners and admins see every user's sharings in listings.
fn sees_all_sharings(user: &UserRow) -> bool {
    matches!(user.global_role, GlobalRole::Owner | GlobalRole::Admin)
}

// ---------------------------------------------------------------------------
// Query builders
// ---------------------------------------------------------------------------

fn has_access_query(workflow_id: Uuid, user: &UserRow) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT EXISTS (SELECT 1 FROM shared_workflow sw");
    let mut filter = Filter::new(&mut qb);
    filter.and().push("sw.workflow_id = ").push_bind(workflow_id);
    if !user.has_global_scope(Scope::WorkflowRead) {
        filter.and().push("sw.user_id = ").push_bind(user.id);
    }
    qb.push(")");
    qb
}

fn list_shared_workflow_ids_query(workflow_ids: &[Uuid]) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT sw.workflow_id FROM shared_workflow sw");
    Filter::new(&mut qb)
        .and()
        .push("sw.workflow_id = ANY(")
        .push_bind(workflow_ids.to_vec())
        .push(")");
    qb
}

fn owner_sharings_query(workflow_ids: &[Uuid]) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_sharings(Relations::ROLE | Relations::USER);
    let mut filter = Filter::new(&mut qb);
    filter
        .and()
        .push("sw.workflow_id = ANY(")
        .push_bind(workflow_ids.to_vec())
        .push(")");
    filter.and().push("r.name = ").push_bind(OWNER_ROLE);
    filter.and().push("r.scope = ").push_bind(WORKFLOW_SCOPE);
    qb
}

fn find_sharing_query(
    workflow_id: Uuid,
    user: &UserRow,
    scope: Scope,
    options: &FindSharingOptions,
) -> (QueryBuilder<'static, Postgres>, Relations) {
    let relations = Relations::WORKFLOW | Relations::ROLE | options.extra_relations;
    let mut qb = select_sharings(relations);
    let mut filter = Filter::new(&mut qb);
    filter.and().push("sw.workflow_id = ").push_bind(workflow_id);
    if !user.has_global_scope(scope) {
        filter.and().push("sw.user_id = ").push_bind(user.id);
    }
    if let Some(roles) = &options.roles {
        filter.and().push("r.name = ANY(").push_bind(roles.clone()).push(")");
    }
    qb.push(" LIMIT 1");
    (qb, relations)
}

fn get_sharing_query(
    user: &UserRow,
    workflow_id: Uuid,
    options: GetSharingOptions,
    relations: Relations,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_sharings(relations);
    let mut filter = Filter::new(&mut qb);
    filter.and().push("sw.workflow_id = ").push_bind(workflow_id);
    let global_access = match options {
        GetSharingOptions::AllowGlobalScope(scope) => user.has_global_scope(scope),
        GetSharingOptions::OwnSharingOnly => false,
    };
    if !global_access {
        filter.and().push("sw.user_id = ").push_bind(user.id);
    }
    qb.push(" LIMIT 1");
    qb
}

fn shared_workflows_query(
    user: &UserRow,
    options: &SharedWorkflowsOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = select_sharings(options.relations);
    let mut filter = Filter::new(&mut qb);
    if !sees_all_sharings(user) {
        filter.and().push("sw.user_id = ").push_bind(user.id);
    }
    if let Some(ids) = &options.workflow_ids {
        filter.and().push("sw.workflow_id = ANY(").push_bind(ids.clone()).push(")");
    }
    qb
}

fn share_query(
    workflow_id: Uuid,
    users: &[UserRow],
    role_id: i64,
) -> Option<QueryBuilder<'static, Postgres>> {
    let rows: Vec<Uuid> = shareable_users(users).map(|user| user.id).collect();
    if rows.is_empty() {
        return None;
    }

    let mut qb = QueryBuilder::new("INSERT INTO shared_workflow (workflow_id, user_id, role_id) ");
    qb.push_values(rows, |mut b, user_id| {
        b.push_bind(workflow_id).push_bind(user_id).push_bind(role_id);
    });
    qb.push(
        " ON CONFLICT (workflow_id, user_id) DO UPDATE \
         SET role_id = EXCLUDED.role_id, updated_at = now() \
         RETURNING workflow_id, user_id, role_id, created_at, updated_at",
    );
    Some(qb)
}

fn find_with_fields_query(
    workflow_ids: &[Uuid],
    fields: &[SharedWorkflowField],
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT ");
    let mut columns = qb.separated(", ");
    for field in fields {
        columns.push(field.column());
    }
    qb.push(" FROM shared_workflow");
    Filter::new(&mut qb)
        .and()
        .push("workflow_id = ANY(")
        .push_bind(workflow_ids.to_vec())
        .push(")");
    qb
}

fn delete_by_ids_query(workflow_ids: &[Uuid], user: Option<&UserRow>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("DELETE FROM shared_workflow");
    let mut filter = Filter::new(&mut qb);
    filter
        .and()
        .push("workflow_id = ANY(")
        .push_bind(workflow_ids.to_vec())
        .push(")");
    if let Some(user) = user {
        filter.and().push("user_id = ").push_bind(user.id);
    }
    qb
}

fn workflow_ids_by_user_query(
    user: &UserRow,
    options: &WorkflowIdsOptions,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT DISTINCT sw.workflow_id FROM shared_workflow sw");
    let mut filter = Filter::new(&mut qb);
    if !user.has_global_scope(Scope::WorkflowRead) {
        filter.and().push("sw.user_id = ").push_bind(user.id);
    }
    if let Some(roles) = &options.roles {
        filter
            .and()
            .push("sw.role_id IN (SELECT r.id FROM role r WHERE r.scope = ")
            .push_bind(WORKFLOW_SCOPE)
            .push(" AND r.name = ANY(")
            .push_bind(roles.clone())
            .push("))");
    }
    qb
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Whether `user` can see `workflow_id` through a sharing.
///
/// Holders of global `workflow:read` match any user's sharing; everyone else
/// needs a sharing of their own.
#[instrument(skip(pool, user), fields(user_id = %user.id))]
pub async fn has_access(pool: &PgPool, workflow_id: Uuid, user: &UserRow) -> Result<bool, DbError> {
    let exists = has_access_query(workflow_id, user)
        .build_query_scalar::<bool>()
        .fetch_one(pool)
        .await?;
    Ok(exists)
}

/// Ids from `workflow_ids` that have at least one sharing, one entry per row.
#[instrument(skip(pool, workflow_ids), fields(requested = workflow_ids.len()))]
pub async fn list_shared_workflow_ids(
    pool: &PgPool,
    workflow_ids: &[Uuid],
) -> Result<Vec<Uuid>, DbError> {
    let ids = list_shared_workflow_ids_query(workflow_ids)
        .build_query_scalar::<Uuid>()
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

/// Owner sharings (`owner` role at `workflow` scope) of the given workflows,
/// with role and user expanded.
#[instrument(skip(pool, workflow_ids), fields(requested = workflow_ids.len()))]
pub async fn find_owner_sharings_by_workflow_ids(
    pool: &PgPool,
    workflow_ids: &[Uuid],
) -> Result<Vec<SharedWorkflow>, DbError> {
    let relations = Relations::ROLE | Relations::USER;
    let rows = owner_sharings_query(workflow_ids).build().fetch_all(pool).await?;
    let sharings = rows
        .iter()
        .map(|row| decode_sharing(row, relations))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(found = sharings.len(), "Loaded owner sharings");
    Ok(sharings)
}

/// A single sharing of `workflow_id` with workflow and role expanded.
///
/// Restricted to `user`'s own sharing unless `user` holds `scope` globally.
#[instrument(skip(pool, user, options), fields(user_id = %user.id, %scope))]
pub async fn find_sharing(
    pool: &PgPool,
    workflow_id: Uuid,
    user: &UserRow,
    scope: Scope,
    options: &FindSharingOptions,
) -> Result<Option<SharedWorkflow>, DbError> {
    let (mut qb, relations) = find_sharing_query(workflow_id, user, scope, options);
    let row = qb.build().fetch_optional(pool).await?;
    Ok(row.map(|row| decode_sharing(&row, relations)).transpose()?)
}

/// Move every sharing held at `role` by somebody other than `user` over to
/// `user`. Returns the number of rows updated.
///
/// Only rows at `role` move. Sharings at any other role stay with their
/// current user, and so do rows `user` already holds. Moving those would
/// give `user` two rows on the same workflow, which the
/// `(workflow_id, user_id)` primary key rejects.
#[instrument(skip(pool, user, role), fields(user_id = %user.id, role_id = role.id))]
pub async fn reassign_ownership(pool: &PgPool, user: &UserRow, role: &RoleRow) -> Result<u64, DbError> {
    let result = sqlx::query(
        r#"
        UPDATE shared_workflow
        SET user_id = $1, role_id = $2, updated_at = now()
        WHERE role_id = $2 AND user_id <> $1
        "#,
    )
    .bind(user.id)
    .bind(role.id)
    .execute(pool)
    .await?;

    debug!(updated = result.rows_affected(), "Reassigned sharings");
    Ok(result.rows_affected())
}

/// A single sharing of `workflow_id`.
///
/// The user filter is dropped only when `options` allows a global scope and
/// `user` actually holds it.
#[instrument(skip(pool, user), fields(user_id = %user.id))]
pub async fn get_sharing(
    pool: &PgPool,
    user: &UserRow,
    workflow_id: Uuid,
    options: GetSharingOptions,
    relations: Relations,
) -> Result<Option<SharedWorkflow>, DbError> {
    let row = get_sharing_query(user, workflow_id, options, relations)
        .build()
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|row| decode_sharing(&row, relations)).transpose()?)
}

/// Sharings visible to `user`: their own, or all of them for owners and
/// admins. Optionally narrowed to `options.workflow_ids`.
#[instrument(skip(pool, user, options), fields(user_id = %user.id))]
pub async fn get_shared_workflows(
    pool: &PgPool,
    user: &UserRow,
    options: &SharedWorkflowsOptions,
) -> Result<Vec<SharedWorkflow>, DbError> {
    let rows = shared_workflows_query(user, options).build().fetch_all(pool).await?;
    let sharings = rows
        .iter()
        .map(|row| decode_sharing(row, options.relations))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(found = sharings.len(), "Loaded shared workflows");
    Ok(sharings)
}

/// Share `workflow` with `users` at `role_id` on the caller's connection.
///
/// Pending users are skipped without error. Sharing again with a user who
/// already has a sharing replaces its role.
#[instrument(skip(conn, workflow, users), fields(workflow_id = %workflow.id, requested = users.len()))]
pub async fn share(
    conn: &mut PgConnection,
    workflow: &WorkflowRow,
    users: &[UserRow],
    role_id: i64,
) -> Result<Vec<SharedWorkflowRow>, DbError> {
    let Some(mut qb) = share_query(workflow.id, users, role_id) else {
        debug!("No shareable users");
        return Ok(Vec::new());
    };

    let rows = qb
        .build_query_as::<SharedWorkflowRow>()
        .fetch_all(&mut *conn)
        .await?;
    debug!(created = rows.len(), "Shared workflow");
    Ok(rows)
}

/// Projected read of the sharings of `workflow_ids`. An empty `fields` list
/// selects every column.
#[instrument(skip(pool, workflow_ids, fields), fields(requested = workflow_ids.len()))]
pub async fn find_with_fields(
    pool: &PgPool,
    workflow_ids: &[Uuid],
    fields: &[SharedWorkflowField],
) -> Result<Vec<SharedWorkflowProjection>, DbError> {
    let fields = if fields.is_empty() { SharedWorkflowField::ALL } else { fields };
    let rows = find_with_fields_query(workflow_ids, fields)
        .build()
        .fetch_all(pool)
        .await?;
    let projections = rows
        .iter()
        .map(|row| decode_projection(row, fields))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(projections)
}

/// Delete the sharings of `workflow_ids` on the caller's connection,
/// optionally only those of `user`. Returns the number of rows deleted.
#[instrument(skip(conn, workflow_ids, user), fields(requested = workflow_ids.len()))]
pub async fn delete_by_ids(
    conn: &mut PgConnection,
    workflow_ids: &[Uuid],
    user: Option<&UserRow>,
) -> Result<u64, DbError> {
    let result = delete_by_ids_query(workflow_ids, user)
        .build()
        .execute(&mut *conn)
        .await?;
    debug!(deleted = result.rows_affected(), "Deleted sharings");
    Ok(result.rows_affected())
}

/// Distinct ids of the workflows shared with `user`, or of every shared
/// workflow when `user` holds global `workflow:read`.
#[instrument(skip(pool, user, options), fields(user_id = %user.id))]
pub async fn find_workflow_ids_by_user(
    pool: &PgPool,
    user: &UserRow,
    options: &WorkflowIdsOptions,
) -> Result<Vec<Uuid>, DbError> {
    let ids = workflow_ids_by_user_query(user, options)
        .build_query_scalar::<Uuid>()
        .fetch_all(pool)
        .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn user(global_role: GlobalRole) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: format!("{global_role}@example.com"),
            first_name: None,
            last_name: None,
            password_hash: Some("hash".into()),
            global_role,
            created_at: Utc::now(),
        }
    }

    fn pending(global_role: GlobalRole) -> UserRow {
        UserRow { password_hash: None, ..user(global_role) }
    }

    fn filters_by_user(sql: &str) -> bool {
        sql.contains("user_id = $")
    }

    // ---- has_access ----

    #[test]
    fn has_access_restricts_members_to_their_own_sharing() {
        let qb = has_access_query(Uuid::new_v4(), &user(GlobalRole::Member));
        assert_eq!(
            qb.sql(),
            "SELECT EXISTS (SELECT 1 FROM shared_workflow sw \
             WHERE sw.workflow_id = $1 AND sw.user_id = $2)"
        );
    }

    #[test]
    fn has_access_with_global_read_matches_any_sharing() {
        for role in [GlobalRole::Owner, GlobalRole::Admin] {
            let qb = has_access_query(Uuid::new_v4(), &user(role));
            assert!(!filters_by_user(qb.sql()), "{role}: {}", qb.sql());
            assert!(qb.sql().contains("sw.workflow_id = $1"));
        }
    }

    // ---- find_sharing ----

    #[test]
    fn find_sharing_omits_user_filter_only_for_global_scope() {
        let options = FindSharingOptions::default();
        let (member_qb, _) =
            find_sharing_query(Uuid::new_v4(), &user(GlobalRole::Member), Scope::WorkflowShare, &options);
        assert!(filters_by_user(member_qb.sql()));

        let (admin_qb, _) =
            find_sharing_query(Uuid::new_v4(), &user(GlobalRole::Admin), Scope::WorkflowShare, &options);
        assert!(!filters_by_user(admin_qb.sql()));
    }

    #[test]
    fn find_sharing_always_expands_workflow_and_role() {
        let options = FindSharingOptions {
            roles: Some(vec!["owner".into()]),
            extra_relations: Relations::USER,
        };
        let (qb, relations) =
            find_sharing_query(Uuid::new_v4(), &user(GlobalRole::Member), Scope::WorkflowRead, &options);
        assert_eq!(relations, Relations { workflow: true, user: true, role: true });
        let sql = qb.sql();
        assert!(sql.contains("INNER JOIN workflow_entity w"));
        assert!(sql.contains("INNER JOIN role r"));
        assert!(sql.contains("INNER JOIN users u"));
        assert!(sql.contains("r.name = ANY($3)"));
        assert!(sql.ends_with(" LIMIT 1"));
    }

    // ---- get_sharing ----

    #[test]
    fn get_sharing_drops_user_filter_when_global_scope_allowed_and_held() {
        let qb = get_sharing_query(
            &user(GlobalRole::Owner),
            Uuid::new_v4(),
            GetSharingOptions::AllowGlobalScope(Scope::WorkflowUpdate),
            Relations::WORKFLOW,
        );
        assert!(!filters_by_user(qb.sql()));
    }

    #[test]
    fn get_sharing_keeps_user_filter_when_scope_not_held() {
        let qb = get_sharing_query(
            &user(GlobalRole::Member),
            Uuid::new_v4(),
            GetSharingOptions::AllowGlobalScope(Scope::WorkflowUpdate),
            Relations::WORKFLOW,
        );
        assert!(filters_by_user(qb.sql()));
    }

    #[test]
    fn get_sharing_keeps_user_filter_when_global_scope_not_allowed() {
        let qb = get_sharing_query(
            &user(GlobalRole::Owner),
            Uuid::new_v4(),
            GetSharingOptions::OwnSharingOnly,
            Relations::NONE,
        );
        assert!(filters_by_user(qb.sql()));
        assert!(!qb.sql().contains("JOIN"));
    }

    // ---- get_shared_workflows ----

    #[test]
    fn shared_workflows_filter_by_user_unless_owner_or_admin() {
        let options = SharedWorkflowsOptions::default();
        assert!(filters_by_user(shared_workflows_query(&user(GlobalRole::Member), &options).sql()));
        assert!(!filters_by_user(shared_workflows_query(&user(GlobalRole::Owner), &options).sql()));
        assert!(!filters_by_user(shared_workflows_query(&user(GlobalRole::Admin), &options).sql()));
    }

    #[test]
    fn shared_workflows_for_owner_without_filters_has_no_where_clause() {
        let qb = shared_workflows_query(&user(GlobalRole::Owner), &SharedWorkflowsOptions::default());
        assert_eq!(
            qb.sql(),
            "SELECT sw.workflow_id, sw.user_id, sw.role_id, sw.created_at, sw.updated_at \
             FROM shared_workflow sw"
        );
    }

    #[test]
    fn shared_workflows_narrow_to_requested_ids() {
        let options = SharedWorkflowsOptions {
            relations: Relations::WORKFLOW,
            workflow_ids: Some(vec![Uuid::new_v4()]),
        };
        let qb = shared_workflows_query(&user(GlobalRole::Member), &options);
        assert!(qb.sql().ends_with("WHERE sw.user_id = $1 AND sw.workflow_id = ANY($2)"));
    }

    // ---- share ----

    #[test]
    fn share_skips_pending_users() {
        let users = vec![
            user(GlobalRole::Member),
            pending(GlobalRole::Member),
            user(GlobalRole::Admin),
        ];
        let shareable: Vec<Uuid> = shareable_users(&users).map(|u| u.id).collect();
        assert_eq!(shareable, vec![users[0].id, users[2].id]);

        let qb = share_query(Uuid::new_v4(), &users, 1).expect("two users are shareable");
        assert!(qb.sql().contains("VALUES ($1, $2, $3), ($4, $5, $6) ON CONFLICT"));
    }

    #[test]
    fn share_lists_a_repeated_user_once() {
        let alice = user(GlobalRole::Member);
        let bob = user(GlobalRole::Member);
        let users = vec![alice.clone(), bob.clone(), alice.clone()];

        let shareable: Vec<Uuid> = shareable_users(&users).map(|u| u.id).collect();
        assert_eq!(shareable, vec![alice.id, bob.id]);

        let qb = share_query(Uuid::new_v4(), &users, 1).expect("two distinct users");
        assert!(qb.sql().contains("VALUES ($1, $2, $3), ($4, $5, $6) ON CONFLICT"));
    }

    #[test]
    fn share_with_only_pending_users_builds_no_statement() {
        let users = vec![pending(GlobalRole::Member), pending(GlobalRole::Admin)];
        assert!(share_query(Uuid::new_v4(), &users, 1).is_none());
        assert!(share_query(Uuid::new_v4(), &[], 1).is_none());
    }

    // ---- find_with_fields / delete_by_ids / workflow ids ----

    #[test]
    fn find_with_fields_selects_only_requested_columns() {
        let qb = find_with_fields_query(
            &[Uuid::new_v4()],
            &[SharedWorkflowField::WorkflowId, SharedWorkflowField::RoleId],
        );
        assert_eq!(
            qb.sql(),
            "SELECT workflow_id, role_id FROM shared_workflow WHERE workflow_id = ANY($1)"
        );
    }

    #[test]
    fn delete_by_ids_scopes_to_user_when_given() {
        let ids = [Uuid::new_v4()];
        assert!(!filters_by_user(delete_by_ids_query(&ids, None).sql()));
        let member = user(GlobalRole::Member);
        assert_eq!(
            delete_by_ids_query(&ids, Some(&member)).sql(),
            "DELETE FROM shared_workflow WHERE workflow_id = ANY($1) AND user_id = $2"
        );
    }

    #[test]
    fn workflow_ids_by_user_honours_global_read_and_roles() {
        let options = WorkflowIdsOptions { roles: Some(vec!["owner".into()]) };
        let member_sql = workflow_ids_by_user_query(&user(GlobalRole::Member), &options);
        assert!(filters_by_user(member_sql.sql()));
        assert!(member_sql.sql().contains("r.name = ANY($3)"));

        let owner_sql = workflow_ids_by_user_query(&user(GlobalRole::Owner), &WorkflowIdsOptions::default());
        assert_eq!(owner_sql.sql(), "SELECT DISTINCT sw.workflow_id FROM shared_workflow sw");
    }

    #[test]
    fn owner_sharings_join_role_and_user() {
        let qb = owner_sharings_query(&[Uuid::new_v4()]);
        let sql = qb.sql();
        assert!(sql.contains("INNER JOIN users u"));
        assert!(sql.contains("INNER JOIN role r"));
        assert!(sql.ends_with("WHERE sw.workflow_id = ANY($1) AND r.name = $2 AND r.scope = $3"));
    }

    #[test]
    fn relations_union_combines_flags() {
        let combined = Relations::WORKFLOW | Relations::ROLE;
        assert!(combined.workflow && combined.role && !combined.user);
        assert_eq!(Relations::NONE | Relations::NONE, Relations::default());
    }
}
