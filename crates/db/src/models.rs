//! Row structs that map 1-to-1 onto database tables.
//!
//! These are *persistence* models. The only behaviour they carry is what the
//! sharing queries need to decide visibility: a user's global scopes and
//! whether the user is still pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::scope::{GlobalRole, Scope};

// ---------------------------------------------------------------------------
// workflow_entity
// ---------------------------------------------------------------------------

/// A persisted workflow row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkflowRow {
    pub id: Uuid,
    pub name: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// users
// ---------------------------------------------------------------------------

/// A persisted user row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub global_role: GlobalRole,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// Whether the user's global role grants `scope` on every workflow.
    pub fn has_global_scope(&self, scope: Scope) -> bool {
        self.global_role.has_scope(scope)
    }

    /// An invited user who has not set a password yet. The instance owner is
    /// never pending.
    pub fn is_pending(&self) -> bool {
        self.password_hash.is_none() && self.global_role != GlobalRole::Owner
    }
}

// ---------------------------------------------------------------------------
// role
// ---------------------------------------------------------------------------

/// A named permission level at a given scope, e.g. `owner` at `workflow`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleRow {
    pub id: i64,
    pub name: String,
    pub scope: String,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// shared_workflow
// ---------------------------------------------------------------------------

/// One user's access grant to one workflow at one role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct SharedWorkflowRow {
    pub workflow_id: Uuid,
    pub user_id: Uuid,
    pub role_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A sharing row together with whichever relations the query expanded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedWorkflow {
    #[serde(flatten)]
    pub sharing: SharedWorkflowRow,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleRow>,
}

/// Partial `shared_workflow` row; only the requested columns are populated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedWorkflowProjection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}
