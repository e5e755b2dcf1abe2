//! Global roles and the scopes they grant.
//!
//! A scope is a named permission string (`workflow:read`, `workflow:share`, …).
//! Scopes held through the user's *global* role apply to every workflow,
//! which is what lets owners and admins see other users' sharings.

use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgTypeInfo, PgValueRef};
use sqlx::Postgres;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// Permission gating a workflow operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "workflow:create")]
    WorkflowCreate,
    #[serde(rename = "workflow:read")]
    WorkflowRead,
    #[serde(rename = "workflow:update")]
    WorkflowUpdate,
    #[serde(rename = "workflow:delete")]
    WorkflowDelete,
    #[serde(rename = "workflow:list")]
    WorkflowList,
    #[serde(rename = "workflow:share")]
    WorkflowShare,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkflowCreate => "workflow:create",
            Self::WorkflowRead => "workflow:read",
            Self::WorkflowUpdate => "workflow:update",
            Self::WorkflowDelete => "workflow:delete",
            Self::WorkflowList => "workflow:list",
            Self::WorkflowShare => "workflow:share",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ALL_WORKFLOW_SCOPES: &[Scope] = &[
    Scope::WorkflowCreate,
    Scope::WorkflowRead,
    Scope::WorkflowUpdate,
    Scope::WorkflowDelete,
    Scope::WorkflowList,
    Scope::WorkflowShare,
];

// ---------------------------------------------------------------------------
// GlobalRole
// ---------------------------------------------------------------------------

/// Instance-wide role stored in `users.global_role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Owner,
    Admin,
    Member,
}

impl GlobalRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Scopes this role holds across every workflow.
    pub fn scopes(self) -> &'static [Scope] {
        match self {
            Self::Owner | Self::Admin => ALL_WORKFLOW_SCOPES,
            Self::Member => &[],
        }
    }

    pub fn has_scope(self, scope: Scope) -> bool {
        self.scopes().contains(&scope)
    }
}

impl std::fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown global role: {0}")]
pub struct UnknownGlobalRole(pub String);

impl std::str::FromStr for GlobalRole {
    type Err = UnknownGlobalRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner"  => Ok(Self::Owner),
            "admin"  => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other    => Err(UnknownGlobalRole(other.to_string())),
        }
    }
}

// Stored as plain TEXT; callers bind `as_str()` when writing.
impl sqlx::Type<Postgres> for GlobalRole {
    fn type_info() -> PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <String as sqlx::Type<Postgres>>::compatible(ty)
    }
}

impl<'r> sqlx::Decode<'r, Postgres> for GlobalRole {
    fn decode(value: PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <&str as sqlx::Decode<Postgres>>::decode(value)?;
        Ok(raw.parse()?)
    }
}
