//! Response shapes returned by the cloud admin service.
//!
//! The service owns these shapes; known fields are typed and anything else is
//! kept in `extra` so the body survives a round trip untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// REST envelope wrapping every response body: `{ "data": … }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ResponseEnvelope<T> {
    pub data: T,
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// The plan the instance is currently subscribed to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CloudPlanData {
    pub plan_id: i64,
    /// `-1` means unlimited.
    pub monthly_executions_limit: i64,
    /// `-1` means unlimited.
    pub active_workflows_limit: i64,
    pub credentials_limit: i64,
    pub is_active: bool,
    pub display_name: String,
    /// ISO-8601 timestamp, passed through as sent.
    pub expiration_date: String,
    pub metadata: PlanMetadata,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlanMetadata {
    pub version: String,
    /// `opt-in`, `opt-out` or `trial`.
    pub group: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<TrialMetadata>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TrialMetadata {
    /// Trial length in days.
    pub length: i64,
    pub grace_period: i64,
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

/// Consumption counted against the plan limits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstanceUsage {
    pub executions: i64,
    pub active_workflows: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Login code
// ---------------------------------------------------------------------------

/// One-time code for signing in to the cloud dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginCode {
    pub code: String,
}
