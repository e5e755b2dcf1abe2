//! `CloudPlansClient` — GET wrappers over the cloud admin REST API.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::{
    CloudError,
    models::{CloudPlanData, InstanceUsage, LoginCode, ResponseEnvelope},
};

// ============================================================================
// Constants
// ============================================================================

const CLOUD_PLAN_PATH: &str = "/admin/cloud-plan";
const CLOUD_LIMITS_PATH: &str = "/cloud/limits";
const LOGIN_CODE_PATH: &str = "/admin/auth/login/code";

/// Header identifying the caller's push connection to the backend.
const PUSH_REF_HEADER: &str = "push-ref";

// ============================================================================
// Configuration
// ============================================================================

/// Where a request goes and on whose behalf.
#[derive(Debug, Clone)]
pub struct RestApiContext {
    /// REST root, e.g. `https://acme.app.example.cloud/rest`.
    pub base_url: String,
    /// Sent as the `push-ref` header when present.
    pub push_ref: Option<String>,
}

impl RestApiContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), push_ref: None }
    }

    pub fn with_push_ref(mut self, push_ref: impl Into<String>) -> Self {
        self.push_ref = Some(push_ref.into());
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// Transport settings for [`CloudPlansClient`].
#[derive(Debug, Clone)]
pub struct CloudClientConfig {
    pub timeout: Duration,
}

impl Default for CloudClientConfig {
    fn default() -> Self {
        Self { timeout: Duration::from_secs(30) }
    }
}

impl CloudClientConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// Thin client for plan and usage data. Cheap to clone.
#[derive(Debug, Clone)]
pub struct CloudPlansClient {
    http: Client,
}

impl CloudPlansClient {
    pub fn new(config: &CloudClientConfig) -> Result<Self, CloudError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http })
    }

    /// Build on an existing `reqwest` client, e.g. one with shared cookies.
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// `GET /admin/cloud-plan`
    pub async fn get_current_plan(&self, ctx: &RestApiContext) -> Result<CloudPlanData, CloudError> {
        self.get(ctx, CLOUD_PLAN_PATH).await
    }

    /// `GET /cloud/limits`
    pub async fn get_current_usage(&self, ctx: &RestApiContext) -> Result<InstanceUsage, CloudError> {
        self.get(ctx, CLOUD_LIMITS_PATH).await
    }

    /// `GET /admin/auth/login/code`
    pub async fn get_login_code(&self, ctx: &RestApiContext) -> Result<LoginCode, CloudError> {
        self.get(ctx, LOGIN_CODE_PATH).await
    }

    #[instrument(skip(self, ctx), fields(base_url = %ctx.base_url))]
    async fn get<T: DeserializeOwned>(&self, ctx: &RestApiContext, path: &str) -> Result<T, CloudError> {
        let mut request = self.http.get(ctx.endpoint(path));
        if let Some(push_ref) = &ctx.push_ref {
            request = request.header(PUSH_REF_HEADER, push_ref);
        }

        let response = request.send().await?.error_for_status()?;
        debug!(status = %response.status(), "Cloud admin response");

        let envelope: ResponseEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slash() {
        let ctx = RestApiContext::new("http://localhost:5678/rest/");
        assert_eq!(ctx.endpoint(CLOUD_LIMITS_PATH), "http://localhost:5678/rest/cloud/limits");

        let ctx = RestApiContext::new("http://localhost:5678/rest");
        assert_eq!(ctx.endpoint(CLOUD_PLAN_PATH), "http://localhost:5678/rest/admin/cloud-plan");
    }

    #[test]
    fn push_ref_is_optional() {
        let ctx = RestApiContext::new("http://localhost");
        assert!(ctx.push_ref.is_none());
        assert_eq!(ctx.with_push_ref("abc").push_ref.as_deref(), Some("abc"));
    }
}
