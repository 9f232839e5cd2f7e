//! REST client for the portal backend.
//!
//! Two endpoints matter to this crate: the login exchange and the permission
//! read. Login failures are surfaced as [`RestError`] so the UI can explain
//! them; permission failures are not errors at all, they degrade to the empty
//! map per the zero-trust rule.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use staffroom_auth::{PermissionMap, RoleCode, StaffProfile};
use staffroom_core::StaffId;

use crate::fetch::{decode_permission_envelope, PermissionSource};
use crate::session::AuthToken;

/// Credentials posted to the login endpoint.
///
/// No `Debug`: the password must not reach logs.
#[derive(Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Role the staff member selected on the login form, forwarded verbatim.
    pub role_claim: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginPayload {
    staff_id: StaffId,
    display_name: String,
    role: String,
    token: String,
}

#[derive(Clone, Deserialize)]
struct LoginEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<LoginPayload>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Error)]
pub enum RestError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("login rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Thin wrapper over one `reqwest::Client` and the backend base URL.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_url: String,
}

impl RestClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url: api_url.into(),
        }
    }

    /// Exchange credentials for the staff profile and a bearer token.
    pub async fn login(
        &self,
        request: &LoginRequest,
    ) -> Result<(StaffProfile, AuthToken), RestError> {
        let url = format!("{}/auth/login", self.api_url);
        let response = self.http.post(&url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<LoginEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| "login failed".to_string());
            return Err(RestError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: LoginEnvelope =
            serde_json::from_str(&body).map_err(|err| RestError::Malformed(err.to_string()))?;
        if !envelope.success {
            return Err(RestError::Rejected {
                status: status.as_u16(),
                message: envelope
                    .message
                    .unwrap_or_else(|| "login failed".to_string()),
            });
        }

        let payload = envelope
            .data
            .ok_or_else(|| RestError::Malformed("missing data in login response".to_string()))?;

        let profile = StaffProfile {
            staff_id: payload.staff_id,
            display_name: payload.display_name,
            raw_role: RoleCode::new(payload.role),
        };
        Ok((profile, AuthToken::new(payload.token)))
    }
}

#[async_trait]
impl PermissionSource for RestClient {
    async fn fetch_permissions(&self, credential: &AuthToken) -> PermissionMap {
        let url = format!("{}/auth/permissions", self.api_url);
        let response = match self
            .http
            .get(&url)
            .bearer_auth(credential.as_str())
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!("permission fetch failed: {err}");
                return PermissionMap::new();
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "permission fetch rejected");
            return PermissionMap::new();
        }

        match response.text().await {
            Ok(body) => decode_permission_envelope(&body),
            Err(err) => {
                tracing::warn!("failed to read permission response body: {err}");
                PermissionMap::new()
            }
        }
    }
}
