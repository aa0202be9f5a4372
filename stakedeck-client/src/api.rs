//! Identity-service client.
//!
//! `IdentityApi` is the seam the session controller (and its tests) work
//! against; `IdentityClient` is the reqwest implementation speaking to the
//! real service. Transport failures and error bodies are classified here so
//! the controller only ever sees [`IdentityError`].

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, header::AUTHORIZATION};
use serde::de::DeserializeOwned;

use shared::config::ClientConfig;
use shared::models::{
    AccessGrantRequest, AuthSession, Credentials, ErrorResponse, LogoutRequest, ProfileUpdate,
    ResetPasswordRequest, SignupRequest, UserProfile, VerifyAuthRequest,
};

use crate::error::{IdentityError, IdentityResult};

/// Remote identity-service operations consumed by the session controller.
///
/// One method per endpoint; authorized calls take the bearer credential the
/// caller selected (the session's refresh token everywhere except the
/// one-time email-approval link).
#[async_trait]
pub trait IdentityApi: Send + Sync {
    /// `POST /v1/auth/register`
    async fn register(&self, signup: &SignupRequest) -> IdentityResult<AuthSession>;

    /// `POST /v1/auth/login`
    async fn login(&self, credentials: &Credentials) -> IdentityResult<AuthSession>;

    /// `POST /v1/auth/logout`
    async fn logout(&self, request: &LogoutRequest) -> IdentityResult<()>;

    /// `PUT /v1/auth/update-profile`
    async fn update_profile(
        &self,
        patch: &ProfileUpdate,
        bearer: &str,
    ) -> IdentityResult<UserProfile>;

    /// `POST /v1/auth/reset-password-profile`
    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        bearer: &str,
    ) -> IdentityResult<()>;

    /// `POST /v1/auth/approve-email`
    async fn approve_email(&self, bearer: &str) -> IdentityResult<UserProfile>;

    /// `POST /v1/auth/send-verification-email`
    async fn send_verification_email(&self, bearer: &str) -> IdentityResult<()>;

    /// `POST /v1/auth/provide-access`
    async fn provide_access(
        &self,
        request: &AccessGrantRequest,
        bearer: &str,
    ) -> IdentityResult<UserProfile>;

    /// `GET /v1/auth/get-auth-token`
    async fn auth_token(&self, bearer: &str) -> IdentityResult<serde_json::Value>;

    /// `POST /v1/auth/verify-auth-token`
    async fn verify_auth_token(
        &self,
        request: &VerifyAuthRequest,
        bearer: &str,
    ) -> IdentityResult<()>;

    /// `POST /v1/auth/disable-auth`
    async fn disable_auth(&self, bearer: &str) -> IdentityResult<()>;
}

#[async_trait]
impl<T> IdentityApi for std::sync::Arc<T>
where
    T: IdentityApi + ?Sized,
{
    async fn register(&self, signup: &SignupRequest) -> IdentityResult<AuthSession> {
        (**self).register(signup).await
    }

    async fn login(&self, credentials: &Credentials) -> IdentityResult<AuthSession> {
        (**self).login(credentials).await
    }

    async fn logout(&self, request: &LogoutRequest) -> IdentityResult<()> {
        (**self).logout(request).await
    }

    async fn update_profile(
        &self,
        patch: &ProfileUpdate,
        bearer: &str,
    ) -> IdentityResult<UserProfile> {
        (**self).update_profile(patch, bearer).await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        bearer: &str,
    ) -> IdentityResult<()> {
        (**self).reset_password(request, bearer).await
    }

    async fn approve_email(&self, bearer: &str) -> IdentityResult<UserProfile> {
        (**self).approve_email(bearer).await
    }

    async fn send_verification_email(&self, bearer: &str) -> IdentityResult<()> {
        (**self).send_verification_email(bearer).await
    }

    async fn provide_access(
        &self,
        request: &AccessGrantRequest,
        bearer: &str,
    ) -> IdentityResult<UserProfile> {
        (**self).provide_access(request, bearer).await
    }

    async fn auth_token(&self, bearer: &str) -> IdentityResult<serde_json::Value> {
        (**self).auth_token(bearer).await
    }

    async fn verify_auth_token(
        &self,
        request: &VerifyAuthRequest,
        bearer: &str,
    ) -> IdentityResult<()> {
        (**self).verify_auth_token(request, bearer).await
    }

    async fn disable_auth(&self, bearer: &str) -> IdentityResult<()> {
        (**self).disable_auth(bearer).await
    }
}

/// Reqwest-backed implementation of [`IdentityApi`].
#[derive(Clone, Debug)]
pub struct IdentityClient {
    base_url: String,
    client: Client,
}

impl IdentityClient {
    /// Create a client for the identity service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client from the resolved [`ClientConfig`].
    #[must_use]
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_base_url)
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(request: RequestBuilder, bearer: &str) -> RequestBuilder {
        request.header(AUTHORIZATION, bearer)
    }

    async fn execute<T: DeserializeOwned>(request: RequestBuilder) -> IdentityResult<T> {
        let response = request.send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    async fn execute_unit(request: RequestBuilder) -> IdentityResult<()> {
        let response = request.send().await?;
        Self::ensure_success(response).await.map(|_| ())
    }

    async fn ensure_success(response: Response) -> IdentityResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify_error_body(status, &body))
    }
}

/// Map a non-success response onto the error taxonomy: the service-supplied
/// message when the body parses as [`ErrorResponse`], the raw body otherwise,
/// the status line as a last resort.
fn classify_error_body(status: StatusCode, body: &str) -> IdentityError {
    if let Ok(parsed) = serde_json::from_str::<ErrorResponse>(body) {
        return IdentityError::service(parsed.message);
    }
    if body.trim().is_empty() {
        IdentityError::service(status.to_string())
    } else {
        IdentityError::service(body.trim())
    }
}

#[async_trait]
impl IdentityApi for IdentityClient {
    async fn register(&self, signup: &SignupRequest) -> IdentityResult<AuthSession> {
        let url = self.api_url("v1/auth/register");
        Self::execute(self.client.post(url).json(signup)).await
    }

    async fn login(&self, credentials: &Credentials) -> IdentityResult<AuthSession> {
        let url = self.api_url("v1/auth/login");
        Self::execute(self.client.post(url).json(credentials)).await
    }

    async fn logout(&self, request: &LogoutRequest) -> IdentityResult<()> {
        let url = self.api_url("v1/auth/logout");
        Self::execute_unit(self.client.post(url).json(request)).await
    }

    async fn update_profile(
        &self,
        patch: &ProfileUpdate,
        bearer: &str,
    ) -> IdentityResult<UserProfile> {
        let url = self.api_url("v1/auth/update-profile");
        Self::execute(Self::authorize(self.client.put(url), bearer).json(patch)).await
    }

    async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
        bearer: &str,
    ) -> IdentityResult<()> {
        let url = self.api_url("v1/auth/reset-password-profile");
        Self::execute_unit(Self::authorize(self.client.post(url), bearer).json(request)).await
    }

    async fn approve_email(&self, bearer: &str) -> IdentityResult<UserProfile> {
        let url = self.api_url("v1/auth/approve-email");
        Self::execute(Self::authorize(self.client.post(url), bearer).json(&serde_json::json!({})))
            .await
    }

    async fn send_verification_email(&self, bearer: &str) -> IdentityResult<()> {
        let url = self.api_url("v1/auth/send-verification-email");
        Self::execute_unit(
            Self::authorize(self.client.post(url), bearer).json(&serde_json::json!({})),
        )
        .await
    }

    async fn provide_access(
        &self,
        request: &AccessGrantRequest,
        bearer: &str,
    ) -> IdentityResult<UserProfile> {
        let url = self.api_url("v1/auth/provide-access");
        Self::execute(Self::authorize(self.client.post(url), bearer).json(request)).await
    }

    async fn auth_token(&self, bearer: &str) -> IdentityResult<serde_json::Value> {
        let url = self.api_url("v1/auth/get-auth-token");
        Self::execute(Self::authorize(self.client.get(url), bearer)).await
    }

    async fn verify_auth_token(
        &self,
        request: &VerifyAuthRequest,
        bearer: &str,
    ) -> IdentityResult<()> {
        let url = self.api_url("v1/auth/verify-auth-token");
        Self::execute_unit(Self::authorize(self.client.post(url), bearer).json(request)).await
    }

    async fn disable_auth(&self, bearer: &str) -> IdentityResult<()> {
        let url = self.api_url("v1/auth/disable-auth");
        Self::execute_unit(
            Self::authorize(self.client.post(url), bearer).json(&serde_json::json!({})),
        )
        .await
    }
}
