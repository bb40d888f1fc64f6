//! HTTP client for the Lumis backend.
//!
//! JSON over HTTPS with bearer auth. A 401 triggers exactly one
//! refresh-token rotation followed by one retry of the original
//! request; a second 401 surfaces as [`ApiError::Unauthorized`].
//! Callers display the error, they do not auto-retry further.

use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::debug;
use url::Url;

use crate::error::ApiError;

use super::{Profile, ReceiptStatus, SyncPayload, TokenPair, TokenStore};

pub struct SyncClient {
    base: Url,
    http: reqwest::Client,
    tokens: TokenStore,
}

impl SyncClient {
    /// Build a client for the configured backend URL with
    /// keyring-backed tokens.
    ///
    /// # Errors
    /// Returns an error if the base URL does not parse.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_tokens(base_url, TokenStore::new())
    }

    pub fn with_tokens(base_url: &str, tokens: TokenStore) -> Result<Self, ApiError> {
        let base = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        Ok(Self {
            base,
            http: reqwest::Client::new(),
            tokens,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_authenticated()
    }

    /// Exchange credentials for a token pair and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = self.join("auth/login")?;
        let resp = self
            .http
            .post(url)
            .json(&json!({"email": email, "password": password}))
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let tokens: TokenPair = resp.json().await?;
        self.tokens.set_tokens(&tokens)
    }

    /// Drop stored credentials.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.tokens.clear()
    }

    /// Push the local state to the backend.
    pub async fn push(&self, payload: &SyncPayload) -> Result<(), ApiError> {
        let body = serde_json::to_value(payload)?;
        self.send_authed(Method::POST, "sync", Some(&body)).await?;
        Ok(())
    }

    /// Pull the server copy of the state.
    pub async fn pull(&self) -> Result<SyncPayload, ApiError> {
        let resp = self.send_authed(Method::GET, "sync", None).await?;
        Ok(resp.json().await?)
    }

    pub async fn profile(&self) -> Result<Profile, ApiError> {
        let resp = self.send_authed(Method::GET, "profile", None).await?;
        Ok(resp.json().await?)
    }

    /// Validate a purchase receipt. De-duplication of repeated
    /// submissions is the payment provider's job, not ours.
    pub async fn validate_receipt(&self, receipt: &str) -> Result<ReceiptStatus, ApiError> {
        let body = json!({ "receipt": receipt });
        let resp = self
            .send_authed(Method::POST, "subscription/validate", Some(&body))
            .await?;
        Ok(resp.json().await?)
    }

    fn join(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path)
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))
    }

    async fn refresh(&self) -> Result<(), ApiError> {
        let refresh = self.tokens.refresh_token()?;
        debug!("rotating sync tokens");
        let url = self.join("auth/refresh")?;
        let resp = self
            .http
            .post(url)
            .json(&json!({"refresh_token": refresh}))
            .send()
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        let resp = Self::check_status(resp).await?;
        let tokens: TokenPair = resp.json().await?;
        self.tokens.set_tokens(&tokens)
    }

    async fn send_authed(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.join(path)?;
        let mut refreshed = false;
        loop {
            let token = self.tokens.access_token()?;
            let mut req = self.http.request(method.clone(), url.clone()).bearer_auth(&token);
            if let Some(b) = body {
                req = req.json(b);
            }
            let resp = req.send().await?;

            if resp.status() == StatusCode::UNAUTHORIZED {
                if refreshed {
                    return Err(ApiError::Unauthorized);
                }
                refreshed = true;
                self.refresh().await?;
                continue;
            }
            return Self::check_status(resp).await;
        }
    }

    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            Ok(resp)
        } else {
            let message = resp.text().await.unwrap_or_default();
            Err(ApiError::Server {
                status: status.as_u16(),
                message,
            })
        }
    }
}
