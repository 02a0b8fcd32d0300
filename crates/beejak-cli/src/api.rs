//! HTTP client for the beejak backend.
//!
//! Every response goes through the same status translation, so commands
//! match on [`ApiError`] variants instead of raw status codes.

use beejak_core::UserProfile;
use beejak_core::models::client::{Client, ClientCreate, ClientUpdate};
use beejak_core::models::invoice::{Invoice, InvoiceCreate, InvoiceUpdate};
use beejak_core::models::template::{InvoiceTemplate, TemplateCreate, TemplateUpdate};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("unauthorized - token missing, expired, or revoked")]
    Unauthorized,

    #[error("forbidden - the account may not perform this action")]
    Forbidden,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("server error ({0}): {1}")]
    Server(u16, String),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Client for the beejak REST API.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> ApiResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("beejak/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach a bearer token to every subsequent request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    async fn handle<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(self.error_for(status, response).await)
    }

    async fn handle_empty(&self, response: Response) -> ApiResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(self.error_for(status, response).await)
    }

    async fn error_for(&self, status: StatusCode, response: Response) -> ApiError {
        let body = response.text().await.unwrap_or_default();
        debug!("API request failed with {}: {}", status, body);
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(body),
            _ => ApiError::Server(status.as_u16(), body),
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let response = self
            .client
            .post(self.url("auth/login"))
            .json(&request)
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn invoices(&self) -> ApiResult<Vec<Invoice>> {
        let response = self
            .authorize(self.client.get(self.url("invoices")))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn invoice(&self, id: Uuid) -> ApiResult<Invoice> {
        let response = self
            .authorize(self.client.get(self.url(&format!("invoices/{}", id))))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn create_invoice(&self, invoice: &InvoiceCreate) -> ApiResult<Invoice> {
        let response = self
            .authorize(self.client.post(self.url("invoices")).json(invoice))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn update_invoice(&self, id: Uuid, update: &InvoiceUpdate) -> ApiResult<Invoice> {
        let response = self
            .authorize(
                self.client
                    .put(self.url(&format!("invoices/{}", id)))
                    .json(update),
            )
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn delete_invoice(&self, id: Uuid) -> ApiResult<()> {
        let response = self
            .authorize(self.client.delete(self.url(&format!("invoices/{}", id))))
            .send()
            .await?;
        self.handle_empty(response).await
    }

    pub async fn clients(&self) -> ApiResult<Vec<Client>> {
        let response = self
            .authorize(self.client.get(self.url("clients")))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn create_client(&self, client: &ClientCreate) -> ApiResult<Client> {
        let response = self
            .authorize(self.client.post(self.url("clients")).json(client))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn update_client(&self, id: Uuid, update: &ClientUpdate) -> ApiResult<Client> {
        let response = self
            .authorize(
                self.client
                    .put(self.url(&format!("clients/{}", id)))
                    .json(update),
            )
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn delete_client(&self, id: Uuid) -> ApiResult<()> {
        let response = self
            .authorize(self.client.delete(self.url(&format!("clients/{}", id))))
            .send()
            .await?;
        self.handle_empty(response).await
    }

    pub async fn templates(&self) -> ApiResult<Vec<InvoiceTemplate>> {
        let response = self
            .authorize(self.client.get(self.url("templates")))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn template(&self, id: Uuid) -> ApiResult<InvoiceTemplate> {
        let response = self
            .authorize(self.client.get(self.url(&format!("templates/{}", id))))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn create_template(&self, template: &TemplateCreate) -> ApiResult<InvoiceTemplate> {
        let response = self
            .authorize(self.client.post(self.url("templates")).json(template))
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn update_template(
        &self,
        id: Uuid,
        update: &TemplateUpdate,
    ) -> ApiResult<InvoiceTemplate> {
        let response = self
            .authorize(
                self.client
                    .put(self.url(&format!("templates/{}", id)))
                    .json(update),
            )
            .send()
            .await?;
        self.handle(response).await
    }

    pub async fn delete_template(&self, id: Uuid) -> ApiResult<()> {
        let response = self
            .authorize(self.client.delete(self.url(&format!("templates/{}", id))))
            .send()
            .await?;
        self.handle_empty(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining_strips_slashes() {
        let client = ApiClient::new("http://localhost:8080/api/", 30).unwrap();
        assert_eq!(client.url("invoices"), "http://localhost:8080/api/invoices");
        assert_eq!(client.url("/invoices"), "http://localhost:8080/api/invoices");
    }

    #[test]
    fn test_login_request_wire_shape() {
        let request = LoginRequest {
            email: "asha@beejak.example".to_string(),
            password: "secret".to_string(),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["email"], "asha@beejak.example");
        assert_eq!(value["password"], "secret");
    }
}
