//! Consumer of the authentication service: login, registration and logout.

use std::sync::Arc;

use reqwest::Client;
use shared::{
    error::detail_message,
    protocol::{LoginRequest, RegisterRequest, TokenResponse},
};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    session::{Credential, SessionGuard},
};

pub struct AuthClient {
    http: Client,
    server_url: String,
    session: Arc<SessionGuard>,
}

impl AuthClient {
    pub fn new(server_url: impl Into<String>, session: Arc<SessionGuard>) -> Self {
        Self::with_client(Client::new(), server_url, session)
    }

    pub fn with_client(
        http: Client,
        server_url: impl Into<String>,
        session: Arc<SessionGuard>,
    ) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
            session,
        }
    }

    /// Exchanges email and password for a credential and stores it. A rejected
    /// login leaves any stored credential untouched.
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/login", self.server_url))
            .json(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = detail_message(&body)
                .unwrap_or_else(|| "login failed; check your credentials".to_string());
            warn!(status = status.as_u16(), "auth: login rejected");
            return Err(ClientError::generic(status, message));
        }

        let body: TokenResponse = response.json().await?;
        self.session
            .set(Credential::new(body.access_token))
            .await
            .map_err(|error| ClientError::GenericFailure {
                status: None,
                message: format!("failed to store session: {error:#}"),
            })?;
        info!("auth: signed in");
        Ok(())
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/users/register", self.server_url))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = detail_message(&body).unwrap_or_else(|| "try again".to_string());
            warn!(status = status.as_u16(), username = %request.username, "auth: registration rejected");
            return Err(ClientError::generic(status, message));
        }

        info!(username = %request.username, "auth: account registered");
        Ok(())
    }

    pub async fn logout(&self) {
        self.session.clear().await;
        info!("auth: signed out");
    }
}

#[cfg(test)]
#[path = "tests/auth_tests.rs"]
mod tests;
