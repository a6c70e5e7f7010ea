//! Typed client for the contract service endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response, StatusCode};
use shared::{
    domain::{ContractFields, ContractId, ContractSummary},
    error::detail_message,
    protocol::{ContractListResponse, MessageResponse, UpdateContractResponse, UploadResponse},
};
use tracing::{info, warn};

use crate::{
    error::ClientError,
    session::SessionGuard,
    types::{ExtractedContract, SourceFile},
};

/// The five remote operations the workflow needs. Nothing here retries.
#[async_trait]
pub trait ContractGateway: Send + Sync {
    async fn list(&self) -> Result<Vec<ContractSummary>, ClientError>;
    async fn fetch_one(&self, id: ContractId) -> Result<ContractSummary, ClientError>;
    async fn upload_and_extract(&self, file: &SourceFile)
        -> Result<ExtractedContract, ClientError>;
    async fn update(&self, id: ContractId, fields: &ContractFields) -> Result<(), ClientError>;
    async fn delete_one(&self, id: ContractId) -> Result<(), ClientError>;
}

pub struct HttpContractGateway {
    http: Client,
    server_url: String,
    session: Arc<SessionGuard>,
}

impl HttpContractGateway {
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

    pub fn session(&self) -> &Arc<SessionGuard> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.server_url)
    }
}

/// Reads the failure message out of a non-success response.
async fn failure_message(response: Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    detail_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_string()
    })
}

/// Status mapping for read, update and delete calls. 401/403 never reach
/// here: the session guard consumes them first.
pub fn map_read_failure(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound { message },
        _ => ClientError::generic(status, message),
    }
}

/// Status mapping for the upload-and-extract call.
pub fn map_upload_failure(status: StatusCode, message: String) -> ClientError {
    match status {
        StatusCode::CONFLICT => ClientError::Conflict { message },
        StatusCode::UNPROCESSABLE_ENTITY => ClientError::UnprocessableInput { message },
        StatusCode::INTERNAL_SERVER_ERROR => ClientError::AnalysisFailure { message },
        StatusCode::SERVICE_UNAVAILABLE => ClientError::ServiceUnavailable { message },
        _ => ClientError::generic(status, message),
    }
}

#[async_trait]
impl ContractGateway for HttpContractGateway {
    async fn list(&self) -> Result<Vec<ContractSummary>, ClientError> {
        let response = self
            .session
            .send(self.http.get(self.url("/contracts")))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = map_read_failure(status, failure_message(response).await);
            if !matches!(error, ClientError::NotFound { .. }) {
                warn!(status = status.as_u16(), %error, "gateway: list contracts failed");
            }
            return Err(error);
        }
        let body: ContractListResponse = response.json().await?;
        Ok(body.contracts)
    }

    async fn fetch_one(&self, id: ContractId) -> Result<ContractSummary, ClientError> {
        let response = self
            .session
            .send(self.http.get(self.url(&format!("/contracts/{}", id.0))))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = map_read_failure(status, failure_message(response).await);
            warn!(contract_id = id.0, status = status.as_u16(), %error, "gateway: fetch contract failed");
            return Err(error);
        }
        Ok(response.json().await?)
    }

    async fn upload_and_extract(
        &self,
        file: &SourceFile,
    ) -> Result<ExtractedContract, ClientError> {
        let part = multipart::Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.mime_type)
            .map_err(|error| ClientError::GenericFailure {
                status: None,
                message: format!("invalid mime type '{}': {error}", file.mime_type),
            })?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .session
            .send(self.http.post(self.url("/contracts/upload")).multipart(form))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = map_upload_failure(status, failure_message(response).await);
            warn!(
                filename = %file.filename,
                status = status.as_u16(),
                %error,
                "gateway: upload and extract failed"
            );
            return Err(error);
        }
        let body: UploadResponse = response.json().await?;
        info!(contract_id = body.id.0, filename = %file.filename, "gateway: contract extracted");
        Ok(ExtractedContract {
            id: body.id,
            fields: body.analysis.to_fields(),
            message: body.message,
        })
    }

    async fn update(&self, id: ContractId, fields: &ContractFields) -> Result<(), ClientError> {
        let response = self
            .session
            .send(
                self.http
                    .put(self.url(&format!("/contracts/{}", id.0)))
                    .json(fields),
            )
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = map_read_failure(status, failure_message(response).await);
            warn!(contract_id = id.0, status = status.as_u16(), %error, "gateway: update contract failed");
            return Err(error);
        }
        // Success is decided by status alone; the body is informational.
        let body = response.json::<UpdateContractResponse>().await.ok();
        info!(
            contract_id = id.0,
            message = body
                .as_ref()
                .and_then(|body| body.message.as_deref())
                .unwrap_or_default(),
            "gateway: contract updated"
        );
        Ok(())
    }

    async fn delete_one(&self, id: ContractId) -> Result<(), ClientError> {
        let response = self
            .session
            .send(self.http.delete(self.url(&format!("/contracts/{}", id.0))))
            .await?;
        let status = response.status();
        if !status.is_success() {
            let error = map_read_failure(status, failure_message(response).await);
            warn!(contract_id = id.0, status = status.as_u16(), %error, "gateway: delete contract failed");
            return Err(error);
        }
        let body = response.json::<MessageResponse>().await.ok();
        info!(
            contract_id = id.0,
            message = body
                .as_ref()
                .and_then(|body| body.message.as_deref())
                .unwrap_or_default(),
            "gateway: contract deleted"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
