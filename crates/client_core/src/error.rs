//! Failure taxonomy shared by the session guard, gateway and workflow.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("not authenticated: sign in before continuing")]
    Unauthenticated,
    #[error("session expired (status {status})")]
    SessionExpired { status: u16 },
    #[error("conflict: {message}")]
    Conflict { message: String },
    #[error("unprocessable input: {message}")]
    UnprocessableInput { message: String },
    #[error("analysis failure: {message}")]
    AnalysisFailure { message: String },
    #[error("analysis service unavailable: {message}")]
    ServiceUnavailable { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("transport failure: {message}")]
    TransportFailure { message: String },
    #[error("request failed ({}): {message}", status_label(.status))]
    GenericFailure { status: Option<u16>, message: String },
}

fn status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |status| format!("status {status}"))
}

impl ClientError {
    pub fn generic(status: StatusCode, message: impl Into<String>) -> Self {
        Self::GenericFailure {
            status: Some(status.as_u16()),
            message: message.into(),
        }
    }

    /// Only session failures end the current workflow.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthenticated | ClientError::SessionExpired { .. }
        )
    }

    /// Message suitable for showing to the person driving the workflow.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Unauthenticated => {
                "You are not signed in. Please log in again.".to_string()
            }
            ClientError::SessionExpired { .. } => {
                "Session expired. Please log in again.".to_string()
            }
            ClientError::Conflict { .. } => {
                "A contract with this file name already exists.".to_string()
            }
            ClientError::UnprocessableInput { .. } => {
                "Could not extract the contract text. Check the file format and try again."
                    .to_string()
            }
            ClientError::AnalysisFailure { .. } => {
                "The analysis service failed to process the contract.".to_string()
            }
            ClientError::ServiceUnavailable { .. } => {
                "The analysis service is not enabled. Configure its API key to use this feature."
                    .to_string()
            }
            ClientError::NotFound { .. } => "Contract not found.".to_string(),
            ClientError::TransportFailure { .. } => {
                "Could not reach the server. Check the URL or network and retry.".to_string()
            }
            ClientError::GenericFailure { message, .. } if !message.is_empty() => {
                format!("Unexpected error: {message}")
            }
            ClientError::GenericFailure { .. } => "Unexpected error.".to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return ClientError::GenericFailure {
                status: error.status().map(|status| status.as_u16()),
                message: format!("invalid response body: {error}"),
            };
        }
        ClientError::TransportFailure {
            message: error.to_string(),
        }
    }
}
