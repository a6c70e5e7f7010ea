use serde::{Deserialize, Serialize};

use crate::domain::{ContractFields, ContractId, ContractSummary};

/// Separator for list-shaped analysis fields (parties, values, clauses).
pub const LIST_SEPARATOR: &str = "; ";
/// Separator for paragraph-shaped analysis fields (obligations).
pub const PARAGRAPH_SEPARATOR: &str = "\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractListResponse {
    pub contracts: Vec<ContractSummary>,
    #[serde(default)]
    pub total: Option<usize>,
}

/// Analysis text that the service emits either as a plain string or as a
/// list of fragments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisText {
    Text(String),
    Items(Vec<String>),
}

impl AnalysisText {
    pub fn join(&self, separator: &str) -> String {
        match self {
            AnalysisText::Text(text) => text.clone(),
            AnalysisText::Items(items) => items.join(separator),
        }
    }
}

/// Structured output of the remote extraction step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    #[serde(default)]
    pub nomes_partes: Option<Vec<String>>,
    #[serde(default)]
    pub valores_monetarios: Option<Vec<String>>,
    #[serde(default)]
    pub obrigacoes_principais: Option<Vec<String>>,
    #[serde(default)]
    pub dados_adicionais: Option<AnalysisText>,
    #[serde(default)]
    pub clausulas_rescisao: Option<AnalysisText>,
}

impl ContractAnalysis {
    /// Flattens the analysis into display strings. Absent lists become empty
    /// strings so every field is present after a successful extraction.
    pub fn to_fields(&self) -> ContractFields {
        fn joined(items: &Option<Vec<String>>, separator: &str) -> String {
            items
                .as_deref()
                .map(|items| items.join(separator))
                .unwrap_or_default()
        }

        ContractFields {
            parties: Some(joined(&self.nomes_partes, LIST_SEPARATOR)),
            monetary_values: Some(joined(&self.valores_monetarios, LIST_SEPARATOR)),
            main_obligations: Some(joined(&self.obrigacoes_principais, PARAGRAPH_SEPARATOR)),
            additional_data: Some(
                self.dados_adicionais
                    .as_ref()
                    .map(|text| text.join(PARAGRAPH_SEPARATOR))
                    .unwrap_or_default(),
            ),
            termination_clauses: Some(
                self.clausulas_rescisao
                    .as_ref()
                    .map(|text| text.join(LIST_SEPARATOR))
                    .unwrap_or_default(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub id: ContractId,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub analysis: ContractAnalysis,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateContractResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated_contract: Option<ContractSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: Option<String>,
}
