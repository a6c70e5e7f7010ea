use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(ContractId);
id_newtype!(UserId);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid contract id '{0}': expected an integer >= 1")]
pub struct InvalidContractId(pub String);

impl FromStr for ContractId {
    type Err = InvalidContractId;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().parse::<i64>() {
            Ok(id) if id >= 1 => Ok(Self(id)),
            _ => Err(InvalidContractId(raw.to_string())),
        }
    }
}

/// The editable, analysis-derived fields of a contract.
///
/// Values are display strings: list-shaped analysis output has already been
/// joined by the time it lands here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractFields {
    #[serde(
        rename = "nomes_partes",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub parties: Option<String>,
    #[serde(
        rename = "valores_monetarios",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub monetary_values: Option<String>,
    #[serde(
        rename = "obrigacoes_principais",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub main_obligations: Option<String>,
    #[serde(
        rename = "dados_adicionais",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_data: Option<String>,
    #[serde(
        rename = "clausulas_rescisao",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub termination_clauses: Option<String>,
}

impl ContractFields {
    pub fn get(&self, field: FieldKind) -> Option<&str> {
        match field {
            FieldKind::Parties => self.parties.as_deref(),
            FieldKind::MonetaryValues => self.monetary_values.as_deref(),
            FieldKind::MainObligations => self.main_obligations.as_deref(),
            FieldKind::AdditionalData => self.additional_data.as_deref(),
            FieldKind::TerminationClauses => self.termination_clauses.as_deref(),
        }
    }

    pub fn set(&mut self, field: FieldKind, value: impl Into<String>) {
        let slot = match field {
            FieldKind::Parties => &mut self.parties,
            FieldKind::MonetaryValues => &mut self.monetary_values,
            FieldKind::MainObligations => &mut self.main_obligations,
            FieldKind::AdditionalData => &mut self.additional_data,
            FieldKind::TerminationClauses => &mut self.termination_clauses,
        };
        *slot = Some(value.into());
    }
}

/// Names one of the five editable contract fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Parties,
    MonetaryValues,
    MainObligations,
    AdditionalData,
    TerminationClauses,
}

impl FieldKind {
    pub const ALL: [FieldKind; 5] = [
        FieldKind::Parties,
        FieldKind::MonetaryValues,
        FieldKind::MainObligations,
        FieldKind::AdditionalData,
        FieldKind::TerminationClauses,
    ];

    /// Wire name used by the contract service.
    pub fn wire_name(self) -> &'static str {
        match self {
            FieldKind::Parties => "nomes_partes",
            FieldKind::MonetaryValues => "valores_monetarios",
            FieldKind::MainObligations => "obrigacoes_principais",
            FieldKind::AdditionalData => "dados_adicionais",
            FieldKind::TerminationClauses => "clausulas_rescisao",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Parties => "Parties",
            FieldKind::MonetaryValues => "Monetary values",
            FieldKind::MainObligations => "Main obligations",
            FieldKind::AdditionalData => "Additional data",
            FieldKind::TerminationClauses => "Termination clauses",
        }
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
        FieldKind::ALL
            .into_iter()
            .find(|field| {
                field.wire_name() == normalized
                    || format!("{field:?}").to_ascii_lowercase() == normalized.replace('_', "")
            })
            .ok_or_else(|| format!("unknown contract field '{raw}'"))
    }
}

/// One stored contract as returned by the listing and fetch-one endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractSummary {
    pub id: ContractId,
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<UserId>,
    #[serde(flatten)]
    pub fields: ContractFields,
}
