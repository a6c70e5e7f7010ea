//! Holds the current contract collection and routes row actions.

use std::sync::Arc;

use shared::domain::{ContractId, ContractSummary};
use tracing::{info, warn};

use crate::{error::ClientError, gateway::ContractGateway};

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Declined,
}

pub struct ContractListing {
    gateway: Arc<dyn ContractGateway>,
    contracts: Vec<ContractSummary>,
}

impl ContractListing {
    pub fn new(gateway: Arc<dyn ContractGateway>) -> Self {
        Self {
            gateway,
            contracts: Vec::new(),
        }
    }

    pub fn contracts(&self) -> &[ContractSummary] {
        &self.contracts
    }

    /// Replaces the held collection wholesale. A 404 from the service means
    /// "no contracts yet" and empties the view without reporting an error.
    /// Any other failure keeps the previous collection.
    pub async fn refresh(&mut self) -> Result<usize, ClientError> {
        match self.gateway.list().await {
            Ok(contracts) => self.contracts = contracts,
            Err(ClientError::NotFound { .. }) => self.contracts.clear(),
            Err(error) => return Err(error),
        }
        info!(count = self.contracts.len(), "listing: refreshed");
        Ok(self.contracts.len())
    }

    pub async fn request_delete(
        &mut self,
        id: ContractId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        if !confirm.confirm(&format!("Delete contract {id}? This cannot be undone.")) {
            return Ok(DeleteOutcome::Declined);
        }
        self.gateway.delete_one(id).await?;
        match self.refresh().await {
            Ok(_) => {}
            Err(error) if error.requires_reauth() => return Err(error),
            Err(error) => {
                warn!(contract_id = id.0, %error, "listing: refresh after delete failed");
                self.contracts.retain(|contract| contract.id != id);
            }
        }
        Ok(DeleteOutcome::Deleted)
    }

    /// Read-only detail for a single contract. Unlike the listing, a 404 here
    /// is an error.
    pub async fn request_view(&self, id: ContractId) -> Result<ContractSummary, ClientError> {
        self.gateway.fetch_one(id).await
    }
}

#[cfg(test)]
#[path = "tests/listing_tests.rs"]
mod tests;
