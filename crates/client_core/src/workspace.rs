//! Command dispatch from the presentation layer into the draft machine,
//! the listing and the gateway.

use std::sync::Arc;

use shared::domain::{ContractId, ContractSummary, FieldKind};
use tracing::{info, warn};

use crate::{
    draft::{ContractDraft, Controls, DraftError, UploadReviewMachine},
    error::ClientError,
    gateway::ContractGateway,
    listing::{Confirm, ContractListing, DeleteOutcome},
    session::SessionGuard,
    types::SourceFile,
};

/// User actions on the create/edit draft.
#[derive(Debug, Clone)]
pub enum DraftCommand {
    SelectFile(Option<SourceFile>),
    SubmitExtract,
    EditField { field: FieldKind, value: String },
    SubmitSave,
    Cancel,
    OpenExisting(ContractId),
}

impl DraftCommand {
    fn name(&self) -> &'static str {
        match self {
            DraftCommand::SelectFile(_) => "select_file",
            DraftCommand::SubmitExtract => "submit_extract",
            DraftCommand::EditField { .. } => "edit_field",
            DraftCommand::SubmitSave => "submit_save",
            DraftCommand::Cancel => "cancel",
            DraftCommand::OpenExisting(_) => "open_existing",
        }
    }
}

/// What the presentation layer should do after a dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// State changed; re-render from the draft and controls.
    Applied,
    /// The command was not valid in the current phase and had no effect.
    Ignored(DraftError),
    /// State changed and there is a message worth showing.
    Notice(String),
    /// The call failed; the draft is back in a phase the user can retry from.
    Recoverable(ClientError),
    /// Fields were saved, the draft was discarded and the listing refreshed.
    Committed(ContractId),
    /// The session is gone; the draft was discarded and the credential cleared.
    RedirectToLogin(ClientError),
}

pub struct ContractWorkspace {
    gateway: Arc<dyn ContractGateway>,
    session: Arc<SessionGuard>,
    machine: UploadReviewMachine,
    listing: ContractListing,
}

impl ContractWorkspace {
    pub fn new(gateway: Arc<dyn ContractGateway>, session: Arc<SessionGuard>) -> Self {
        Self {
            listing: ContractListing::new(gateway.clone()),
            gateway,
            session,
            machine: UploadReviewMachine::new(),
        }
    }

    pub fn draft(&self) -> &ContractDraft {
        self.machine.draft()
    }

    pub fn controls(&self) -> Controls {
        self.machine.controls()
    }

    pub fn contracts(&self) -> &[ContractSummary] {
        self.listing.contracts()
    }

    pub async fn dispatch(&mut self, command: DraftCommand) -> DispatchOutcome {
        let name = command.name();
        let outcome = match command {
            DraftCommand::SelectFile(file) => applied(self.machine.select_file(file)),
            DraftCommand::SubmitExtract => self.submit_extract().await,
            DraftCommand::EditField { field, value } => {
                applied(self.machine.edit_field(field, value))
            }
            DraftCommand::SubmitSave => self.submit_save().await,
            DraftCommand::Cancel => applied(self.machine.cancel()),
            DraftCommand::OpenExisting(id) => self.open_existing(id).await,
        };
        if let DispatchOutcome::Ignored(reason) = &outcome {
            warn!(command = name, %reason, "workspace: command ignored");
        }
        outcome
    }

    async fn submit_extract(&mut self) -> DispatchOutcome {
        let (ticket, file) = match self.machine.begin_extract() {
            Ok(started) => started,
            Err(reason) => return DispatchOutcome::Ignored(reason),
        };
        match self.gateway.upload_and_extract(&file).await {
            Ok(extracted) => {
                info!(
                    filename = %file.filename,
                    server_message = extracted.message.as_deref().unwrap_or_default(),
                    "workspace: extraction ready for review"
                );
                if let Err(reason) = self.machine.finish_extract(ticket, extracted) {
                    return DispatchOutcome::Ignored(reason);
                }
                DispatchOutcome::Notice(
                    "Data extracted. Review the fields and save to confirm.".to_string(),
                )
            }
            Err(error) => {
                if let Err(reason) = self.machine.fail_extract(ticket, &error) {
                    return DispatchOutcome::Ignored(reason);
                }
                self.resolve_failure(error).await
            }
        }
    }

    async fn submit_save(&mut self) -> DispatchOutcome {
        let request = match self.machine.begin_save() {
            Ok(request) => request,
            Err(reason) => return DispatchOutcome::Ignored(reason),
        };
        match self.gateway.update(request.id, &request.fields).await {
            Ok(()) => {
                let id = match self.machine.finish_save(request.ticket) {
                    Ok(id) => id,
                    Err(reason) => return DispatchOutcome::Ignored(reason),
                };
                self.machine.discard();
                info!(contract_id = id.0, "workspace: contract committed");
                match self.listing.refresh().await {
                    Ok(_) => DispatchOutcome::Committed(id),
                    Err(error) if error.requires_reauth() => self.resolve_failure(error).await,
                    Err(error) => {
                        warn!(%error, "workspace: listing refresh after commit failed");
                        DispatchOutcome::Committed(id)
                    }
                }
            }
            Err(error) => {
                if let Err(reason) = self.machine.fail_save(request.ticket, &error) {
                    return DispatchOutcome::Ignored(reason);
                }
                self.resolve_failure(error).await
            }
        }
    }

    async fn open_existing(&mut self, id: ContractId) -> DispatchOutcome {
        match self.gateway.fetch_one(id).await {
            Ok(contract) => {
                self.machine.open_existing(contract);
                DispatchOutcome::Applied
            }
            Err(error) => {
                self.machine.fail_open(id, &error);
                self.resolve_failure(error).await
            }
        }
    }

    /// Single exit for failures: session loss ends the workflow, anything
    /// else is left for the user to retry.
    async fn resolve_failure(&mut self, error: ClientError) -> DispatchOutcome {
        if error.requires_reauth() {
            self.end_session().await;
            return DispatchOutcome::RedirectToLogin(error);
        }
        DispatchOutcome::Recoverable(error)
    }

    async fn end_session(&mut self) {
        self.machine.discard();
        self.session.clear().await;
        warn!("workspace: session ended, draft discarded");
    }

    pub async fn refresh(&mut self) -> Result<usize, ClientError> {
        let result = self.listing.refresh().await;
        self.end_session_on_reauth(result).await
    }

    pub async fn request_delete(
        &mut self,
        id: ContractId,
        confirm: &dyn Confirm,
    ) -> Result<DeleteOutcome, ClientError> {
        let result = self.listing.request_delete(id, confirm).await;
        self.end_session_on_reauth(result).await
    }

    pub async fn request_view(&mut self, id: ContractId) -> Result<ContractSummary, ClientError> {
        let result = self.listing.request_view(id).await;
        self.end_session_on_reauth(result).await
    }

    /// Hands a listed contract to the draft machine.
    pub async fn request_edit(&mut self, id: ContractId) -> DispatchOutcome {
        self.dispatch(DraftCommand::OpenExisting(id)).await
    }

    async fn end_session_on_reauth<T>(
        &mut self,
        result: Result<T, ClientError>,
    ) -> Result<T, ClientError> {
        if let Err(error) = &result {
            if error.requires_reauth() {
                self.end_session().await;
            }
        }
        result
    }
}

fn applied(result: Result<(), DraftError>) -> DispatchOutcome {
    match result {
        Ok(()) => DispatchOutcome::Applied,
        Err(reason) => DispatchOutcome::Ignored(reason),
    }
}

#[cfg(test)]
#[path = "tests/workspace_tests.rs"]
mod tests;
