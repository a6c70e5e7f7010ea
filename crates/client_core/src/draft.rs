//! Upload-review state machine for a single contract draft.
//!
//! The machine is synchronous: network calls happen outside it, between a
//! `begin_*` call that hands out a ticket and the matching `finish_*`/`fail_*`
//! call that consumes it. A ticket is only honoured while the draft is still
//! in the phase that issued it, so a stale response can never move a draft
//! that was discarded or reopened in the meantime.

use shared::domain::{ContractFields, ContractId, ContractSummary, FieldKind};
use thiserror::Error;
use tracing::debug;

use crate::{
    error::ClientError,
    types::{ExtractedContract, SourceFile},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    FileSelected,
    Extracting,
    ReviewReady,
    Saving,
    Committed,
    /// An existing contract could not be opened for editing.
    Failed,
}

/// How the draft got its contract id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOrigin {
    Upload,
    Existing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractDraft {
    id: Option<ContractId>,
    source_file: Option<SourceFile>,
    filename: Option<String>,
    fields: ContractFields,
    phase: Phase,
    origin: DraftOrigin,
    failure: Option<String>,
}

impl Default for ContractDraft {
    fn default() -> Self {
        Self {
            id: None,
            source_file: None,
            filename: None,
            fields: ContractFields::default(),
            phase: Phase::Empty,
            origin: DraftOrigin::Upload,
            failure: None,
        }
    }
}

impl ContractDraft {
    pub fn id(&self) -> Option<ContractId> {
        self.id
    }

    pub fn source_file(&self) -> Option<&SourceFile> {
        self.source_file.as_ref()
    }

    /// Name of the selected file, or of the stored contract in edit mode.
    pub fn filename(&self) -> Option<&str> {
        self.source_file
            .as_ref()
            .map(|file| file.filename.as_str())
            .or(self.filename.as_deref())
    }

    pub fn fields(&self) -> &ContractFields {
        &self.fields
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn origin(&self) -> DraftOrigin {
        self.origin
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    pub fn controls(&self) -> Controls {
        Controls::for_draft(self)
    }
}

/// Enabled state of every user-facing action, derived from the draft alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub select_file: bool,
    pub extract: bool,
    pub edit_fields: bool,
    pub commit: bool,
    pub cancel: bool,
}

impl Controls {
    pub fn for_draft(draft: &ContractDraft) -> Self {
        let phase = draft.phase;
        let in_flight = matches!(phase, Phase::Extracting | Phase::Saving);
        Self {
            select_file: draft.origin == DraftOrigin::Upload
                && matches!(
                    phase,
                    Phase::Empty | Phase::FileSelected | Phase::ReviewReady
                ),
            extract: phase == Phase::FileSelected && draft.source_file.is_some(),
            edit_fields: phase == Phase::ReviewReady,
            commit: phase == Phase::ReviewReady && draft.id.is_some(),
            cancel: !in_flight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("cannot {action} while the draft is {phase:?}")]
    InvalidTransition { action: &'static str, phase: Phase },
    #[error("no file selected")]
    NoFileSelected,
    #[error("draft has no contract id; upload a file before saving")]
    MissingContractId,
    #[error("response arrived for a draft that has since changed")]
    StaleTicket,
}

/// Issued when extraction starts; redeemed by the extraction response.
#[derive(Debug)]
#[must_use]
pub struct ExtractTicket {
    generation: u64,
}

/// Issued when saving starts; redeemed by the update response.
#[derive(Debug)]
#[must_use]
pub struct SaveTicket {
    generation: u64,
}

/// Request produced by [`UploadReviewMachine::begin_save`].
#[derive(Debug)]
pub struct SaveRequest {
    pub ticket: SaveTicket,
    pub id: ContractId,
    pub fields: ContractFields,
}

#[derive(Debug, Default)]
pub struct UploadReviewMachine {
    draft: ContractDraft,
    generation: u64,
}

impl UploadReviewMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &ContractDraft {
        &self.draft
    }

    pub fn phase(&self) -> Phase {
        self.draft.phase
    }

    pub fn controls(&self) -> Controls {
        self.draft.controls()
    }

    fn reject(&self, action: &'static str) -> DraftError {
        DraftError::InvalidTransition {
            action,
            phase: self.draft.phase,
        }
    }

    fn set_phase(&mut self, phase: Phase) {
        debug!(from = ?self.draft.phase, to = ?phase, "draft: phase transition");
        self.draft.phase = phase;
    }

    /// Replaces the current selection. `None` means the picker was cleared,
    /// which drops the whole draft.
    pub fn select_file(&mut self, file: Option<SourceFile>) -> Result<(), DraftError> {
        if !self.controls().select_file {
            return Err(self.reject("select a file"));
        }
        match file {
            Some(file) => {
                self.draft.failure = None;
                self.draft.source_file = Some(file);
                self.set_phase(Phase::FileSelected);
            }
            None => self.discard(),
        }
        Ok(())
    }

    pub fn begin_extract(&mut self) -> Result<(ExtractTicket, SourceFile), DraftError> {
        if self.draft.phase != Phase::FileSelected {
            return Err(self.reject("extract"));
        }
        let file = self
            .draft
            .source_file
            .clone()
            .ok_or(DraftError::NoFileSelected)?;
        self.generation += 1;
        self.set_phase(Phase::Extracting);
        Ok((
            ExtractTicket {
                generation: self.generation,
            },
            file,
        ))
    }

    pub fn finish_extract(
        &mut self,
        ticket: ExtractTicket,
        extracted: ExtractedContract,
    ) -> Result<(), DraftError> {
        self.redeem(ticket.generation, Phase::Extracting)?;
        self.draft.id = Some(extracted.id);
        self.draft.fields = extracted.fields;
        self.set_phase(Phase::ReviewReady);
        Ok(())
    }

    /// Session failures discard the draft; anything else returns it to
    /// `FileSelected` with fields untouched.
    pub fn fail_extract(
        &mut self,
        ticket: ExtractTicket,
        error: &ClientError,
    ) -> Result<(), DraftError> {
        self.redeem(ticket.generation, Phase::Extracting)?;
        if error.requires_reauth() {
            self.discard();
        } else {
            self.set_phase(Phase::FileSelected);
        }
        Ok(())
    }

    pub fn edit_field(&mut self, field: FieldKind, value: impl Into<String>) -> Result<(), DraftError> {
        if !self.controls().edit_fields {
            return Err(self.reject("edit fields"));
        }
        self.draft.fields.set(field, value);
        Ok(())
    }

    pub fn begin_save(&mut self) -> Result<SaveRequest, DraftError> {
        if self.draft.phase != Phase::ReviewReady {
            return Err(self.reject("save"));
        }
        let id = self.draft.id.ok_or(DraftError::MissingContractId)?;
        self.generation += 1;
        self.set_phase(Phase::Saving);
        Ok(SaveRequest {
            ticket: SaveTicket {
                generation: self.generation,
            },
            id,
            fields: self.draft.fields.clone(),
        })
    }

    pub fn finish_save(&mut self, ticket: SaveTicket) -> Result<ContractId, DraftError> {
        self.redeem(ticket.generation, Phase::Saving)?;
        self.set_phase(Phase::Committed);
        self.draft.id.ok_or(DraftError::MissingContractId)
    }

    pub fn fail_save(&mut self, ticket: SaveTicket, error: &ClientError) -> Result<(), DraftError> {
        self.redeem(ticket.generation, Phase::Saving)?;
        if error.requires_reauth() {
            self.discard();
        } else {
            self.set_phase(Phase::ReviewReady);
        }
        Ok(())
    }

    /// Loads a stored contract straight into review, whatever the current
    /// phase. Any response still pending for the previous draft goes stale.
    pub fn open_existing(&mut self, contract: ContractSummary) {
        self.generation += 1;
        self.draft = ContractDraft {
            id: Some(contract.id),
            source_file: None,
            filename: Some(contract.filename),
            fields: contract.fields,
            phase: Phase::Empty,
            origin: DraftOrigin::Existing,
            failure: None,
        };
        self.set_phase(Phase::ReviewReady);
    }

    /// Records that an existing contract could not be opened.
    pub fn fail_open(&mut self, id: ContractId, error: &ClientError) {
        self.discard();
        if error.requires_reauth() {
            return;
        }
        self.draft.id = Some(id);
        self.draft.origin = DraftOrigin::Existing;
        self.draft.failure = Some(error.user_message());
        self.set_phase(Phase::Failed);
    }

    pub fn cancel(&mut self) -> Result<(), DraftError> {
        if !self.controls().cancel {
            return Err(self.reject("cancel"));
        }
        self.discard();
        Ok(())
    }

    /// Drops the draft unconditionally and invalidates outstanding tickets.
    pub fn discard(&mut self) {
        self.generation += 1;
        self.draft = ContractDraft::default();
    }

    fn redeem(&self, generation: u64, expected: Phase) -> Result<(), DraftError> {
        if generation != self.generation || self.draft.phase != expected {
            return Err(DraftError::StaleTicket);
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/draft_tests.rs"]
mod tests;
