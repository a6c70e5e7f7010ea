pub mod auth;
pub mod draft;
pub mod error;
pub mod gateway;
pub mod listing;
pub mod session;
pub mod types;
pub mod workspace;

pub use auth::AuthClient;
pub use draft::{ContractDraft, Controls, DraftError, DraftOrigin, Phase, UploadReviewMachine};
pub use error::ClientError;
pub use gateway::{ContractGateway, HttpContractGateway};
pub use listing::{Confirm, ContractListing, DeleteOutcome};
pub use session::{
    Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionGuard,
};
pub use types::{ExtractedContract, SourceFile};
pub use workspace::{ContractWorkspace, DispatchOutcome, DraftCommand};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

#[cfg(test)]
#[path = "tests/mock_service.rs"]
mod mock_service;
