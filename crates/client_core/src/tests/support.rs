//! Scripted in-memory gateway shared by the listing and workspace tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use shared::domain::{ContractFields, ContractId, ContractSummary};

use crate::{
    error::ClientError,
    gateway::ContractGateway,
    types::{ExtractedContract, SourceFile},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    FetchOne(ContractId),
    Upload(String),
    Update(ContractId, ContractFields),
    Delete(ContractId),
}

#[derive(Default)]
pub struct ScriptedGateway {
    list: Mutex<VecDeque<Result<Vec<ContractSummary>, ClientError>>>,
    fetch: Mutex<VecDeque<Result<ContractSummary, ClientError>>>,
    upload: Mutex<VecDeque<Result<ExtractedContract, ClientError>>>,
    update: Mutex<VecDeque<Result<(), ClientError>>>,
    delete: Mutex<VecDeque<Result<(), ClientError>>>,
    calls: Mutex<Vec<GatewayCall>>,
}

fn next<T>(queue: &Mutex<VecDeque<Result<T, ClientError>>>, op: &str) -> Result<T, ClientError> {
    queue
        .lock()
        .expect("script lock")
        .pop_front()
        .unwrap_or_else(|| {
            Err(ClientError::GenericFailure {
                status: None,
                message: format!("no scripted response for {op}"),
            })
        })
}

impl ScriptedGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_list(self, result: Result<Vec<ContractSummary>, ClientError>) -> Self {
        self.list.lock().expect("script lock").push_back(result);
        self
    }

    pub fn on_fetch(self, result: Result<ContractSummary, ClientError>) -> Self {
        self.fetch.lock().expect("script lock").push_back(result);
        self
    }

    pub fn on_upload(self, result: Result<ExtractedContract, ClientError>) -> Self {
        self.upload.lock().expect("script lock").push_back(result);
        self
    }

    pub fn on_update(self, result: Result<(), ClientError>) -> Self {
        self.update.lock().expect("script lock").push_back(result);
        self
    }

    pub fn on_delete(self, result: Result<(), ClientError>) -> Self {
        self.delete.lock().expect("script lock").push_back(result);
        self
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: GatewayCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl ContractGateway for ScriptedGateway {
    async fn list(&self) -> Result<Vec<ContractSummary>, ClientError> {
        self.record(GatewayCall::List);
        next(&self.list, "list")
    }

    async fn fetch_one(&self, id: ContractId) -> Result<ContractSummary, ClientError> {
        self.record(GatewayCall::FetchOne(id));
        next(&self.fetch, "fetch_one")
    }

    async fn upload_and_extract(
        &self,
        file: &SourceFile,
    ) -> Result<ExtractedContract, ClientError> {
        self.record(GatewayCall::Upload(file.filename.clone()));
        next(&self.upload, "upload_and_extract")
    }

    async fn update(&self, id: ContractId, fields: &ContractFields) -> Result<(), ClientError> {
        self.record(GatewayCall::Update(id, fields.clone()));
        next(&self.update, "update")
    }

    async fn delete_one(&self, id: ContractId) -> Result<(), ClientError> {
        self.record(GatewayCall::Delete(id));
        next(&self.delete, "delete_one")
    }
}

pub fn summary(id: i64, filename: &str) -> ContractSummary {
    ContractSummary {
        id: ContractId(id),
        filename: filename.to_string(),
        uploaded_by: None,
        fields: ContractFields {
            parties: Some("Ana; Bruno".to_string()),
            ..ContractFields::default()
        },
    }
}
