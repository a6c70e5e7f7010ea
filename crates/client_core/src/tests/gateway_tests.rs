use super::*;
use crate::{
    mock_service::{spawn_mock_service, REVOKED_TOKEN, VALID_TOKEN},
    session::Credential,
};
use shared::domain::FieldKind;

async fn gateway_with_token(server_url: &str, token: Option<&str>) -> HttpContractGateway {
    let session = Arc::new(SessionGuard::in_memory());
    if let Some(token) = token {
        session.set(Credential::new(token)).await.expect("set");
    }
    HttpContractGateway::new(server_url, session)
}

fn pdf(name: &str) -> SourceFile {
    SourceFile::new(name, b"%PDF-1.4 contrato".to_vec())
}

#[test]
fn upload_status_mapping_is_exact() {
    let cases = [
        (StatusCode::CONFLICT, "Conflict"),
        (StatusCode::UNPROCESSABLE_ENTITY, "UnprocessableInput"),
        (StatusCode::INTERNAL_SERVER_ERROR, "AnalysisFailure"),
        (StatusCode::SERVICE_UNAVAILABLE, "ServiceUnavailable"),
        (StatusCode::BAD_REQUEST, "GenericFailure"),
        (StatusCode::NOT_FOUND, "GenericFailure"),
    ];
    for (status, expected) in cases {
        let error = map_upload_failure(status, "m".into());
        let variant = format!("{error:?}");
        assert!(
            variant.starts_with(expected),
            "{status} mapped to {variant}"
        );
    }
}

#[test]
fn read_status_mapping_only_special_cases_not_found() {
    assert!(matches!(
        map_read_failure(StatusCode::NOT_FOUND, "x".into()),
        ClientError::NotFound { .. }
    ));
    assert_eq!(
        map_read_failure(StatusCode::CONFLICT, "x".into()),
        ClientError::GenericFailure {
            status: Some(409),
            message: "x".into()
        }
    );
}

#[tokio::test]
async fn list_on_empty_service_is_not_found() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;

    let err = gateway.list().await.expect_err("empty");
    assert_eq!(
        err,
        ClientError::NotFound {
            message: "Nenhum contrato encontrado.".into()
        }
    );
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let (url, state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, None).await;

    assert_eq!(gateway.list().await, Err(ClientError::Unauthenticated));
    assert_eq!(
        gateway.upload_and_extract(&pdf("a.pdf")).await,
        Err(ClientError::Unauthenticated)
    );
    assert_eq!(*state.requests.lock().await, 0);
}

#[tokio::test]
async fn revoked_credential_expires_session() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(REVOKED_TOKEN)).await;

    let err = gateway.delete_one(ContractId(1)).await.expect_err("403");
    assert_eq!(err, ClientError::SessionExpired { status: 403 });
    assert!(!gateway.session().is_authenticated().await);
}

#[tokio::test]
async fn upload_sends_multipart_file_and_joins_analysis() {
    let (url, state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;

    let extracted = gateway
        .upload_and_extract(&pdf("contrato.pdf"))
        .await
        .expect("upload");

    assert_eq!(extracted.id, ContractId(1));
    assert_eq!(extracted.fields.parties.as_deref(), Some("Ana; Bruno"));
    assert_eq!(
        extracted.fields.main_obligations.as_deref(),
        Some("Pagar\nEntregar")
    );
    assert_eq!(
        extracted.fields.termination_clauses.as_deref(),
        Some("Aviso de 30 dias; Multa")
    );

    let uploads = state.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].filename, "contrato.pdf");
    assert_eq!(uploads[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(uploads[0].size_bytes, b"%PDF-1.4 contrato".len());
}

#[tokio::test]
async fn upload_failures_map_to_typed_errors_with_server_detail() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;
    gateway
        .upload_and_extract(&pdf("contrato.pdf"))
        .await
        .expect("first upload");

    assert_eq!(
        gateway.upload_and_extract(&pdf("contrato.pdf")).await,
        Err(ClientError::Conflict {
            message: "Já existe um contrato com o nome de arquivo 'contrato.pdf'.".into()
        })
    );
    assert!(matches!(
        gateway.upload_and_extract(&pdf("scan.pdf")).await,
        Err(ClientError::UnprocessableInput { .. })
    ));
    assert!(matches!(
        gateway.upload_and_extract(&pdf("boom.pdf")).await,
        Err(ClientError::AnalysisFailure { .. })
    ));
    assert!(matches!(
        gateway.upload_and_extract(&pdf("disabled.pdf")).await,
        Err(ClientError::ServiceUnavailable { .. })
    ));
    assert_eq!(
        gateway.upload_and_extract(&pdf("teapot.pdf")).await,
        Err(ClientError::GenericFailure {
            status: Some(418),
            message: "unexpected".into()
        })
    );
    assert!(matches!(
        gateway
            .upload_and_extract(&SourceFile::new("notes.txt", b"hi".to_vec()))
            .await,
        Err(ClientError::GenericFailure {
            status: Some(400),
            ..
        })
    ));
}

#[tokio::test]
async fn update_then_fetch_returns_submitted_values() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;
    let extracted = gateway
        .upload_and_extract(&pdf("contrato.pdf"))
        .await
        .expect("upload");

    let mut fields = extracted.fields.clone();
    fields.set(FieldKind::Parties, "Ana Souza; Bruno Lima");
    fields.set(FieldKind::MainObligations, "Pagar até dia 5\nEntregar chaves");
    fields.set(FieldKind::AdditionalData, "");
    gateway.update(extracted.id, &fields).await.expect("update");

    let fetched = gateway.fetch_one(extracted.id).await.expect("fetch");
    assert_eq!(fetched.fields, fields);
    assert_eq!(fetched.filename, "contrato.pdf");
}

#[tokio::test]
async fn fetch_and_update_of_missing_contract_are_not_found() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;

    assert!(matches!(
        gateway.fetch_one(ContractId(42)).await,
        Err(ClientError::NotFound { .. })
    ));
    assert!(matches!(
        gateway
            .update(ContractId(42), &ContractFields::default())
            .await,
        Err(ClientError::NotFound { .. })
    ));
}

#[tokio::test]
async fn delete_removes_contract_from_listing() {
    let (url, _state) = spawn_mock_service().await;
    let gateway = gateway_with_token(&url, Some(VALID_TOKEN)).await;
    let first = gateway
        .upload_and_extract(&pdf("a.pdf"))
        .await
        .expect("upload a");
    gateway
        .upload_and_extract(&pdf("b.pdf"))
        .await
        .expect("upload b");

    gateway.delete_one(first.id).await.expect("delete");

    let remaining = gateway.list().await.expect("list");
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].filename, "b.pdf");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let gateway = gateway_with_token("http://127.0.0.1:9", Some(VALID_TOKEN)).await;
    assert!(matches!(
        gateway.list().await,
        Err(ClientError::TransportFailure { .. })
    ));
}
