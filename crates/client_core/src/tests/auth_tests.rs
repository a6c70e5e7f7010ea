use super::*;
use crate::mock_service::{spawn_mock_service, PASSWORD, VALID_TOKEN};

fn registration(email: &str) -> RegisterRequest {
    RegisterRequest {
        username: "ana".into(),
        full_name: "Ana Souza".into(),
        email: email.into(),
        password: PASSWORD.into(),
    }
}

#[tokio::test]
async fn login_stores_the_issued_token() {
    let (url, _state) = spawn_mock_service().await;
    let session = Arc::new(SessionGuard::in_memory());
    let auth = AuthClient::new(url, session.clone());

    auth.login("ana@example.com", PASSWORD)
        .await
        .expect("login");

    let credential = session.get().await.expect("credential stored");
    assert_eq!(credential.expose(), VALID_TOKEN);
}

#[tokio::test]
async fn rejected_login_surfaces_detail_and_keeps_previous_credential() {
    let (url, _state) = spawn_mock_service().await;
    let session = Arc::new(SessionGuard::in_memory());
    session
        .set(Credential::new("earlier-token"))
        .await
        .expect("seed credential");
    let auth = AuthClient::new(url, session.clone());

    let err = auth
        .login("ana@example.com", "wrong")
        .await
        .expect_err("bad password");

    assert_eq!(
        err,
        ClientError::GenericFailure {
            status: Some(401),
            message: "Usuário ou senha inválidos".into()
        }
    );
    let credential = session.get().await.expect("still present");
    assert_eq!(credential.expose(), "earlier-token");
}

#[tokio::test]
async fn register_then_duplicate_email_is_rejected() {
    let (url, state) = spawn_mock_service().await;
    let auth = AuthClient::new(url, Arc::new(SessionGuard::in_memory()));

    auth.register(&registration("ana@example.com"))
        .await
        .expect("first registration");
    let err = auth
        .register(&registration("ana@example.com"))
        .await
        .expect_err("duplicate");

    assert_eq!(
        err,
        ClientError::GenericFailure {
            status: Some(400),
            message: "E-mail já cadastrado".into()
        }
    );
    assert_eq!(state.registered.lock().await.len(), 1);
}

#[tokio::test]
async fn validation_errors_are_flattened_into_one_message() {
    let (url, _state) = spawn_mock_service().await;
    let auth = AuthClient::new(url, Arc::new(SessionGuard::in_memory()));

    let err = auth
        .register(&registration("not-an-email"))
        .await
        .expect_err("invalid email");

    assert_eq!(
        err,
        ClientError::GenericFailure {
            status: Some(422),
            message: "body.email: value is not a valid email address".into()
        }
    );
}

#[tokio::test]
async fn logout_clears_the_session() {
    let (url, _state) = spawn_mock_service().await;
    let session = Arc::new(SessionGuard::in_memory());
    let auth = AuthClient::new(url, session.clone());
    auth.login("ana@example.com", PASSWORD)
        .await
        .expect("login");

    auth.logout().await;

    assert!(!session.is_authenticated().await);
}
