mod common;

use std::time::Duration;

use common::{auth_body, Harness, ALICE_ADDRESS};
use estcoin_wallet_lib::{
    LoginController, NotificationKind, RegisterController, Route, SubmitOutcome, WalletError,
};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn login_persists_session_and_opens_dashboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "alice", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t1", "alice")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let login = LoginController::new(harness.ctx.clone());
    login.set_username("alice");
    login.set_password("secret1");

    assert_eq!(login.submit().await, SubmitOutcome::Completed);
    assert_eq!(harness.sessions.token().as_deref(), Some("t1"));
    assert_eq!(
        harness.sessions.ethereum_address().as_deref(),
        Some(ALICE_ADDRESS)
    );
    assert_eq!(harness.router.current(), Route::Dashboard);
    assert_eq!(
        harness.messages(NotificationKind::Success),
        vec!["Welcome, alice!".to_string()]
    );
    assert!(!login.is_submitting());
}

#[tokio::test]
async fn invalid_credentials_are_reported_on_the_login_screen() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let login = LoginController::new(harness.ctx.clone());
    login.set_username("alice");
    login.set_password("wrong1");

    let outcome = login.submit().await;
    assert_eq!(
        outcome,
        SubmitOutcome::Failed(WalletError::Unauthorized("Invalid credentials".into()))
    );
    assert!(!harness.sessions.is_authenticated());
    assert_eq!(harness.router.current(), Route::Login);
    assert_eq!(
        harness.messages(NotificationKind::Error),
        vec!["Invalid credentials".to_string()]
    );
}

#[tokio::test]
async fn empty_login_fields_never_reach_the_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("t1", "alice")))
        .expect(0)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let login = LoginController::new(harness.ctx.clone());
    login.set_username("alice");

    assert!(matches!(
        login.submit().await,
        SubmitOutcome::Rejected(WalletError::ValidationError(_))
    ));
    assert_eq!(harness.messages(NotificationKind::Warning).len(), 1);
}

#[tokio::test]
async fn register_creates_session_and_returns_to_login() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({"username": "alice", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body("t2", "alice")))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let register = RegisterController::new(harness.ctx.clone());
    register.set_username("alice");
    register.set_password("secret1");
    register.set_confirm_password("secret1");

    assert_eq!(register.submit().await, SubmitOutcome::Completed);
    assert_eq!(harness.sessions.token().as_deref(), Some("t2"));
    assert_eq!(harness.sessions.username().as_deref(), Some("alice"));
    assert_eq!(
        harness.sessions.ethereum_address().as_deref(),
        Some(ALICE_ADDRESS)
    );
    assert_eq!(harness.router.current(), Route::Login);
    assert_eq!(
        harness.messages(NotificationKind::Success),
        vec!["Account created successfully!".to_string()]
    );
    assert_eq!(
        harness.messages(NotificationKind::Info),
        vec![
            "Initial balance: 10 EST credited".to_string(),
            "Address: 0x742d35Cc...".to_string(),
        ]
    );
}

#[tokio::test]
async fn register_validation_stops_at_first_failing_rule() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let register = RegisterController::new(harness.ctx.clone());
    register.set_username("alice");
    register.set_password("abcdef");
    register.set_confirm_password("abcdef");

    let outcome = register.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Rejected(_)));
    assert_eq!(harness.messages(NotificationKind::Warning).len(), 1);
    assert!(!harness.sessions.is_authenticated());
}

#[tokio::test]
async fn duplicate_username_message_comes_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "Username already exists"})),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let register = RegisterController::new(harness.ctx.clone());
    register.set_username("alice");
    register.set_password("secret1");
    register.set_confirm_password("secret1");

    assert_eq!(
        register.submit().await,
        SubmitOutcome::Failed(WalletError::Api("Username already exists".into()))
    );
    assert_eq!(
        harness.messages(NotificationKind::Error),
        vec!["Username already exists".to_string()]
    );
    assert_eq!(harness.router.current(), Route::Login);
}

#[tokio::test]
async fn second_submit_while_in_flight_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_body("t1", "alice"))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let login = LoginController::new(harness.ctx.clone());
    login.set_username("alice");
    login.set_password("secret1");

    let (first, second) = tokio::join!(login.submit(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(login.is_submitting());
        login.submit().await
    });
    assert_eq!(first, SubmitOutcome::Completed);
    assert_eq!(second, SubmitOutcome::Busy);
}

#[tokio::test]
async fn response_after_unmount_is_discarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(auth_body("t1", "alice"))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let harness = Harness::new(&server);
    let login = LoginController::new(harness.ctx.clone());
    login.set_username("alice");
    login.set_password("secret1");

    let (outcome, ()) = tokio::join!(login.submit(), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        login.unmount();
    });
    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert!(harness.notifications.active().is_empty());
    assert_eq!(harness.router.current(), Route::Login);
    assert_eq!(login.form().username, "");
}

#[tokio::test]
async fn rejected_registration_fires_auth_hook_once_without_error_toast() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Token expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let harness = Harness::logged_in(&server);
    let register = RegisterController::new(harness.ctx.clone());
    register.set_username("carol");
    register.set_password("secret1");
    register.set_confirm_password("secret1");

    assert_eq!(
        register.submit().await,
        SubmitOutcome::Failed(WalletError::Unauthorized("Token expired".into()))
    );
    assert_eq!(harness.auth_rejections(), 1);
    assert!(!harness.sessions.is_authenticated());
    assert_eq!(harness.router.current(), Route::Login);
    assert!(harness.messages(NotificationKind::Error).is_empty());
}
