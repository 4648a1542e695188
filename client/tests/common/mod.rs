#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use estcoin_wallet_lib::{
    ApiClient, Navigator, NotificationCenter, NotificationKind, Route, Router, SessionStore,
    UiDelays, UserProfile, ViewContext,
};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const ALICE_ADDRESS: &str = "0x742d35Cc6634C0532925a3b844Bc9e7595f0bEb1";
pub const BOB_ADDRESS: &str = "0x8ba1f109551bD432803012645Ac136ddd64DBA72";

/// A wired client talking to a mock backend, with in-memory session storage
/// and no UI pauses.
pub struct Harness {
    pub sessions: SessionStore,
    pub router: Router,
    pub notifications: NotificationCenter,
    pub ctx: ViewContext,
    auth_rejections: Arc<AtomicUsize>,
}

impl Harness {
    pub fn new(server: &MockServer) -> Self {
        let sessions = SessionStore::in_memory();
        let router = Router::new(sessions.clone());
        let notifications = NotificationCenter::with_defaults();
        let navigator: Arc<dyn Navigator> = Arc::new(router.clone());
        let auth_rejections = Arc::new(AtomicUsize::new(0));
        let hook_navigator = navigator.clone();
        let hook_count = auth_rejections.clone();
        let api = ApiClient::new(format!("{}/api", server.uri()), sessions.clone())
            .unwrap()
            .on_auth_rejected(move || {
                hook_count.fetch_add(1, Ordering::SeqCst);
                hook_navigator.navigate(Route::Login);
            });
        let ctx = ViewContext::new(api, notifications.clone(), navigator)
            .with_delays(UiDelays::immediate());
        Self {
            sessions,
            router,
            notifications,
            ctx,
            auth_rejections,
        }
    }

    pub fn logged_in(server: &MockServer) -> Self {
        let harness = Self::new(server);
        harness
            .sessions
            .set_session("t1", &UserProfile::new("alice", ALICE_ADDRESS))
            .unwrap();
        harness.router.navigate(Route::Dashboard);
        harness
    }

    /// How many times the auth-rejected hook has fired.
    pub fn auth_rejections(&self) -> usize {
        self.auth_rejections.load(Ordering::SeqCst)
    }

    pub fn messages(&self, kind: NotificationKind) -> Vec<String> {
        self.notifications
            .active()
            .into_iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message)
            .collect()
    }
}

pub fn auth_body(token: &str, username: &str) -> Value {
    json!({
        "message": "ok",
        "token": token,
        "user": {
            "username": username,
            "ethereum_address": ALICE_ADDRESS,
            "balance": 10.0
        }
    })
}

pub fn history_body() -> Value {
    json!({
        "transactions": [
            {
                "from": ALICE_ADDRESS,
                "to": BOB_ADDRESS,
                "value": "2.5",
                "timestamp": 1_700_000_000_000i64
            },
            {
                "from": BOB_ADDRESS,
                "to": ALICE_ADDRESS,
                "value": 1,
                "timestamp": "2024-01-01T12:00:00Z"
            }
        ],
        "count": 2
    })
}
