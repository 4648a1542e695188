use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    Login,
    Register,
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Register => "/register",
            Route::Dashboard => "/dashboard",
        }
    }

    fn requires_session(&self) -> bool {
        matches!(self, Route::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Number of route changes kept in the router history.
pub const MAX_HISTORY: usize = 50;

/// Anything that can move the user to another screen.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Route state with the guards of the web app: `/` picks Dashboard or Login
/// depending on the session, Dashboard requires a session, and unknown paths
/// fall back to `/`.
#[derive(Debug, Clone)]
pub struct Router {
    sessions: SessionStore,
    state: Arc<RwLock<RouterState>>,
}

#[derive(Debug)]
struct RouterState {
    current: Route,
    history: Vec<Route>,
}

impl Router {
    pub fn new(sessions: SessionStore) -> Self {
        let initial = if sessions.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        };
        Self {
            sessions,
            state: Arc::new(RwLock::new(RouterState {
                current: initial,
                history: vec![initial],
            })),
        }
    }

    pub fn current(&self) -> Route {
        self.state.read().current
    }

    /// Recent route changes, oldest first. Navigating to the current route
    /// records nothing.
    pub fn history(&self) -> Vec<Route> {
        self.state.read().history.clone()
    }

    /// Map a path to the route that would actually be rendered.
    pub fn resolve(&self, path: &str) -> Route {
        let requested = match path.trim_end_matches('/') {
            "/login" => Some(Route::Login),
            "/register" => Some(Route::Register),
            "/dashboard" => Some(Route::Dashboard),
            _ => None,
        };

        match requested {
            Some(route) => self.guard(route),
            None => self.home(),
        }
    }

    pub fn open(&self, path: &str) -> Route {
        let route = self.resolve(path);
        self.navigate(route);
        route
    }

    fn home(&self) -> Route {
        if self.sessions.is_authenticated() {
            Route::Dashboard
        } else {
            Route::Login
        }
    }

    fn guard(&self, route: Route) -> Route {
        if route.requires_session() && !self.sessions.is_authenticated() {
            Route::Login
        } else {
            route
        }
    }
}

impl Navigator for Router {
    fn navigate(&self, route: Route) {
        let target = self.guard(route);
        let mut state = self.state.write();
        if state.current == target {
            return;
        }
        tracing::debug!(from = %state.current, to = %target, "navigating");
        state.current = target;
        state.history.push(target);
        if state.history.len() > MAX_HISTORY {
            let excess = state.history.len() - MAX_HISTORY;
            state.history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::UserProfile;

    #[test]
    fn root_depends_on_session() {
        let sessions = SessionStore::in_memory();
        let router = Router::new(sessions.clone());
        assert_eq!(router.current(), Route::Login);
        assert_eq!(router.resolve("/"), Route::Login);

        sessions
            .set_session("t1", &UserProfile::new("alice", "0xabc"))
            .unwrap();
        assert_eq!(router.resolve("/"), Route::Dashboard);
        assert_eq!(router.resolve("/unknown"), Route::Dashboard);
    }

    #[test]
    fn dashboard_is_guarded() {
        let sessions = SessionStore::in_memory();
        let router = Router::new(sessions);
        router.navigate(Route::Dashboard);
        assert_eq!(router.current(), Route::Login);

        assert_eq!(router.open("/register/"), Route::Register);
        assert_eq!(router.current(), Route::Register);
        assert_eq!(router.history(), vec![Route::Login, Route::Register]);
    }

    #[test]
    fn history_records_changes_and_stays_bounded() {
        let sessions = SessionStore::in_memory();
        let router = Router::new(sessions);
        for _ in 0..10 {
            router.navigate(Route::Login);
        }
        assert_eq!(router.history(), vec![Route::Login]);

        for _ in 0..MAX_HISTORY {
            router.navigate(Route::Register);
            router.navigate(Route::Login);
        }
        let history = router.history();
        assert_eq!(history.len(), MAX_HISTORY);
        assert_eq!(history.last(), Some(&Route::Login));
        assert_eq!(router.current(), Route::Login);
    }
}
