use parking_lot::Mutex;

use crate::api::types::Credentials;
use crate::controllers::{pause, Lifecycle, SubmitOutcome, ViewContext};
use crate::navigation::Route;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

pub struct LoginController {
    ctx: ViewContext,
    form: Mutex<LoginForm>,
    lifecycle: Lifecycle,
}

impl LoginController {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Mutex::new(LoginForm::default()),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.form.lock().username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form.lock().password = password.into();
    }

    pub fn form(&self) -> LoginForm {
        self.form.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lifecycle.is_submitting()
    }

    /// Leave the screen: input is dropped and in-flight responses are ignored.
    pub fn unmount(&self) {
        self.lifecycle.unmount();
        *self.form.lock() = LoginForm::default();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(ticket) = self.lifecycle.begin() else {
            return SubmitOutcome::Busy;
        };

        let form = self.form();
        if let Err(err) = self.ctx.validator.validate_login(&form.username, &form.password) {
            self.ctx.report(&err);
            return SubmitOutcome::Rejected(err);
        }

        let credentials = Credentials {
            username: form.username,
            password: form.password,
        };
        let result = self.ctx.api.login(&credentials).await;
        if !ticket.is_current() {
            tracing::debug!("login response arrived after unmount; discarded");
            return SubmitOutcome::Discarded;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                // a 401 here means bad credentials, which the user needs to see
                self.ctx.report(&err);
                return SubmitOutcome::Failed(err);
            }
        };

        let username = response
            .user
            .as_ref()
            .map(|user| user.username.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or(credentials.username);
        self.ctx
            .notifications
            .success(format!("Welcome, {}!", username));
        let generation = ticket.generation;
        drop(ticket);

        pause(self.ctx.delays.login_redirect).await;
        if !self.lifecycle.is_current(generation) {
            return SubmitOutcome::Discarded;
        }
        self.ctx.navigator.navigate(Route::Dashboard);
        SubmitOutcome::Completed
    }
}
