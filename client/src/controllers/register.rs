use parking_lot::Mutex;

use crate::api::types::Credentials;
use crate::controllers::{pause, Lifecycle, SubmitOutcome, ViewContext};
use crate::format::{prefix, TOKEN_SYMBOL};
use crate::navigation::Route;

/// Balance the backend credits to every new account.
pub const INITIAL_BALANCE: f64 = 10.0;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

pub struct RegisterController {
    ctx: ViewContext,
    form: Mutex<RegisterForm>,
    lifecycle: Lifecycle,
}

impl RegisterController {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Mutex::new(RegisterForm::default()),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn set_username(&self, username: impl Into<String>) {
        self.form.lock().username = username.into();
    }

    pub fn set_password(&self, password: impl Into<String>) {
        self.form.lock().password = password.into();
    }

    pub fn set_confirm_password(&self, confirmation: impl Into<String>) {
        self.form.lock().confirm_password = confirmation.into();
    }

    pub fn form(&self) -> RegisterForm {
        self.form.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lifecycle.is_submitting()
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
        *self.form.lock() = RegisterForm::default();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(ticket) = self.lifecycle.begin() else {
            return SubmitOutcome::Busy;
        };

        let form = self.form();
        if let Err(err) = self.ctx.validator.validate_registration(
            &form.username,
            &form.password,
            &form.confirm_password,
        ) {
            self.ctx.report(&err);
            return SubmitOutcome::Rejected(err);
        }

        let credentials = Credentials {
            username: form.username,
            password: form.password,
        };
        let result = self.ctx.api.register(&credentials).await;
        if !ticket.is_current() {
            tracing::debug!("register response arrived after unmount; discarded");
            return SubmitOutcome::Discarded;
        }

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                // the auth-rejected hook has already taken the user to the login screen
                if !err.is_unauthorized() {
                    self.ctx.report(&err);
                }
                return SubmitOutcome::Failed(err);
            }
        };

        let notifications = &self.ctx.notifications;
        notifications.success("Account created successfully!");
        let balance = response
            .user
            .as_ref()
            .and_then(|user| user.balance)
            .unwrap_or(INITIAL_BALANCE);
        notifications.info(format!(
            "Initial balance: {} {} credited",
            balance, TOKEN_SYMBOL
        ));
        if let Some(user) = response.user.as_ref() {
            notifications.info(format!("Address: {}", prefix(&user.ethereum_address, 10)));
        }

        let generation = ticket.generation;
        drop(ticket);

        pause(self.ctx.delays.register_redirect).await;
        if !self.lifecycle.is_current(generation) {
            return SubmitOutcome::Discarded;
        }
        self.ctx.navigator.navigate(Route::Login);
        SubmitOutcome::Completed
    }
}
