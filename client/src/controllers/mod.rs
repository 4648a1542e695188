// Screen controllers.
//
// Each controller owns its ephemeral form state, validates synchronously,
// issues at most one backend call per submit, and reports every outcome
// through the notification center. A controller that has been unmounted
// discards any response that arrives afterwards.

pub mod dashboard;
pub mod login;
pub mod register;
pub mod transfer;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config_store::UiConfig;
use crate::errors::WalletError;
use crate::navigation::Navigator;
use crate::notifications::NotificationCenter;
use crate::session::SessionStore;
use crate::validation::InputValidator;

pub use dashboard::{DashboardController, DashboardState, Direction, LoadOutcome, TransactionRow};
pub use login::{LoginController, LoginForm};
pub use register::{RegisterController, RegisterForm};
pub use transfer::{TransferController, TransferForm};

/// Pauses between a success message and the screen transition that follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiDelays {
    pub login_redirect: Duration,
    pub register_redirect: Duration,
    pub transfer_close: Duration,
    pub logout: Duration,
}

impl UiDelays {
    /// No pauses at all; transitions happen as soon as the response is handled.
    pub fn immediate() -> Self {
        Self {
            login_redirect: Duration::ZERO,
            register_redirect: Duration::ZERO,
            transfer_close: Duration::ZERO,
            logout: Duration::ZERO,
        }
    }
}

impl Default for UiDelays {
    fn default() -> Self {
        Self::from(&UiConfig::default())
    }
}

impl From<&UiConfig> for UiDelays {
    fn from(config: &UiConfig) -> Self {
        Self {
            login_redirect: Duration::from_millis(config.login_redirect_ms),
            register_redirect: Duration::from_millis(config.register_redirect_ms),
            transfer_close: Duration::from_millis(config.transfer_close_ms),
            logout: Duration::from_millis(config.logout_delay_ms),
        }
    }
}

/// Collaborators shared by every screen.
#[derive(Clone)]
pub struct ViewContext {
    pub api: ApiClient,
    pub notifications: NotificationCenter,
    pub navigator: Arc<dyn Navigator>,
    pub validator: InputValidator,
    pub delays: UiDelays,
    pub history_limit: u32,
}

impl ViewContext {
    pub fn new(
        api: ApiClient,
        notifications: NotificationCenter,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            api,
            notifications,
            navigator,
            validator: InputValidator::default(),
            delays: UiDelays::default(),
            history_limit: UiConfig::default().dashboard_history_limit,
        }
    }

    pub fn with_delays(mut self, delays: UiDelays) -> Self {
        self.delays = delays;
        self
    }

    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        self.api.sessions()
    }

    /// Report an error through a notification of the matching severity.
    fn report(&self, err: &WalletError) {
        self.notifications
            .notify(err.user_message(), err.notification_kind());
    }
}

/// Result of a form submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The request succeeded and the follow-up transition ran.
    Completed,
    /// Client-side validation failed; nothing was sent.
    Rejected(WalletError),
    /// The backend call failed.
    Failed(WalletError),
    /// A submission was already in flight; nothing was sent.
    Busy,
    /// The controller was unmounted before the response arrived.
    Discarded,
}

impl SubmitOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, SubmitOutcome::Completed)
    }
}

/// Submitting flag plus mount generation.
#[derive(Debug, Default)]
struct Lifecycle {
    submitting: AtomicBool,
    generation: AtomicU64,
}

impl Lifecycle {
    /// Enter the submitting state, or `None` if a submission is already running.
    fn begin(&self) -> Option<SubmitTicket<'_>> {
        self.submitting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(SubmitTicket {
            lifecycle: self,
            generation: self.generation(),
        })
    }

    fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation() == generation
    }

    fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    fn unmount(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

/// Clears the submitting flag when dropped.
struct SubmitTicket<'a> {
    lifecycle: &'a Lifecycle,
    generation: u64,
}

impl SubmitTicket<'_> {
    fn is_current(&self) -> bool {
        self.lifecycle.is_current(self.generation)
    }
}

impl Drop for SubmitTicket<'_> {
    fn drop(&mut self) {
        self.lifecycle.submitting.store(false, Ordering::Release);
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
