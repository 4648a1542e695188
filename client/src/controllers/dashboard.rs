use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::api::types::{TransactionRecord, UserProfile};
use crate::controllers::{pause, Lifecycle, SubmitOutcome, TransferController, ViewContext};
use crate::errors::{WalletError, WalletResult};
use crate::format::{format_address, format_timestamp, format_token_amount, TOKEN_SYMBOL};
use crate::navigation::Route;

pub const DASHBOARD_LOAD_ERROR: &str = "Error loading dashboard data";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub user: Option<UserProfile>,
    pub balance: Option<f64>,
    pub transactions: Vec<TransactionRecord>,
    pub loading: bool,
    pub show_transfer: bool,
}

/// Result of mounting or refreshing the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No session; the user was sent to the login screen.
    Redirected,
    Loaded,
    /// At least one fetch failed. Data from the other fetch was still applied.
    Failed(WalletError),
    Discarded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn sign(&self) -> char {
        match self {
            Direction::Incoming => '+',
            Direction::Outgoing => '-',
        }
    }
}

/// A history entry ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub direction: Direction,
    pub from: String,
    pub to: String,
    pub amount: String,
    pub timestamp: Option<String>,
}

impl TransactionRow {
    /// Outgoing when the record was sent from `own_address`.
    pub fn from_record(record: &TransactionRecord, own_address: Option<&str>) -> Self {
        let direction = match own_address {
            Some(address) if !address.is_empty() && record.from.eq_ignore_ascii_case(address) => {
                Direction::Outgoing
            }
            _ => Direction::Incoming,
        };
        Self {
            direction,
            from: format_address(&record.from),
            to: format_address(&record.to),
            amount: format!(
                "{}{} {}",
                direction.sign(),
                format_token_amount(record.value),
                TOKEN_SYMBOL
            ),
            timestamp: record.timestamp.as_ref().map(format_timestamp),
        }
    }
}

pub struct DashboardController {
    ctx: ViewContext,
    state: RwLock<DashboardState>,
    transfer: TransferController,
    lifecycle: Lifecycle,
    /// Sequence of the most recently started refresh.
    latest_refresh: AtomicU64,
    logging_out: AtomicBool,
}

impl DashboardController {
    pub fn new(ctx: ViewContext) -> Self {
        let transfer = TransferController::new(ctx.clone());
        Self {
            ctx,
            state: RwLock::new(DashboardState::default()),
            transfer,
            lifecycle: Lifecycle::default(),
            latest_refresh: AtomicU64::new(0),
            logging_out: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> DashboardState {
        self.state.read().clone()
    }

    pub fn transfer(&self) -> &TransferController {
        &self.transfer
    }

    /// Enter the screen. Without a session nothing is fetched.
    pub async fn mount(&self) -> LoadOutcome {
        if !self.ctx.sessions().is_authenticated() {
            self.ctx.navigator.navigate(Route::Login);
            return LoadOutcome::Redirected;
        }
        self.refresh().await
    }

    /// Reload the user, balance and recent history.
    ///
    /// Only the most recently started refresh applies its results; an older
    /// one that completes later returns `Discarded` and leaves `loading` alone.
    pub async fn refresh(&self) -> LoadOutcome {
        let generation = self.lifecycle.generation();
        let sequence = self.latest_refresh.fetch_add(1, Ordering::AcqRel) + 1;
        {
            let mut state = self.state.write();
            state.loading = true;
            state.user = self.ctx.sessions().current_user();
        }

        let api = &self.ctx.api;
        let (balance, history) = tokio::join!(
            api.get_balance(),
            api.get_history(Some(self.ctx.history_limit))
        );

        if !self.lifecycle.is_current(generation) {
            tracing::debug!("dashboard data arrived after unmount; discarded");
            return LoadOutcome::Discarded;
        }
        if self.latest_refresh.load(Ordering::Acquire) != sequence {
            tracing::debug!(sequence, "dashboard data superseded by a newer refresh; discarded");
            return LoadOutcome::Discarded;
        }

        let mut failure: Option<WalletError> = None;
        {
            let mut state = self.state.write();
            match balance {
                Ok(response) => state.balance = Some(response.balance),
                Err(err) => failure = Some(err),
            }
            match history {
                Ok(response) => state.transactions = response.transactions,
                Err(err) => {
                    failure.get_or_insert(err);
                }
            }
            state.loading = false;
        }

        match failure {
            None => LoadOutcome::Loaded,
            Some(err) => {
                tracing::warn!(error = %err, "failed to load dashboard data");
                if !err.is_unauthorized() {
                    self.ctx.notifications.error(DASHBOARD_LOAD_ERROR);
                }
                LoadOutcome::Failed(err)
            }
        }
    }

    pub fn rows(&self) -> Vec<TransactionRow> {
        let state = self.state.read();
        let own_address = state.user.as_ref().map(|user| user.ethereum_address.as_str());
        state
            .transactions
            .iter()
            .map(|record| TransactionRow::from_record(record, own_address))
            .collect()
    }

    /// Formatted balance, or `None` while it has never been loaded.
    pub fn balance_display(&self) -> Option<String> {
        self.state
            .read()
            .balance
            .map(|balance| format!("{} {}", format_token_amount(balance), TOKEN_SYMBOL))
    }

    /// Sign out after a short farewell. Repeated calls while one is pending do nothing.
    pub async fn logout(&self) -> WalletResult<()> {
        if self.logging_out.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.ctx
            .notifications
            .info("Goodbye! You have been signed out.");
        pause(self.ctx.delays.logout).await;

        let result = self.ctx.api.logout();
        self.logging_out.store(false, Ordering::Release);
        result?;
        self.ctx.navigator.navigate(Route::Login);
        Ok(())
    }

    /// Address to place on the clipboard, if a user is loaded.
    pub fn copy_address(&self) -> Option<String> {
        let address = self
            .state
            .read()
            .user
            .as_ref()
            .map(|user| user.ethereum_address.clone())
            .filter(|address| !address.is_empty())?;
        self.ctx
            .notifications
            .success("Address copied to clipboard!");
        Some(address)
    }

    pub fn toggle_transfer(&self) -> bool {
        let open = {
            let mut state = self.state.write();
            state.show_transfer = !state.show_transfer;
            state.show_transfer
        };
        if !open {
            self.transfer.unmount();
        }
        open
    }

    pub fn close_transfer(&self) {
        self.state.write().show_transfer = false;
        self.transfer.unmount();
    }

    /// Submit the transfer panel; a completed transfer closes it and reloads.
    pub async fn submit_transfer(&self) -> SubmitOutcome {
        let outcome = self.transfer.submit().await;
        if outcome.is_completed() {
            self.close_transfer();
            self.ctx
                .notifications
                .info("Refreshing balance and history...");
            self.refresh().await;
        }
        outcome
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
        self.transfer.unmount();
        *self.state.write() = DashboardState::default();
    }

}
