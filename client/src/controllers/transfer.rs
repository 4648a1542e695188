use parking_lot::Mutex;

use crate::api::types::TransferRequest;
use crate::controllers::{pause, Lifecycle, SubmitOutcome, ViewContext};
use crate::format::{abbreviate, TOKEN_SYMBOL};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferForm {
    pub recipient: String,
    pub amount: String,
}

/// Transfer panel. `submit` resolves only after the close delay has elapsed,
/// so the caller can close the panel and refresh as soon as it returns
/// `Completed`.
pub struct TransferController {
    ctx: ViewContext,
    form: Mutex<TransferForm>,
    lifecycle: Lifecycle,
}

impl TransferController {
    pub fn new(ctx: ViewContext) -> Self {
        Self {
            ctx,
            form: Mutex::new(TransferForm::default()),
            lifecycle: Lifecycle::default(),
        }
    }

    pub fn set_recipient(&self, recipient: impl Into<String>) {
        self.form.lock().recipient = recipient.into();
    }

    pub fn set_amount(&self, amount: impl Into<String>) {
        self.form.lock().amount = amount.into();
    }

    pub fn form(&self) -> TransferForm {
        self.form.lock().clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.lifecycle.is_submitting()
    }

    pub fn unmount(&self) {
        self.lifecycle.unmount();
        *self.form.lock() = TransferForm::default();
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let Some(ticket) = self.lifecycle.begin() else {
            return SubmitOutcome::Busy;
        };

        let form = self.form();
        let amount = match self
            .ctx
            .validator
            .validate_transfer(&form.recipient, &form.amount)
        {
            Ok(amount) => amount,
            Err(err) => {
                self.ctx.report(&err);
                return SubmitOutcome::Rejected(err);
            }
        };

        let recipient = form.recipient.trim().to_string();
        let request = TransferRequest {
            recipient: recipient.clone(),
            amount,
        };
        let result = self.ctx.api.transfer(&request).await;
        if !ticket.is_current() {
            tracing::debug!("transfer response arrived after unmount; discarded");
            return SubmitOutcome::Discarded;
        }

        if let Err(err) = result {
            // the auth-rejected hook has already taken the user to the login screen
            if !err.is_unauthorized() {
                self.ctx.report(&err);
            }
            return SubmitOutcome::Failed(err);
        }

        tracing::info!(%recipient, amount, "transfer submitted");
        let notifications = &self.ctx.notifications;
        notifications.success(format!(
            "Transfer completed! {} {} sent",
            form.amount.trim(),
            TOKEN_SYMBOL
        ));
        notifications.info(format!("To: {}", abbreviate(&recipient, 10, 8)));
        *self.form.lock() = TransferForm::default();

        let generation = ticket.generation;
        drop(ticket);

        pause(self.ctx.delays.transfer_close).await;
        if !self.lifecycle.is_current(generation) {
            return SubmitOutcome::Discarded;
        }
        SubmitOutcome::Completed
    }
}
