//! Gift-card creation form.
//!
//! Holds one in-progress draft and orchestrates submit: validate, convert
//! the amount, create the escrow on the ledger, send the claim email, reset.
//! Field changes are mirrored to an optional observer through the trailing
//! debounce window.

use gl_api_types::CreationDraft;
use gl_assist::{AssistError, MessageAssist};
use gl_chain_client::{ChainError, CreateGiftCard, GiftLedger};
use gl_mailer::{ClaimEmail, Mailer};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::amount::{self, AmountError};
use crate::debounce::{DEBOUNCE_WINDOW, Debouncer};
use crate::draft::{self, FieldUpdate};

/// Unit scale of the escrowed stablecoin.
pub const GIFT_DECIMALS: u8 = 6;

#[derive(Debug, Error)]
pub enum CreationError {
    #[error("recipient name is required")]
    EmptyRecipientName,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("connected to an unsupported network (chain {chain_id}); switch network and retry")]
    SwitchNetwork { chain_id: u64 },
    #[error("gift card creation failed")]
    CreationFailed { detail: String },
    #[error("a submission is already in flight")]
    Busy,
}

/// Delivery result of the claim email. Failures are surfaced but never fail
/// the creation: the card already exists on the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailOutcome {
    Sent { message_id: String },
    Failed { detail: String },
}

impl EmailOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, EmailOutcome::Sent { .. })
    }
}

#[derive(Debug, Clone)]
pub struct CreationReceipt {
    pub card_id: String,
    pub claim_link: String,
    pub email: EmailOutcome,
}

pub struct CreationForm<L: ?Sized, M: ?Sized> {
    ledger: Arc<L>,
    mailer: Arc<M>,
    base_url: String,
    sender_address: String,
    draft: CreationDraft,
    observer: Option<Debouncer<CreationDraft>>,
    submitting: bool,
}

impl<L, M> CreationForm<L, M>
where
    L: GiftLedger + ?Sized,
    M: Mailer + ?Sized,
{
    pub fn new(
        ledger: Arc<L>,
        mailer: Arc<M>,
        base_url: impl Into<String>,
        sender_address: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            mailer,
            base_url: base_url.into(),
            sender_address: sender_address.into(),
            draft: CreationDraft::default(),
            observer: None,
            submitting: false,
        }
    }

    /// Mirror every draft change to `sink`, coalesced over the trailing
    /// debounce window.
    pub fn with_observer(mut self, sink: impl Fn(CreationDraft) + Send + Sync + 'static) -> Self {
        self.observer = Some(Debouncer::new(DEBOUNCE_WINDOW, sink));
        self
    }

    pub fn with_draft(mut self, mut draft: CreationDraft) -> Self {
        draft.message = draft::clamp_message(draft.message);
        self.draft = draft;
        self
    }

    pub fn draft(&self) -> &CreationDraft {
        &self.draft
    }

    pub fn submitting(&self) -> bool {
        self.submitting
    }

    /// Apply one field change and notify the observer with the full draft.
    pub fn apply(&mut self, update: FieldUpdate) {
        draft::apply_update(&mut self.draft, update);
        if let Some(observer) = &self.observer {
            observer.update(self.draft.clone());
        }
    }

    pub fn clear(&mut self) {
        self.draft = CreationDraft::default();
    }

    /// Replace the message field with generated text. Without a configured
    /// assist collaborator this reports unavailable and performs no call;
    /// generation failures leave the message untouched.
    pub async fn generate_message(
        &mut self,
        assist: Option<&dyn MessageAssist>,
    ) -> Result<(), AssistError> {
        let Some(assist) = assist else {
            return Err(AssistError::Unavailable);
        };

        match assist.generate(&self.draft.message).await {
            Ok(text) => {
                self.draft.message = draft::clamp_message(text);
                Ok(())
            }
            Err(err) => {
                warn!("message generation failed: {err}");
                Err(err)
            }
        }
    }

    /// Run the creation workflow for the current draft. The submitting flag
    /// is cleared on every exit path.
    pub async fn submit(&mut self) -> Result<CreationReceipt, CreationError> {
        if self.submitting {
            return Err(CreationError::Busy);
        }
        self.submitting = true;
        let result = self.submit_draft().await;
        self.submitting = false;
        result
    }

    async fn submit_draft(&mut self) -> Result<CreationReceipt, CreationError> {
        if self.draft.recipient_name.trim().is_empty() {
            return Err(CreationError::EmptyRecipientName);
        }

        let base_units = amount::to_base_units(&self.draft.amount, GIFT_DECIMALS)?;

        let request = CreateGiftCard {
            recipient: self.draft.recipient_address.clone(),
            amount_base_units: base_units.to_string(),
            recipient_email: self.draft.recipient_email.clone(),
        };

        let card_id = self
            .ledger
            .create_gift_card(&request)
            .await
            .map_err(|err| match err {
                ChainError::UnsupportedNetwork { chain_id } => {
                    CreationError::SwitchNetwork { chain_id }
                }
                other => {
                    warn!("gift card creation failed: {other}");
                    CreationError::CreationFailed {
                        detail: other.to_string(),
                    }
                }
            })?;

        let claim_link = format!("{}/claim/{}", self.base_url.trim_end_matches('/'), card_id);

        let email = ClaimEmail {
            link: claim_link.clone(),
            recipient_name: self.draft.recipient_name.clone(),
            sender_address: self.sender_address.clone(),
            email: self.draft.recipient_email.clone(),
            subject_line: self.draft.message.clone(),
        };

        let email = match self.mailer.send_claim_email(&email).await {
            Ok(receipt) => EmailOutcome::Sent {
                message_id: receipt.message_id,
            },
            Err(err) => {
                warn!("claim email for card {card_id} failed: {err}");
                EmailOutcome::Failed {
                    detail: err.to_string(),
                }
            }
        };

        // The card exists on the ledger now; the draft resets regardless of
        // the email outcome.
        self.draft = CreationDraft::default();

        Ok(CreationReceipt {
            card_id,
            claim_link,
            email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use gl_api_types::{GiftCard, Theme};
    use gl_chain_client::{PreparedCall, RedeemReceipt};
    use gl_mailer::{EmailReceipt, MailError};
    use std::sync::Mutex;

    const BASE_URL: &str = "https://gift.example";

    #[derive(Default)]
    struct RecordingLedger {
        created: Mutex<Vec<CreateGiftCard>>,
        fail_with: Mutex<Option<ChainError>>,
    }

    impl RecordingLedger {
        fn failing(err: ChainError) -> Self {
            Self {
                created: Mutex::new(Vec::new()),
                fail_with: Mutex::new(Some(err)),
            }
        }

        fn created(&self) -> Vec<CreateGiftCard> {
            self.created.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl GiftLedger for RecordingLedger {
        fn chain_id(&self) -> u64 {
            5115
        }

        async fn create_gift_card(&self, req: &CreateGiftCard) -> Result<String, ChainError> {
            if let Some(err) = self.fail_with.lock().unwrap().take() {
                return Err(err);
            }
            self.created.lock().unwrap().push(req.clone());
            Ok("42".to_owned())
        }

        async fn simulate_redeem(&self, _card_id: &str) -> Result<PreparedCall, ChainError> {
            unimplemented!("creation tests never simulate")
        }

        async fn redeem(&self, _call: &PreparedCall) -> Result<RedeemReceipt, ChainError> {
            unimplemented!("creation tests never redeem")
        }

        async fn gift_card(&self, _card_id: &str) -> Result<Option<GiftCard>, ChainError> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<ClaimEmail>>,
        fail: bool,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        fn sent(&self) -> Vec<ClaimEmail> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send_claim_email(&self, req: &ClaimEmail) -> Result<EmailReceipt, MailError> {
            if self.fail {
                return Err(MailError::Rejected {
                    detail: "HTTP 502: relay down".to_owned(),
                });
            }
            self.sent.lock().unwrap().push(req.clone());
            Ok(EmailReceipt {
                message_id: uuid::Uuid::new_v4().to_string(),
            })
        }
    }

    struct CannedAssist(&'static str);

    #[async_trait]
    impl MessageAssist for CannedAssist {
        async fn generate(&self, _prompt: &str) -> Result<String, AssistError> {
            Ok(self.0.to_owned())
        }
    }

    fn alice_draft() -> CreationDraft {
        CreationDraft {
            recipient_name: "Alice".to_owned(),
            recipient_address: "0xabc".to_owned(),
            recipient_email: "a@x.com".to_owned(),
            amount: "10".to_owned(),
            currency: "CBTC".to_owned(),
            message: "Happy Birthday".to_owned(),
            theme: Theme::Gold,
        }
    }

    fn form(
        ledger: &Arc<RecordingLedger>,
        mailer: &Arc<RecordingMailer>,
    ) -> CreationForm<RecordingLedger, RecordingMailer> {
        CreationForm::new(Arc::clone(ledger), Arc::clone(mailer), BASE_URL, "0xfeed")
    }

    #[tokio::test]
    async fn valid_submit_creates_once_emails_and_resets() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        let receipt = form.submit().await.unwrap();

        let created = ledger.created();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].recipient, "0xabc");
        assert_eq!(created[0].amount_base_units, "10000000");
        assert_eq!(created[0].recipient_email, "a@x.com");

        assert_eq!(receipt.card_id, "42");
        assert!(receipt.claim_link.ends_with("/claim/42"));
        assert!(receipt.email.is_sent());

        let sent = mailer.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].link, "https://gift.example/claim/42");
        assert_eq!(sent[0].recipient_name, "Alice");
        assert_eq!(sent[0].sender_address, "0xfeed");
        assert_eq!(sent[0].subject_line, "Happy Birthday");

        assert_eq!(form.draft(), &CreationDraft::default());
        assert!(!form.submitting());
    }

    #[tokio::test]
    async fn empty_recipient_name_never_reaches_the_ledger() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(CreationDraft {
            recipient_name: String::new(),
            ..alice_draft()
        });

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, CreationError::EmptyRecipientName));
        assert!(ledger.created().is_empty());
        assert!(mailer.sent().is_empty());
        assert!(!form.submitting());
    }

    #[tokio::test]
    async fn lossy_amount_never_reaches_the_ledger() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(CreationDraft {
            amount: "0.0000001".to_owned(),
            ..alice_draft()
        });

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, CreationError::InvalidAmount(_)));
        assert!(ledger.created().is_empty());
    }

    #[tokio::test]
    async fn unsupported_network_maps_to_switch_network() {
        let ledger = Arc::new(RecordingLedger::failing(ChainError::UnsupportedNetwork {
            chain_id: 1,
        }));
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        let err = form.submit().await.unwrap_err();
        assert!(matches!(err, CreationError::SwitchNetwork { chain_id: 1 }));
        assert!(mailer.sent().is_empty());
        // The draft survives a failed creation for a user-triggered retry.
        assert_eq!(form.draft().recipient_name, "Alice");
        assert!(!form.submitting());
    }

    #[tokio::test]
    async fn other_chain_errors_collapse_to_a_generic_failure() {
        let ledger = Arc::new(RecordingLedger::failing(ChainError::Reverted {
            reason: "pool underfunded".to_owned(),
        }));
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        let err = form.submit().await.unwrap_err();
        match err {
            CreationError::CreationFailed { detail } => {
                assert!(detail.contains("pool underfunded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn email_failure_is_nonfatal_and_still_resets_the_draft() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::failing());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        let receipt = form.submit().await.unwrap();
        assert_eq!(receipt.card_id, "42");
        match receipt.email {
            EmailOutcome::Failed { detail } => assert!(detail.contains("relay down")),
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(form.draft(), &CreationDraft::default());
    }

    #[tokio::test]
    async fn missing_assist_reports_unavailable_without_calling() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        let err = form.generate_message(None).await.unwrap_err();
        assert!(matches!(err, AssistError::Unavailable));
        assert_eq!(form.draft().message, "Happy Birthday");
    }

    #[tokio::test]
    async fn generated_text_replaces_the_message() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        form.generate_message(Some(&CannedAssist("Wishing you the best!")))
            .await
            .unwrap();
        assert_eq!(form.draft().message, "Wishing you the best!");
    }

    #[tokio::test]
    async fn empty_completion_clears_the_message() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        form.generate_message(Some(&CannedAssist(""))).await.unwrap();
        assert_eq!(form.draft().message, "");
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_collapse_to_one_notification_with_final_values() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let mut form = form(&ledger, &mailer).with_observer(move |draft: CreationDraft| {
            tx.send(draft).unwrap();
        });

        form.apply(FieldUpdate::RecipientName("A".into()));
        form.apply(FieldUpdate::RecipientName("Al".into()));
        form.apply(FieldUpdate::RecipientName("Alice".into()));
        form.apply(FieldUpdate::Amount("10".into()));

        let notified = rx.recv().await.unwrap();
        assert_eq!(notified.recipient_name, "Alice");
        assert_eq!(notified.amount, "10");

        tokio::time::sleep(DEBOUNCE_WINDOW * 3).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn clear_restores_the_default_draft() {
        let ledger = Arc::new(RecordingLedger::default());
        let mailer = Arc::new(RecordingMailer::default());
        let mut form = form(&ledger, &mailer).with_draft(alice_draft());

        form.clear();
        assert_eq!(form.draft(), &CreationDraft::default());
    }
}
