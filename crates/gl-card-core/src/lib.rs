//! Gift-card workflow core.
//!
//! Owns the creation and claim form state contracts: draft reducer,
//! debounced draft notification, amount conversion, and the
//! submit orchestration against the ledger, mailer, and assist
//! collaborators.

pub mod amount;
pub mod claim;
pub mod creation;
pub mod debounce;
pub mod draft;

pub use claim::{ClaimError, ClaimForm};
pub use creation::{CreationError, CreationForm, CreationReceipt, EmailOutcome, GIFT_DECIMALS};
pub use debounce::{DEBOUNCE_WINDOW, Debouncer};
pub use draft::FieldUpdate;
