//! Navigation view state
//!
//! The view is derived, never stored: it is recomputed from the session
//! status, the mailbox contents, the selection and the compose window.

mod navigation;
mod state;

pub use navigation::Navigation;
pub use state::{MailboxView, Route, ViewState, derive_view};
