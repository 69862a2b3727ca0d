//! Domain models for session and mailbox entities

mod draft;
mod mail;
mod user;

pub use draft::Draft;
pub use mail::{Collection, Mail, MailBuilder, MailId, MailOrigin};
pub use user::{Credential, UserRef};
