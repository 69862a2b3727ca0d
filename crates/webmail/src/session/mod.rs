//! Session lifecycle
//!
//! Owns identity and credential state: restore on start, login, signup and
//! logout. The persisted credential slot is abstracted behind
//! `CredentialStore` so tests and ephemeral runs can keep it in memory.

mod address;
mod credentials;
mod store;

pub use address::{local_part, normalize_address};
pub use credentials::{CREDENTIAL_KEY, CredentialStore, FileCredentialStore, InMemoryCredentialStore};
pub use store::{MIN_SECRET_LEN, SessionState, SessionStatus, SessionStore, SignupProfile};
