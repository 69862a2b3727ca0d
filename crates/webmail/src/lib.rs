//! Webmail crate - Client-side session and mailbox state
//!
//! This crate provides the state core of a web mail client:
//! - Domain models (Mail, Draft, UserRef, Credential)
//! - Backend gateway contract and its HTTP implementation
//! - Session lifecycle (restore, login, signup, logout)
//! - Mailbox loading, optimistic send and search
//! - Compose window state machine
//! - Derived navigation view state
//!
//! The crate has no UI dependencies. Renderers read state from an
//! [`AppState`] and dispatch user intents into it.

pub mod app;
pub mod cancel;
pub mod compose;
pub mod config;
pub mod error;
pub mod gateway;
pub mod mailbox;
pub mod models;
pub mod session;
pub mod view;

pub use app::{AppState, StateChange, StateObserver, SubscriptionId};
pub use cancel::CancellationToken;
pub use compose::{ComposeController, ComposeWindowState};
pub use crate::config::{ClientConfig, SessionSource};
pub use error::{MailError, Result};
pub use gateway::{GatewayError, HttpGateway, LoginResponse, NetworkGateway, SignupRequest};
pub use mailbox::{LoadApplied, LoadOutcome, LoadRequest, MailboxStore, SendRequest, search};
pub use models::{Collection, Credential, Draft, Mail, MailBuilder, MailId, MailOrigin, UserRef};
pub use session::{
    CredentialStore, FileCredentialStore, InMemoryCredentialStore, SessionState, SessionStatus,
    SessionStore, SignupProfile, local_part, normalize_address,
};
pub use view::{MailboxView, Navigation, Route, ViewState, derive_view};
