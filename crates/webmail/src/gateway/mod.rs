//! Backend integration
//!
//! This module provides:
//! - The `NetworkGateway` contract the stores call into
//! - An HTTP implementation over ureq
//! - Wire payload types and their normalization to domain models

mod http;
mod normalize;

pub use http::HttpGateway;
pub use normalize::{normalize_mail, normalize_mails, normalize_user};

use crate::models::{Credential, Draft, Mail, UserRef};

/// Failure of a single gateway call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// The backend answered with a non-success status
    #[error("rejected with status {status}")]
    Rejected {
        status: u16,
        /// Message from the error payload, when present
        message: Option<String>,
    },
    /// The backend could not be reached
    #[error("transport failure: {0}")]
    Transport(String),
    /// The backend answered but the payload was not understood
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Build a rejection carrying a server message
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: Some(message.into()),
        }
    }
}

/// Result of a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginResponse {
    pub user: UserRef,
    /// Token for header-based auth; absent when the backend relies on a cookie
    pub credential: Option<Credential>,
}

/// Account creation request, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignupRequest {
    pub display_name: String,
    pub address: String,
    pub secret: String,
}

/// Authenticated calls to the mail backend
///
/// Every call that acts on the session receives the same canonical credential
/// from the session store. Implementations may additionally carry a cookie;
/// that is a transport detail and never part of the state model.
///
/// Calls are synchronous so implementations stay executor-agnostic. Callers
/// that need concurrency run them on worker threads.
pub trait NetworkGateway: Send + Sync {
    /// Resolve the user owning a session
    fn fetch_current_user(&self, credential: Option<&Credential>) -> Result<UserRef, GatewayError>;

    fn login(&self, address: &str, secret: &str) -> Result<LoginResponse, GatewayError>;

    fn signup(&self, request: &SignupRequest) -> Result<(), GatewayError>;

    /// End the server-side session
    fn logout(&self, credential: Option<&Credential>) -> Result<(), GatewayError>;

    /// Inbox items, most recent first
    fn fetch_inbox(&self, credential: Option<&Credential>) -> Result<Vec<Mail>, GatewayError>;

    /// Sent items, most recent first
    fn fetch_sent(&self, credential: Option<&Credential>) -> Result<Vec<Mail>, GatewayError>;

    /// Submit a draft. Not idempotent on the server side.
    fn send_mail(&self, credential: Option<&Credential>, draft: &Draft) -> Result<(), GatewayError>;
}

/// Backend wire types
pub mod api {
    use serde::{Deserialize, Serialize};
    use serde_json::Value;

    /// User object as returned by the auth endpoints
    #[derive(Debug, Deserialize)]
    pub struct UserPayload {
        pub email: Option<String>,
        pub name: Option<String>,
    }

    /// Response from GET /auth/me
    #[derive(Debug, Deserialize)]
    pub struct CurrentUserResponse {
        pub user: Option<UserPayload>,
    }

    /// Response from POST /auth/login
    #[derive(Debug, Deserialize)]
    pub struct LoginResponseBody {
        pub user: Option<UserPayload>,
        pub token: Option<String>,
    }

    /// Body of POST /auth/login
    #[derive(Debug, Serialize)]
    pub struct LoginBody<'a> {
        pub email: &'a str,
        pub password: &'a str,
    }

    /// Body of POST /auth/signup
    #[derive(Debug, Serialize)]
    pub struct SignupBody<'a> {
        pub name: &'a str,
        pub email: &'a str,
        pub password: &'a str,
    }

    /// Body of POST /mail/send
    #[derive(Debug, Serialize)]
    pub struct SendBody<'a> {
        pub to: &'a str,
        pub subject: &'a str,
        pub text: &'a str,
    }

    /// Response from the mail listing endpoints
    #[derive(Debug, Deserialize)]
    pub struct MailsResponse {
        pub mails: Option<Vec<MailRecord>>,
    }

    /// Mail document as stored by the backend
    #[derive(Debug, Default, Deserialize)]
    pub struct MailRecord {
        #[serde(rename = "_id")]
        pub mongo_id: Option<String>,
        pub id: Option<String>,
        pub from: Option<String>,
        pub to: Option<String>,
        pub subject: Option<String>,
        pub text: Option<String>,
        pub html: Option<String>,
        /// RFC 3339 text or epoch milliseconds, as a string or a number
        pub date: Option<Value>,
        #[serde(rename = "createdAt")]
        pub created_at: Option<Value>,
    }

    /// Error payload returned alongside non-success statuses
    #[derive(Debug, Deserialize)]
    pub struct ErrorBody {
        pub message: Option<String>,
    }
}
