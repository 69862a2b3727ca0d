//! Session store: restore, login, signup, logout

use log::{debug, info, warn};
use std::sync::Arc;

use super::{CredentialStore, local_part, normalize_address};
use crate::config::{ClientConfig, SessionSource};
use crate::error::{MailError, Result};
use crate::gateway::{NetworkGateway, SignupRequest};
use crate::models::{Credential, UserRef};

/// Minimum number of characters in a signup secret
pub const MIN_SECRET_LEN: usize = 6;

/// Coarse session status consumed by navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Startup restore has not resolved yet; no navigation decision
    Restoring,
    Authenticated,
    Unauthenticated,
}

/// Full session state
///
/// A user exists exactly when the session is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Restoring,
    Unauthenticated,
    Authenticated {
        user: UserRef,
        /// Absent when the backend relies on its cookie alone
        credential: Option<Credential>,
    },
}

impl SessionState {
    pub fn status(&self) -> SessionStatus {
        match self {
            SessionState::Restoring => SessionStatus::Restoring,
            SessionState::Unauthenticated => SessionStatus::Unauthenticated,
            SessionState::Authenticated { .. } => SessionStatus::Authenticated,
        }
    }
}

/// Fields of the signup form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupProfile {
    pub display_name: String,
    pub identifier: String,
    pub secret: String,
    pub secret_confirmation: String,
}

impl SignupProfile {
    pub fn new(
        display_name: impl Into<String>,
        identifier: impl Into<String>,
        secret: impl Into<String>,
        secret_confirmation: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            identifier: identifier.into(),
            secret: secret.into(),
            secret_confirmation: secret_confirmation.into(),
        }
    }

    /// Local checks that run before any network call
    pub fn validate(&self) -> Result<()> {
        if local_part(&self.identifier).is_empty() {
            return Err(MailError::validation("Username is required"));
        }
        if self.secret.chars().count() < MIN_SECRET_LEN {
            return Err(MailError::validation(format!(
                "Password must be at least {} characters",
                MIN_SECRET_LEN
            )));
        }
        if self.secret != self.secret_confirmation {
            return Err(MailError::validation("Passwords do not match"));
        }
        Ok(())
    }
}

/// Owner of identity and credential state
pub struct SessionStore {
    state: SessionState,
    credentials: Arc<dyn CredentialStore>,
    address_domain: String,
    source: SessionSource,
    restore_attempted: bool,
    last_error: Option<MailError>,
}

impl SessionStore {
    /// Create a store in the `Restoring` state
    pub fn new(credentials: Arc<dyn CredentialStore>, config: &ClientConfig) -> Self {
        Self {
            state: SessionState::Restoring,
            credentials,
            address_domain: config.address_domain.clone(),
            source: config.session_source,
            restore_attempted: false,
            last_error: None,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    pub fn is_authenticated(&self) -> bool {
        self.status() == SessionStatus::Authenticated
    }

    pub fn user(&self) -> Option<&UserRef> {
        match &self.state {
            SessionState::Authenticated { user, .. } => Some(user),
            _ => None,
        }
    }

    /// The canonical credential every authenticated call carries
    pub fn credential(&self) -> Option<&Credential> {
        match &self.state {
            SessionState::Authenticated { credential, .. } => credential.as_ref(),
            _ => None,
        }
    }

    /// Message of the most recent failed login or signup
    pub fn last_error(&self) -> Option<&MailError> {
        self.last_error.as_ref()
    }

    /// Canonical address for an identifier under the configured domain
    pub fn canonical_address(&self, identifier: &str) -> String {
        normalize_address(identifier, &self.address_domain)
    }

    /// Re-establish a session from the persisted credential
    ///
    /// Runs once; later calls return the current status without touching the
    /// network. Every failure resolves to `Unauthenticated` with the persisted
    /// credential cleared.
    pub fn restore(&mut self, gateway: &dyn NetworkGateway) -> SessionStatus {
        if self.restore_attempted || self.state != SessionState::Restoring {
            debug!("Session restore already resolved ({:?})", self.status());
            self.restore_attempted = true;
            return self.status();
        }
        self.restore_attempted = true;

        let persisted = match self.credentials.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!("Unreadable persisted credential: {:#}", e);
                self.forget_credential();
                None
            }
        };

        if persisted.is_none() && self.source == SessionSource::LocalToken {
            info!("No persisted credential, starting logged out");
            self.state = SessionState::Unauthenticated;
            return self.status();
        }

        match gateway.fetch_current_user(persisted.as_ref()) {
            Ok(user) => {
                info!("Restored session for {}", user.address);
                self.state = SessionState::Authenticated {
                    user,
                    credential: persisted,
                };
            }
            Err(e) => {
                info!("Session restore failed: {}", e);
                self.forget_credential();
                self.state = SessionState::Unauthenticated;
            }
        }

        self.status()
    }

    /// Authenticate with an identifier and secret
    ///
    /// On failure the state and the persisted credential are left untouched.
    pub fn login(&mut self, gateway: &dyn NetworkGateway, identifier: &str, secret: &str) -> Result<()> {
        self.last_error = None;

        let result = self.try_login(gateway, identifier, secret);
        if let Err(e) = &result {
            self.last_error = Some(e.clone());
        }
        result
    }

    fn try_login(&mut self, gateway: &dyn NetworkGateway, identifier: &str, secret: &str) -> Result<()> {
        if local_part(identifier).is_empty() {
            return Err(MailError::validation("Username is required"));
        }
        if secret.is_empty() {
            return Err(MailError::validation("Password is required"));
        }

        let address = self.canonical_address(identifier);
        let response = gateway
            .login(&address, secret)
            .map_err(|e| MailError::from_auth(e, "Login failed"))?;

        if let Some(credential) = &response.credential
            && let Err(e) = self.credentials.save(credential)
        {
            warn!("Failed to persist credential: {:#}", e);
        }

        info!("Logged in as {}", response.user.address);
        self.state = SessionState::Authenticated {
            user: response.user,
            credential: response.credential,
        };
        self.restore_attempted = true;
        Ok(())
    }

    /// Create an account, then log in with it
    ///
    /// Validation failures never reach the network.
    pub fn signup(&mut self, gateway: &dyn NetworkGateway, profile: &SignupProfile) -> Result<()> {
        self.last_error = None;

        if let Err(e) = profile.validate() {
            self.last_error = Some(e.clone());
            return Err(e);
        }

        let address = self.canonical_address(&profile.identifier);
        let display_name = match profile.display_name.trim() {
            "" => address.clone(),
            name => name.to_string(),
        };
        let request = SignupRequest {
            display_name,
            address,
            secret: profile.secret.clone(),
        };

        if let Err(e) = gateway.signup(&request) {
            let err = MailError::from_auth(e, "Signup failed");
            self.last_error = Some(err.clone());
            return Err(err);
        }

        info!("Account {} created", request.address);
        self.login(gateway, &profile.identifier, &profile.secret)
    }

    /// End the session. Always succeeds locally.
    pub fn logout(&mut self, gateway: &dyn NetworkGateway) {
        if let Err(e) = gateway.logout(self.credential()) {
            warn!("Logout request failed, continuing: {}", e);
        }

        self.forget_credential();
        self.state = SessionState::Unauthenticated;
        self.restore_attempted = true;
        self.last_error = None;
        info!("Logged out");
    }

    fn forget_credential(&self) {
        if let Err(e) = self.credentials.clear() {
            warn!("Failed to clear persisted credential: {:#}", e);
        }
    }
}
