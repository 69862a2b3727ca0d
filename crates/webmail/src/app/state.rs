//! Root application state for the mail client

use chrono::{DateTime, Utc};
use log::{debug, info};
use std::sync::Arc;

use super::{StateChange, StateObserver, SubscriptionId};
use crate::cancel::CancellationToken;
use crate::compose::ComposeController;
use crate::config::ClientConfig;
use crate::error::{MailError, Result};
use crate::gateway::{GatewayError, NetworkGateway};
use crate::mailbox::{LoadApplied, LoadOutcome, LoadRequest, MailboxStore, SendRequest};
use crate::models::{Collection, Credential, MailId};
use crate::session::{CredentialStore, SessionStatus, SessionStore, SignupProfile};
use crate::view::{Navigation, ViewState, derive_view};

/// Session, mailbox, compose and navigation state for one client
///
/// Renderers hold a reference, read state through the accessors and
/// dispatch user intents through the methods. Every mutation notifies the
/// subscribed observers.
pub struct AppState {
    config: ClientConfig,
    gateway: Arc<dyn NetworkGateway>,
    session: SessionStore,
    mailbox: MailboxStore,
    compose: ComposeController,
    navigation: Navigation,
    /// Bound to the authenticated mailbox view; cancelled on logout
    view_token: CancellationToken,
    observers: Vec<(SubscriptionId, Arc<dyn StateObserver>)>,
    next_subscription: u64,
}

impl AppState {
    pub fn new(
        config: ClientConfig,
        gateway: Arc<dyn NetworkGateway>,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let session = SessionStore::new(credentials, &config);
        let compose = ComposeController::new(config.send_ack_delay());

        Self {
            config,
            gateway,
            session,
            mailbox: MailboxStore::new(),
            compose,
            navigation: Navigation::new(),
            view_token: CancellationToken::new(),
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn gateway(&self) -> Arc<dyn NetworkGateway> {
        self.gateway.clone()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn mailbox(&self) -> &MailboxStore {
        &self.mailbox
    }

    pub fn compose(&self) -> &ComposeController {
        &self.compose
    }

    pub fn navigation(&self) -> &Navigation {
        &self.navigation
    }

    /// Current derived view
    pub fn view(&self) -> ViewState {
        derive_view(
            self.session.status(),
            &self.navigation,
            &self.mailbox,
            &self.compose,
        )
    }

    // === Subscriptions ===

    pub fn subscribe(&mut self, observer: Arc<dyn StateObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, observer));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    fn notify(&self, change: StateChange) {
        for (_, observer) in &self.observers {
            observer.on_change(change);
        }
    }

    fn notify_session(&self) {
        self.notify(StateChange::Session(self.session.status()));
    }

    fn notify_compose(&self) {
        self.notify(StateChange::Compose(self.compose.state()));
    }

    // === Session ===

    /// Restore the session, then load the mailbox if it was re-established
    ///
    /// Calling this again on an already authenticated session changes nothing.
    pub fn start(&mut self) -> SessionStatus {
        let previous = self.signed_in_address();
        let status = self.session.restore(self.gateway.as_ref());
        self.notify_session();

        self.enter_if_identity_changed(previous);
        status
    }

    pub fn login(&mut self, identifier: &str, secret: &str) -> Result<()> {
        let previous = self.signed_in_address();
        let result = self.session.login(self.gateway.as_ref(), identifier, secret);
        self.notify_session();

        if result.is_ok() {
            self.enter_if_identity_changed(previous);
        }
        result
    }

    pub fn signup(&mut self, profile: &SignupProfile) -> Result<()> {
        let previous = self.signed_in_address();
        let result = self.session.signup(self.gateway.as_ref(), profile);
        self.notify_session();

        if result.is_ok() {
            self.enter_if_identity_changed(previous);
        }
        result
    }

    fn signed_in_address(&self) -> Option<String> {
        self.session.user().map(|user| user.address.clone())
    }

    /// Start a fresh mailbox when the signed-in user is new
    fn enter_if_identity_changed(&mut self, previous: Option<String>) {
        match self.signed_in_address() {
            Some(current) if previous.as_ref() != Some(&current) => self.enter_authenticated(),
            Some(_) => debug!("Session identity unchanged, keeping mailbox"),
            None => {}
        }
    }

    /// End the session and drop everything tied to it
    pub fn logout(&mut self) {
        self.view_token.cancel();
        self.session.logout(self.gateway.as_ref());

        self.mailbox.reset();
        self.compose.close();
        self.navigation.reset();
        self.view_token = CancellationToken::new();

        self.notify_session();
        self.notify(StateChange::Mailbox);
        self.notify_compose();
        self.notify(StateChange::Navigation);
    }

    /// Start a fresh mailbox for a newly authenticated session
    fn enter_authenticated(&mut self) {
        self.view_token.cancel();
        self.view_token = CancellationToken::new();
        self.mailbox.reset();
        self.navigation.reset();
        self.notify(StateChange::Navigation);
        if self.compose.is_visible() {
            self.compose.close();
            self.notify_compose();
        }

        if let Err(e) = self.reload() {
            debug!("Initial mailbox load skipped: {}", e);
        }
    }

    // === Mailbox ===

    /// Fetch both collections and apply the result
    pub fn reload(&mut self) -> Result<LoadApplied> {
        let request = self.begin_reload()?;
        let outcome = MailboxStore::fetch_collections(self.gateway.as_ref(), self.session.credential());
        Ok(self.apply_reload(request, outcome))
    }

    /// Start a load whose fetch the caller runs elsewhere
    ///
    /// Pair with `MailboxStore::fetch_collections(state.gateway().as_ref(),
    /// credential)` and hand the outcome to `apply_reload`.
    pub fn begin_reload(&mut self) -> Result<LoadRequest> {
        if !self.session.is_authenticated() {
            return Err(MailError::NotAuthenticated);
        }
        let request = self.mailbox.begin_load(self.view_token.clone());
        self.notify(StateChange::Mailbox);
        Ok(request)
    }

    /// Credential to pass to gateway calls made outside the state object
    pub fn credential(&self) -> Option<Credential> {
        self.session.credential().cloned()
    }

    pub fn apply_reload(&mut self, request: LoadRequest, outcome: LoadOutcome) -> LoadApplied {
        let applied = self.mailbox.apply_load(request, outcome);
        if applied != LoadApplied::Stale {
            self.notify(StateChange::Mailbox);
        }
        applied
    }

    // === Navigation ===

    /// Open a mail from the active collection in the detail view
    pub fn select(&mut self, id: &MailId) -> bool {
        if !self.session.is_authenticated()
            || self.mailbox.find(self.navigation.collection(), id).is_none()
        {
            return false;
        }
        self.navigation.select(id.clone());
        self.notify(StateChange::Navigation);
        true
    }

    pub fn back(&mut self) {
        self.navigation.back();
        self.notify(StateChange::Navigation);
    }

    pub fn switch_collection(&mut self, collection: Collection) {
        self.navigation.switch_collection(collection);
        self.notify(StateChange::Navigation);
    }

    // === Compose ===

    pub fn open_compose(&mut self) -> bool {
        let opened = self.compose.open_compose();
        if opened {
            self.notify_compose();
        }
        opened
    }

    pub fn minimize_compose(&mut self) -> bool {
        let changed = self.compose.minimize();
        if changed {
            self.notify_compose();
        }
        changed
    }

    pub fn restore_compose(&mut self) -> bool {
        let changed = self.compose.restore();
        if changed {
            self.notify_compose();
        }
        changed
    }

    pub fn maximize_compose(&mut self) -> bool {
        let changed = self.compose.maximize();
        if changed {
            self.notify_compose();
        }
        changed
    }

    pub fn unmaximize_compose(&mut self) -> bool {
        let changed = self.compose.unmaximize();
        if changed {
            self.notify_compose();
        }
        changed
    }

    pub fn close_compose(&mut self) {
        self.compose.close();
        self.notify_compose();
    }

    pub fn set_draft_to(&mut self, to: impl Into<String>) {
        self.compose.set_to(to);
    }

    pub fn set_draft_subject(&mut self, subject: impl Into<String>) {
        self.compose.set_subject(subject);
    }

    pub fn set_draft_text(&mut self, text: impl Into<String>) {
        self.compose.set_text(text);
    }

    /// Send the open draft
    ///
    /// On success the sent record is already in the sent collection and the
    /// window closes once the acknowledgement delay passes (see `tick`).
    pub fn submit_compose(&mut self, now: DateTime<Utc>) -> Result<MailId> {
        let request = self.begin_submit()?;
        let result = MailboxStore::deliver(self.gateway.as_ref(), self.session.credential(), &request);
        self.complete_submit(request, result, now)
    }

    /// Lock the open draft for sending and return the request to deliver
    ///
    /// Pair with `MailboxStore::deliver(state.gateway().as_ref(), credential,
    /// &request)` and hand the result to `complete_submit`. Loads, navigation
    /// and compose window changes stay available meanwhile.
    pub fn begin_submit(&mut self) -> Result<SendRequest> {
        if !self.session.is_authenticated() {
            return Err(MailError::NotAuthenticated);
        }

        let draft = self.compose.begin_submit()?;
        let request = match self.mailbox.begin_send(&draft) {
            Ok(request) => request,
            Err(e) => {
                self.compose.abort_submit(e.clone());
                self.notify_compose();
                return Err(e);
            }
        };

        self.notify(StateChange::Mailbox);
        self.notify_compose();
        Ok(request)
    }

    /// Record the result of a delivery started with `begin_submit`
    ///
    /// A send begun before a logout or a change of user is dropped with
    /// `SendDiscarded` and leaves the current mailbox and compose untouched.
    pub fn complete_submit(
        &mut self,
        request: SendRequest,
        result: std::result::Result<(), GatewayError>,
        now: DateTime<Utc>,
    ) -> Result<MailId> {
        let author = self.signed_in_address().unwrap_or_default();
        let result = self.mailbox.complete_send(request, result, &author, now);
        if let Err(MailError::SendDiscarded) = &result {
            return result;
        }

        self.compose.finish_submit(&result, now);

        if let Ok(id) = &result {
            info!("Draft sent as {}", id.as_str());
        }
        self.notify(StateChange::Mailbox);
        self.notify_compose();
        result
    }

    /// Advance time-based state. Returns true when something changed.
    pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
        let closed = self.compose.poll(now);
        if closed {
            self.notify_compose();
        }
        closed
    }
}
