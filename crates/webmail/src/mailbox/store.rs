//! Mailbox store: load, optimistic send, filtering
//!
//! Network work is split from state mutation. `begin_*` records intent and
//! returns a request, the fetch runs without borrowing the store (possibly on
//! another thread), and `apply_load` / `complete_send` mutate state when the
//! result arrives. Overlapping loads are ordered by a sequence number so only
//! the most recently initiated one is ever applied.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use super::{dedupe_by_id, reconcile_sent, search};
use crate::cancel::CancellationToken;
use crate::error::{MailError, Result};
use crate::gateway::{GatewayError, NetworkGateway};
use crate::models::{Collection, Credential, Draft, Mail, MailId};

/// A load that has been initiated but not yet applied
#[derive(Debug, Clone)]
pub struct LoadRequest {
    seq: u64,
    token: CancellationToken,
}

impl LoadRequest {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

/// Results of fetching both collections
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub inbox: std::result::Result<Vec<Mail>, GatewayError>,
    pub sent: std::result::Result<Vec<Mail>, GatewayError>,
}

/// What `apply_load` did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadApplied {
    /// Both collections replaced
    Applied,
    /// One collection replaced, the other kept its previous items
    Partial,
    /// Both fetches failed; previous items kept
    Failed,
    /// A newer load was initiated; outcome discarded
    Stale,
    /// The consuming view went away; outcome discarded
    Cancelled,
}

/// A send that has been initiated but not yet completed
#[derive(Debug, Clone)]
pub struct SendRequest {
    draft: Draft,
    generation: u64,
}

impl SendRequest {
    pub fn draft(&self) -> &Draft {
        &self.draft
    }
}

/// Owner of the inbox and sent collections
#[derive(Debug, Default)]
pub struct MailboxStore {
    inbox_items: Vec<Mail>,
    sent_items: Vec<Mail>,
    loaded: bool,
    loading: bool,
    load_error: Option<MailError>,
    /// Sequence number of the most recently initiated load
    latest_seq: u64,
    sending: bool,
    send_error: Option<MailError>,
    /// Bumped on every reset; sends begun before it are dropped
    generation: u64,
}

impl MailboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inbox_items(&self) -> &[Mail] {
        &self.inbox_items
    }

    pub fn sent_items(&self) -> &[Mail] {
        &self.sent_items
    }

    pub fn items(&self, collection: Collection) -> &[Mail] {
        match collection {
            Collection::Inbox => &self.inbox_items,
            Collection::Sent => &self.sent_items,
        }
    }

    /// Find a mail by id within one collection
    pub fn find(&self, collection: Collection, id: &MailId) -> Option<&Mail> {
        self.items(collection).iter().find(|m| &m.id == id)
    }

    /// Whether any collection holds this id
    pub fn contains_id(&self, id: &MailId) -> bool {
        self.inbox_items.iter().chain(&self.sent_items).any(|m| &m.id == id)
    }

    /// Filter a collection by a free-text query
    pub fn filtered(&self, collection: Collection, query: &str) -> Vec<&Mail> {
        search(self.items(collection), query)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether at least one load has populated the store
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn load_error(&self) -> Option<&MailError> {
        self.load_error.as_ref()
    }

    /// Submit is unavailable while this is true
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    pub fn send_error(&self) -> Option<&MailError> {
        self.send_error.as_ref()
    }

    // === Load ===

    /// Record a new load and return the request to apply its outcome with
    ///
    /// Any load initiated earlier becomes stale.
    pub fn begin_load(&mut self, token: CancellationToken) -> LoadRequest {
        self.latest_seq += 1;
        self.loading = true;
        self.load_error = None;
        debug!("Mailbox load #{} started", self.latest_seq);

        LoadRequest {
            seq: self.latest_seq,
            token,
        }
    }

    /// Fetch inbox and sent concurrently; both must resolve before returning
    pub fn fetch_collections(gateway: &dyn NetworkGateway, credential: Option<&Credential>) -> LoadOutcome {
        let (inbox, sent) = rayon::join(
            || gateway.fetch_inbox(credential),
            || gateway.fetch_sent(credential),
        );
        LoadOutcome { inbox, sent }
    }

    /// Apply a fetched outcome if its request is still current
    pub fn apply_load(&mut self, request: LoadRequest, outcome: LoadOutcome) -> LoadApplied {
        if request.seq != self.latest_seq {
            debug!(
                "Discarding stale mailbox load #{} (latest #{})",
                request.seq, self.latest_seq
            );
            return LoadApplied::Stale;
        }

        self.loading = false;

        if request.token.is_cancelled() {
            debug!("Discarding cancelled mailbox load #{}", request.seq);
            return LoadApplied::Cancelled;
        }

        let mut failures = Vec::new();

        match outcome.inbox {
            Ok(items) => self.inbox_items = dedupe_by_id(items),
            Err(e) => failures.push(format!("inbox: {}", e)),
        }
        match outcome.sent {
            Ok(items) => self.sent_items = reconcile_sent(items, &self.sent_items),
            Err(e) => failures.push(format!("sent: {}", e)),
        }

        let result = match failures.len() {
            0 => LoadApplied::Applied,
            1 => LoadApplied::Partial,
            _ => LoadApplied::Failed,
        };

        if result != LoadApplied::Failed {
            self.loaded = true;
        }

        if failures.is_empty() {
            info!(
                "Mailbox loaded: {} inbox, {} sent",
                self.inbox_items.len(),
                self.sent_items.len()
            );
        } else {
            let message = format!("Failed to load mail ({})", failures.join("; "));
            warn!("{}", message);
            self.load_error = Some(MailError::Transport { message });
        }

        result
    }

    /// Load both collections and apply the result
    pub fn load(
        &mut self,
        gateway: &dyn NetworkGateway,
        credential: Option<&Credential>,
        token: CancellationToken,
    ) -> LoadApplied {
        let request = self.begin_load(token);
        let outcome = Self::fetch_collections(gateway, credential);
        self.apply_load(request, outcome)
    }

    // === Send ===

    /// Mark a send as outstanding and return the request to deliver
    ///
    /// Fails while another send is in flight, and when no recipient is set.
    pub fn begin_send(&mut self, draft: &Draft) -> Result<SendRequest> {
        if self.sending {
            return Err(MailError::SendInFlight);
        }
        if !draft.has_recipient() {
            return Err(MailError::validation("Recipient is required"));
        }

        self.sending = true;
        self.send_error = None;
        Ok(SendRequest {
            draft: draft.clone(),
            generation: self.generation,
        })
    }

    /// Submit the draft to the backend
    pub fn deliver(
        gateway: &dyn NetworkGateway,
        credential: Option<&Credential>,
        request: &SendRequest,
    ) -> std::result::Result<(), GatewayError> {
        gateway.send_mail(credential, &request.draft)
    }

    /// Record the result of a send
    ///
    /// Success prepends exactly one local record to the sent collection and
    /// returns its id. Failure appends nothing and keeps the error for display.
    /// A request begun before the last `reset` changes nothing and fails with
    /// `SendDiscarded`.
    pub fn complete_send(
        &mut self,
        request: SendRequest,
        result: std::result::Result<(), GatewayError>,
        author: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<MailId> {
        if request.generation != self.generation {
            debug!("Dropping send to {} begun before reset", request.draft.to);
            return Err(MailError::SendDiscarded);
        }
        self.sending = false;

        if let Err(e) = result {
            let err = MailError::from_send(e);
            warn!("Send failed: {}", err);
            self.send_error = Some(err.clone());
            return Err(err);
        }

        let mut mail = Mail::from_sent_draft(&request.draft, author, sent_at);
        while self.contains_id(&mail.id) {
            mail.id = MailId::local();
        }

        let id = mail.id.clone();
        self.sent_items.insert(0, mail);
        info!("Sent mail to {}", request.draft.to);
        Ok(id)
    }

    /// Send a draft and record the result
    pub fn send(
        &mut self,
        gateway: &dyn NetworkGateway,
        credential: Option<&Credential>,
        draft: &Draft,
        author: &str,
        sent_at: DateTime<Utc>,
    ) -> Result<MailId> {
        let request = self.begin_send(draft)?;
        let result = Self::deliver(gateway, credential, &request);
        self.complete_send(request, result, author, sent_at)
    }

    /// Forget everything; loads and sends still in flight become stale
    pub fn reset(&mut self) {
        *self = Self {
            latest_seq: self.latest_seq + 1,
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail(id: &str, subject: &str) -> Mail {
        Mail::builder(MailId::new(id)).from("bob@domain").subject(subject).build()
    }

    fn outcome(inbox: Vec<Mail>, sent: Vec<Mail>) -> LoadOutcome {
        LoadOutcome {
            inbox: Ok(inbox),
            sent: Ok(sent),
        }
    }

    #[test]
    fn test_apply_load() {
        let mut store = MailboxStore::new();
        let request = store.begin_load(CancellationToken::new());
        assert!(store.is_loading());

        let result = store.apply_load(request, outcome(vec![mail("1", "a")], vec![mail("2", "b")]));

        assert_eq!(result, LoadApplied::Applied);
        assert!(!store.is_loading());
        assert!(store.is_loaded());
        assert_eq!(store.inbox_items().len(), 1);
        assert_eq!(store.sent_items().len(), 1);
    }

    #[test]
    fn test_only_latest_load_applies() {
        let mut store = MailboxStore::new();
        let first = store.begin_load(CancellationToken::new());
        let second = store.begin_load(CancellationToken::new());

        // Second finishes first
        assert_eq!(
            store.apply_load(second, outcome(vec![mail("new", "new")], vec![])),
            LoadApplied::Applied
        );
        assert_eq!(
            store.apply_load(first, outcome(vec![mail("old", "old")], vec![])),
            LoadApplied::Stale
        );

        assert_eq!(store.inbox_items()[0].id.as_str(), "new");
    }

    #[test]
    fn test_stale_result_does_not_end_newer_loading() {
        let mut store = MailboxStore::new();
        let first = store.begin_load(CancellationToken::new());
        let _second = store.begin_load(CancellationToken::new());

        store.apply_load(first, outcome(vec![], vec![]));
        assert!(store.is_loading());
    }

    #[test]
    fn test_cancelled_load_is_discarded_and_not_loading() {
        let mut store = MailboxStore::new();
        let token = CancellationToken::new();
        let request = store.begin_load(token.clone());
        token.cancel();

        let result = store.apply_load(request, outcome(vec![mail("1", "a")], vec![]));

        assert_eq!(result, LoadApplied::Cancelled);
        assert!(!store.is_loading());
        assert!(store.inbox_items().is_empty());
    }

    #[test]
    fn test_partial_failure_keeps_other_half() {
        let mut store = MailboxStore::new();
        let request = store.begin_load(CancellationToken::new());
        store.apply_load(request, outcome(vec![mail("1", "a")], vec![mail("2", "b")]));

        let request = store.begin_load(CancellationToken::new());
        let result = store.apply_load(
            request,
            LoadOutcome {
                inbox: Ok(vec![mail("3", "c")]),
                sent: Err(GatewayError::Transport("down".to_string())),
            },
        );

        assert_eq!(result, LoadApplied::Partial);
        assert!(!store.is_loading());
        assert!(store.load_error().is_some());
        assert_eq!(store.inbox_items()[0].id.as_str(), "3");
        assert_eq!(store.sent_items()[0].id.as_str(), "2");
    }

    #[test]
    fn test_total_failure_never_stuck_loading() {
        let mut store = MailboxStore::new();
        let request = store.begin_load(CancellationToken::new());
        let result = store.apply_load(
            request,
            LoadOutcome {
                inbox: Err(GatewayError::Transport("down".to_string())),
                sent: Err(GatewayError::rejected(500, "boom")),
            },
        );

        assert_eq!(result, LoadApplied::Failed);
        assert!(!store.is_loading());
        assert!(!store.is_loaded());
    }

    #[test]
    fn test_send_in_flight_guard() {
        let mut store = MailboxStore::new();
        let draft = Draft::new("bob@domain", "Hi", "hello");

        let request = store.begin_send(&draft).unwrap();
        assert!(store.is_sending());
        assert_eq!(store.begin_send(&draft).unwrap_err(), MailError::SendInFlight);

        store.complete_send(request, Ok(()), "alice@domain", Utc::now()).unwrap();
        assert!(!store.is_sending());
        assert!(store.begin_send(&draft).is_ok());
    }

    #[test]
    fn test_send_requires_recipient() {
        let mut store = MailboxStore::new();
        let err = store.begin_send(&Draft::new("  ", "Hi", "hello")).unwrap_err();
        assert!(matches!(err, MailError::Validation { .. }));
        assert!(!store.is_sending());
    }

    #[test]
    fn test_failed_send_appends_nothing() {
        let mut store = MailboxStore::new();
        let request = store.begin_send(&Draft::new("bob@domain", "Hi", "hello")).unwrap();

        let err = store
            .complete_send(request, Err(GatewayError::rejected(400, "Mailbox full")), "alice@domain", Utc::now())
            .unwrap_err();

        assert_eq!(err.to_string(), "Mailbox full");
        assert!(store.sent_items().is_empty());
        assert_eq!(store.send_error(), Some(&err));
    }

    #[test]
    fn test_reset_makes_inflight_load_stale() {
        let mut store = MailboxStore::new();
        let request = store.begin_load(CancellationToken::new());
        store.reset();

        assert_eq!(
            store.apply_load(request, outcome(vec![mail("1", "a")], vec![])),
            LoadApplied::Stale
        );
        assert!(store.inbox_items().is_empty());
        assert!(!store.is_loading());
    }

    #[test]
    fn test_send_completed_after_reset_is_dropped() {
        let mut store = MailboxStore::new();
        let old = store.begin_send(&Draft::new("bob@domain", "Hi", "hello")).unwrap();
        store.reset();

        // A send from the new session is outstanding when the old one lands
        let current = store.begin_send(&Draft::new("carol@domain", "Yo", "hey")).unwrap();

        let err = store
            .complete_send(old, Ok(()), "alice@domain", Utc::now())
            .unwrap_err();
        assert_eq!(err, MailError::SendDiscarded);
        assert!(store.sent_items().is_empty());
        assert!(store.is_sending());

        store.complete_send(current, Ok(()), "dave@domain", Utc::now()).unwrap();
        assert_eq!(store.sent_items().len(), 1);
        assert_eq!(store.sent_items()[0].from, "dave@domain");
    }
}
