//! Mail model for inbox and sent collections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Draft;

/// Unique identifier for a mail within inbox and sent
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MailId(pub String);

impl MailId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh id for a locally synthesized record
    pub fn local() -> Self {
        Self(format!("local-{}", uuid::Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MailId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for MailId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Where a mail record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MailOrigin {
    /// Returned by the backend
    #[default]
    Server,
    /// Synthesized after a successful send, not yet confirmed by a refetch
    Local,
}

/// The two mailbox collections a user can browse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Collection {
    #[default]
    Inbox,
    Sent,
}

impl Collection {
    pub fn label(&self) -> &'static str {
        match self {
            Collection::Inbox => "Inbox",
            Collection::Sent => "Sent",
        }
    }

    /// The other collection
    pub fn toggled(self) -> Self {
        match self {
            Collection::Inbox => Collection::Sent,
            Collection::Sent => Collection::Inbox,
        }
    }
}

/// A single mail record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    pub id: MailId,
    /// Sender address
    pub from: String,
    /// Recipient address, opaque text
    pub to: String,
    pub subject: String,
    /// Plain text body
    pub text: String,
    /// HTML body, when the backend has one
    pub html: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub origin: MailOrigin,
}

impl Mail {
    /// Create a new mail builder
    pub fn builder(id: MailId) -> MailBuilder {
        MailBuilder::new(id)
    }

    /// Synthesize the sent record for a draft that was just accepted
    pub fn from_sent_draft(draft: &Draft, author: &str, sent_at: DateTime<Utc>) -> Self {
        Mail::builder(MailId::local())
            .from(author)
            .to(draft.to.clone())
            .subject(draft.subject.clone())
            .text(draft.text.clone())
            .timestamp(sent_at)
            .origin(MailOrigin::Local)
            .build()
    }

    pub fn is_local(&self) -> bool {
        self.origin == MailOrigin::Local
    }

    /// Subject for list display
    pub fn display_subject(&self) -> &str {
        if self.subject.is_empty() {
            "(no subject)"
        } else {
            &self.subject
        }
    }

    /// Whether two records carry the same content, ignoring identity and time
    pub fn same_content(&self, other: &Mail) -> bool {
        self.to == other.to && self.subject == other.subject && self.text == other.text
    }
}

/// Builder for creating Mail instances
pub struct MailBuilder {
    id: MailId,
    from: String,
    to: String,
    subject: String,
    text: String,
    html: Option<String>,
    timestamp: Option<DateTime<Utc>>,
    origin: MailOrigin,
}

impl MailBuilder {
    fn new(id: MailId) -> Self {
        Self {
            id,
            from: String::new(),
            to: String::new(),
            subject: String::new(),
            text: String::new(),
            html: None,
            timestamp: None,
            origin: MailOrigin::Server,
        }
    }

    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    pub fn to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn html(mut self, html: Option<String>) -> Self {
        self.html = html;
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn origin(mut self, origin: MailOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn build(self) -> Mail {
        Mail {
            id: self.id,
            from: self.from,
            to: self.to,
            subject: self.subject,
            text: self.text,
            html: self.html,
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            origin: self.origin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_ids_are_unique() {
        let a = MailId::local();
        let b = MailId::local();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("local-"));
    }

    #[test]
    fn test_from_sent_draft() {
        let draft = Draft::new("bob@domain", "Hi", "hello");
        let now = Utc::now();
        let mail = Mail::from_sent_draft(&draft, "alice@domain", now);

        assert_eq!(mail.from, "alice@domain");
        assert_eq!(mail.to, "bob@domain");
        assert_eq!(mail.subject, "Hi");
        assert_eq!(mail.text, "hello");
        assert_eq!(mail.timestamp, now);
        assert!(mail.is_local());
    }

    #[test]
    fn test_display_subject_placeholder() {
        let mail = Mail::builder(MailId::new("m1")).build();
        assert_eq!(mail.display_subject(), "(no subject)");
    }

    #[test]
    fn test_collection_toggle() {
        assert_eq!(Collection::Inbox.toggled(), Collection::Sent);
        assert_eq!(Collection::Sent.toggled(), Collection::Inbox);
    }
}
