//! Draft model for the compose window

use serde::{Deserialize, Serialize};

/// In-progress, unsent mail content
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl Draft {
    pub fn new(to: impl Into<String>, subject: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            subject: subject.into(),
            text: text.into(),
        }
    }

    /// Whether a recipient has been entered
    pub fn has_recipient(&self) -> bool {
        !self.to.trim().is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.to.is_empty() && self.subject.is_empty() && self.text.is_empty()
    }
}
