//! Compose window state machine

use chrono::{DateTime, TimeDelta, Utc};
use log::debug;
use std::time::Duration;

use crate::error::{MailError, Result};
use crate::models::{Draft, MailId};

/// Display state of the compose window
///
/// Minimized and maximized are distinct variants, so a window can never be
/// both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeWindowState {
    #[default]
    Closed,
    Open,
    OpenMinimized,
    OpenMaximized,
}

impl ComposeWindowState {
    pub fn is_open(&self) -> bool {
        !matches!(self, ComposeWindowState::Closed)
    }
}

/// Owner of the draft and the compose window display state
#[derive(Debug)]
pub struct ComposeController {
    state: ComposeWindowState,
    /// Present exactly while the window is open and the draft is unsent
    draft: Option<Draft>,
    submitting: bool,
    error: Option<MailError>,
    /// Set after a successful send; the window closes at this instant
    dismiss_at: Option<DateTime<Utc>>,
    ack_delay: TimeDelta,
}

impl ComposeController {
    /// Create a closed controller with the given acknowledgement delay
    pub fn new(ack_delay: Duration) -> Self {
        Self {
            state: ComposeWindowState::Closed,
            draft: None,
            submitting: false,
            error: None,
            dismiss_at: None,
            ack_delay: TimeDelta::from_std(ack_delay).unwrap_or_else(|_| TimeDelta::zero()),
        }
    }

    pub fn state(&self) -> ComposeWindowState {
        self.state
    }

    /// Whether the overlay should be drawn
    pub fn is_visible(&self) -> bool {
        self.state.is_open()
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.draft.as_ref()
    }

    pub fn error(&self) -> Option<&MailError> {
        self.error.as_ref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// A send succeeded and the window is showing the confirmation
    pub fn is_acknowledging(&self) -> bool {
        self.dismiss_at.is_some()
    }

    /// Whether the submit action is available
    pub fn can_submit(&self) -> bool {
        self.state.is_open()
            && !self.submitting
            && self.draft.as_ref().is_some_and(Draft::has_recipient)
    }

    /// Open the window with an empty draft. No-op when already open.
    pub fn open_compose(&mut self) -> bool {
        if self.state.is_open() {
            return false;
        }
        self.state = ComposeWindowState::Open;
        self.draft = Some(Draft::default());
        self.error = None;
        self.dismiss_at = None;
        true
    }

    pub fn minimize(&mut self) -> bool {
        self.transition(
            |s| matches!(s, ComposeWindowState::Open | ComposeWindowState::OpenMaximized),
            ComposeWindowState::OpenMinimized,
        )
    }

    /// Bring a minimized window back to normal size
    pub fn restore(&mut self) -> bool {
        self.transition(
            |s| s == ComposeWindowState::OpenMinimized,
            ComposeWindowState::Open,
        )
    }

    pub fn maximize(&mut self) -> bool {
        self.transition(
            |s| matches!(s, ComposeWindowState::Open | ComposeWindowState::OpenMinimized),
            ComposeWindowState::OpenMaximized,
        )
    }

    pub fn unmaximize(&mut self) -> bool {
        self.transition(
            |s| s == ComposeWindowState::OpenMaximized,
            ComposeWindowState::Open,
        )
    }

    fn transition<F>(&mut self, allowed: F, to: ComposeWindowState) -> bool
    where
        F: Fn(ComposeWindowState) -> bool,
    {
        if !allowed(self.state) {
            debug!("Ignoring compose transition {:?} -> {:?}", self.state, to);
            return false;
        }
        self.state = to;
        true
    }

    /// Close the window from any state and discard the draft
    pub fn close(&mut self) {
        self.state = ComposeWindowState::Closed;
        self.draft = None;
        self.error = None;
        self.dismiss_at = None;
        self.submitting = false;
    }

    pub fn set_to(&mut self, to: impl Into<String>) {
        if let Some(draft) = self.editable_draft() {
            draft.to = to.into();
        }
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        if let Some(draft) = self.editable_draft() {
            draft.subject = subject.into();
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.editable_draft() {
            draft.text = text.into();
        }
    }

    fn editable_draft(&mut self) -> Option<&mut Draft> {
        if self.submitting {
            return None;
        }
        self.draft.as_mut()
    }

    /// Take a snapshot of the draft for sending and disable submit
    pub fn begin_submit(&mut self) -> Result<Draft> {
        if self.submitting {
            return Err(MailError::SendInFlight);
        }
        let draft = match &self.draft {
            Some(draft) if self.state.is_open() => draft.clone(),
            _ => return Err(MailError::validation("No draft to send")),
        };
        if !draft.has_recipient() {
            return Err(MailError::validation("Recipient is required"));
        }

        self.submitting = true;
        self.error = None;
        Ok(draft)
    }

    /// Record the result of a send started with `begin_submit`
    ///
    /// Success consumes the draft and schedules dismissal; failure keeps the
    /// window state and draft so the user can retry. Ignored when no submit
    /// is outstanding, e.g. the window was closed and reopened meanwhile.
    pub fn finish_submit(&mut self, result: &Result<MailId>, now: DateTime<Utc>) {
        if !self.submitting {
            debug!("Ignoring send result with no submit outstanding");
            return;
        }
        self.submitting = false;

        if !self.state.is_open() {
            return;
        }

        match result {
            Ok(_) => {
                self.draft = None;
                self.dismiss_at = Some(now + self.ack_delay);
                self.poll(now);
            }
            Err(e) => self.error = Some(e.clone()),
        }
    }

    /// Release the submit lock when the send could not be started
    pub fn abort_submit(&mut self, error: MailError) {
        self.submitting = false;
        self.error = Some(error);
    }

    /// Close the window once the acknowledgement delay has passed
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.dismiss_at {
            Some(at) if now >= at => {
                self.close();
                true
            }
            _ => false,
        }
    }
}
