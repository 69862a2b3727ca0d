//! Reconcile optimistic sent records with a refetched listing

use std::collections::HashSet;

use chrono::TimeDelta;
use log::debug;

use crate::models::Mail;

/// Drop later records whose id was already seen, keeping order
pub fn dedupe_by_id(items: Vec<Mail>) -> Vec<Mail> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|mail| seen.insert(mail.id.clone()))
        .collect()
}

/// Allowance for client and server clocks disagreeing about send time
const CLOCK_SKEW_SECS: i64 = 120;

/// Merge a refetched sent listing with the records currently held
///
/// Server records are canonical. Each server record confirms at most one
/// local record: one with the same recipient, subject and text, stamped no
/// earlier than the local send (within `CLOCK_SKEW_SECS`). Confirmed local records
/// are dropped; unconfirmed ones stay in front of the server listing.
pub fn reconcile_sent(server: Vec<Mail>, previous: &[Mail]) -> Vec<Mail> {
    let server = dedupe_by_id(server);
    let mut claimed = vec![false; server.len()];
    let skew = TimeDelta::seconds(CLOCK_SKEW_SECS);

    let pending: Vec<Mail> = previous
        .iter()
        .filter(|mail| mail.is_local())
        .filter(|local| {
            let confirmation = server.iter().enumerate().position(|(idx, remote)| {
                !claimed[idx]
                    && remote.same_content(local)
                    && remote.timestamp >= local.timestamp - skew
            });
            match confirmation {
                Some(idx) => {
                    claimed[idx] = true;
                    false
                }
                None => true,
            }
        })
        .cloned()
        .collect();

    if !pending.is_empty() {
        debug!("Keeping {} unconfirmed sent record(s)", pending.len());
    }

    pending.into_iter().chain(server).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Draft, MailId};
    use chrono::Utc;

    fn server_mail(id: &str, subject: &str) -> Mail {
        Mail::builder(MailId::new(id))
            .from("alice@domain")
            .to("bob@domain")
            .subject(subject)
            .text("hello")
            .build()
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let items = vec![server_mail("1", "a"), server_mail("2", "b"), server_mail("1", "c")];
        let deduped = dedupe_by_id(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].subject, "a");
    }

    #[test]
    fn test_confirmed_local_record_is_replaced() {
        let local = Mail::from_sent_draft(&Draft::new("bob@domain", "Hi", "hello"), "alice@domain", Utc::now());
        let previous = vec![local, server_mail("old", "Earlier")];

        let merged = reconcile_sent(vec![server_mail("srv-1", "Hi"), server_mail("old", "Earlier")], &previous);

        assert_eq!(merged.len(), 2);
        assert!(merged.iter().all(|m| !m.is_local()));
        assert_eq!(merged[0].id.as_str(), "srv-1");
    }

    #[test]
    fn test_unconfirmed_local_record_is_kept_in_front() {
        let local = Mail::from_sent_draft(&Draft::new("bob@domain", "New", "hello"), "alice@domain", Utc::now());
        let local_id = local.id.clone();

        let merged = reconcile_sent(vec![server_mail("old", "Earlier")], &[local]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, local_id);
    }

    #[test]
    fn test_one_server_record_confirms_one_local() {
        let draft = Draft::new("bob@domain", "Hi", "hello");
        let sent_at = Utc::now();
        let first = Mail::from_sent_draft(&draft, "alice@domain", sent_at);
        let second = Mail::from_sent_draft(&draft, "alice@domain", sent_at);

        let merged = reconcile_sent(vec![server_mail("srv-1", "Hi")], &[second, first]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged.iter().filter(|m| m.is_local()).count(), 1);
        assert_eq!(merged[1].id.as_str(), "srv-1");
    }

    #[test]
    fn test_older_identical_server_record_does_not_confirm() {
        let earlier = Mail::builder(MailId::new("srv-old"))
            .from("alice@domain")
            .to("bob@domain")
            .subject("Hi")
            .text("hello")
            .timestamp(Utc::now() - TimeDelta::hours(1))
            .build();
        let local = Mail::from_sent_draft(&Draft::new("bob@domain", "Hi", "hello"), "alice@domain", Utc::now());
        let local_id = local.id.clone();

        let merged = reconcile_sent(vec![earlier], &[local]);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].id, local_id);
    }
}
