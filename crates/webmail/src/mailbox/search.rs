//! Case-insensitive mailbox filtering

use crate::models::Mail;

/// Whether a mail matches a lowercase needle on from, to or subject
pub fn matches_query(mail: &Mail, needle: &str) -> bool {
    [&mail.from, &mail.to, &mail.subject]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}

/// Filter a collection by a free-text query
///
/// Matching is a case-insensitive substring test over sender, recipient and
/// subject. A blank query returns every item. Order is always preserved.
pub fn search<'a>(items: &'a [Mail], query: &str) -> Vec<&'a Mail> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.iter().collect();
    }

    items.iter().filter(|mail| matches_query(mail, &needle)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MailId;

    fn mail(id: &str, from: &str, subject: &str) -> Mail {
        Mail::builder(MailId::new(id))
            .from(from)
            .to("alice@domain")
            .subject(subject)
            .build()
    }

    fn ids(found: &[&Mail]) -> Vec<String> {
        found.iter().map(|m| m.id.as_str().to_string()).collect()
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let items = vec![mail("b", "x", "B"), mail("a", "y", "A")];
        assert_eq!(ids(&search(&items, "")), vec!["b", "a"]);
        assert_eq!(ids(&search(&items, "   ")), vec!["b", "a"]);
    }

    #[test]
    fn test_subject_match() {
        let items = vec![mail("1", "bob@domain", "Invoice #1"), mail("2", "carol@domain", "Lunch")];
        assert_eq!(ids(&search(&items, "invoice")), vec!["1"]);
    }

    #[test]
    fn test_case_insensitive() {
        let items = vec![mail("1", "Foo@domain", "x"), mail("2", "bar@domain", "FOOD"), mail("3", "z", "y")];
        assert_eq!(search(&items, "FOO"), search(&items, "foo"));
        assert_eq!(ids(&search(&items, "foo")), vec!["1", "2"]);
    }

    #[test]
    fn test_matches_recipient() {
        let items = vec![mail("1", "bob@domain", "Hi")];
        assert_eq!(ids(&search(&items, "ALICE")), vec!["1"]);
    }

    #[test]
    fn test_body_is_not_searched() {
        let mut m = mail("1", "bob@domain", "Hi");
        m.text = "secret invoice".to_string();
        assert!(search(&[m], "invoice").is_empty());
    }
}
