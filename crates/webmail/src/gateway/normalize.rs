//! Normalize backend payloads to domain models

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde_json::Value;

use super::GatewayError;
use super::api::{MailRecord, UserPayload};
use crate::models::{Mail, MailId, UserRef};

/// Convert a user payload, rejecting ones without an address
pub fn normalize_user(payload: Option<UserPayload>) -> Result<UserRef, GatewayError> {
    let payload =
        payload.ok_or_else(|| GatewayError::Malformed("response has no user".to_string()))?;

    let address = payload
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| GatewayError::Malformed("user has no address".to_string()))?;

    Ok(match payload.name.filter(|n| !n.trim().is_empty()) {
        Some(name) => UserRef::new(address, name),
        None => UserRef::from_address(address),
    })
}

/// Convert a single mail record
pub fn normalize_mail(record: MailRecord) -> Result<Mail, String> {
    let id = record
        .mongo_id
        .or(record.id)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| "mail record has no id".to_string())?;

    let timestamp = [record.date.as_ref(), record.created_at.as_ref()]
        .into_iter()
        .flatten()
        .find_map(parse_timestamp)
        .unwrap_or_else(|| {
            debug!("Mail {} has no usable timestamp", id);
            Utc::now()
        });

    Ok(Mail::builder(MailId::new(id))
        .from(record.from.unwrap_or_default())
        .to(record.to.unwrap_or_default())
        .subject(record.subject.unwrap_or_default())
        .text(record.text.unwrap_or_default())
        .html(record.html.filter(|h| !h.is_empty()))
        .timestamp(timestamp)
        .build())
}

/// Convert a listing, preserving server order and skipping broken records
pub fn normalize_mails(records: Vec<MailRecord>) -> Vec<Mail> {
    let mut mails = Vec::with_capacity(records.len());
    for record in records {
        match normalize_mail(record) {
            Ok(mail) => mails.push(mail),
            Err(e) => warn!("Skipping mail record: {}", e),
        }
    }
    mails
}

/// Accept RFC 3339 strings and epoch milliseconds (numeric or as text)
fn parse_timestamp(raw: &Value) -> Option<DateTime<Utc>> {
    match raw {
        Value::String(text) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
                return Some(dt.with_timezone(&Utc));
            }
            text.parse::<i64>()
                .ok()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
        }
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|millis| millis as i64))
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::api::MailsResponse;

    #[test]
    fn test_normalize_user_with_name() {
        let user = normalize_user(Some(UserPayload {
            email: Some("alice@domain".to_string()),
            name: Some("Alice".to_string()),
        }))
        .unwrap();
        assert_eq!(user.address, "alice@domain");
        assert_eq!(user.display_name, "Alice");
    }

    #[test]
    fn test_normalize_user_missing() {
        assert!(matches!(normalize_user(None), Err(GatewayError::Malformed(_))));
        let no_address = UserPayload {
            email: None,
            name: Some("Alice".to_string()),
        };
        assert!(normalize_user(Some(no_address)).is_err());
    }

    #[test]
    fn test_normalize_listing_json() {
        let json = r#"{
            "mails": [
                { "_id": "a1", "from": "bob@domain", "to": "alice@domain",
                  "subject": "Invoice #1", "text": "pay", "date": "2024-05-01T10:00:00Z" },
                { "from": "nobody@domain", "subject": "no id" },
                { "id": "a2", "subject": "Lunch", "createdAt": "1714557600000", "html": "" }
            ]
        }"#;
        let response: MailsResponse = serde_json::from_str(json).unwrap();
        let mails = normalize_mails(response.mails.unwrap());

        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].id.as_str(), "a1");
        assert_eq!(mails[0].timestamp.to_rfc3339(), "2024-05-01T10:00:00+00:00");
        assert_eq!(mails[1].id.as_str(), "a2");
        assert_eq!(mails[1].timestamp.timestamp_millis(), 1714557600000);
        assert!(mails[1].html.is_none());
    }

    #[test]
    fn test_numeric_timestamps_keep_listing() {
        let json = r#"{
            "mails": [
                { "_id": "n1", "subject": "Numeric", "date": 1714557600000 },
                { "_id": "n2", "subject": "Fallback", "date": "yesterday", "createdAt": 1714557600000 },
                { "_id": "n3", "subject": "Odd", "date": true }
            ]
        }"#;
        let response: MailsResponse = serde_json::from_str(json).unwrap();
        let mails = normalize_mails(response.mails.unwrap());

        assert_eq!(mails.len(), 3);
        assert_eq!(mails[0].timestamp.timestamp_millis(), 1714557600000);
        assert_eq!(mails[1].timestamp.timestamp_millis(), 1714557600000);
        assert_eq!(mails[2].id.as_str(), "n3");
    }
}
