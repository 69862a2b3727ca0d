//! Canonical address construction

/// Local part an identifier contributes to its canonical address
///
/// Whitespace is removed and the result lowercased. Anything from the first
/// `@` on is dropped. An empty result means the identifier names no user.
pub fn local_part(identifier: &str) -> String {
    let compact: String = identifier
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    compact.split('@').next().unwrap_or_default().to_string()
}

/// Build the canonical address for a login or signup identifier
///
/// A domain the user typed is replaced by `domain`.
pub fn normalize_address(identifier: &str, domain: &str) -> String {
    format!("{}@{}", local_part(identifier), domain.trim().to_lowercase())
}
