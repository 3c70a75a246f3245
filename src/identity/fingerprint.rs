use std::fmt;

use sha2::Digest as _;

/// Trim and lower-case an email; `None` when nothing is left.
pub fn normalize_email(email: &str) -> Option<String> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// One-way digest of a normalized email, used only as an opaque key for the external prober.
///
/// The digest is the lower-case hex SHA-256 of [`normalize_email`]'s output.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct EmailFingerprint(String);

impl EmailFingerprint {
    /// Fingerprint an email, or `None` when the email is blank.
    pub fn from_email(email: &str) -> Option<Self> {
        let normalized = normalize_email(email)?;
        Some(Self(sha256_hex(normalized.as_bytes())))
    }

    /// Hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EmailFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Short prefix only; enough to correlate log lines.
        write!(f, "EmailFingerprint({}..)", &self.0[..8.min(self.0.len())])
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/identity/fingerprint.rs"]
mod tests;
