use std::sync::Arc;

use crate::identity::directory::UserLookup;
use crate::identity::fingerprint::EmailFingerprint;

/// Canonical identity used for avatar selection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    /// Name the letter avatar is derived from; may be empty.
    pub display_name: String,
    /// Present only when a non-blank email was known.
    pub email_fingerprint: Option<EmailFingerprint>,
}

/// Turns a request's user reference into an [`Identity`].
///
/// Resolution never fails: lookup errors of any kind degrade to the request-supplied fields.
#[derive(Clone)]
pub struct IdentityResolver {
    lookup: Arc<dyn UserLookup>,
}

impl IdentityResolver {
    /// Resolver backed by the given user-lookup collaborator.
    pub fn new(lookup: Arc<dyn UserLookup>) -> Self {
        Self { lookup }
    }

    /// Resolve `user_id` through the lookup, falling back to `fallback_name`/`fallback_email`.
    ///
    /// A found record supplies both fields; a blank stored name still falls back to
    /// `fallback_name` so the letter avatar has something to show.
    #[tracing::instrument(skip(self, fallback_email), fields(lookup = self.lookup.name()))]
    pub fn resolve(
        &self,
        user_id: Option<i64>,
        fallback_name: &str,
        fallback_email: Option<&str>,
    ) -> Identity {
        if let Some(id) = user_id {
            match self.lookup.lookup_user_by_id(id) {
                Ok(user) => {
                    let display_name = if user.name.trim().is_empty() {
                        fallback_name.to_string()
                    } else {
                        user.name
                    };
                    return Identity {
                        display_name,
                        email_fingerprint: user
                            .email
                            .as_deref()
                            .and_then(EmailFingerprint::from_email),
                    };
                }
                Err(e) if e.is_not_found() => {
                    tracing::debug!(user_id = id, "user not found; using request fields");
                }
                Err(e) => {
                    tracing::warn!(user_id = id, error = %e, "user lookup failed; using request fields");
                }
            }
        }

        Identity {
            display_name: fallback_name.to_string(),
            email_fingerprint: fallback_email.and_then(EmailFingerprint::from_email),
        }
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("lookup", &self.lookup.name())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/identity/resolver.rs"]
mod tests;
