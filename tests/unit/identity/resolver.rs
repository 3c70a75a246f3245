use std::sync::atomic::{AtomicUsize, Ordering};

use super::*;
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::identity::directory::{InMemoryUserDirectory, NoUserDirectory, UserRecord};

struct BrokenLookup {
    calls: AtomicUsize,
}

impl UserLookup for BrokenLookup {
    fn lookup_user_by_id(&self, _id: i64) -> AvatarResult<UserRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(AvatarError::lookup("connection refused"))
    }

    fn name(&self) -> &'static str {
        "broken"
    }
}

fn vader_directory() -> Arc<dyn UserLookup> {
    Arc::new(InMemoryUserDirectory::from_records([
        UserRecord {
            id: 3,
            name: "Darth Vader".to_string(),
            email: Some("darthvader.fider@gmail.com".to_string()),
        },
        UserRecord {
            id: 5,
            name: "   ".to_string(),
            email: None,
        },
    ]))
}

#[test]
fn found_user_supplies_name_and_email() {
    let resolver = IdentityResolver::new(vader_directory());
    let id = resolver.resolve(Some(3), "Someone Else", Some("other@example.com"));
    assert_eq!(id.display_name, "Darth Vader");
    assert_eq!(
        id.email_fingerprint,
        EmailFingerprint::from_email("darthvader.fider@gmail.com")
    );
}

#[test]
fn found_user_without_email_has_no_fingerprint() {
    let resolver = IdentityResolver::new(vader_directory());
    let id = resolver.resolve(Some(5), "Jon Snow", Some("jon@example.com"));
    assert_eq!(id.display_name, "Jon Snow");
    assert_eq!(id.email_fingerprint, None);
}

#[test]
fn missing_user_falls_back_to_request_fields() {
    let resolver = IdentityResolver::new(vader_directory());
    let id = resolver.resolve(Some(0), "Jon Snow", None);
    assert_eq!(id.display_name, "Jon Snow");
    assert_eq!(id.email_fingerprint, None);

    let id = resolver.resolve(Some(0), "Jon Snow", Some(" Jon@Example.com "));
    assert_eq!(
        id.email_fingerprint,
        EmailFingerprint::from_email("jon@example.com")
    );
}

#[test]
fn lookup_errors_are_not_fatal() {
    let lookup = Arc::new(BrokenLookup {
        calls: AtomicUsize::new(0),
    });
    let resolver = IdentityResolver::new(lookup.clone());
    let id = resolver.resolve(Some(3), "Darth Vader", Some("darthvader.fider@gmail.com"));
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 1);
    assert_eq!(id.display_name, "Darth Vader");
    assert!(id.email_fingerprint.is_some());
}

#[test]
fn absent_id_skips_lookup() {
    let lookup = Arc::new(BrokenLookup {
        calls: AtomicUsize::new(0),
    });
    let resolver = IdentityResolver::new(lookup.clone());
    let id = resolver.resolve(None, "", None);
    assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    assert_eq!(id.display_name, "");
    assert_eq!(id.email_fingerprint, None);
}

#[test]
fn empty_directory_resolves_to_request_name() {
    let resolver = IdentityResolver::new(Arc::new(NoUserDirectory));
    let id = resolver.resolve(Some(42), "Ada Lovelace", Some("   "));
    assert_eq!(id.display_name, "Ada Lovelace");
    assert_eq!(id.email_fingerprint, None);
}
