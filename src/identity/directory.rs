use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{AvatarError, AvatarResult};

/// Stored profile fields the resolver cares about.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    /// Numeric user id.
    pub id: i64,
    /// Display name; may be empty.
    #[serde(default)]
    pub name: String,
    /// Email, when the user has one on file.
    #[serde(default)]
    pub email: Option<String>,
}

/// Narrow user-lookup capability consumed by [`crate::IdentityResolver`].
///
/// Implementations may be slow or fail; the resolver never retries and treats every error as a
/// cue to fall back to request-supplied fields.
pub trait UserLookup: Send + Sync {
    /// Fetch a user by id. A missing user is reported as [`AvatarError::UserNotFound`].
    fn lookup_user_by_id(&self, id: i64) -> AvatarResult<UserRecord>;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Lookup that knows nobody.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoUserDirectory;

impl UserLookup for NoUserDirectory {
    fn lookup_user_by_id(&self, id: i64) -> AvatarResult<UserRecord> {
        Err(AvatarError::UserNotFound(id))
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Read-only user table held in memory, typically loaded from a JSON array of
/// `{"id": .., "name": .., "email": ..}` objects.
#[derive(Clone, Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<i64, UserRecord>,
}

impl InMemoryUserDirectory {
    /// Build from records; a later record with a duplicate id wins.
    pub fn from_records(records: impl IntoIterator<Item = UserRecord>) -> Self {
        let users = records.into_iter().map(|u| (u.id, u)).collect();
        Self { users }
    }

    /// Parse a JSON array of user records.
    pub fn from_reader<R: Read>(reader: R) -> AvatarResult<Self> {
        let records: Vec<UserRecord> = serde_json::from_reader(reader)
            .map_err(|e| AvatarError::config(format!("invalid user directory json: {e}")))?;
        Ok(Self::from_records(records))
    }

    /// Load a JSON array of user records from disk.
    pub fn from_path(path: impl AsRef<Path>) -> AvatarResult<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .with_context(|| format!("open user directory '{}'", path.display()))?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Number of known users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Return `true` when no users are known.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

impl UserLookup for InMemoryUserDirectory {
    fn lookup_user_by_id(&self, id: i64) -> AvatarResult<UserRecord> {
        self.users
            .get(&id)
            .cloned()
            .ok_or(AvatarError::UserNotFound(id))
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
#[path = "../../tests/unit/identity/directory.rs"]
mod tests;
