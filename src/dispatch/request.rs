use crate::foundation::core::{AvatarSize, SizeBounds};

/// One avatar request as it arrives from the HTTP boundary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvatarRequest {
    /// User to look up, if the caller knows one.
    pub user_id: Option<i64>,
    /// Fallback display name; may be empty.
    pub name: String,
    /// Fallback email.
    pub email: Option<String>,
    /// Requested edge, already clamped.
    pub size: AvatarSize,
}

impl AvatarRequest {
    /// Request for `name` at `size` pixels (clamped into `bounds`).
    pub fn new(name: impl Into<String>, size: i64, bounds: &SizeBounds) -> Self {
        Self {
            user_id: None,
            name: name.into(),
            email: None,
            size: bounds.clamp(size),
        }
    }

    /// Set the user id.
    pub fn with_user_id(mut self, id: i64) -> Self {
        self.user_id = Some(id);
        self
    }

    /// Set the fallback email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Parse a URL query string (`id`, `name`, `email`, `size`; a leading `?` is allowed).
    ///
    /// Lenient by design of the boundary: a non-integer `id` is treated as absent, a missing or
    /// unparseable `size` becomes the default, and any size is clamped. Unknown keys are ignored;
    /// for repeated keys the last one wins.
    pub fn from_query(query: &str, bounds: &SizeBounds) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut req = Self {
            user_id: None,
            name: String::new(),
            email: None,
            size: bounds.default_size(),
        };

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "id" => req.user_id = value.trim().parse::<i64>().ok(),
                "name" => req.name = value.into_owned(),
                "email" => {
                    req.email = (!value.trim().is_empty()).then(|| value.into_owned());
                }
                "size" => {
                    req.size = match value.trim().parse::<i64>() {
                        Ok(n) => bounds.clamp(n),
                        Err(_) => bounds.default_size(),
                    };
                }
                _ => {}
            }
        }
        req
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/request.rs"]
mod tests;
