//! External avatar probing: the capability seam and its HTTP implementation.

pub(crate) mod gravatar;

use std::fmt;

use crate::foundation::core::{AvatarImage, AvatarSize};
use crate::identity::fingerprint::EmailFingerprint;

/// Why an external avatar was not used. Informational only; every reason routes to the
/// letter-avatar fallback the same way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MissReason {
    /// Probing is switched off by configuration.
    Disabled,
    /// The identity carries no email fingerprint; no probe was issued.
    NoFingerprint,
    /// Upstream answered with a non-success status.
    Status(u16),
    /// Upstream did not answer within the configured timeout.
    Timeout,
    /// Connection, TLS or protocol failure.
    Transport,
    /// Upstream answered 2xx but the body is not a supported, parseable image.
    Malformed,
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("disabled"),
            Self::NoFingerprint => f.write_str("no fingerprint"),
            Self::Status(code) => write!(f, "status {code}"),
            Self::Timeout => f.write_str("timeout"),
            Self::Transport => f.write_str("transport error"),
            Self::Malformed => f.write_str("malformed body"),
        }
    }
}

/// Result of one probe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Upstream bytes, unmodified.
    Found(AvatarImage),
    /// Nothing usable upstream.
    NotFound(MissReason),
}

/// Narrow capability: look up an externally hosted avatar by email fingerprint.
///
/// Implementations make at most one outbound attempt, bound it by a timeout, and never retry.
pub trait AvatarProber: Send + Sync {
    /// Probe for an avatar of roughly `size` pixels.
    fn probe(&self, fingerprint: &EmailFingerprint, size: AvatarSize) -> ProbeOutcome;

    /// Short name for logging.
    fn name(&self) -> &'static str;
}

/// Prober that never finds anything; used when probing is disabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledProber;

impl AvatarProber for DisabledProber {
    fn probe(&self, _fingerprint: &EmailFingerprint, _size: AvatarSize) -> ProbeOutcome {
        ProbeOutcome::NotFound(MissReason::Disabled)
    }

    fn name(&self) -> &'static str {
        "disabled"
    }
}
