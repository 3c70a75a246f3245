//! Lettermark resolves the avatar image for a user reference.
//!
//! A request carries an optional user id, a display name, an optional email and a size. The
//! crate turns it into image bytes plus a media type:
//!
//! 1. **Resolve**: the user id is looked up through a [`UserLookup`]; stored fields win over the
//!    request's, and a failed lookup silently falls back to them.
//! 2. **Probe**: if an email is known, its SHA-256 [`EmailFingerprint`] is sent to an external
//!    avatar service ([`GravatarProber`]). A hit is passed through byte for byte.
//! 3. **Generate**: otherwise a square PNG letter avatar is drawn: up to two initials in white on a
//!    background chosen deterministically from a fixed [`Palette`].
//!
//! Guarantees:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Never fails per request**: [`AvatarDispatcher::get_avatar`] always returns an image.
//! - **Deterministic**: the same name and size yield byte-identical PNGs, independent of the
//!   host's installed fonts.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod config;
mod dispatch;
mod foundation;
mod identity;
mod probe;
mod render;

pub use config::{AvatarConfig, ENV_PREFIX, ProbeConfig};
pub use dispatch::{AvatarDispatcher, AvatarPath, AvatarRequest, DispatchOutcome};
pub use foundation::core::{AvatarImage, AvatarSize, MimeType, Rgb8, SizeBounds};
pub use foundation::error::{AvatarError, AvatarResult};
pub use identity::directory::{InMemoryUserDirectory, NoUserDirectory, UserLookup, UserRecord};
pub use identity::fingerprint::{EmailFingerprint, normalize_email};
pub use identity::resolver::{Identity, IdentityResolver};
pub use probe::gravatar::GravatarProber;
pub use probe::{AvatarProber, DisabledProber, MissReason, ProbeOutcome};
pub use render::cpu::RgbCanvas;
pub use render::encode::encode_png;
pub use render::font::EMBEDDED_FONT;
pub use render::glyph::{DEFAULT_GLYPH, initials};
pub use render::palette::{
    DEFAULT_PALETTE, Palette, PaletteEntry, RESERVED_INDEX, fnv1a64, normalize_name,
};
pub use render::{
    CAP_HEIGHT_FRACTION, FOREGROUND, LetterAvatarRenderer, LetterPlan, MAX_INK_FRACTION,
};
