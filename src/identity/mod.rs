//! Identity resolution: user lookup seam, email fingerprinting, and the resolver itself.

pub(crate) mod directory;
pub(crate) mod fingerprint;
pub(crate) mod resolver;
