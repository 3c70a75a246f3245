//! Request dispatch: resolve identity, try the external avatar, fall back to a letter avatar.

pub(crate) mod request;

use std::sync::Arc;

use crate::config::AvatarConfig;
use crate::foundation::core::AvatarImage;
use crate::foundation::error::AvatarResult;
use crate::identity::directory::UserLookup;
use crate::identity::resolver::IdentityResolver;
use crate::probe::gravatar::GravatarProber;
use crate::probe::{AvatarProber, DisabledProber, MissReason, ProbeOutcome};
use crate::render::LetterAvatarRenderer;

pub use request::AvatarRequest;

/// Which branch produced a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AvatarPath {
    /// Upstream bytes passed through.
    External,
    /// Letter avatar rendered locally.
    Generated {
        /// Why the external avatar was not used.
        miss: MissReason,
    },
}

/// Dispatch result with the branch taken.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Response body and media type.
    pub image: AvatarImage,
    /// Branch that produced `image`.
    pub path: AvatarPath,
}

/// Orchestrates one avatar request. Stateless between requests; share it behind an `Arc`.
#[derive(Clone)]
pub struct AvatarDispatcher {
    resolver: IdentityResolver,
    prober: Arc<dyn AvatarProber>,
    renderer: Arc<LetterAvatarRenderer>,
}

impl AvatarDispatcher {
    /// Dispatcher over explicit collaborators.
    pub fn new(
        resolver: IdentityResolver,
        prober: Arc<dyn AvatarProber>,
        renderer: Arc<LetterAvatarRenderer>,
    ) -> Self {
        Self {
            resolver,
            prober,
            renderer,
        }
    }

    /// Build the production wiring from configuration.
    ///
    /// With probing disabled no HTTP client is created.
    pub fn from_config(cfg: &AvatarConfig, lookup: Arc<dyn UserLookup>) -> AvatarResult<Self> {
        cfg.validate()?;
        let prober: Arc<dyn AvatarProber> = if cfg.probe.enabled {
            Arc::new(GravatarProber::new(&cfg.probe)?)
        } else {
            Arc::new(DisabledProber)
        };
        let renderer = Arc::new(LetterAvatarRenderer::from_config(cfg)?);
        Ok(Self::new(IdentityResolver::new(lookup), prober, renderer))
    }

    /// The letter-avatar renderer in use.
    pub fn renderer(&self) -> &LetterAvatarRenderer {
        &self.renderer
    }

    /// Produce an avatar for `req` and report which branch served it.
    ///
    /// Never fails: every lookup or probe problem ends in a generated image. The requested size
    /// is clamped into the renderer's range before it reaches the prober or the renderer.
    #[tracing::instrument(skip(self, req), fields(user_id = ?req.user_id, size_px = req.size.px()))]
    pub fn dispatch(&self, req: &AvatarRequest) -> DispatchOutcome {
        let size = self.renderer.clamp_size(req.size);
        let identity = self
            .resolver
            .resolve(req.user_id, &req.name, req.email.as_deref());
        tracing::debug!(
            has_fingerprint = identity.email_fingerprint.is_some(),
            "identity resolved"
        );

        let miss = match &identity.email_fingerprint {
            None => MissReason::NoFingerprint,
            Some(fp) => match self.prober.probe(fp, size) {
                ProbeOutcome::Found(image) => {
                    tracing::debug!(prober = self.prober.name(), mime = %image.mime_type(), "external avatar found");
                    return DispatchOutcome {
                        image,
                        path: AvatarPath::External,
                    };
                }
                ProbeOutcome::NotFound(miss) => miss,
            },
        };

        tracing::debug!(%miss, "rendering letter avatar");
        DispatchOutcome {
            image: self.renderer.render(&identity.display_name, size),
            path: AvatarPath::Generated { miss },
        }
    }

    /// Image bytes and media type for `req`.
    pub fn get_avatar(&self, req: &AvatarRequest) -> AvatarImage {
        self.dispatch(req).image
    }
}

impl std::fmt::Debug for AvatarDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarDispatcher")
            .field("resolver", &self.resolver)
            .field("prober", &self.prober.name())
            .field("renderer", &self.renderer)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dispatch/dispatcher.rs"]
mod tests;
