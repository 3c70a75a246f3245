use std::io::Cursor;

use crate::config::ProbeConfig;
use crate::foundation::core::{AvatarImage, AvatarSize, MimeType};
use crate::foundation::error::{AvatarError, AvatarResult};
use crate::identity::fingerprint::EmailFingerprint;
use crate::probe::{AvatarProber, MissReason, ProbeOutcome};

/// Upper bound on accepted upstream bodies.
const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Gravatar-compatible prober: `GET {base_url}/{fingerprint}?s={size}&d=404`.
///
/// The `d=404` parameter makes the service answer 404 instead of serving its own default
/// artwork, so a miss is distinguishable from a hit. Uses a blocking client; call it from a
/// worker thread, not from inside an async executor.
pub struct GravatarProber {
    base_url: url::Url,
    http_client: reqwest::blocking::Client,
}

impl GravatarProber {
    /// Build a prober from validated settings.
    pub fn new(cfg: &ProbeConfig) -> AvatarResult<Self> {
        let base_url = url::Url::parse(&cfg.base_url)
            .map_err(|e| AvatarError::config(format!("probe.base_url: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AvatarError::config("probe.base_url cannot carry a path"));
        }
        if cfg.timeout_ms == 0 {
            return Err(AvatarError::config("probe.timeout_ms must be > 0"));
        }

        let http_client = reqwest::blocking::Client::builder()
            .connect_timeout(cfg.timeout())
            .timeout(cfg.timeout())
            .user_agent(cfg.user_agent.clone())
            .build()
            .map_err(|e| AvatarError::config(format!("http client: {e}")))?;

        Ok(Self {
            base_url,
            http_client,
        })
    }

    /// URL probed for `fingerprint` at `size`.
    pub fn avatar_url(&self, fingerprint: &EmailFingerprint, size: AvatarSize) -> url::Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(fingerprint.as_str());
        }
        url.query_pairs_mut()
            .clear()
            .append_pair("s", &size.px().to_string())
            .append_pair("d", "404");
        url
    }

    fn fetch(&self, url: url::Url) -> Result<AvatarImage, MissReason> {
        let resp = self.http_client.get(url).send().map_err(classify)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MissReason::Status(status.as_u16()));
        }
        if resp
            .content_length()
            .is_some_and(|n| n > MAX_BODY_BYTES as u64)
        {
            return Err(MissReason::Malformed);
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = resp.bytes().map_err(classify)?;
        if body.len() > MAX_BODY_BYTES {
            return Err(MissReason::Malformed);
        }

        let mime = validate_body(content_type.as_deref(), &body).ok_or(MissReason::Malformed)?;
        Ok(AvatarImage::new(body.to_vec(), mime))
    }
}

impl AvatarProber for GravatarProber {
    #[tracing::instrument(skip(self, size), fields(size_px = size.px()))]
    fn probe(&self, fingerprint: &EmailFingerprint, size: AvatarSize) -> ProbeOutcome {
        match self.fetch(self.avatar_url(fingerprint, size)) {
            Ok(image) => {
                tracing::debug!(
                    bytes = image.bytes().len(),
                    mime = %image.mime_type(),
                    "external avatar found"
                );
                ProbeOutcome::Found(image)
            }
            Err(reason) => {
                tracing::debug!(%reason, "external avatar miss");
                ProbeOutcome::NotFound(reason)
            }
        }
    }

    fn name(&self) -> &'static str {
        "gravatar"
    }
}

impl std::fmt::Debug for GravatarProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GravatarProber")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

fn classify(e: reqwest::Error) -> MissReason {
    if e.is_timeout() {
        MissReason::Timeout
    } else {
        MissReason::Transport
    }
}

/// Decide the media type of an upstream body, or `None` when it must be treated as a miss.
///
/// The declared `Content-Type` wins when present, but it must be JPEG or PNG and agree with the
/// sniffed container; the body must also yield image dimensions.
pub(crate) fn validate_body(content_type: Option<&str>, body: &[u8]) -> Option<MimeType> {
    if body.is_empty() {
        return None;
    }

    let reader = image::ImageReader::new(Cursor::new(body))
        .with_guessed_format()
        .ok()?;
    let sniffed = reader.format().and_then(MimeType::from_image_format)?;
    let declared = match content_type {
        Some(ct) => MimeType::from_content_type(ct)?,
        None => sniffed,
    };
    if declared != sniffed {
        return None;
    }

    let (w, h) = reader.into_dimensions().ok()?;
    (w > 0 && h > 0).then_some(declared)
}

#[cfg(test)]
#[path = "../../tests/unit/probe/gravatar.rs"]
mod tests;
