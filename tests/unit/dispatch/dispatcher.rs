use std::sync::Mutex;

use super::*;
use crate::foundation::core::{AvatarSize, MimeType, SizeBounds};
use crate::identity::directory::{InMemoryUserDirectory, NoUserDirectory, UserRecord};
use crate::identity::fingerprint::EmailFingerprint;

const VADER_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

/// Answers `Found` for one fingerprint and records every call.
struct ScriptedProber {
    known: EmailFingerprint,
    miss: MissReason,
    calls: Mutex<Vec<(String, u32)>>,
}

impl ScriptedProber {
    fn new(miss: MissReason) -> Arc<Self> {
        Arc::new(Self {
            known: EmailFingerprint::from_email("darthvader.fider@gmail.com")
                .expect("non-blank email"),
            miss,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().expect("lock").clone()
    }
}

impl AvatarProber for ScriptedProber {
    fn probe(&self, fingerprint: &EmailFingerprint, size: AvatarSize) -> ProbeOutcome {
        self.calls
            .lock()
            .expect("lock")
            .push((fingerprint.as_str().to_string(), size.px()));
        if *fingerprint == self.known {
            ProbeOutcome::Found(AvatarImage::new(VADER_JPEG.to_vec(), MimeType::Jpeg))
        } else {
            ProbeOutcome::NotFound(self.miss)
        }
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

fn renderer() -> Arc<LetterAvatarRenderer> {
    Arc::new(LetterAvatarRenderer::embedded(SizeBounds::default()).expect("embedded font"))
}

fn dispatcher(lookup: Arc<dyn UserLookup>, prober: Arc<ScriptedProber>) -> AvatarDispatcher {
    AvatarDispatcher::new(IdentityResolver::new(lookup), prober, renderer())
}

fn png_dims(bytes: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png).expect("png");
    (img.width(), img.height())
}

#[test]
fn known_email_passes_upstream_bytes_through() {
    let prober = ScriptedProber::new(MissReason::Status(404));
    let d = dispatcher(Arc::new(NoUserDirectory), prober.clone());
    let req = AvatarRequest::new("Darth Vader", 50, &SizeBounds::default())
        .with_email("darthvader.fider@gmail.com");

    let out = d.dispatch(&req);
    assert_eq!(out.path, AvatarPath::External);
    assert_eq!(out.image.mime_type(), MimeType::Jpeg);
    assert_eq!(out.image.bytes(), VADER_JPEG);
    assert_eq!(prober.calls().len(), 1);
    assert_eq!(prober.calls()[0].1, 50);
}

#[test]
fn unknown_email_falls_back_to_letter_avatar() {
    let prober = ScriptedProber::new(MissReason::Status(404));
    let d = dispatcher(Arc::new(NoUserDirectory), prober.clone());
    let req = AvatarRequest::new("Darth Vader", 50, &SizeBounds::default())
        .with_email("darthvader.fider1234567890@gmail.com");

    let out = d.dispatch(&req);
    assert_eq!(
        out.path,
        AvatarPath::Generated {
            miss: MissReason::Status(404)
        }
    );
    assert_eq!(out.image.mime_type(), MimeType::Png);
    assert_eq!(png_dims(out.image.bytes()), (50, 50));
    assert_eq!(prober.calls().len(), 1);
}

#[test]
fn no_email_never_probes() {
    let prober = ScriptedProber::new(MissReason::Status(404));
    let d = dispatcher(Arc::new(NoUserDirectory), prober.clone());
    let req = AvatarRequest::new("Jon Snow", 50, &SizeBounds::default()).with_user_id(0);

    let first = d.dispatch(&req);
    let second = d.dispatch(&req);
    assert_eq!(
        first.path,
        AvatarPath::Generated {
            miss: MissReason::NoFingerprint
        }
    );
    assert_eq!(first.image.bytes(), second.image.bytes());
    assert!(prober.calls().is_empty());
}

#[test]
fn directory_email_is_probed_before_request_email() {
    let lookup = Arc::new(InMemoryUserDirectory::from_records([UserRecord {
        id: 3,
        name: "Darth Vader".to_string(),
        email: Some("DarthVader.Fider@Gmail.com ".to_string()),
    }]));
    let prober = ScriptedProber::new(MissReason::Status(404));
    let d = dispatcher(lookup, prober.clone());
    let req = AvatarRequest::new("", 50, &SizeBounds::default())
        .with_user_id(3)
        .with_email("someone@example.com");

    assert_eq!(d.dispatch(&req).path, AvatarPath::External);
    assert_eq!(prober.calls()[0].0, prober.known.as_str());
}

#[test]
fn every_miss_reason_renders_the_same_image() {
    let req = AvatarRequest::new("Ada Lovelace", 120, &SizeBounds::default())
        .with_email("ada@example.com");
    let images: Vec<Vec<u8>> = [
        MissReason::Status(500),
        MissReason::Timeout,
        MissReason::Transport,
        MissReason::Malformed,
        MissReason::Disabled,
    ]
    .into_iter()
    .map(|miss| {
        let d = dispatcher(Arc::new(NoUserDirectory), ScriptedProber::new(miss));
        let out = d.dispatch(&req);
        assert_eq!(out.path, AvatarPath::Generated { miss });
        out.image.bytes().to_vec()
    })
    .collect();

    assert!(images.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(png_dims(&images[0]), (120, 120));
}

#[test]
fn get_avatar_matches_dispatch_image() {
    let d = dispatcher(
        Arc::new(NoUserDirectory),
        ScriptedProber::new(MissReason::Status(404)),
    );
    let req = AvatarRequest::new("Jon Snow", 75, &SizeBounds::default());
    assert_eq!(d.get_avatar(&req), d.dispatch(&req).image);
}

#[test]
fn from_config_with_probe_disabled_uses_disabled_prober() {
    let mut cfg = AvatarConfig::default();
    cfg.probe.enabled = false;
    let d = AvatarDispatcher::from_config(&cfg, Arc::new(NoUserDirectory)).expect("config");
    let req = AvatarRequest::new("Darth Vader", 50, &cfg.sizes)
        .with_email("darthvader.fider@gmail.com");
    assert_eq!(
        d.dispatch(&req).path,
        AvatarPath::Generated {
            miss: MissReason::Disabled
        }
    );
    assert!(format!("{d:?}").contains("disabled"));
}

#[test]
fn loose_request_bounds_are_clamped_before_probe_and_render() {
    let mut cfg = AvatarConfig::default();
    cfg.probe.enabled = false;
    let prober = ScriptedProber::new(MissReason::Status(404));
    let d = AvatarDispatcher::new(
        IdentityResolver::new(Arc::new(NoUserDirectory)),
        prober.clone(),
        Arc::new(LetterAvatarRenderer::from_config(&cfg).expect("renderer")),
    );
    let loose = SizeBounds {
        min: 1,
        max: 5000,
        default: 1,
    };

    for (query, edge) in [
        ("name=Jon+Snow&size=3000&email=jon%40example.com", 200),
        ("name=Jon+Snow&size=1&email=jon%40example.com", 50),
    ] {
        let req = AvatarRequest::from_query(query, &loose);
        let out = d.dispatch(&req);
        assert_eq!(png_dims(out.image.bytes()), (edge, edge), "{query}");
    }
    let probed: Vec<u32> = prober.calls().into_iter().map(|(_, px)| px).collect();
    assert_eq!(probed, vec![200, 50]);
}
