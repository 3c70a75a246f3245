use std::path::Path;

use anyhow::Context;

use crate::foundation::error::AvatarResult;
use crate::render::text::TextLayoutEngine;

/// DejaVu Sans Bold, compiled into the binary so letter avatars never depend on system fonts.
pub const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");

/// Immutable typeface shared by every render: one handle for shaping, one for rasterizing.
#[derive(Clone)]
pub(crate) struct Typeface {
    pub(crate) layout_blob: parley::fontique::Blob<u8>,
    pub(crate) raster_font: vello_cpu::peniko::FontData,
    pub(crate) family_name: String,
}

impl Typeface {
    /// Parse font bytes; fails when no usable family can be registered.
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> AvatarResult<Self> {
        let layout_blob = parley::fontique::Blob::from(bytes.clone());
        let family_name = TextLayoutEngine::new(&layout_blob)?
            .family_name()
            .to_string();
        let raster_font = vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes), 0);
        Ok(Self {
            layout_blob,
            raster_font,
            family_name,
        })
    }

    pub(crate) fn embedded() -> AvatarResult<Self> {
        Self::from_bytes(EMBEDDED_FONT.to_vec())
    }

    pub(crate) fn from_path(path: &Path) -> AvatarResult<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("read font '{}'", path.display()))?;
        Self::from_bytes(bytes)
    }
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typeface")
            .field("family_name", &self.family_name)
            .finish()
    }
}
