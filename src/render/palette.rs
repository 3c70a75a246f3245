use crate::foundation::core::Rgb8;

/// A named background color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaletteEntry {
    /// Human-readable name, used in diagnostics.
    pub name: &'static str,
    /// Background fill.
    pub color: Rgb8,
}

const fn entry(name: &'static str, rgb: u32) -> PaletteEntry {
    PaletteEntry {
        name,
        color: Rgb8::from_u32(rgb),
    }
}

/// Background colors, in selection order. Index 0 is reserved for the empty name.
///
/// Every entry keeps white initials readable (contrast ratio above 3:1).
pub const DEFAULT_PALETTE: [PaletteEntry; 13] = [
    entry("slate", 0x6B7280),
    entry("red", 0xE53935),
    entry("pink", 0xD81B60),
    entry("purple", 0x8E24AA),
    entry("deep-purple", 0x5E35B1),
    entry("indigo", 0x3949AB),
    entry("blue", 0x1E88E5),
    entry("teal", 0x00897B),
    entry("green", 0x43A047),
    entry("olive", 0x558B2F),
    entry("orange", 0xF4511E),
    entry("brown", 0x6D4C41),
    entry("blue-grey", 0x546E7A),
];

/// Index used when the normalized name is empty.
pub const RESERVED_INDEX: usize = 0;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a. Fixed constants, no per-process seed.
pub const fn fnv1a64(bytes: &[u8]) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    let mut i = 0;
    while i < bytes.len() {
        h ^= bytes[i] as u64;
        h = h.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    h
}

/// Normalize a display name for color selection: trim, collapse whitespace runs to one space,
/// lower-case.
pub fn normalize_name(display_name: &str) -> String {
    display_name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Fixed, ordered set of background colors with deterministic name-to-color mapping.
#[derive(Clone, Copy, Debug)]
pub struct Palette {
    entries: &'static [PaletteEntry],
}

impl Palette {
    /// The built-in palette.
    pub const DEFAULT: Self = Self {
        entries: &DEFAULT_PALETTE,
    };

    /// All entries, reserved one first.
    pub fn entries(&self) -> &'static [PaletteEntry] {
        self.entries
    }

    /// Palette index for `display_name`.
    ///
    /// Empty names map to [`RESERVED_INDEX`]; everything else maps to
    /// `1 + fnv1a64(normalize_name(name)) % (len - 1)`.
    pub fn index_for(&self, display_name: &str) -> usize {
        let normalized = normalize_name(display_name);
        if normalized.is_empty() || self.entries.len() < 2 {
            return RESERVED_INDEX;
        }
        let selectable = (self.entries.len() - 1) as u64;
        1 + (fnv1a64(normalized.as_bytes()) % selectable) as usize
    }

    /// Palette entry for `display_name`.
    pub fn entry_for(&self, display_name: &str) -> PaletteEntry {
        self.entries[self.index_for(display_name)]
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/palette.rs"]
mod tests;
