//! Icon atlas: all registered glyphs rasterized into one strip texture
//! plus a lookup table of per-icon rectangles.

use std::collections::BTreeMap;

use foundation::color::Rgba;

use crate::glyph::{GLYPH_VIEW_BOX, VectorGlyph, builtin_glyphs};

/// Cell side length in pixels; every glyph rasterizes into one cell.
pub const ATLAS_CELL: u32 = 32;

/// Glyphs render as a white mask; tinting happens in the point layer.
const GLYPH_FILL: Rgba = Rgba::opaque(255, 255, 255);

/// One icon's rectangle inside the atlas texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IconRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// The pixels are a mask to be tinted, not full-color artwork.
    pub mask: bool,
}

/// A complete, immutable atlas.
///
/// Readers always see a whole atlas or none; rebuilds replace the
/// previous atlas rather than patching it.
#[derive(Debug, Clone, PartialEq)]
pub struct IconAtlas {
    pub width: u32,
    pub height: u32,
    /// RGBA8, row-major.
    pub pixels: Vec<u8>,
    pub mapping: BTreeMap<String, IconRect>,
    /// Content fingerprint over the pixel buffer.
    pub fingerprint: blake3::Hash,
}

impl IconAtlas {
    pub fn rect(&self, name: &str) -> Option<IconRect> {
        self.mapping.get(name).copied()
    }
}

/// Accumulates glyph registrations and builds atlases from them.
///
/// Every build reconstructs the whole atlas in O(icon count); callers
/// adding icons incrementally should batch registrations before
/// triggering a rebuild.
#[derive(Debug, Clone)]
pub struct AtlasBuilder {
    glyphs: BTreeMap<String, VectorGlyph>,
}

impl Default for AtlasBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AtlasBuilder {
    /// Starts from the builtin glyph set.
    pub fn new() -> Self {
        Self {
            glyphs: builtin_glyphs(),
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn has_glyph(&self, name: &str) -> bool {
        self.glyphs.contains_key(name)
    }

    /// Registers one glyph; an existing name is overwritten.
    pub fn register(&mut self, name: impl Into<String>, glyph: VectorGlyph) {
        self.glyphs.insert(name.into(), glyph);
    }

    pub fn register_all(&mut self, glyphs: BTreeMap<String, VectorGlyph>) {
        self.glyphs.extend(glyphs);
    }

    /// Rasterizes every registered glyph into one strip texture.
    ///
    /// Sampling is at pixel centers, so the output is identical for
    /// identical glyph sets.
    pub fn build(&self) -> IconAtlas {
        let cell = ATLAS_CELL;
        let count = self.glyphs.len() as u32;
        let width = cell * count;
        let height = if count == 0 { 0 } else { cell };
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let mut mapping = BTreeMap::new();

        for (index, (name, glyph)) in self.glyphs.iter().enumerate() {
            let x0 = index as u32 * cell;
            for py in 0..cell {
                for px in 0..cell {
                    let sample = [
                        (f64::from(px) + 0.5) / f64::from(cell) * GLYPH_VIEW_BOX,
                        (f64::from(py) + 0.5) / f64::from(cell) * GLYPH_VIEW_BOX,
                    ];
                    if !glyph.contains(sample) {
                        continue;
                    }
                    let offset = ((py * width + x0 + px) * 4) as usize;
                    pixels[offset] = GLYPH_FILL.r;
                    pixels[offset + 1] = GLYPH_FILL.g;
                    pixels[offset + 2] = GLYPH_FILL.b;
                    pixels[offset + 3] = GLYPH_FILL.a;
                }
            }
            mapping.insert(
                name.clone(),
                IconRect {
                    x: x0,
                    y: 0,
                    width: cell,
                    height: cell,
                    mask: true,
                },
            );
        }

        let fingerprint = blake3::hash(&pixels);
        IconAtlas {
            width,
            height,
            pixels,
            mapping,
            fingerprint,
        }
    }
}
