//! Vector icon glyphs.
//!
//! Glyphs are filled shapes in a small square view box, kept as
//! geometry rather than image data so the atlas can rasterize them
//! deterministically at any cell size.

use std::collections::BTreeMap;

use geodata::hit_test::point_in_ring;

/// Side length of the glyph view box.
pub const GLYPH_VIEW_BOX: f64 = 8.0;

/// A filled vector shape in glyph space.
#[derive(Debug, Clone, PartialEq)]
pub enum VectorGlyph {
    Circle { cx: f64, cy: f64, r: f64 },
    Polygon { points: Vec<[f64; 2]> },
}

impl VectorGlyph {
    /// Whether `p` (in view-box coordinates) is covered by the shape.
    pub fn contains(&self, p: [f64; 2]) -> bool {
        match self {
            VectorGlyph::Circle { cx, cy, r } => {
                let dx = p[0] - cx;
                let dy = p[1] - cy;
                dx * dx + dy * dy <= r * r
            }
            VectorGlyph::Polygon { points } => point_in_ring(p, points),
        }
    }
}

/// The builtin glyph set every atlas starts from.
pub fn builtin_glyphs() -> BTreeMap<String, VectorGlyph> {
    BTreeMap::from([
        (
            "circle".to_string(),
            VectorGlyph::Circle {
                cx: 4.0,
                cy: 4.0,
                r: 3.0,
            },
        ),
        (
            "star".to_string(),
            VectorGlyph::Polygon {
                points: vec![
                    [4.0, 5.757],
                    [6.06, 7.0],
                    [5.455, 4.656],
                    [7.5, 3.08],
                    [5.104, 2.876],
                    [4.0, 1.0],
                    [3.104, 2.876],
                    [0.5, 3.08],
                    [2.545, 4.656],
                    [1.94, 7.0],
                ],
            },
        ),
        (
            "diamond".to_string(),
            VectorGlyph::Polygon {
                points: vec![[4.0, 1.0], [1.0, 4.0], [4.0, 7.0], [7.0, 4.0]],
            },
        ),
    ])
}
