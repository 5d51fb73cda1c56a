use anyhow::{anyhow, Result};
use rgb::RGB8;
use rustc_hash::FxHashMap;

use crate::gfa::Path;

/// Used for structural links no path walks.
pub const LINK_GREY: RGB8 = RGB8 {
    r: 120,
    g: 120,
    b: 120,
};

const GRADIENTS: &[(&str, colorous::Gradient)] = &[
    ("Rainbow", colorous::RAINBOW),
    ("Sinebow", colorous::SINEBOW),
    ("Turbo", colorous::TURBO),
    ("Viridis", colorous::VIRIDIS),
    ("Plasma", colorous::PLASMA),
    ("Magma", colorous::MAGMA),
    ("Inferno", colorous::INFERNO),
    ("Cividis", colorous::CIVIDIS),
    ("Spectral", colorous::SPECTRAL),
    ("Cool", colorous::COOL),
    ("Warm", colorous::WARM),
];

const NAMED: &[(&str, RGB8)] = &[
    ("black", RGB8 { r: 0, g: 0, b: 0 }),
    ("white", RGB8 { r: 255, g: 255, b: 255 }),
    ("grey", RGB8 { r: 128, g: 128, b: 128 }),
    ("gray", RGB8 { r: 128, g: 128, b: 128 }),
    ("red", RGB8 { r: 255, g: 0, b: 0 }),
    ("green", RGB8 { r: 0, g: 128, b: 0 }),
    ("blue", RGB8 { r: 0, g: 0, b: 255 }),
    ("orange", RGB8 { r: 255, g: 165, b: 0 }),
    ("purple", RGB8 { r: 128, g: 0, b: 128 }),
    ("brown", RGB8 { r: 165, g: 42, b: 42 }),
    ("pink", RGB8 { r: 255, g: 192, b: 203 }),
    ("steelblue", RGB8 { r: 70, g: 130, b: 180 }),
];

fn to_rgb(c: colorous::Color) -> RGB8 {
    RGB8::new(c.r, c.g, c.b)
}

fn darker(c: RGB8) -> RGB8 {
    let scale = |v: u8| (v as f32 * 0.7).round() as u8;
    RGB8::new(scale(c.r), scale(c.g), scale(c.b))
}

/// How segment strands are colored: sampled from a gradient by segment
/// index, or one solid color for all of them (`Just<Name>`).
#[derive(Clone, Copy)]
pub enum ColorScheme {
    Gradient {
        name: &'static str,
        gradient: colorous::Gradient,
    },
    Solid(RGB8),
}

impl ColorScheme {
    pub fn parse(name: &str) -> Result<Self> {
        if let Some(color) = name.strip_prefix("Just") {
            let color = color.to_lowercase();
            return NAMED
                .iter()
                .find(|(n, _)| *n == color)
                .map(|(_, rgb)| ColorScheme::Solid(*rgb))
                .ok_or_else(|| anyhow!("unknown color name `{}`", color));
        }

        GRADIENTS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(name, gradient)| ColorScheme::Gradient { name, gradient })
            .ok_or_else(|| anyhow!("unknown color scheme `{}`", name))
    }

    pub fn node_color(&self, index: usize, count: usize) -> RGB8 {
        match self {
            ColorScheme::Solid(color) => *color,
            ColorScheme::Gradient { gradient, .. } => {
                let t = if count == 0 {
                    0.0
                } else {
                    index as f64 / count as f64
                };
                darker(to_rgb(gradient.eval_continuous(t)))
            }
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        ColorScheme::Gradient {
            name: "Rainbow",
            gradient: colorous::RAINBOW,
        }
    }
}

impl std::fmt::Debug for ColorScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorScheme::Gradient { name, .. } => {
                f.debug_tuple("Gradient").field(name).finish()
            }
            ColorScheme::Solid(color) => {
                f.debug_tuple("Solid").field(color).finish()
            }
        }
    }
}

impl PartialEq for ColorScheme {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                ColorScheme::Gradient { name: a, .. },
                ColorScheme::Gradient { name: b, .. },
            ) => a == b,
            (ColorScheme::Solid(a), ColorScheme::Solid(b)) => a == b,
            _ => false,
        }
    }
}

/// Lane index and color for each path, by declaration order. Colors
/// cycle through `CATEGORY10`.
#[derive(Debug, Default, Clone)]
pub struct PathPalette {
    lanes: FxHashMap<String, usize>,
}

impl PathPalette {
    pub fn from_paths(paths: &[Path]) -> Self {
        let mut lanes = FxHashMap::default();
        for path in paths {
            let next = lanes.len();
            lanes.entry(path.name.clone()).or_insert(next);
        }
        Self { lanes }
    }

    pub fn lane(&self, name: &str) -> Option<usize> {
        self.lanes.get(name).copied()
    }

    pub fn color(&self, name: &str) -> RGB8 {
        self.lane(name)
            .map(|lane| {
                let palette = &colorous::CATEGORY10;
                to_rgb(palette[lane % palette.len()])
            })
            .unwrap_or(LINK_GREY)
    }
}
