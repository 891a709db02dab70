use crate::records::FlowerRecord;
use crate::rng::attribute_rng;
use rand::seq::SliceRandom;

/// Linear-ish RGB in [0, 1].
pub type Rgb = [f32; 3];

// Default bright palette for flowers without (or with an unknown) family tag.
pub const BRIGHT: &[Rgb] = &[
    [0.96, 0.36, 0.44], // coral
    [1.00, 0.78, 0.25], // marigold
    [0.55, 0.42, 0.95], // violet
    [0.35, 0.78, 0.95], // sky
    [0.98, 0.55, 0.80], // pink
    [0.98, 0.96, 0.90], // cream
];

pub const ROSA: &[Rgb] = &[
    [0.86, 0.18, 0.30],
    [0.95, 0.45, 0.55],
    [0.99, 0.72, 0.76],
    [0.62, 0.10, 0.22],
];

pub const GIRASOL: &[Rgb] = &[
    [1.00, 0.80, 0.10],
    [0.98, 0.64, 0.12],
    [0.92, 0.50, 0.08],
];

pub const LAVANDA: &[Rgb] = &[
    [0.62, 0.52, 0.88],
    [0.74, 0.66, 0.95],
    [0.48, 0.40, 0.78],
];

pub const MARGARITA: &[Rgb] = &[
    [0.99, 0.98, 0.94],
    [0.96, 0.94, 0.82],
    [1.00, 0.90, 0.55],
];

pub const TULIPAN: &[Rgb] = &[
    [0.93, 0.20, 0.18],
    [0.99, 0.50, 0.20],
    [0.98, 0.85, 0.30],
    [0.80, 0.30, 0.62],
];

/// Palette for a family tag; unknown or absent tags use [`BRIGHT`].
pub fn palette_for_family(family: Option<&str>) -> &'static [Rgb] {
    match family.map(|f| f.trim().to_ascii_lowercase()).as_deref() {
        Some("rosa") => ROSA,
        Some("girasol") => GIRASOL,
        Some("lavanda") => LAVANDA,
        Some("margarita") => MARGARITA,
        Some("tulipan") | Some("tulipán") => TULIPAN,
        _ => BRIGHT,
    }
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional).
pub fn parse_hex_color(raw: &str) -> Option<Rgb> {
    let hex = raw.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
    match hex.len() {
        6 => Some([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        3 => {
            let mut out = [0.0; 3];
            for (i, c) in hex.chars().enumerate() {
                let doubled: String = [c, c].iter().collect();
                out[i] = channel(&doubled)?;
            }
            Some(out)
        }
        _ => None,
    }
}

/// `#rrggbb`, the inverse of [`parse_hex_color`] up to 8-bit rounding.
pub fn format_hex_color(rgb: Rgb) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(rgb[0]), byte(rgb[1]), byte(rgb[2]))
}

/// Explicit override when parseable, otherwise a seeded pick from the family palette.
pub fn pick_palette_color(record: &FlowerRecord) -> Rgb {
    if let Some(rgb) = record.color.as_deref().and_then(parse_hex_color) {
        return rgb;
    }
    let palette = palette_for_family(record.family.as_deref());
    let mut rng = attribute_rng(&record.id, "color");
    palette.choose(&mut rng).copied().unwrap_or(BRIGHT[0])
}
