use log::warn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Linear RGB color with components in [0.0, 1.0]
///
/// CSS inputs (`#hex`, `rgb()`, `hsl()`, names) are sRGB encoded and get
/// linearized on the way in; `to_rgb8` and `Display` encode back to sRGB.
/// Deserialization never fails on a well-formed value: an unreadable color
/// falls back to [`Color::DEFAULT_OBJECT`] with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "ColorSpec", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

/// Accepted on-the-wire color forms: any CSS-style string, or an
/// `[hue_degrees, saturation_percent, lightness_percent]` triple
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ColorSpec {
    Css(String),
    Hsl([f32; 3]),
    Other(serde::de::IgnoredAny),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ColorError {
    #[error("invalid hex color: {0}")]
    InvalidHex(String),
    #[error("invalid color function: {0}")]
    InvalidFunction(String),
    #[error("unknown color name: {0}")]
    UnknownName(String),
}

impl Color {
    /// Fallback used when an object carries no color (`#888888`)
    pub const DEFAULT_OBJECT: Color = Color::rgb(0.246_201_3, 0.246_201_3, 0.246_201_3);

    /// Build from linear components
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from sRGB encoded components in [0, 1]
    pub fn from_srgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgb(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// Build from hue in degrees, saturation and lightness in [0, 1]
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        let [r, g, b] = hsl_to_rgb(h, s, l);
        Self::from_srgb(r, g, b)
    }

    /// Parse a CSS color string: `#rgb`, `#rrggbb`, `rgb(..)`, `hsl(..)` or a named color
    pub fn parse(input: &str) -> Result<Self, ColorError> {
        let value = input.trim().to_ascii_lowercase();

        if let Some(hex) = value.strip_prefix('#') {
            return Self::from_hex(hex);
        }
        if let Some(args) = function_args(&value, &["hsl", "hsla"]) {
            return parse_hsl_args(args).ok_or_else(|| ColorError::InvalidFunction(input.to_string()));
        }
        if let Some(args) = function_args(&value, &["rgb", "rgba"]) {
            return parse_rgb_args(args).ok_or_else(|| ColorError::InvalidFunction(input.to_string()));
        }

        named(&value).ok_or_else(|| ColorError::UnknownName(input.to_string()))
    }

    fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let invalid = || ColorError::InvalidHex(hex.to_string());
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

        let (r, g, b) = match hex.len() {
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1].repeat(2));
                (expand(0)?, expand(1)?, expand(2)?)
            }
            6 => (channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?),
            _ => return Err(invalid()),
        };

        Ok(Self::from_srgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_rgba(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    /// sRGB encoded bytes
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |c: f32| (linear_to_srgb(c) * 255.0).round().clamp(0.0, 255.0) as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::DEFAULT_OBJECT
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::parse(s)
    }
}

impl From<ColorSpec> for Color {
    fn from(spec: ColorSpec) -> Self {
        match spec {
            ColorSpec::Css(s) => Color::parse(&s).unwrap_or_else(|e| {
                warn!("{}, using {}", e, Color::DEFAULT_OBJECT);
                Color::DEFAULT_OBJECT
            }),
            ColorSpec::Hsl([h, s, l]) => Color::from_hsl(h, s / 100.0, l / 100.0),
            ColorSpec::Other(_) => {
                warn!("Unreadable color value, using {}", Color::DEFAULT_OBJECT);
                Color::DEFAULT_OBJECT
            }
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.to_rgb8();
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// sRGB transfer function, decode direction
pub fn srgb_to_linear(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

pub fn linear_to_srgb(c: f32) -> f32 {
    let c = c.clamp(0.0, 1.0);
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// HSL to sRGB encoded RGB, hue in degrees (any range), saturation and lightness in [0, 1]
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let s = s.clamp(0.0, 1.0);
    let l = l.clamp(0.0, 1.0);
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h_prime as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

fn function_args<'a>(value: &'a str, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        value
            .strip_prefix(name)
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
    })
}

// Accepts both comma and space separated syntax; an alpha after `/` or a
// fourth component is ignored.
fn split_args(args: &str) -> Vec<&str> {
    args.split('/')
        .next()
        .unwrap_or_default()
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .take(3)
        .collect()
}

fn parse_percent(token: &str) -> Option<f32> {
    let number = token.strip_suffix('%').unwrap_or(token);
    number.parse::<f32>().ok().map(|v| v / 100.0)
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() != 3 {
        return None;
    }
    let hue = parts[0].strip_suffix("deg").unwrap_or(parts[0]).parse::<f32>().ok()?;
    let saturation = parse_percent(parts[1])?;
    let lightness = parse_percent(parts[2])?;
    Some(Color::from_hsl(hue, saturation, lightness))
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let parts = split_args(args);
    if parts.len() != 3 {
        return None;
    }
    let channel = |token: &str| -> Option<f32> {
        match token.strip_suffix('%') {
            Some(pct) => pct.parse::<f32>().ok().map(|v| v / 100.0),
            None => token.parse::<f32>().ok().map(|v| v / 255.0),
        }
        .map(|v| v.clamp(0.0, 1.0))
    };
    Some(Color::from_srgb(channel(parts[0])?, channel(parts[1])?, channel(parts[2])?))
}

fn named(name: &str) -> Option<Color> {
    let [r, g, b]: [u8; 3] = match name {
        "black" => [0, 0, 0],
        "white" => [255, 255, 255],
        "red" => [255, 0, 0],
        "green" => [0, 128, 0],
        "blue" => [0, 0, 255],
        "yellow" => [255, 255, 0],
        "orange" => [255, 165, 0],
        "purple" => [128, 0, 128],
        "gray" | "grey" => [128, 128, 128],
        "silver" => [192, 192, 192],
        "maroon" => [128, 0, 0],
        "olive" => [128, 128, 0],
        "lime" => [0, 255, 0],
        "teal" => [0, 128, 128],
        "navy" => [0, 0, 128],
        "aqua" | "cyan" => [0, 255, 255],
        "fuchsia" | "magenta" => [255, 0, 255],
        "pink" => [255, 192, 203],
        "brown" => [165, 42, 42],
        _ => return None,
    };
    Some(Color::from_srgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.01)
    }

    #[test]
    fn test_hsl_to_rgb_red() {
        assert!(approx(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
    }

    #[test]
    fn test_hsl_to_rgb_white_and_black() {
        assert!(approx(hsl_to_rgb(200.0, 0.7, 1.0), [1.0, 1.0, 1.0]));
        assert!(approx(hsl_to_rgb(200.0, 0.7, 0.0), [0.0, 0.0, 0.0]));
    }

    #[test]
    fn test_hsl_hue_wraps() {
        assert!(approx(hsl_to_rgb(360.0, 1.0, 0.5), hsl_to_rgb(0.0, 1.0, 0.5)));
        assert!(approx(hsl_to_rgb(-120.0, 1.0, 0.5), hsl_to_rgb(240.0, 1.0, 0.5)));
    }

    #[test]
    fn test_parse_short_hex() {
        let c = Color::parse("#888").unwrap();
        assert_eq!(c.to_rgb8(), [0x88, 0x88, 0x88]);
    }

    #[test]
    fn test_parse_long_hex() {
        let c = Color::parse("#FF8800").unwrap();
        assert_eq!(c.to_rgb8(), [255, 136, 0]);
    }

    #[test]
    fn test_parse_space_separated_hsl() {
        let c = Color::parse("hsl(120 100% 50%)").unwrap();
        assert_eq!(c.to_rgb8(), [0, 255, 0]);
    }

    #[test]
    fn test_parse_comma_separated_hsl() {
        let c = Color::parse("hsl(240, 100%, 50%)").unwrap();
        assert_eq!(c.to_rgb8(), [0, 0, 255]);
    }

    #[test]
    fn test_parse_rgb_function() {
        let c = Color::parse("rgb(255, 0, 128)").unwrap();
        assert_eq!(c.to_rgb8(), [255, 0, 128]);
    }

    #[test]
    fn test_parse_named() {
        assert_eq!(Color::parse("White").unwrap().to_rgb8(), [255, 255, 255]);
        assert_eq!(Color::parse("teal").unwrap().to_rgb8(), [0, 128, 128]);
        assert_eq!(Color::parse("pink").unwrap().to_rgb8(), [255, 192, 203]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(Color::parse("#12"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::parse("#GG0000"), Err(ColorError::InvalidHex(_))));
        assert!(matches!(Color::parse("hsl(1 2%)"), Err(ColorError::InvalidFunction(_))));
        assert!(matches!(Color::parse("chartreuse-ish"), Err(ColorError::UnknownName(_))));
    }

    #[test]
    fn test_css_input_is_linearized() {
        let gray = Color::parse("#808080").unwrap();
        assert!((gray.r - 0.2159).abs() < 1e-3);
        assert_eq!(gray.to_rgb8(), [0x80, 0x80, 0x80]);
        assert!(approx(Color::parse("#888").unwrap().to_array(), Color::DEFAULT_OBJECT.to_array()));
        assert!((Color::from_hsl(0.0, 0.0, 0.5).g - 0.2140).abs() < 1e-3);
    }

    #[test]
    fn test_transfer_functions_invert() {
        for byte in [0u8, 10, 64, 128, 200, 255] {
            let c = byte as f32 / 255.0;
            assert!((linear_to_srgb(srgb_to_linear(c)) - c).abs() < 1e-5);
        }
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_string(), "#ff0000");
    }

    #[test]
    fn test_deserialize_string_and_triple() {
        let from_str: Color = serde_json::from_str("\"hsl(0 100% 50%)\"").unwrap();
        let from_triple: Color = serde_json::from_str("[0.0, 100.0, 50.0]").unwrap();
        assert_eq!(from_str.to_rgb8(), from_triple.to_rgb8());
    }

    #[test]
    fn test_unreadable_color_falls_back() {
        let unknown: Color = serde_json::from_str("\"teal-ish\"").unwrap();
        let bad_hex: Color = serde_json::from_str("\"#12\"").unwrap();
        let number: Color = serde_json::from_str("42").unwrap();
        assert_eq!(unknown, Color::DEFAULT_OBJECT);
        assert_eq!(bad_hex, Color::DEFAULT_OBJECT);
        assert_eq!(number, Color::DEFAULT_OBJECT);
    }

    #[test]
    fn test_serialize_as_hex() {
        let json = serde_json::to_string(&Color::rgb(0.0, 0.0, 1.0)).unwrap();
        assert_eq!(json, "\"#0000ff\"");
    }
}
