mod color;

pub use color::{hsl_to_rgb, linear_to_srgb, srgb_to_linear, Color, ColorError, ColorSpec};
