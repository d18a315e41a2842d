use palette::{IntoColor, Srgb};

/// A single 8-bit RGB sample.
pub type PixelSample = (u8, u8, u8);

/// A color in the HSV model. Hue is in degrees within `[0, 360)`, saturation and value are within `[0, 1]`.
///
/// Usually produced by [`rgb_to_hsv`]. The fields are public so that samples can be written out by hand, for
/// example when calibrating [`crate::Thresholds`]; nothing checks that such a sample stays within these ranges, and a
/// hue outside of them is categorized as [`crate::ColorCategory::Other`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Hsv {
    pub fn from_rgb((r, g, b): PixelSample) -> Self {
        rgb_to_hsv(r, g, b)
    }
}

impl From<PixelSample> for Hsv {
    fn from(rgb: PixelSample) -> Self {
        Hsv::from_rgb(rgb)
    }
}

pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let hsv: palette::Hsv = Srgb::new(r, g, b).into_format::<f32>().into_color();
    let (hue, s, v) = hsv.into_components();

    let mut h = hue.into_positive_degrees();
    // tiny negative hues round up to exactly 360
    if h >= 360.0 {
        h -= 360.0;
    }

    Hsv { h, s, v }
}
