use crate::hsv::{Hsv, PixelSample};

/// A trait used to implement filters for the pixel scan.
///
/// Pixels a filter disallows are left out of the tally entirely: they count towards neither any category nor the total
/// the ratios are computed against. This trait allows the library consumer to implement custom filters, for example to
/// skip a known backdrop.
///
/// Filters run on the scan's worker threads, so they have to be `Send` and `Sync`.
///
/// See [`crate::ColorAnalyzer::add_filter`] on how to add filters to the analysis.
pub trait Filter: Send + Sync {
    /// Return whether a given color should be counted or not. The same color is given in both sRGB and HSV for
    /// convenience.
    fn is_allowed(&self, rgb: PixelSample, hsv: Hsv) -> bool;
}

/// Excludes pixels within a per-channel tolerance of a background color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IgnoreColor {
    rgb: PixelSample,
    tolerance: u8,
}

impl IgnoreColor {
    pub fn new(rgb: PixelSample, tolerance: u8) -> Self {
        Self { rgb, tolerance }
    }

    pub fn exact(rgb: PixelSample) -> Self {
        Self::new(rgb, 0)
    }

    pub fn rgb(&self) -> PixelSample {
        self.rgb
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    pub fn matches(&self, (r, g, b): PixelSample) -> bool {
        let (ir, ig, ib) = self.rgb;

        r.abs_diff(ir) <= self.tolerance && g.abs_diff(ig) <= self.tolerance && b.abs_diff(ib) <= self.tolerance
    }
}

impl Filter for IgnoreColor {
    fn is_allowed(&self, rgb: PixelSample, _: Hsv) -> bool {
        !self.matches(rgb)
    }
}
