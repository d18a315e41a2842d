use crate::{catalog::PaletteEntry, report::ColorRatioReport, report::Dominant};

/// The verdict on whether a photo fits the palette entry the user picked for it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationResult {
    pub accepted: bool,
    pub detected: Dominant,
    pub selected: PaletteEntry,
    /// The entry matching the detected color, if the photo was rejected and such an entry exists.
    pub suggestion: Option<PaletteEntry>,
    /// The percentage of pixels in the detected category.
    pub dominant_ratio: f64,
    /// The percentage of pixels in the selected entry's category.
    pub selected_ratio: f64,
}

/// Check an analysed image against the palette entry the user selected.
///
/// The image is accepted when its dominant color is the selected entry's category. Otherwise the entry for the dominant
/// color is suggested instead; images dominated by gray, unclassified colors or nothing at all get no suggestion.
pub fn validate(selected: PaletteEntry, report: &ColorRatioReport) -> ValidationResult {
    let detected = report.dominant();
    let accepted = detected
        .category()
        .and_then(|category| category.palette_key())
        .map_or(false, |key| key == selected.key());

    let suggestion = if accepted {
        None
    } else {
        detected.category().and_then(PaletteEntry::for_category)
    };

    ValidationResult {
        accepted,
        detected,
        selected,
        suggestion,
        dominant_ratio: report.dominant_ratio(),
        selected_ratio: report.ratio(selected.category()),
    }
}
