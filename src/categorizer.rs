use crate::{category::ColorCategory, hsv::Hsv, thresholds::Thresholds};

/// The rules of the classification, in the order they are tried. The first rule that matches a sample decides its
/// category; later rules never override an earlier match.
///
/// 1. [`Rule::Black`]: value below `black_max_value`, regardless of hue and saturation.
/// 2. [`Rule::White`]: value above `white_min_value` and saturation below `achromatic_max_saturation`.
/// 3. [`Rule::Gray`]: any other sample with saturation below `achromatic_max_saturation`.
/// 4. [`Rule::Brown`]: hue within the brown arc, saturation below `brown_max_saturation` and value below
///    `brown_max_value`.
/// 5. [`Rule::HueArc`]: the chromatic arc that owns the hue.
/// 6. [`Rule::Fallback`]: anything left, which only happens for samples outside the HSV domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Black,
    White,
    Gray,
    Brown,
    HueArc(ColorCategory),
    Fallback,
}

impl Rule {
    pub fn category(self) -> ColorCategory {
        match self {
            Rule::Black => ColorCategory::Black,
            Rule::White => ColorCategory::White,
            Rule::Gray => ColorCategory::Gray,
            Rule::Brown => ColorCategory::Brown,
            Rule::HueArc(category) => category,
            Rule::Fallback => ColorCategory::Other,
        }
    }
}

/// Classifies HSV samples into [`ColorCategory`] buckets using a set of [`Thresholds`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Categorizer {
    thresholds: Thresholds,
}

impl Categorizer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    pub fn categorize(&self, hsv: Hsv) -> ColorCategory {
        self.matching_rule(hsv).category()
    }

    /// Return the first rule that matches the sample.
    pub fn matching_rule(&self, Hsv { h, s, v }: Hsv) -> Rule {
        let t = &self.thresholds;

        if v < t.black_max_value {
            return Rule::Black;
        }

        if s < t.achromatic_max_saturation {
            return if v > t.white_min_value { Rule::White } else { Rule::Gray };
        }

        if (t.brown_hue_start..t.brown_hue_end).contains(&h) && s < t.brown_max_saturation && v < t.brown_max_value {
            return Rule::Brown;
        }

        match self.hue_arc(h) {
            Some(category) => Rule::HueArc(category),
            None => Rule::Fallback,
        }
    }

    fn hue_arc(&self, h: f32) -> Option<ColorCategory> {
        let arcs = &self.thresholds.hue_arcs;

        if !(0.0..360.0).contains(&h) {
            return None;
        }

        let category = if h < arcs.orange || h >= arcs.red {
            ColorCategory::Red
        } else if h < arcs.yellow {
            ColorCategory::Orange
        } else if h < arcs.green {
            ColorCategory::Yellow
        } else if h < arcs.blue {
            ColorCategory::Green
        } else if h < arcs.purple {
            ColorCategory::Blue
        } else {
            ColorCategory::Purple
        };

        Some(category)
    }
}

/// Classify a sample with the default thresholds.
pub fn categorize(hsv: Hsv) -> ColorCategory {
    Categorizer::default().categorize(hsv)
}
