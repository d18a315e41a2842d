use crate::{
    category::ColorCategory,
    categorizer::Categorizer,
    hsv::{Hsv, PixelSample},
};

/// The outcome of picking an image's dominant color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Dominant {
    Color(ColorCategory),
    /// No pixel was counted, because every one of them was filtered out.
    NoData,
}

impl Dominant {
    pub fn category(self) -> Option<ColorCategory> {
        match self {
            Dominant::Color(category) => Some(category),
            Dominant::NoData => None,
        }
    }
}

/// Running per-category pixel counts of a scan. Tallies of separate chunks of an image are merged into one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    counts: [u64; ColorCategory::COUNT],
    excluded: u64,
    // channel sums of the counted pixels
    red_sum: u64,
    green_sum: u64,
    blue_sum: u64,
}

impl Tally {
    pub(crate) fn count(&mut self, category: ColorCategory, (r, g, b): PixelSample) {
        self.counts[category.index()] += 1;
        self.red_sum += r as u64;
        self.green_sum += g as u64;
        self.blue_sum += b as u64;
    }

    pub(crate) fn exclude(&mut self) {
        self.excluded += 1;
    }

    pub(crate) fn merge(mut self, other: Tally) -> Tally {
        for (count, other) in self.counts.iter_mut().zip(other.counts) {
            *count += other;
        }

        self.excluded += other.excluded;
        self.red_sum += other.red_sum;
        self.green_sum += other.green_sum;
        self.blue_sum += other.blue_sum;
        self
    }

    pub(crate) fn into_report(self, categorizer: &Categorizer) -> ColorRatioReport {
        let counted: u64 = self.counts.iter().sum();
        let dominant = dominant_of(&self.counts);

        let average_color = (counted > 0).then(|| {
            (
                (self.red_sum as f64 / counted as f64).round() as u8,
                (self.green_sum as f64 / counted as f64).round() as u8,
                (self.blue_sum as f64 / counted as f64).round() as u8,
            )
        });

        let average_category = average_color.map(|rgb| categorizer.categorize(Hsv::from_rgb(rgb)));

        ColorRatioReport {
            counts: self.counts,
            counted,
            excluded: self.excluded,
            dominant,
            average_color,
            average_category,
        }
    }
}

fn dominant_of(counts: &[u64; ColorCategory::COUNT]) -> Dominant {
    // strict comparison keeps the earliest category on ties
    ColorCategory::ALL
        .into_iter()
        .fold(None, |best: Option<ColorCategory>, category| match best {
            Some(best) if counts[best.index()] >= counts[category.index()] => Some(best),
            _ => Some(category),
        })
        .filter(|&best| counts[best.index()] > 0)
        .map_or(Dominant::NoData, Dominant::Color)
}

/// The per-category pixel ratios of an analysed image, along with its dominant color.
///
/// A deserialized report has to be consistent with its own counts, otherwise deserialization fails.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "UncheckedReport"))]
pub struct ColorRatioReport {
    counts: [u64; ColorCategory::COUNT],
    counted: u64,
    excluded: u64,
    dominant: Dominant,
    average_color: Option<PixelSample>,
    average_category: Option<ColorCategory>,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct UncheckedReport {
    counts: [u64; ColorCategory::COUNT],
    counted: u64,
    excluded: u64,
    dominant: Dominant,
    average_color: Option<PixelSample>,
    average_category: Option<ColorCategory>,
}

#[cfg(feature = "serde")]
impl TryFrom<UncheckedReport> for ColorRatioReport {
    type Error = String;

    fn try_from(report: UncheckedReport) -> std::result::Result<Self, Self::Error> {
        let counted = report
            .counts
            .iter()
            .try_fold(0u64, |total, &count| total.checked_add(count))
            .ok_or("category counts overflow")?;

        if counted != report.counted {
            return Err(format!("counted is {}, the category counts add up to {counted}", report.counted));
        }

        let dominant = dominant_of(&report.counts);
        if dominant != report.dominant {
            return Err(format!("dominant is {:?}, the category counts say {dominant:?}", report.dominant));
        }

        if report.average_color.is_some() != (counted > 0) || report.average_category.is_some() != (counted > 0) {
            return Err("the average color has to be present exactly when pixels were counted".to_string());
        }

        Ok(ColorRatioReport {
            counts: report.counts,
            counted,
            excluded: report.excluded,
            dominant,
            average_color: report.average_color,
            average_category: report.average_category,
        })
    }
}

impl ColorRatioReport {
    pub fn dominant(&self) -> Dominant {
        self.dominant
    }

    pub fn dominant_category(&self) -> Option<ColorCategory> {
        self.dominant.category()
    }

    /// The number of pixels classified into a category.
    pub fn count(&self, category: ColorCategory) -> u64 {
        self.counts[category.index()]
    }

    /// The share of counted pixels classified into a category, as a percentage. Zero when no pixel was counted.
    pub fn ratio(&self, category: ColorCategory) -> f64 {
        if self.counted == 0 {
            0.0
        } else {
            self.count(category) as f64 / self.counted as f64 * 100.0
        }
    }

    /// Every category with its ratio, in tie-break order.
    pub fn ratios(&self) -> impl Iterator<Item = (ColorCategory, f64)> + '_ {
        ColorCategory::ALL
            .into_iter()
            .map(move |category| (category, self.ratio(category)))
    }

    pub fn dominant_ratio(&self) -> f64 {
        self.dominant_category()
            .map_or(0.0, |category| self.ratio(category))
    }

    /// The number of pixels that were classified.
    pub fn counted(&self) -> u64 {
        self.counted
    }

    /// The number of pixels left out by filters.
    pub fn excluded(&self) -> u64 {
        self.excluded
    }

    pub fn is_empty(&self) -> bool {
        self.counted == 0
    }

    /// The mean color of every counted pixel.
    pub fn average_color(&self) -> Option<PixelSample> {
        self.average_color
    }

    /// The category of [`ColorRatioReport::average_color`]. This is a cheaper, coarser alternative to the dominant
    /// color that can disagree with it on images with several strong colors.
    pub fn average_category(&self) -> Option<ColorCategory> {
        self.average_category
    }
}
