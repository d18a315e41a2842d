use crate::error::{AnalysisError, Result};

const BLACK_MAX_VALUE: f32 = 0.15;
const WHITE_MIN_VALUE: f32 = 0.90;
const ACHROMATIC_MAX_SATURATION: f32 = 0.15;

const BROWN_HUE_START: f32 = 10.0;
const BROWN_HUE_END: f32 = 45.0;
const BROWN_MAX_SATURATION: f32 = 0.80;
const BROWN_MAX_VALUE: f32 = 0.65;

const ORANGE_HUE_START: f32 = 15.0;
const YELLOW_HUE_START: f32 = 45.0;
const GREEN_HUE_START: f32 = 70.0;
const BLUE_HUE_START: f32 = 165.0;
const PURPLE_HUE_START: f32 = 255.0;
const RED_HUE_START: f32 = 330.0;

/// The calibration data for [`crate::Categorizer`].
///
/// Every cutoff the categorizer uses lives here, so the classification can be recalibrated without touching its control
/// flow. Override single values with struct update syntax:
///
/// ```
/// let thresholds = dominance::Thresholds {
///     black_max_value: 0.2,
///     ..Default::default()
/// };
///
/// assert!(thresholds.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Thresholds {
    /// Samples with a value below this are black regardless of hue or saturation.
    pub black_max_value: f32,
    /// Low-saturation samples with a value above this are white.
    pub white_min_value: f32,
    /// Samples with a saturation below this are achromatic (white or gray).
    pub achromatic_max_saturation: f32,
    /// Start of the warm hue arc that can read as brown, inclusive.
    pub brown_hue_start: f32,
    /// End of the brown hue arc, exclusive.
    pub brown_hue_end: f32,
    /// Brown samples have a saturation below this.
    pub brown_max_saturation: f32,
    /// Brown samples have a value below this.
    pub brown_max_value: f32,
    pub hue_arcs: HueArcs,
}

/// The start of each chromatic hue arc in degrees. Each arc runs up to the start of the next one; the red arc wraps
/// around from `red` through 360° back to `orange`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HueArcs {
    pub orange: f32,
    pub yellow: f32,
    pub green: f32,
    pub blue: f32,
    pub purple: f32,
    pub red: f32,
}

impl Thresholds {
    /// Check every value is within its domain and the hue arcs partition the whole hue circle.
    pub fn validate(&self) -> Result<()> {
        let unit_values = [
            ("black_max_value", self.black_max_value),
            ("white_min_value", self.white_min_value),
            ("achromatic_max_saturation", self.achromatic_max_saturation),
            ("brown_max_saturation", self.brown_max_saturation),
            ("brown_max_value", self.brown_max_value),
        ];

        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::invalid_thresholds(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.black_max_value > self.white_min_value {
            return Err(AnalysisError::invalid_thresholds(format!(
                "black_max_value ({}) is above white_min_value ({})",
                self.black_max_value, self.white_min_value
            )));
        }

        if !(0.0..360.0).contains(&self.brown_hue_start)
            || !(0.0..=360.0).contains(&self.brown_hue_end)
            || self.brown_hue_start >= self.brown_hue_end
        {
            return Err(AnalysisError::invalid_thresholds(format!(
                "brown hue arc [{}, {}) is not a valid arc",
                self.brown_hue_start, self.brown_hue_end
            )));
        }

        self.hue_arcs.validate()
    }

    #[cfg(feature = "serde")]
    pub fn from_json_str(json: &str) -> Result<Self> {
        let thresholds: Thresholds = serde_json::from_str(json)?;
        thresholds.validate()?;

        Ok(thresholds)
    }

    #[cfg(feature = "serde")]
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<std::path::Path>,
    {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            black_max_value: BLACK_MAX_VALUE,
            white_min_value: WHITE_MIN_VALUE,
            achromatic_max_saturation: ACHROMATIC_MAX_SATURATION,
            brown_hue_start: BROWN_HUE_START,
            brown_hue_end: BROWN_HUE_END,
            brown_max_saturation: BROWN_MAX_SATURATION,
            brown_max_value: BROWN_MAX_VALUE,
            hue_arcs: HueArcs::default(),
        }
    }
}

impl HueArcs {
    pub fn validate(&self) -> Result<()> {
        let starts = self.starts();

        if starts[0] <= 0.0 || starts[starts.len() - 1] >= 360.0 {
            return Err(AnalysisError::invalid_thresholds(format!(
                "hue arcs must start within (0, 360), got orange {} and red {}",
                self.orange, self.red
            )));
        }

        // NaN fails every comparison and ends up here too
        if !starts.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(AnalysisError::invalid_thresholds(format!(
                "hue arcs must be strictly ascending from orange to red, got {starts:?}"
            )));
        }

        Ok(())
    }

    // orange, yellow, green, blue, purple, red
    fn starts(&self) -> [f32; 6] {
        [self.orange, self.yellow, self.green, self.blue, self.purple, self.red]
    }
}

impl Default for HueArcs {
    fn default() -> Self {
        Self {
            orange: ORANGE_HUE_START,
            yellow: YELLOW_HUE_START,
            green: GREEN_HUE_START,
            blue: BLUE_HUE_START,
            purple: PURPLE_HUE_START,
            red: RED_HUE_START,
        }
    }
}
