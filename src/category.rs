use std::fmt;

/// The semantic color buckets a pixel can be classified into.
///
/// The declaration order is significant: it is the order used to break ties when picking the dominant category, with
/// the earliest category winning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ColorCategory {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Purple,
    Brown,
    Black,
    White,
    Gray,
    Other,
}

impl ColorCategory {
    pub const COUNT: usize = 11;

    /// Every category in tie-break order.
    pub const ALL: [ColorCategory; ColorCategory::COUNT] = [
        ColorCategory::Red,
        ColorCategory::Orange,
        ColorCategory::Yellow,
        ColorCategory::Green,
        ColorCategory::Blue,
        ColorCategory::Purple,
        ColorCategory::Brown,
        ColorCategory::Black,
        ColorCategory::White,
        ColorCategory::Gray,
        ColorCategory::Other,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ColorCategory::Red => "red",
            ColorCategory::Orange => "orange",
            ColorCategory::Yellow => "yellow",
            ColorCategory::Green => "green",
            ColorCategory::Blue => "blue",
            ColorCategory::Purple => "purple",
            ColorCategory::Brown => "brown",
            ColorCategory::Black => "black",
            ColorCategory::White => "white",
            ColorCategory::Gray => "gray",
            ColorCategory::Other => "other",
        }
    }

    /// The key of the palette entry users can select for this category. Gray and Other are never offered to users and
    /// have no key.
    pub fn palette_key(self) -> Option<&'static str> {
        match self {
            ColorCategory::Gray | ColorCategory::Other => None,
            category => Some(category.name()),
        }
    }
}

impl fmt::Display for ColorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
