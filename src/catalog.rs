use crate::{
    category::ColorCategory,
    error::{AnalysisError, Result},
    hsv::PixelSample,
};
use palette::Srgb;

/// One of the colors users can pick for their photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PaletteEntry {
    id: u8,
    key: &'static str,
    display_name: &'static str,
    emoji: &'static str,
    hex: &'static str,
}

static CATALOG: [PaletteEntry; 9] = [
    PaletteEntry::new(1, "red", "Red", "❤️", "#FF4B5C"),
    PaletteEntry::new(2, "orange", "Orange", "🧡", "#FF8C42"),
    PaletteEntry::new(3, "yellow", "Yellow", "💛", "#FFD93D"),
    PaletteEntry::new(4, "green", "Green", "💚", "#4CAF50"),
    PaletteEntry::new(5, "blue", "Blue", "💙", "#4A90E2"),
    PaletteEntry::new(6, "purple", "Purple", "💜", "#A66DD4"),
    PaletteEntry::new(7, "brown", "Brown", "🤎", "#8B5E3C"),
    PaletteEntry::new(8, "black", "Black", "🖤", "#222"),
    PaletteEntry::new(9, "white", "White", "🤍", "#FFFFFF"),
];

impl PaletteEntry {
    const fn new(
        id: u8,
        key: &'static str,
        display_name: &'static str,
        emoji: &'static str,
        hex: &'static str,
    ) -> Self {
        Self {
            id,
            key,
            display_name,
            emoji,
            hex,
        }
    }

    /// Every palette entry, ordered by id.
    pub fn all() -> &'static [PaletteEntry] {
        &CATALOG
    }

    pub fn by_id(id: u8) -> Option<PaletteEntry> {
        CATALOG.iter().find(|entry| entry.id == id).copied()
    }

    /// Look up an entry by its key, ignoring ASCII case.
    pub fn by_key(key: &str) -> Option<PaletteEntry> {
        CATALOG
            .iter()
            .find(|entry| entry.key.eq_ignore_ascii_case(key.trim()))
            .copied()
    }

    pub fn for_category(category: ColorCategory) -> Option<PaletteEntry> {
        category.palette_key().and_then(PaletteEntry::by_key)
    }

    /// Look up an entry by either its numeric id or its key.
    pub fn lookup(id_or_key: &str) -> Result<PaletteEntry> {
        let found = match id_or_key.trim().parse::<u8>() {
            Ok(id) => PaletteEntry::by_id(id),
            Err(_) => PaletteEntry::by_key(id_or_key),
        };

        found.ok_or_else(|| AnalysisError::UnknownPaletteEntry(id_or_key.to_string()))
    }

    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn display_name(&self) -> &'static str {
        self.display_name
    }

    pub fn emoji(&self) -> &'static str {
        self.emoji
    }

    pub fn hex(&self) -> &'static str {
        self.hex
    }

    /// The category this entry stands for.
    pub fn category(&self) -> ColorCategory {
        ColorCategory::ALL
            .into_iter()
            .find(|category| category.palette_key() == Some(self.key))
            .unwrap_or(ColorCategory::Other)
    }

    pub fn rgb(&self) -> Result<PixelSample> {
        let rgb: Srgb<u8> = self
            .hex
            .parse()
            .map_err(|e| AnalysisError::invalid_input(format!("palette entry {} has a bad hex color: {e}", self.key)))?;

        Ok(rgb.into_components())
    }
}
