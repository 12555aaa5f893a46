//! Category defaults and keyword inference

use serde::{Deserialize, Serialize};

/// Used when no category can be determined
pub const DEFAULT_IMAGE: &str =
    "https://commons.wikimedia.org/wiki/Special:FilePath/Indonesia_landscape_rice_field.jpg";

/// Destination category with its own default image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Beach,
    Mountain,
    Temple,
    Lake,
    City,
}

/// Name keywords per category, scanned in this order.
const KEYWORDS: &[(Category, &[&str])] = &[
    (Category::Beach, &["pantai", "beach", "pulau", "island", "gili", "nusa"]),
    (Category::Mountain, &["gunung", "mount", "bukit", "kawah", "volcano", "crater"]),
    (Category::Temple, &["candi", "pura", "temple", "masjid", "klenteng", "vihara"]),
    (Category::Lake, &["danau", "lake", "telaga", "ranu", "situ"]),
    (Category::City, &["kota", "city", "alun", "malioboro", "jalan"]),
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Beach => "beach",
            Category::Mountain => "mountain",
            Category::Temple => "temple",
            Category::Lake => "lake",
            Category::City => "city",
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Beach,
            Category::Mountain,
            Category::Temple,
            Category::Lake,
            Category::City,
        ]
    }

    /// Default image for this category
    pub fn default_image(&self) -> &'static str {
        match self {
            Category::Beach => "https://commons.wikimedia.org/wiki/Special:FilePath/Pantai_Kuta_Bali.jpg",
            Category::Mountain => "https://commons.wikimedia.org/wiki/Special:FilePath/Gunung_Semeru_dari_Ranu_Kumbolo.jpg",
            Category::Temple => "https://commons.wikimedia.org/wiki/Special:FilePath/Candi_Prambanan_di_senja_hari.jpg",
            Category::Lake => "https://commons.wikimedia.org/wiki/Special:FilePath/Danau_Beratan_Bedugul.jpg",
            Category::City => "https://commons.wikimedia.org/wiki/Special:FilePath/Bundaran_HI_Jakarta.jpg",
        }
    }

    /// Parse an explicit category hint (Indonesian or English label)
    pub fn from_hint(hint: &str) -> Option<Self> {
        match hint.trim().to_lowercase().as_str() {
            "pantai" | "beach" | "pulau" | "island" | "bahari" => Some(Category::Beach),
            "gunung" | "mountain" | "alam" | "nature" => Some(Category::Mountain),
            "candi" | "pura" | "temple" | "budaya" | "culture" | "religi" => Some(Category::Temple),
            "danau" | "lake" => Some(Category::Lake),
            "kota" | "city" | "urban" => Some(Category::City),
            _ => None,
        }
    }

    /// Infer a category from keywords in the place name
    pub fn infer(place_name: &str) -> Option<Self> {
        let name = place_name.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| name.contains(w)))
            .map(|(category, _)| *category)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category default for a place.
///
/// An explicit hint is looked up directly and never falls through to
/// inference; an unrecognized hint yields [`DEFAULT_IMAGE`].
pub fn category_fallback(place_name: &str, hint: Option<&str>) -> &'static str {
    let category = match hint {
        Some(hint) => Category::from_hint(hint),
        None => Category::infer(place_name),
    };

    category.map(|c| c.default_image()).unwrap_or(DEFAULT_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hint_labels() {
        assert_eq!(Category::from_hint("Pantai"), Some(Category::Beach));
        assert_eq!(Category::from_hint(" GUNUNG "), Some(Category::Mountain));
        assert_eq!(Category::from_hint("Budaya"), Some(Category::Temple));
        assert_eq!(Category::from_hint("kuliner"), None);
    }

    #[test]
    fn test_infer_from_name() {
        assert_eq!(Category::infer("Pantai Parangtritis"), Some(Category::Beach));
        assert_eq!(Category::infer("Gunung Rinjani"), Some(Category::Mountain));
        assert_eq!(Category::infer("Candi Sewu"), Some(Category::Temple));
        assert_eq!(Category::infer("Danau Sentani"), Some(Category::Lake));
        assert_eq!(Category::infer("Kota Lama Semarang"), Some(Category::City));
        assert_eq!(Category::infer("Raja Ampat"), None);
    }

    #[test]
    fn test_infer_scan_order() {
        // beach keywords are scanned before lake keywords
        assert_eq!(Category::infer("Pulau di Danau Toba"), Some(Category::Beach));
    }

    #[test]
    fn test_hint_overrides_inference() {
        assert_eq!(
            category_fallback("Pantai Kuta", Some("Gunung")),
            Category::Mountain.default_image()
        );
        assert_eq!(
            category_fallback("Pantai Kuta", None),
            Category::Beach.default_image()
        );
    }

    #[test]
    fn test_unrecognized_hint_uses_default() {
        // no inference once a hint is given
        assert_eq!(category_fallback("Pantai Kuta", Some("kuliner")), DEFAULT_IMAGE);
        assert_eq!(category_fallback("Nonexistent Obscure Village", None), DEFAULT_IMAGE);
    }

    #[test]
    fn test_defaults_are_distinct() {
        let mut images: Vec<_> = Category::all().iter().map(|c| c.default_image()).collect();
        images.push(DEFAULT_IMAGE);
        let count = images.len();
        images.sort();
        images.dedup();
        assert_eq!(images.len(), count);
    }
}
