//! Place categories and response languages.
//!
//! Both are closed enums: every table keyed on them is an exhaustive
//! `match`, and parsing an unknown label is an error rather than a silent
//! fallback to some default category.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryTag {
    Lodging,
    Restaurant,
    Cafe,
    Bar,
    Nightclub,
    Museum,
    Attraction,
    Beach,
    Park,
    Shopping,
    /// Anything the caller could not place in a narrower category.
    Other,
}

impl CategoryTag {
    pub const ALL: [CategoryTag; 11] = [
        CategoryTag::Lodging,
        CategoryTag::Restaurant,
        CategoryTag::Cafe,
        CategoryTag::Bar,
        CategoryTag::Nightclub,
        CategoryTag::Museum,
        CategoryTag::Attraction,
        CategoryTag::Beach,
        CategoryTag::Park,
        CategoryTag::Shopping,
        CategoryTag::Other,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryTag::Lodging => "lodging",
            CategoryTag::Restaurant => "restaurant",
            CategoryTag::Cafe => "cafe",
            CategoryTag::Bar => "bar",
            CategoryTag::Nightclub => "nightclub",
            CategoryTag::Museum => "museum",
            CategoryTag::Attraction => "attraction",
            CategoryTag::Beach => "beach",
            CategoryTag::Park => "park",
            CategoryTag::Shopping => "shopping",
            CategoryTag::Other => "other",
        }
    }

    /// Place-type labels used by Google-Places-style search backends.
    ///
    /// The first entry is the primary type sent upstream; the rest are
    /// accepted as compatible when filtering results.
    #[must_use]
    pub fn search_types(self) -> &'static [&'static str] {
        match self {
            CategoryTag::Lodging => &["lodging"],
            CategoryTag::Restaurant => &["restaurant", "meal_takeaway", "food"],
            CategoryTag::Cafe => &["cafe", "bakery"],
            CategoryTag::Bar => &["bar", "night_club"],
            CategoryTag::Nightclub => &["night_club", "bar"],
            CategoryTag::Museum => &["museum", "art_gallery"],
            CategoryTag::Attraction => &[
                "tourist_attraction",
                "amusement_park",
                "zoo",
                "aquarium",
                "point_of_interest",
            ],
            CategoryTag::Beach => &["natural_feature", "tourist_attraction"],
            CategoryTag::Park => &["park"],
            CategoryTag::Shopping => &["shopping_mall", "store", "department_store"],
            CategoryTag::Other => &["point_of_interest", "establishment"],
        }
    }
}

impl std::fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown place category \"{0}\"")]
pub struct ParseCategoryError(pub String);

impl FromStr for CategoryTag {
    type Err = ParseCategoryError;

    /// Accepts canonical names plus the common English and Spanish aliases
    /// users actually type (`hoteles`, `restaurante`, `discoteca`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let tag = match normalized.as_str() {
            "lodging" | "hotel" | "hotels" | "hoteles" | "hostal" | "hostel" | "hospedaje"
            | "alojamiento" | "accommodation" => CategoryTag::Lodging,
            "restaurant" | "restaurants" | "restaurante" | "restaurantes" | "comida" | "food"
            | "dining" => CategoryTag::Restaurant,
            "cafe" | "café" | "cafes" | "cafés" | "cafeteria" | "cafetería" | "coffee" => {
                CategoryTag::Cafe
            }
            "bar" | "bars" | "bares" | "pub" | "pubs" | "cantina" => CategoryTag::Bar,
            "nightclub" | "night_club" | "club" | "discoteca" | "disco" | "nightlife"
            | "vida nocturna" => CategoryTag::Nightclub,
            "museum" | "museums" | "museo" | "museos" | "gallery" | "galería" | "galeria"
            | "culture" | "cultura" => CategoryTag::Museum,
            "attraction" | "attractions" | "atraccion" | "atracción" | "atracciones"
            | "tourist_attraction" | "sightseeing" | "landmark" | "sitios" | "lugares" => {
                CategoryTag::Attraction
            }
            "beach" | "beaches" | "playa" | "playas" => CategoryTag::Beach,
            "park" | "parks" | "parque" | "parques" => CategoryTag::Park,
            "shopping" | "shop" | "store" | "mall" | "tienda" | "tiendas" | "centro comercial" => {
                CategoryTag::Shopping
            }
            "other" | "general" => CategoryTag::Other,
            _ => return Err(ParseCategoryError(s.to_string())),
        };
        Ok(tag)
    }
}

/// Language used for provider queries and distance labels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language \"{0}\"; expected es or en")]
pub struct ParseLanguageError(pub String);

impl FromStr for Language {
    type Err = ParseLanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "es" | "spanish" | "español" | "espanol" => Ok(Language::Es),
            "en" | "english" | "inglés" | "ingles" => Ok(Language::En),
            _ => Err(ParseLanguageError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_canonical_names() {
        for tag in CategoryTag::ALL {
            assert_eq!(tag.as_str().parse::<CategoryTag>().unwrap(), tag);
        }
    }

    #[test]
    fn parses_spanish_aliases() {
        assert_eq!("Hoteles".parse::<CategoryTag>().unwrap(), CategoryTag::Lodging);
        assert_eq!(" restaurante ".parse::<CategoryTag>().unwrap(), CategoryTag::Restaurant);
        assert_eq!("discoteca".parse::<CategoryTag>().unwrap(), CategoryTag::Nightclub);
        assert_eq!("playas".parse::<CategoryTag>().unwrap(), CategoryTag::Beach);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let err = "restaurnat".parse::<CategoryTag>().unwrap_err();
        assert_eq!(err, ParseCategoryError("restaurnat".to_string()));
    }

    #[test]
    fn every_category_has_a_primary_search_type() {
        for tag in CategoryTag::ALL {
            assert!(!tag.search_types().is_empty(), "{tag} has no search types");
        }
    }

    #[test]
    fn language_parsing() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Es);
        assert_eq!("english".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }
}
