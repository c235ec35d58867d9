//! Upstream venue sources.
//!
//! The engine talks to exactly two kinds of provider: a curated partner
//! directory and a generic place search. Both are traits so tests and
//! alternative backends can be injected.

pub mod directory;
pub mod places_api;

use async_trait::async_trait;
use placefinder_core::{CategoryTag, Language, PartnerTier};

use crate::error::ProviderError;
use crate::geo::Coordinate;
use crate::types::SortMode;

pub use directory::StaticDirectory;
pub use places_api::PlacesApiClient;

/// A partner venue as the directory reports it.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryRecord {
    pub id: String,
    pub name: String,
    pub location: Option<Coordinate>,
    pub rating: Option<f64>,
    pub address: String,
    pub tier: PartnerTier,
    pub phone: Option<String>,
    pub website: Option<String>,
}

/// A venue from the generic search provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRecord {
    pub id: String,
    pub name: String,
    pub location: Option<Coordinate>,
    pub rating: Option<f64>,
    pub address: String,
    pub types: Vec<String>,
    pub photos: Vec<String>,
}

#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Partner venues of `category` within `radius_meters` of `origin`.
    async fn query(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        radius_meters: u32,
    ) -> Result<Vec<DirectoryRecord>, ProviderError>;
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Generic venues near `origin`. `sort_hint` tells the upstream what the
    /// caller will rank by; results are re-ranked locally either way.
    async fn query(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        radius_meters: u32,
        sort_hint: SortMode,
        language: Language,
    ) -> Result<Vec<SearchRecord>, ProviderError>;
}
