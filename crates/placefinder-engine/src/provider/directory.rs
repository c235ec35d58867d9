use async_trait::async_trait;
use placefinder_core::{CategoryTag, PartnersFile};

use super::{DirectoryProvider, DirectoryRecord};
use crate::error::{LocationError, ProviderError};
use crate::geo::{distance_km, Coordinate};

#[derive(Debug, Clone)]
struct Entry {
    category: CategoryTag,
    record: DirectoryRecord,
}

/// In-memory partner directory loaded once at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<Entry>,
}

impl StaticDirectory {
    /// Builds the directory from a validated partners file, keeping file
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::InvalidCoordinate`] if a partner's
    /// coordinates do not form a valid point.
    pub fn from_partners(file: &PartnersFile) -> Result<Self, LocationError> {
        let entries = file
            .partners
            .iter()
            .map(|partner| -> Result<Entry, LocationError> {
                Ok(Entry {
                    category: partner.category,
                    record: DirectoryRecord {
                        id: partner.id.clone(),
                        name: partner.name.clone(),
                        location: Some(Coordinate::new(partner.lat, partner.lng)?),
                        rating: partner.rating,
                        address: partner.address.clone(),
                        tier: partner.tier,
                        phone: partner.phone.clone(),
                        website: partner.website.clone(),
                    },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl DirectoryProvider for StaticDirectory {
    async fn query(
        &self,
        origin: Coordinate,
        category: CategoryTag,
        radius_meters: u32,
    ) -> Result<Vec<DirectoryRecord>, ProviderError> {
        let radius_km = f64::from(radius_meters) / 1000.0;
        let records = self
            .entries
            .iter()
            .filter(|entry| entry.category == category)
            .filter(|entry| {
                entry
                    .record
                    .location
                    .is_some_and(|at| distance_km(origin, at) <= radius_km)
            })
            .map(|entry| entry.record.clone())
            .collect::<Vec<_>>();

        tracing::debug!(
            category = %category,
            radius_meters,
            matched = records.len(),
            "partner directory query"
        );
        Ok(records)
    }
}
