//! Geography loading choreography.
//!
//! The fetch itself is an external concern; this module owns the
//! request lifecycle around it: one in-flight request at a time, a
//! result cache, country-specific cleaning on arrival, and a staleness
//! guard so a late result for a superseded navigation never lands.

use std::collections::BTreeMap;

use geodata::adcode::{CHINA_ADCODE, has_geometry_coverage};
use geodata::feature::FeatureCollection;
use geodata::sanitize::clean_china_map;

use crate::level::NavigationLevel;

/// Identifies one fetchable geography file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GeographyQuery {
    pub level: NavigationLevel,
    pub country: String,
    pub region: String,
}

impl GeographyQuery {
    pub fn new(
        level: NavigationLevel,
        country: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            level,
            country: country.into(),
            region: region.into(),
        }
    }
}

/// Ticket for one in-flight fetch; completions carrying a stale ticket
/// are ignored.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

/// What [`GeographyLoader::begin`] decided.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchPlan {
    /// Data is already available; no fetch needed.
    Ready(FeatureCollection),
    /// The caller must fetch and hand the result to `complete`.
    Fetch(RequestId),
}

#[derive(Debug, Default)]
pub struct GeographyLoader {
    cache: BTreeMap<GeographyQuery, FeatureCollection>,
    in_flight: Option<(RequestId, GeographyQuery)>,
    next_id: u64,
}

impl GeographyLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_flight(&self) -> Option<(RequestId, &GeographyQuery)> {
        self.in_flight.as_ref().map(|(id, q)| (*id, q))
    }

    pub fn cached(&self, query: &GeographyQuery) -> Option<&FeatureCollection> {
        self.cache.get(query)
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    /// Starts loading `query`, superseding any request still in flight
    /// (its eventual completion becomes stale and is ignored).
    ///
    /// Countries known to have no geometry files resolve immediately to
    /// an empty collection, as do cache hits.
    pub fn begin(&mut self, query: GeographyQuery) -> FetchPlan {
        if query.level == NavigationLevel::Country && !has_geometry_coverage(&query.region) {
            return FetchPlan::Ready(FeatureCollection::empty());
        }
        if let Some(hit) = self.cache.get(&query) {
            return FetchPlan::Ready(hit.clone());
        }
        let id = RequestId(self.next_id);
        self.next_id += 1;
        self.in_flight = Some((id, query));
        FetchPlan::Fetch(id)
    }

    /// Installs a fetch result.
    ///
    /// Returns the cleaned collection with its query when `id` is still
    /// current, `None` when the request was superseded or cancelled. An
    /// absent result means "no geometry available" and lands as an
    /// empty collection rather than an error.
    pub fn complete(
        &mut self,
        id: RequestId,
        result: Option<FeatureCollection>,
    ) -> Option<(GeographyQuery, FeatureCollection)> {
        let query = match self.in_flight.take() {
            Some((current, query)) if current == id => query,
            other => {
                self.in_flight = other;
                return None;
            }
        };
        let mut data = result.unwrap_or_else(FeatureCollection::empty);
        if query.level == NavigationLevel::Country && query.region == CHINA_ADCODE {
            clean_china_map(&mut data);
        }
        self.cache.insert(query.clone(), data.clone());
        Some((query, data))
    }

    pub fn cancel(&mut self) {
        self.in_flight = None;
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
