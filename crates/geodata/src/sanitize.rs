//! Country-specific cleaning of fetched boundary files.

use crate::feature::{FeatureCollection, Geometry};

/// Province whose `MultiPolygon` is trimmed to its primary landmass.
const HAINAN: &str = "海南省";

/// Cleans the China country map in place.
///
/// Two rules, applied to the raw file before it is installed:
/// - features without a name are dropped (disputed-territory artifacts
///   carry none);
/// - the Hainan province `MultiPolygon` keeps only its first polygon,
///   the main island, discarding the surrounding islets.
pub fn clean_china_map(collection: &mut FeatureCollection) {
    collection
        .features
        .retain(|f| f.name().is_some_and(|n| !n.is_empty()));
    for feature in &mut collection.features {
        if feature.name() != Some(HAINAN) {
            continue;
        }
        if let Some(Geometry::MultiPolygon { coordinates }) = &mut feature.geometry {
            coordinates.truncate(1);
        }
    }
}
