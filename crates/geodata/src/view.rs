//! View fitting: derive a center and zoom from geometry extents.

use foundation::bounds::Bounds2;

use crate::feature::FeatureCollection;

/// A fitted view over some geometry.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ViewFit {
    pub center: [f64; 2],
    pub zoom: f64,
}

const MIN_ZOOM: f64 = 0.5;
const MAX_ZOOM: f64 = 6.0;

/// Fits a view over a flat position set.
///
/// Zoom is estimated from the bounding box's share of the full world
/// extent in each axis, taking the tighter of the two, clamped into
/// `[0.5, 6]`. Returns `None` for an empty position set.
pub fn fit_positions<I>(positions: I) -> Option<ViewFit>
where
    I: IntoIterator<Item = [f64; 2]>,
{
    let bounds = Bounds2::from_points(positions)?;
    let lng_diff = bounds.width().abs().max(0.0001);
    let lat_diff = bounds.height().abs().max(0.0001);
    let zoom = (360.0 / lng_diff).log2().min((180.0 / lat_diff).log2());
    Some(ViewFit {
        center: bounds.center(),
        zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
    })
}

/// Fits a view over every feature in the collection.
pub fn fit_collection(collection: &FeatureCollection) -> Option<ViewFit> {
    fit_positions(
        collection
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .flat_map(|g| g.positions()),
    )
}
