//! The drill-down state machine: decides whether a descent is legal,
//! resolves the next administrative code, and decides whether series
//! coordinates need reprojection for the loaded file.

use geodata::adcode::{CHINA_ADCODE, US_ADCODE, key_for_country};
use geodata::feature::FeatureCollection;

use crate::level::NavigationLevel;

/// Country-level region with no subdivision data worth descending into.
pub const EXCLUDED_COUNTRY_REGION: &str = "南海诸岛";

/// City-level codes administered directly as municipalities; they have
/// no county subdivision.
pub const MUNICIPALITY_CODES: [&str; 4] = ["110000", "120000", "310000", "500000"];

/// Countries with sub-national geography files available.
pub const SUBNATIONAL_COUNTRIES: [&str; 2] = [CHINA_ADCODE, US_ADCODE];

/// World-map display names with fixed administrative codes.
const WORLD_NAME_CHINA: &str = "中国";
const WORLD_NAME_US: &str = "美国";

pub fn is_municipality(adcode: &str) -> bool {
    MUNICIPALITY_CODES.contains(&adcode)
}

/// A legal descent, ready to apply to the navigation context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descent {
    pub level: NavigationLevel,
    pub adcode: String,
    pub country: String,
}

/// The level a double-click on `region_name` would descend to, or
/// `None` when descent is not legal from here.
///
/// `current_adcode` is the code of the region currently displayed: at
/// Country level it gates the two sub-nationally supported countries,
/// at City level it blocks municipalities that have no counties.
pub fn descend_target(
    level: NavigationLevel,
    region_name: &str,
    current_adcode: &str,
) -> Option<NavigationLevel> {
    match level {
        NavigationLevel::World => Some(NavigationLevel::Country),
        NavigationLevel::Country => {
            if region_name == EXCLUDED_COUNTRY_REGION {
                return None;
            }
            if !SUBNATIONAL_COUNTRIES.contains(&current_adcode) {
                return None;
            }
            Some(NavigationLevel::Province)
        }
        NavigationLevel::Province => Some(NavigationLevel::City),
        NavigationLevel::City => {
            if is_municipality(current_adcode) {
                None
            } else {
                Some(NavigationLevel::County)
            }
        }
        NavigationLevel::County => None,
    }
}

/// Resolves the administrative code of the clicked region.
///
/// At World level the two names with guaranteed coverage map to fixed
/// codes; everything else reads the clicked feature's code property via
/// the country-selected key strategy. A missing feature or property
/// resolves to an empty string, which is a recoverable no-op, not an
/// error.
pub fn resolve_next_adcode(
    level: NavigationLevel,
    country: &str,
    region_name: &str,
    detail: &FeatureCollection,
) -> String {
    if level == NavigationLevel::World {
        match region_name {
            WORLD_NAME_CHINA => return CHINA_ADCODE.to_string(),
            WORLD_NAME_US => return US_ADCODE.to_string(),
            _ => {}
        }
    }
    detail
        .feature_by_name(region_name)
        .and_then(|feature| key_for_country(country).ad_code(feature))
        .unwrap_or_default()
}

/// Combines eligibility and code resolution into one decision.
///
/// An unresolved (empty) code blocks the transition entirely: the map
/// stays where it is rather than navigating under an empty code.
pub fn plan_descent(
    level: NavigationLevel,
    country: &str,
    current_adcode: &str,
    region_name: &str,
    detail: &FeatureCollection,
) -> Option<Descent> {
    let next = descend_target(level, region_name, current_adcode)?;
    let adcode = resolve_next_adcode(level, country, region_name, detail);
    if adcode.is_empty() {
        return None;
    }
    let country = if level == NavigationLevel::World {
        adcode.clone()
    } else {
        country.to_string()
    };
    Some(Descent {
        level: next,
        adcode,
        country,
    })
}

/// Whether series coordinates must be mapped through the loaded file's
/// projection before rendering.
///
/// China files and the US country file are plain lng/lat; every other
/// non-China file carries projected coordinates with an `hc-transform`.
pub fn needs_reprojection(country: &str, level: NavigationLevel, adcode: &str) -> bool {
    if country == CHINA_ADCODE {
        return false;
    }
    !(level == NavigationLevel::Country && adcode == US_ADCODE)
}
