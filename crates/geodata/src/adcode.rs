//! Administrative-code lookup strategies.
//!
//! The detail files are duck-typed: China keys regions by an `adcode`
//! property, the world map keys countries by `hc-key`. Rather than
//! branching on property names at every call site, callers pick a
//! strategy once from the active country.

use crate::feature::Feature;

/// Administrative code the navigation state uses for China.
pub const CHINA_ADCODE: &str = "100000";
/// Administrative code the navigation state uses for the United States.
pub const US_ADCODE: &str = "us";

/// World-map country codes with no sub-national geometry files available.
pub const MISSING_COVERAGE_KEYS: [&str; 14] = [
    "um", "fm", "sw", "sh", "ki", "bu", "mv", "sp", "to", "tv", "mh", "va", "cnm", "jk",
];

pub fn has_geometry_coverage(code: &str) -> bool {
    !MISSING_COVERAGE_KEYS.contains(&code)
}

/// Capability interface for reading a feature's administrative code.
pub trait AdCodeKey {
    fn ad_code(&self, feature: &Feature) -> Option<String>;
}

/// China detail files: the `adcode` property (string or number).
#[derive(Debug, Default)]
pub struct ChinaAdCodeKey;

impl AdCodeKey for ChinaAdCodeKey {
    fn ad_code(&self, feature: &Feature) -> Option<String> {
        feature.properties.adcode_string()
    }
}

/// World and non-China files: the `hc-key` property.
#[derive(Debug, Default)]
pub struct HcKeyAdCode;

impl AdCodeKey for HcKeyAdCode {
    fn ad_code(&self, feature: &Feature) -> Option<String> {
        feature.properties.hc_key.clone()
    }
}

/// Selects the lookup strategy for the active country.
pub fn key_for_country(country: &str) -> &'static dyn AdCodeKey {
    if country == CHINA_ADCODE {
        &ChinaAdCodeKey
    } else {
        &HcKeyAdCode
    }
}
