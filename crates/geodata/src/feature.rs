use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::names::strip_region_suffix;

/// One polygon ring: a closed sequence of lng/lat positions.
pub type Ring = Vec<[f64; 2]>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: [f64; 2] },
    LineString { coordinates: Vec<[f64; 2]> },
    Polygon { coordinates: Vec<Ring> },
    MultiPolygon { coordinates: Vec<Vec<Ring>> },
}

impl Geometry {
    /// All positions in this geometry, flattened for view fitting.
    pub fn positions(&self) -> Vec<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::LineString { coordinates } => coordinates.clone(),
            Geometry::Polygon { coordinates } => {
                coordinates.iter().flatten().copied().collect()
            }
            Geometry::MultiPolygon { coordinates } => {
                coordinates.iter().flatten().flatten().copied().collect()
            }
        }
    }
}

/// Feature properties.
///
/// The source files disagree on types: China detail files carry `adcode`
/// as a string or a number, world files key countries by `hc-key`.
/// Everything else is preserved untyped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Properties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adcode: Option<Value>,
    #[serde(rename = "hc-key", default, skip_serializing_if = "Option::is_none")]
    pub hc_key: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Properties {
    pub fn adcode_string(&self) -> Option<String> {
        match &self.adcode {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

fn feature_kind() -> String {
    "Feature".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type", default = "feature_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: Properties,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            kind: feature_kind(),
            id: None,
            geometry: Some(geometry),
            properties: Properties::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.properties.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.properties.name.as_deref()
    }
}

/// Per-collection linear projection for country files whose coordinates
/// are not plain lng/lat (`hc-transform` in the source data).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HcTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<HcProjection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HcProjection {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl HcProjection {
    /// Maps a lng/lat position into the file's projected space.
    pub fn apply(&self, p: [f64; 2]) -> [f64; 2] {
        [
            p[0] * self.scale[0] + self.translate[0],
            p[1] * self.scale[1] + self.translate[1],
        ]
    }
}

fn collection_kind() -> String {
    "FeatureCollection".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type", default = "collection_kind")]
    pub kind: String,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(rename = "hc-transform", default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<HcTransform>,
}

impl Default for FeatureCollection {
    fn default() -> Self {
        Self::empty()
    }
}

impl FeatureCollection {
    pub fn empty() -> Self {
        Self {
            kind: collection_kind(),
            features: Vec::new(),
            transform: None,
        }
    }

    pub fn from_features(features: Vec<Feature>) -> Self {
        Self {
            features,
            ..Self::empty()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// The per-collection projection, when the file carries one.
    pub fn projection(&self) -> Option<&HcProjection> {
        self.transform.as_ref().and_then(|t| t.default.as_ref())
    }

    pub fn feature_by_id(&self, id: &str) -> Option<&Feature> {
        self.features.iter().find(|f| f.id.as_deref() == Some(id))
    }

    /// Looks a feature up by region name.
    ///
    /// Exact match first; falls back to comparing with the Chinese
    /// administrative suffixes stripped, since business data often omits
    /// them while the map files carry them.
    pub fn feature_by_name(&self, name: &str) -> Option<&Feature> {
        if let Some(found) = self.features.iter().find(|f| f.name() == Some(name)) {
            return Some(found);
        }
        let wanted = strip_region_suffix(name);
        self.features
            .iter()
            .find(|f| f.name().is_some_and(|n| strip_region_suffix(n) == wanted))
    }
}
