//! Layer slots and the immutable records that occupy them.

use std::collections::BTreeMap;

use serde_json::Value;

/// Fixed named positions in the render stack.
///
/// The enum order is the canonical z-order, bottom first.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerSlot {
    Boundary,
    Points,
    Lines,
    LineTrails,
}

impl LayerSlot {
    /// Every slot, in canonical z-order.
    pub const CANONICAL: [LayerSlot; 4] = [
        LayerSlot::Boundary,
        LayerSlot::Points,
        LayerSlot::Lines,
        LayerSlot::LineTrails,
    ];

    /// Stable id the rendering backend diffs layers by.
    pub fn id(self) -> &'static str {
        match self {
            LayerSlot::Boundary => "geojson-layer",
            LayerSlot::Points => "point-layer",
            LayerSlot::Lines => "line-layer",
            LayerSlot::LineTrails => "line-trail-layer",
        }
    }
}

/// What kind of drawable a record describes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LayerKind {
    GeoJson,
    Icon,
    Path,
    Scatter,
    Arc,
}

/// An immutable value object describing one layer.
///
/// Records are never mutated in place; every update constructs a new
/// record, so previous-frame and current-frame state can never alias.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerRecord {
    id: String,
    kind: LayerKind,
    props: BTreeMap<String, Value>,
}

impl LayerRecord {
    pub fn new(id: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            props: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn props(&self) -> &BTreeMap<String, Value> {
        &self.props
    }

    pub fn prop(&self, key: &str) -> Option<&Value> {
        self.props.get(key)
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: Value) -> Self {
        self.props.insert(key.into(), value);
        self
    }

    pub fn with_props(mut self, props: BTreeMap<String, Value>) -> Self {
        self.props.extend(props);
        self
    }

    /// A new record identical to this one but carrying `id`.
    pub fn rebuilt_with_id(&self, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: self.kind,
            props: self.props.clone(),
        }
    }

    /// A new record with `patch` merged over this record's props,
    /// patch values winning.
    pub fn merged(&self, patch: BTreeMap<String, Value>) -> Self {
        let mut props = self.props.clone();
        props.extend(patch);
        Self {
            id: self.id.clone(),
            kind: self.kind,
            props,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::{LayerKind, LayerRecord, LayerSlot};

    #[test]
    fn canonical_order_is_the_enum_order() {
        let mut sorted = LayerSlot::CANONICAL;
        sorted.sort();
        assert_eq!(sorted, LayerSlot::CANONICAL);
        assert_eq!(LayerSlot::Boundary.id(), "geojson-layer");
        assert_eq!(LayerSlot::LineTrails.id(), "line-trail-layer");
    }

    #[test]
    fn merge_constructs_a_new_record() {
        let record = LayerRecord::new("point-layer", LayerKind::Icon)
            .with_prop("size", json!(24))
            .with_prop("pickable", json!(true));
        let patch = BTreeMap::from([("size".to_string(), json!(38))]);
        let merged = record.merged(patch);
        assert_eq!(merged.prop("size"), Some(&json!(38)));
        assert_eq!(merged.prop("pickable"), Some(&json!(true)));
        // Original record is untouched.
        assert_eq!(record.prop("size"), Some(&json!(24)));
    }

    #[test]
    fn rebuild_forces_the_id_and_keeps_props() {
        let record = LayerRecord::new("wrong-id", LayerKind::Path).with_prop("width", json!(0.3));
        let rebuilt = record.rebuilt_with_id("line-layer");
        assert_eq!(rebuilt.id(), "line-layer");
        assert_eq!(rebuilt.prop("width"), Some(&json!(0.3)));
        assert_eq!(rebuilt.kind(), LayerKind::Path);
    }
}
