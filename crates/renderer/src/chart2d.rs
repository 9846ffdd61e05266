//! Declarative 2D chart adapter.
//!
//! Renders nothing itself: it maintains a serializable option tree the
//! host charting library consumes, and keeps that tree synchronized to
//! the navigation context. Trail animation is delegated to the chart's
//! own line effect, so `advance` is a no-op here.

use std::collections::BTreeMap;

use foundation::color::Rgba;
use geodata::feature::{FeatureCollection, HcProjection};
use geodata::overlay::{FlowEdge, PointMarker};
use geodata::view::{fit_collection, fit_positions};
use layers::glyph::VectorGlyph;
use navigation::context::NavigationContext;
use navigation::level::NavigationLevel;
use navigation::resolver::needs_reprojection;
use runtime::clock::ClockFrame;
use serde_json::{Value, json};
use tracing::warn;

use crate::backend::{BackendError, BackendKind, MapBackend};

const AREA_COLOR: &str = "#094777";
const BORDER_COLOR: &str = "#1480C5";
const SHADOW_COLOR: &str = "rgba(0, 0, 0, 0.5)";
const EMPHASIS_AREA_COLOR: &str = "#3079c8";
const WORLD_ZOOM: f64 = 1.3;

/// Flow effect the chart runs on the lines series.
const EFFECT_PERIOD: f64 = 6.0;
const EFFECT_TRAIL_LENGTH: f64 = 0.7;
const EFFECT_SYMBOL_SIZE: f64 = 3.0;

const DEFAULT_SYMBOL_SIZE: f64 = 10.0;

pub struct ChartBackend {
    option: Value,
    point_series: Option<Value>,
    line_series: Option<Value>,
    projection: Option<HcProjection>,
    /// World-level country id to center and zoom on, when set.
    focus_country: Option<String>,
    size: (u32, u32),
    destroyed: bool,
}

impl Default for ChartBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartBackend {
    pub fn new() -> Self {
        let mut backend = Self {
            option: Value::Null,
            point_series: None,
            line_series: None,
            projection: None,
            focus_country: None,
            size: (0, 0),
            destroyed: false,
        };
        backend.option = json!({
            "tooltip": { "show": false },
            "geo": backend.geo_component(NavigationLevel::World, None, WORLD_ZOOM, ""),
            "series": [],
        });
        backend
    }

    pub fn with_focus_country(mut self, country_id: impl Into<String>) -> Self {
        self.focus_country = Some(country_id.into());
        self
    }

    /// The current option tree, ready to hand to the chart library.
    pub fn option(&self) -> &Value {
        &self.option
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_alive(&self) -> Result<(), BackendError> {
        if self.destroyed {
            return Err(BackendError::Destroyed);
        }
        Ok(())
    }

    fn geo_component(
        &self,
        level: NavigationLevel,
        center: Option<[f64; 2]>,
        zoom: f64,
        map: &str,
    ) -> Value {
        json!({
            "map": map,
            "roam": true,
            "silent": false,
            "center": center,
            "zoom": zoom,
            "scaleLimit": { "min": 1 },
            "itemStyle": Self::boundary_item_style(level),
            "emphasis": {
                "label": { "show": false },
                "itemStyle": { "areaColor": EMPHASIS_AREA_COLOR, "borderWidth": 0 },
            },
        })
    }

    /// The world map hides borders behind a soft shadow; deeper levels
    /// invert that.
    fn boundary_item_style(level: NavigationLevel) -> Value {
        let world = level == NavigationLevel::World;
        json!({
            "areaColor": AREA_COLOR,
            "borderColor": BORDER_COLOR,
            "borderWidth": if world { 0 } else { 1 },
            "shadowBlur": if world { 1 } else { 0 },
            "shadowColor": SHADOW_COLOR,
        })
    }

    fn maybe_project(&self, ctx: &NavigationContext, p: [f64; 2]) -> [f64; 2] {
        if !needs_reprojection(ctx.country(), ctx.level(), ctx.adcode()) {
            return p;
        }
        match &self.projection {
            Some(projection) => projection.apply(p),
            None => p,
        }
    }

    fn rebuild_series(&mut self) {
        let mut series = Vec::new();
        if let Some(points) = &self.point_series {
            series.push(points.clone());
        }
        if let Some(lines) = &self.line_series {
            series.push(lines.clone());
        }
        self.option["series"] = Value::Array(series);
    }
}

/// CSS color string for the option tree.
fn css_color(color: Rgba) -> String {
    if color.a == 255 {
        format!("#{:02x}{:02x}{:02x}", color.r, color.g, color.b)
    } else {
        format!(
            "rgba({}, {}, {}, {:.3})",
            color.r,
            color.g,
            color.b,
            f64::from(color.a) / 255.0
        )
    }
}

impl MapBackend for ChartBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Chart2d
    }

    fn set_geo_data(
        &mut self,
        ctx: &NavigationContext,
        boundary: &FeatureCollection,
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.projection = boundary.projection().cloned();

        let mut center = None;
        let mut zoom = if ctx.level() == NavigationLevel::World {
            WORLD_ZOOM
        } else {
            1.0
        };
        match ctx.level() {
            NavigationLevel::World => {
                if let Some(focus) = &self.focus_country {
                    if let Some(fit) = boundary
                        .feature_by_id(focus)
                        .and_then(|f| f.geometry.as_ref())
                        .and_then(|g| fit_positions(g.positions()))
                    {
                        center = Some(fit.center);
                        zoom = fit.zoom;
                    }
                }
            }
            NavigationLevel::Country => {}
            _ => {
                if let Some(fit) = fit_collection(boundary) {
                    center = Some(fit.center);
                }
            }
        }
        self.option["geo"] = self.geo_component(ctx.level(), center, zoom, ctx.adcode());
        Ok(())
    }

    fn set_points(
        &mut self,
        ctx: &NavigationContext,
        points: &[PointMarker],
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        let data: Vec<Value> = points
            .iter()
            .map(|p| {
                let value = self.maybe_project(ctx, [p.coordinate.lng, p.coordinate.lat]);
                let mut item = json!({
                    "name": p.label.as_deref().unwrap_or(&p.id),
                    "id": p.id,
                    "value": value,
                    "symbolSize": p.size.unwrap_or(DEFAULT_SYMBOL_SIZE),
                });
                if let Some(color) = p.color {
                    item["itemStyle"] = json!({ "color": css_color(color) });
                }
                item
            })
            .collect();
        self.point_series = Some(json!({
            "name": "points",
            "type": "scatter",
            "coordinateSystem": "geo",
            "geoIndex": 0,
            "data": data,
            "emphasis": { "label": { "show": true, "position": "right" } },
        }));
        self.rebuild_series();
        Ok(())
    }

    fn set_lines(
        &mut self,
        ctx: &NavigationContext,
        edges: &[FlowEdge],
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        let data: Vec<Value> = edges
            .iter()
            .map(|e| {
                let coords = [
                    self.maybe_project(ctx, [e.start.lng, e.start.lat]),
                    self.maybe_project(ctx, [e.end.lng, e.end.lat]),
                ];
                let mut item = json!({ "id": e.id, "coords": coords });
                if e.color.is_some() || e.width.is_some() {
                    item["lineStyle"] = json!({
                        "color": e.color.map(css_color),
                        "width": e.width.unwrap_or(2.0),
                    });
                }
                item
            })
            .collect();
        self.line_series = Some(json!({
            "name": "lines",
            "type": "lines",
            "coordinateSystem": "geo",
            "geoIndex": 0,
            // Trail effects smear if the series also runs entry
            // animation.
            "animation": false,
            "data": data,
            "effect": {
                "show": true,
                "period": EFFECT_PERIOD,
                "trailLength": EFFECT_TRAIL_LENGTH,
                "symbolSize": EFFECT_SYMBOL_SIZE,
            },
            "lineStyle": { "width": 2, "opacity": 0.6 },
        }));
        self.rebuild_series();
        Ok(())
    }

    fn update_level(&mut self, level: NavigationLevel) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.option["geo"]["itemStyle"] = Self::boundary_item_style(level);
        Ok(())
    }

    fn register_icons(
        &mut self,
        glyphs: BTreeMap<String, VectorGlyph>,
    ) -> Result<(), BackendError> {
        self.ensure_alive()?;
        warn!(
            count = glyphs.len(),
            "chart backend has no icon layer; ignoring registered icons"
        );
        Ok(())
    }

    fn set_selected_point(&mut self, _id: Option<&str>) -> Result<(), BackendError> {
        self.ensure_alive()
    }

    fn advance(&mut self, _frame: ClockFrame) -> Result<(), BackendError> {
        // The chart's declarative line effect animates on its own.
        self.ensure_alive()
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.size = (width, height);
        Ok(())
    }

    fn destroy(&mut self) -> Result<(), BackendError> {
        self.ensure_alive()?;
        self.destroyed = true;
        self.point_series = None;
        self.line_series = None;
        self.option = Value::Null;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use foundation::color::Rgba;
    use foundation::coord::LngLat;
    use geodata::feature::{Feature, FeatureCollection, Geometry};
    use geodata::overlay::{FlowEdge, PointMarker};
    use navigation::context::NavigationContext;
    use navigation::level::NavigationLevel;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::{ChartBackend, css_color};
    use crate::backend::{BackendError, MapBackend};

    fn province_collection() -> FeatureCollection {
        FeatureCollection::from_features(vec![
            Feature::new(Geometry::Polygon {
                coordinates: vec![vec![
                    [100.0, 30.0],
                    [104.0, 30.0],
                    [104.0, 34.0],
                    [100.0, 34.0],
                    [100.0, 30.0],
                ]],
            })
            .with_name("四川省"),
        ])
    }

    #[test]
    fn starts_with_world_styling() {
        let backend = ChartBackend::new();
        let geo = &backend.option()["geo"];
        assert_eq!(geo["zoom"], json!(1.3));
        assert_eq!(geo["itemStyle"]["borderWidth"], json!(0));
        assert_eq!(geo["itemStyle"]["shadowBlur"], json!(1));
    }

    #[test]
    fn deeper_levels_center_and_show_borders() {
        let mut backend = ChartBackend::new();
        let mut ctx = NavigationContext::new();
        ctx.apply_transition(NavigationLevel::Province, "510000", "100000");
        backend
            .set_geo_data(&ctx, &province_collection())
            .expect("set geo");
        let geo = &backend.option()["geo"];
        assert_eq!(geo["map"], json!("510000"));
        assert_eq!(geo["zoom"], json!(1.0));
        assert_eq!(geo["center"], json!([102.0, 32.0]));
        assert_eq!(geo["itemStyle"]["borderWidth"], json!(1));
        assert_eq!(geo["itemStyle"]["shadowBlur"], json!(0));
    }

    #[test]
    fn world_view_centers_on_the_focus_country() {
        let mut backend = ChartBackend::new().with_focus_country("cn");
        let ctx = NavigationContext::new();
        let world = FeatureCollection::from_features(vec![
            Feature::new(Geometry::Polygon {
                coordinates: vec![vec![
                    [73.0, 18.0],
                    [135.0, 18.0],
                    [135.0, 53.0],
                    [73.0, 53.0],
                    [73.0, 18.0],
                ]],
            })
            .with_id("cn")
            .with_name("中国"),
        ]);
        backend.set_geo_data(&ctx, &world).expect("set geo");
        let geo = &backend.option()["geo"];
        assert_eq!(geo["center"], json!([104.0, 35.5]));
        // Zoom follows the focus feature's extent, not the world
        // default.
        assert_ne!(geo["zoom"], json!(1.3));
    }

    #[test]
    fn resize_records_the_surface_size() {
        let mut backend = ChartBackend::new();
        backend.resize(800, 600).expect("resize");
        assert_eq!(backend.size(), (800, 600));
    }

    #[test]
    fn points_become_a_scatter_series() {
        let mut backend = ChartBackend::new();
        let ctx = NavigationContext::new();
        let marker = PointMarker::new("p1", LngLat::new(116.4, 39.9))
            .with_color(Rgba::opaque(255, 107, 107))
            .with_label("北京");
        backend.set_points(&ctx, &[marker]).expect("set points");
        let series = &backend.option()["series"][0];
        assert_eq!(series["type"], json!("scatter"));
        assert_eq!(series["data"][0]["name"], json!("北京"));
        assert_eq!(series["data"][0]["value"], json!([116.4, 39.9]));
        assert_eq!(series["data"][0]["itemStyle"]["color"], json!("#ff6b6b"));
    }

    #[test]
    fn lines_series_carries_the_flow_effect() {
        let mut backend = ChartBackend::new();
        let ctx = NavigationContext::new();
        let edge = FlowEdge::new("e1", LngLat::new(116.4, 39.9), LngLat::new(121.5, 31.2));
        backend.set_lines(&ctx, &[edge]).expect("set lines");
        let series = &backend.option()["series"][0];
        assert_eq!(series["type"], json!("lines"));
        assert_eq!(series["effect"]["period"], json!(6.0));
        assert_eq!(series["effect"]["trailLength"], json!(0.7));
        assert_eq!(series["data"][0]["coords"][0], json!([116.4, 39.9]));
    }

    #[test]
    fn series_coordinates_reproject_for_projected_countries() {
        let mut backend = ChartBackend::new();
        let mut ctx = NavigationContext::new();
        ctx.apply_transition(NavigationLevel::Province, "fr-idf", "fr");
        let raw = r#"{
            "type": "FeatureCollection",
            "hc-transform": { "default": { "scale": [2.0, 3.0], "translate": [10.0, 20.0] } },
            "features": []
        }"#;
        let boundary: FeatureCollection = serde_json::from_str(raw).expect("parse");
        backend.set_geo_data(&ctx, &boundary).expect("set geo");
        backend
            .set_points(&ctx, &[PointMarker::new("p", LngLat::new(1.0, 2.0))])
            .expect("set points");
        let value = &backend.option()["series"][0]["data"][0]["value"];
        assert_eq!(value, &json!([12.0, 26.0]));
    }

    #[test]
    fn china_series_are_never_reprojected() {
        let mut backend = ChartBackend::new();
        let mut ctx = NavigationContext::new();
        ctx.apply_transition(NavigationLevel::Province, "510000", "100000");
        let raw = r#"{
            "type": "FeatureCollection",
            "hc-transform": { "default": { "scale": [2.0, 3.0], "translate": [10.0, 20.0] } },
            "features": []
        }"#;
        let boundary: FeatureCollection = serde_json::from_str(raw).expect("parse");
        backend.set_geo_data(&ctx, &boundary).expect("set geo");
        backend
            .set_points(&ctx, &[PointMarker::new("p", LngLat::new(1.0, 2.0))])
            .expect("set points");
        let value = &backend.option()["series"][0]["data"][0]["value"];
        assert_eq!(value, &json!([1.0, 2.0]));
    }

    #[test]
    fn destroyed_backend_rejects_every_operation() {
        let mut backend = ChartBackend::new();
        let ctx = NavigationContext::new();
        backend.destroy().expect("first destroy");
        assert_eq!(
            backend.set_points(&ctx, &[]),
            Err(BackendError::Destroyed)
        );
        assert_eq!(backend.destroy(), Err(BackendError::Destroyed));
    }

    #[test]
    fn css_color_formats_opaque_and_translucent() {
        assert_eq!(css_color(Rgba::opaque(9, 71, 119)), "#094777");
        assert_eq!(css_color(Rgba::new(255, 255, 255, 51)), "rgba(255, 255, 255, 0.200)");
    }
}
