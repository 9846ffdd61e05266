//! The per-backend orchestrator.
//!
//! Wires raw input to the resolver and navigation context, runs the
//! debounced hover/series choreography against the boundary-loading
//! gate, and drives the backend from the shared animation clock. All of
//! it is single-threaded and cooperative: the host advances logical
//! time through `tick`.

use foundation::time::Millis;
use geodata::feature::FeatureCollection;
use geodata::hit_test::points_in_region;
use geodata::overlay::{FlowEdge, PointMarker};
use navigation::context::NavigationContext;
use navigation::loader::{FetchPlan, GeographyLoader, GeographyQuery, RequestId};
use navigation::resolver::plan_descent;
use runtime::clock::{AnimationClock, ClockConfig};
use runtime::debounce::Debouncer;
use runtime::gate::{GateOutcome, LoadGate};
use tracing::{debug, warn};

use crate::backend::{BackendError, MapBackend};
use crate::events::{EventQueue, MapEvent, PickTarget, RawInput};

/// Timing knobs, in logical milliseconds.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerConfig {
    /// Quiet period before an area hover settles.
    pub hover_debounce_ms: u64,
    /// Quiet period collapsing bursts of series updates.
    pub series_debounce_ms: u64,
    /// How long a series update may wait on a boundary load.
    pub boundary_timeout_ms: u64,
    pub clock: ClockConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            hover_debounce_ms: 600,
            series_debounce_ms: 300,
            boundary_timeout_ms: 5000,
            clock: ClockConfig::default(),
        }
    }
}

/// A batched overlay-data replacement.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesUpdate {
    Points(Vec<PointMarker>),
    Lines(Vec<FlowEdge>),
}

impl SeriesUpdate {
    fn describe(&self) -> &'static str {
        match self {
            SeriesUpdate::Points(_) => "points",
            SeriesUpdate::Lines(_) => "lines",
        }
    }
}

/// What one `tick` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// The clock fired and animated layers advanced.
    pub animated: bool,
    /// A debounced hover settled this tick.
    pub hover_settled: bool,
    pub series_applied: u32,
    pub series_dropped: u32,
}

pub struct MapController<B: MapBackend> {
    ctx: NavigationContext,
    loader: GeographyLoader,
    backend: B,
    hover: Debouncer<Option<String>>,
    series: Debouncer<SeriesUpdate>,
    gate: LoadGate<SeriesUpdate>,
    clock: AnimationClock,
    events: EventQueue,
    /// Last applied markers, kept for hover hit-testing.
    points: Vec<PointMarker>,
}

impl<B: MapBackend> MapController<B> {
    pub fn new(backend: B, config: ControllerConfig, now: Millis) -> Self {
        let mut clock = AnimationClock::new(config.clock);
        clock.start(now);
        Self {
            ctx: NavigationContext::new(),
            loader: GeographyLoader::new(),
            backend,
            hover: Debouncer::new(config.hover_debounce_ms),
            series: Debouncer::new(config.series_debounce_ms),
            gate: LoadGate::new(config.boundary_timeout_ms),
            clock,
            events: EventQueue::new(),
            points: Vec::new(),
        }
    }

    pub fn context(&self) -> &NavigationContext {
        &self.ctx
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_boundary_loading(&self) -> bool {
        self.gate.is_loading()
    }

    /// The fetch the host must perform, if one is outstanding.
    pub fn pending_fetch(&self) -> Option<(RequestId, &GeographyQuery)> {
        self.loader.in_flight()
    }

    pub fn events(&self) -> &[MapEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<MapEvent> {
        self.events.drain()
    }

    /// Normalizes one raw interaction.
    ///
    /// Click and zoom events surface synchronously; area hovers arm the
    /// debouncer and settle in a later `tick`.
    pub fn handle_input(&mut self, input: RawInput, now: Millis) -> Result<(), BackendError> {
        match input {
            RawInput::Click(PickTarget::Area { name }) => {
                self.events.emit(MapEvent::AreaClick { name });
            }
            RawInput::Click(PickTarget::Point { id }) => {
                self.backend.set_selected_point(Some(&id))?;
                self.events.emit(MapEvent::PointClick { id });
            }
            RawInput::Click(PickTarget::Empty) => {
                self.backend.set_selected_point(None)?;
            }
            RawInput::DoubleClick(PickTarget::Area { name }) => {
                self.descend(&name)?;
            }
            RawInput::DoubleClick(_) => {}
            RawInput::Hover(PickTarget::Area { name }) => {
                self.hover.submit(Some(name), now);
            }
            RawInput::Hover(PickTarget::Point { id }) => {
                self.events.emit(MapEvent::PointHover { id: Some(id) });
            }
            RawInput::Hover(PickTarget::Empty) => {
                self.hover.submit(None, now);
            }
            RawInput::Zoom(zoom) => {
                self.events.emit(MapEvent::ZoomChanged(zoom));
            }
            RawInput::Resize { width, height } => {
                self.backend.resize(width, height)?;
            }
        }
        Ok(())
    }

    /// Replaces the overlay markers after the series quiet period.
    pub fn set_points(&mut self, points: Vec<PointMarker>, now: Millis) {
        self.series.submit(SeriesUpdate::Points(points), now);
    }

    /// Replaces the overlay edges after the series quiet period.
    pub fn set_lines(&mut self, edges: Vec<FlowEdge>, now: Millis) {
        self.series.submit(SeriesUpdate::Lines(edges), now);
    }

    pub fn register_icons(
        &mut self,
        glyphs: std::collections::BTreeMap<String, layers::glyph::VectorGlyph>,
    ) -> Result<(), BackendError> {
        self.backend.register_icons(glyphs)
    }

    /// Installs the result of a fetch the host performed.
    ///
    /// Returns `Ok(false)` when the result was stale: superseded in the
    /// loader, or the navigation has moved past the request's target.
    pub fn complete_fetch(
        &mut self,
        id: RequestId,
        result: Option<FeatureCollection>,
    ) -> Result<bool, BackendError> {
        let Some((query, data)) = self.loader.complete(id, result) else {
            debug!("ignoring superseded geography completion");
            return Ok(false);
        };
        if query.level != self.ctx.level() || query.region != self.ctx.adcode() {
            warn!(
                level = %query.level,
                region = %query.region,
                "geography arrived for a navigation that moved on; dropped"
            );
            self.gate.clear_loading();
            return Ok(false);
        }
        self.install(data)?;
        self.gate.clear_loading();
        Ok(true)
    }

    /// Drains the debouncers, the loading gate and the clock.
    pub fn tick(&mut self, now: Millis) -> Result<TickSummary, BackendError> {
        let mut summary = TickSummary::default();

        if let Some(hovered) = self.hover.poll(now) {
            summary.hover_settled = true;
            let event = match hovered {
                Some(name) => {
                    let points_inside = match self.ctx.geography() {
                        Some(detail) => points_in_region(detail, &name, &self.points),
                        None => Vec::new(),
                    };
                    MapEvent::AreaHover {
                        name: Some(name),
                        points_inside,
                    }
                }
                None => MapEvent::AreaHover {
                    name: None,
                    points_inside: Vec::new(),
                },
            };
            self.events.emit(event);
        }

        if let Some(update) = self.series.poll(now) {
            if let Some(update) = self.gate.submit(update, now) {
                self.apply_series(update)?;
                summary.series_applied += 1;
            }
        }
        for outcome in self.gate.poll(now) {
            match outcome {
                GateOutcome::Passed(update) => {
                    self.apply_series(update)?;
                    summary.series_applied += 1;
                }
                GateOutcome::TimedOut(update) => {
                    warn!(
                        kind = update.describe(),
                        "series update timed out waiting for boundary load; dropped"
                    );
                    summary.series_dropped += 1;
                }
            }
        }

        if let Some(frame) = self.clock.poll(now) {
            self.backend.advance(frame)?;
            summary.animated = true;
        }
        Ok(summary)
    }

    /// Stops the clock, destroys the backend and tears the context
    /// down. The clock would otherwise keep a timer running.
    pub fn destroy(&mut self) -> Result<(), BackendError> {
        self.clock.stop();
        self.hover.cancel();
        self.series.cancel();
        self.backend.destroy()?;
        self.ctx.teardown();
        Ok(())
    }

    fn descend(&mut self, name: &str) -> Result<(), BackendError> {
        let empty = FeatureCollection::empty();
        let detail = self.ctx.geography().unwrap_or(&empty);
        let Some(plan) = plan_descent(
            self.ctx.level(),
            self.ctx.country(),
            self.ctx.adcode(),
            name,
            detail,
        ) else {
            debug!(region = name, level = %self.ctx.level(), "descent rejected");
            return Ok(());
        };
        self.events.emit(MapEvent::AreaDoubleClick {
            name: name.to_string(),
            next_level: plan.level,
        });
        // Level, adcode and country move now; geometry follows when the
        // fetch lands.
        self.ctx
            .apply_transition(plan.level, plan.adcode.clone(), plan.country.clone());
        self.backend.update_level(plan.level)?;
        let query = GeographyQuery::new(plan.level, plan.country, plan.adcode);
        match self.loader.begin(query) {
            FetchPlan::Ready(data) => self.install(data)?,
            FetchPlan::Fetch(_) => self.gate.begin_loading(),
        }
        Ok(())
    }

    fn install(&mut self, data: FeatureCollection) -> Result<(), BackendError> {
        self.ctx.install_geography(data);
        let Some(geography) = self.ctx.geography() else {
            return Ok(());
        };
        self.backend.set_geo_data(&self.ctx, geography)
    }

    fn apply_series(&mut self, update: SeriesUpdate) -> Result<(), BackendError> {
        match update {
            SeriesUpdate::Points(points) => {
                self.backend.set_points(&self.ctx, &points)?;
                self.points = points;
            }
            SeriesUpdate::Lines(edges) => self.backend.set_lines(&self.ctx, &edges)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use foundation::coord::LngLat;
    use foundation::time::Millis;
    use geodata::feature::{Feature, FeatureCollection, Geometry};
    use geodata::overlay::{FlowEdge, PointMarker};
    use navigation::level::NavigationLevel;
    use serde_json::json;

    use super::{ControllerConfig, MapController, TickSummary};
    use crate::chart2d::ChartBackend;
    use crate::events::{MapEvent, PickTarget, RawInput};

    fn controller() -> MapController<ChartBackend> {
        MapController::new(ChartBackend::new(), ControllerConfig::default(), Millis::ZERO)
    }

    fn region(name: &str, adcode: u64) -> Feature {
        let mut f = Feature::new(Geometry::Polygon {
            coordinates: vec![vec![
                [100.0, 30.0],
                [110.0, 30.0],
                [110.0, 40.0],
                [100.0, 40.0],
                [100.0, 30.0],
            ]],
        })
        .with_name(name);
        f.properties.adcode = Some(json!(adcode));
        f
    }

    fn dbl_area(name: &str) -> RawInput {
        RawInput::DoubleClick(PickTarget::Area {
            name: name.to_string(),
        })
    }

    /// Double-clicks a region and feeds the resulting fetch back in.
    fn descend_and_load(
        c: &mut MapController<ChartBackend>,
        name: &str,
        detail: FeatureCollection,
        now: Millis,
    ) {
        c.handle_input(dbl_area(name), now).expect("input");
        let (id, _) = c.pending_fetch().expect("fetch outstanding");
        assert!(c.complete_fetch(id, Some(detail)).expect("complete"));
    }

    #[test]
    fn world_click_on_china_descends_to_country() {
        let mut c = controller();
        c.handle_input(dbl_area("中国"), Millis::ZERO).expect("input");
        assert_eq!(c.context().level(), NavigationLevel::Country);
        assert_eq!(c.context().country(), "100000");
        assert_eq!(c.context().adcode(), "100000");
        // Geometry has not arrived yet; level runs ahead of it.
        assert!(c.context().geography().is_none());
        assert!(c.is_boundary_loading());
        let events = c.drain_events();
        assert_eq!(
            events,
            vec![MapEvent::AreaDoubleClick {
                name: "中国".to_string(),
                next_level: NavigationLevel::Country,
            }]
        );

        let (id, query) = c.pending_fetch().expect("fetch outstanding");
        assert_eq!(query.level, NavigationLevel::Country);
        let detail = FeatureCollection::from_features(vec![region("北京市", 110000)]);
        assert!(c.complete_fetch(id, Some(detail)).expect("complete"));
        assert!(!c.is_boundary_loading());
        assert!(c.context().geography().is_some());
    }

    #[test]
    fn municipality_rejects_county_descent() {
        let mut c = controller();
        let t = Millis::ZERO;
        descend_and_load(
            &mut c,
            "中国",
            FeatureCollection::from_features(vec![region("北京市", 110000)]),
            t,
        );
        descend_and_load(
            &mut c,
            "北京市",
            FeatureCollection::from_features(vec![region("北京市", 110000)]),
            t,
        );
        assert_eq!(c.context().level(), NavigationLevel::Province);
        descend_and_load(
            &mut c,
            "北京市",
            FeatureCollection::from_features(vec![region("东城区", 110101)]),
            t,
        );
        assert_eq!(c.context().level(), NavigationLevel::City);
        assert_eq!(c.context().adcode(), "110000");

        // City -> County is rejected for the municipality code.
        c.handle_input(dbl_area("东城区"), t).expect("input");
        assert_eq!(c.context().level(), NavigationLevel::City);
        assert_eq!(c.context().adcode(), "110000");
        assert!(c.pending_fetch().is_none());
    }

    #[test]
    fn unresolved_region_leaves_the_map_where_it_was() {
        let mut c = controller();
        descend_and_load(
            &mut c,
            "中国",
            FeatureCollection::from_features(vec![region("北京市", 110000)]),
            Millis::ZERO,
        );
        c.drain_events();
        c.handle_input(dbl_area("不存在的省"), Millis::ZERO).expect("input");
        assert_eq!(c.context().level(), NavigationLevel::Country);
        assert_eq!(c.context().adcode(), "100000");
        assert!(c.drain_events().is_empty());
    }

    #[test]
    fn hover_settles_after_the_quiet_period_with_contained_points() {
        let mut c = controller();
        descend_and_load(
            &mut c,
            "中国",
            FeatureCollection::from_features(vec![region("四川省", 510000)]),
            Millis::ZERO,
        );
        c.set_points(
            vec![
                PointMarker::new("inside", LngLat::new(105.0, 35.0)),
                PointMarker::new("outside", LngLat::new(80.0, 10.0)),
            ],
            Millis(0),
        );
        let applied = c.tick(Millis(300)).expect("tick");
        assert_eq!(applied.series_applied, 1);

        c.handle_input(
            RawInput::Hover(PickTarget::Area {
                name: "四川省".to_string(),
            }),
            Millis(1000),
        )
        .expect("input");
        c.drain_events();
        assert!(!c.tick(Millis(1500)).expect("tick").hover_settled);
        let summary = c.tick(Millis(1600)).expect("tick");
        assert!(summary.hover_settled);
        let events = c.drain_events();
        assert_eq!(
            events,
            vec![MapEvent::AreaHover {
                name: Some("四川省".to_string()),
                points_inside: vec!["inside".to_string()],
            }]
        );
    }

    #[test]
    fn rapid_hovers_collapse_to_the_latest() {
        let mut c = controller();
        for (i, name) in ["甲", "乙", "丙"].iter().enumerate() {
            c.handle_input(
                RawInput::Hover(PickTarget::Area {
                    name: name.to_string(),
                }),
                Millis(i as u64 * 100),
            )
            .expect("input");
        }
        c.tick(Millis(200 + 600)).expect("tick");
        let events = c.drain_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            MapEvent::AreaHover { name: Some(n), .. } if n == "丙"
        ));
    }

    #[test]
    fn series_update_times_out_while_boundary_loads() {
        let mut c = controller();
        c.handle_input(dbl_area("中国"), Millis::ZERO).expect("input");
        assert!(c.is_boundary_loading());
        c.set_lines(
            vec![FlowEdge::new(
                "e",
                LngLat::new(100.0, 30.0),
                LngLat::new(110.0, 35.0),
            )],
            Millis(0),
        );
        // Debounce elapses; the update parks behind the loading gate.
        let parked = c.tick(Millis(300)).expect("tick");
        assert_eq!(parked.series_applied, 0);
        assert_eq!(parked.series_dropped, 0);
        // The fetch never completes; the parked update times out.
        let timed_out = c.tick(Millis(300 + 5000)).expect("tick");
        assert_eq!(timed_out.series_dropped, 1);
    }

    #[test]
    fn parked_series_applies_once_the_boundary_lands() {
        let mut c = controller();
        c.handle_input(dbl_area("中国"), Millis::ZERO).expect("input");
        c.set_points(vec![PointMarker::new("p", LngLat::new(105.0, 35.0))], Millis(0));
        c.tick(Millis(300)).expect("tick");
        let (id, _) = c.pending_fetch().expect("fetch outstanding");
        c.complete_fetch(
            id,
            Some(FeatureCollection::from_features(vec![region("四川省", 510000)])),
        )
        .expect("complete");
        let summary = c.tick(Millis(400)).expect("tick");
        assert_eq!(summary.series_applied, 1);
    }

    #[test]
    fn clicks_surface_before_debounced_hovers() {
        let mut c = controller();
        c.handle_input(
            RawInput::Hover(PickTarget::Area {
                name: "四川省".to_string(),
            }),
            Millis(0),
        )
        .expect("input");
        c.handle_input(
            RawInput::Click(PickTarget::Area {
                name: "四川省".to_string(),
            }),
            Millis(10),
        )
        .expect("input");
        c.tick(Millis(700)).expect("tick");
        let events = c.drain_events();
        assert!(matches!(events[0], MapEvent::AreaClick { .. }));
        assert!(matches!(events[1], MapEvent::AreaHover { .. }));
    }

    #[test]
    fn clock_advances_animated_layers_on_tick() {
        let mut c = controller();
        let summary = c.tick(Millis(10)).expect("tick");
        assert!(summary.animated);
        let idle = c.tick(Millis(12)).expect("tick");
        assert_eq!(idle, TickSummary::default());
    }

    #[test]
    fn destroy_stops_the_clock_and_the_backend() {
        let mut c = controller();
        c.destroy().expect("destroy");
        // No timer keeps running after teardown.
        let summary = c.tick(Millis(10_000)).expect("tick");
        assert!(!summary.animated);
        assert_eq!(c.context().level(), NavigationLevel::World);
        assert!(c.backend().option().is_null());
        assert!(c.destroy().is_err());
    }

    #[test]
    fn zoom_and_point_events_pass_straight_through() {
        let mut c = controller();
        c.handle_input(RawInput::Zoom(1.8), Millis(0)).expect("input");
        c.handle_input(
            RawInput::Hover(PickTarget::Point {
                id: "p1".to_string(),
            }),
            Millis(0),
        )
        .expect("input");
        let events = c.drain_events();
        assert_eq!(events[0], MapEvent::ZoomChanged(1.8));
        assert_eq!(
            events[1],
            MapEvent::PointHover {
                id: Some("p1".to_string())
            }
        );
    }
}
