//! Headless demo driver: wires a controller to one backend, drives a
//! scripted drill-down over embedded sample geography and prints the
//! resulting events.
//!
//! Usage: `viewer [chart|gpu]`

use std::collections::BTreeMap;
use std::env;
use std::error::Error;

use foundation::color::Rgba;
use foundation::coord::LngLat;
use foundation::time::Millis;
use geodata::feature::{Feature, FeatureCollection, Geometry};
use geodata::overlay::{FlowEdge, PointMarker};
use layers::glyph::VectorGlyph;
use navigation::level::NavigationLevel;
use navigation::loader::GeographyQuery;
use renderer::backend::{BackendError, BackendKind, MapBackend};
use renderer::chart2d::ChartBackend;
use renderer::controller::{ControllerConfig, MapController};
use renderer::events::{PickTarget, RawInput};
use renderer::gpu3d::{GpuBackend, RenderMode};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let kind = env::args().nth(1).unwrap_or_else(|| "chart".to_string());
    match kind.parse::<BackendKind>()? {
        BackendKind::Chart2d => run(MapController::new(
            ChartBackend::new(),
            ControllerConfig::default(),
            Millis::ZERO,
        )),
        BackendKind::Gpu3d => run(MapController::new(
            GpuBackend::new(RenderMode::Perspective),
            ControllerConfig::default(),
            Millis::ZERO,
        )),
    }?;
    Ok(())
}

fn run<B: MapBackend>(mut map: MapController<B>) -> Result<(), BackendError> {
    info!(
        backend = map.backend().kind().as_str(),
        level = %map.context().level(),
        "starting at world view"
    );

    // Drill into China; the level moves now, geometry follows.
    map.handle_input(dbl_area("中国"), Millis(0))?;
    pump_fetch(&mut map)?;
    info!(
        level = %map.context().level(),
        adcode = map.context().adcode(),
        "descended"
    );

    // Overlay data lands after its debounce window.
    map.set_points(sample_points(), Millis(0));
    let mut now = Millis(400);
    map.tick(now)?;
    map.set_lines(sample_edges(), now);
    now = Millis(800);
    map.tick(now)?;

    map.register_icons(BTreeMap::from([(
        "hub".to_string(),
        VectorGlyph::Circle {
            cx: 4.0,
            cy: 4.0,
            r: 3.5,
        },
    )]))?;

    // Hover a province and let the debounce settle.
    map.handle_input(
        RawInput::Hover(PickTarget::Area {
            name: "四川省".to_string(),
        }),
        now,
    )?;
    now = Millis(1500);
    map.tick(now)?;

    // Drill one level further.
    map.handle_input(dbl_area("四川省"), now)?;
    pump_fetch(&mut map)?;

    // Run the animation clock for a while.
    for step in 1..=50u64 {
        map.tick(Millis(1500 + step * 10))?;
    }

    for event in map.drain_events() {
        info!(?event, "map event");
    }
    info!(
        level = %map.context().level(),
        adcode = map.context().adcode(),
        country = map.context().country(),
        "final navigation state"
    );

    map.destroy()
}

fn dbl_area(name: &str) -> RawInput {
    RawInput::DoubleClick(PickTarget::Area {
        name: name.to_string(),
    })
}

/// Serves outstanding fetches from the embedded sample geography.
fn pump_fetch<B: MapBackend>(map: &mut MapController<B>) -> Result<(), BackendError> {
    while let Some((id, query)) = map.pending_fetch().map(|(id, q)| (id, q.clone())) {
        let result = fetch_geography(&query);
        info!(
            level = %query.level,
            region = %query.region,
            found = result.is_some(),
            "serving geography fetch"
        );
        map.complete_fetch(id, result)?;
    }
    Ok(())
}

fn fetch_geography(query: &GeographyQuery) -> Option<FeatureCollection> {
    match (query.level, query.region.as_str()) {
        (NavigationLevel::Country, "100000") => Some(china_country_map()),
        (NavigationLevel::Province, "510000") => Some(sichuan_province_map()),
        _ => None,
    }
}

fn region(name: &str, adcode: u64, ring: Vec<[f64; 2]>) -> Feature {
    let mut feature = Feature::new(Geometry::Polygon {
        coordinates: vec![ring],
    })
    .with_name(name);
    feature.properties.adcode = Some(json!(adcode));
    feature
}

fn china_country_map() -> FeatureCollection {
    FeatureCollection::from_features(vec![
        region(
            "北京市",
            110000,
            vec![
                [115.4, 39.4],
                [117.5, 39.4],
                [117.5, 41.1],
                [115.4, 41.1],
                [115.4, 39.4],
            ],
        ),
        region(
            "四川省",
            510000,
            vec![
                [97.3, 26.0],
                [108.5, 26.0],
                [108.5, 34.3],
                [97.3, 34.3],
                [97.3, 26.0],
            ],
        ),
        region(
            "广东省",
            440000,
            vec![
                [109.6, 20.2],
                [117.2, 20.2],
                [117.2, 25.5],
                [109.6, 25.5],
                [109.6, 20.2],
            ],
        ),
    ])
}

fn sichuan_province_map() -> FeatureCollection {
    FeatureCollection::from_features(vec![
        region(
            "成都市",
            510100,
            vec![
                [103.0, 30.1],
                [104.9, 30.1],
                [104.9, 31.4],
                [103.0, 31.4],
                [103.0, 30.1],
            ],
        ),
        region(
            "绵阳市",
            510700,
            vec![
                [103.7, 31.4],
                [105.7, 31.4],
                [105.7, 33.0],
                [103.7, 33.0],
                [103.7, 31.4],
            ],
        ),
    ])
}

fn sample_points() -> Vec<PointMarker> {
    vec![
        PointMarker::new("chengdu", LngLat::new(104.07, 30.67))
            .with_label("成都")
            .with_icon("star")
            .with_color(Rgba::opaque(255, 107, 107)),
        PointMarker::new("beijing", LngLat::new(116.41, 39.90))
            .with_label("北京")
            .with_icon("circle"),
        PointMarker::new("guangzhou", LngLat::new(113.26, 23.13)).with_label("广州"),
    ]
}

fn sample_edges() -> Vec<FlowEdge> {
    vec![
        FlowEdge::new(
            "chengdu->beijing",
            LngLat::new(104.07, 30.67),
            LngLat::new(116.41, 39.90),
        )
        .with_color(Rgba::opaque(200, 200, 200)),
        FlowEdge::new(
            "chengdu->guangzhou",
            LngLat::new(104.07, 30.67),
            LngLat::new(113.26, 23.13),
        ),
        FlowEdge::new(
            "beijing->guangzhou",
            LngLat::new(116.41, 39.90),
            LngLat::new(113.26, 23.13),
        )
        .with_width(1.0),
    ]
}
