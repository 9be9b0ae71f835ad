mod common;

use common::{airport, build_files, navaid, runway, single_airport_db};
use geo::{Coord, Point, Rect};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::time::Duration;
use synvis::viewpoint::CellKey;
use synvis::{
    AirportLabel, Config, GeoObject, Index, IndexNode, IndexReader, NavDatabase, ObjectKind,
    ObjectSource, RenderSink, Result, RunwayId, RunwayView, ViewPhase, ViewpointBuilder,
};
use tempfile::tempdir;

#[test]
fn test_index_then_find_objects() {
    let dir = tempdir().unwrap();
    let (db_path, index_path) = build_files(dir.path(), &single_airport_db());

    let mut db = NavDatabase::open(&db_path, &index_path).unwrap();
    let objects = db.find_objects(10.0, 10.0).unwrap();
    let kinds: Vec<_> = objects.iter().map(GeoObject::kind).collect();
    assert_eq!(
        kinds,
        vec![ObjectKind::Airport, ObjectKind::Runway, ObjectKind::Runway]
    );
    // Raw runway ends are not paired yet.
    assert!(
        objects
            .iter()
            .filter_map(GeoObject::as_runway)
            .all(|r| r.opposing.is_none())
    );

    assert!(db.find_objects(11.0, 10.0).unwrap().is_empty());
}

#[test]
fn test_cached_runways_are_paired() {
    let dir = tempdir().unwrap();
    let (db_path, index_path) = build_files(dir.path(), &single_airport_db());

    let mut viewpoint = ViewpointBuilder::new()
        .database_path(db_path)
        .index_path(index_path)
        .build()
        .unwrap();
    viewpoint.initialize(10.0, 10.0, 2000.0, 45.0).unwrap();

    let pairs: Vec<_> = viewpoint.cache().runway_pairs().collect();
    assert_eq!(pairs.len(), 1);
    let (primary, opposite) = pairs[0];
    assert_eq!(primary.name, "RW03");
    assert_eq!(opposite.name, "RW21");
    assert_eq!(primary.opposing, Some(opposite.id()));
    assert_eq!(opposite.opposing, Some(primary.id()));
    assert_eq!(viewpoint.approx_elevation_ft(), 50.0);
}

#[test]
fn test_unmatched_runway_is_dropped_from_cache() {
    let dir = tempdir().unwrap();
    let lines = vec![
        airport("KBBB", "N10100000", "E010100000", "BRAVO"),
        runway("KBBB", "RW09", "0900", "N10100000", "E010100000"),
    ];
    let (db_path, index_path) = build_files(dir.path(), &lines);

    let mut viewpoint = ViewpointBuilder::new()
        .database_path(db_path)
        .index_path(index_path)
        .build()
        .unwrap();
    viewpoint.initialize(10.0, 10.0, 2000.0, 0.0).unwrap();
    assert!(viewpoint.cache().runways().is_empty());
    assert_eq!(viewpoint.cache().airports().count(), 1);
    assert_eq!(viewpoint.approx_elevation_ft(), 0.0);
}

#[test]
fn test_index_round_trip_ignores_insertion_order() {
    let nodes: Vec<IndexNode> = (0..40u32)
        .map(|i| IndexNode::new((i % 5) as i16 - 2, (i % 7) as i16 * 3 - 9, i * 100))
        .collect();

    let mut forward = Index::new();
    let mut backward = Index::new();
    for node in &nodes {
        forward.insert(*node);
    }
    for node in nodes.iter().rev() {
        backward.insert(*node);
    }

    let mut a = Vec::new();
    let mut b = Vec::new();
    forward.write_to(&mut a).unwrap();
    backward.write_to(&mut b).unwrap();
    let mut reader_a = IndexReader::new(Cursor::new(a));
    let mut reader_b = IndexReader::new(Cursor::new(b));

    for lat in -2..=2i16 {
        for lng in (-9..=9i16).step_by(3) {
            let expected: BTreeSet<u32> = nodes
                .iter()
                .filter(|n| n.lat == lat && n.lng == lng)
                .map(|n| n.offset)
                .collect();
            let got_a: BTreeSet<u32> = reader_a
                .find_bucket(lat, lng)
                .unwrap()
                .iter()
                .map(|n| n.offset)
                .collect();
            let got_b: BTreeSet<u32> = reader_b
                .find_bucket(lat, lng)
                .unwrap()
                .iter()
                .map(|n| n.offset)
                .collect();
            assert_eq!(got_a, expected);
            assert_eq!(got_b, expected);
        }
    }
}

#[test]
fn test_truncated_index_returns_partial_bucket() {
    let dir = tempdir().unwrap();
    let (db_path, index_path) = build_files(dir.path(), &single_airport_db());

    let bytes = std::fs::read(&index_path).unwrap();
    std::fs::write(&index_path, &bytes[..bytes.len() - 6]).unwrap();

    let mut db = NavDatabase::open(&db_path, &index_path).unwrap();
    let objects = db.find_objects(10.0, 10.0).unwrap();
    assert_eq!(objects.len(), 2);
}

/// Serves a single record per cell so the window can be watched.
struct Cells;

impl ObjectSource for Cells {
    fn find_objects(&mut self, lat: f64, lng: f64) -> Result<Vec<GeoObject>> {
        Ok(vec![GeoObject::Navaid(synvis::Navaid {
            id: format!("N{}_{}", lat, lng),
            name: String::new(),
            location: Point::new(lng, lat),
            magnetic_deviation: 0.0,
        })])
    }
}

#[test]
fn test_cache_window_follows_viewer() {
    let config = Config::default().with_min_recompute_interval(Duration::ZERO);
    let mut viewpoint = ViewpointBuilder::new()
        .config(config)
        .source(Box::new(Cells))
        .build()
        .unwrap();

    viewpoint.initialize(10.0, 10.0, 5000.0, 90.0).unwrap();
    assert!(viewpoint.cache().contains_cell(&CellKey::new(10, 9)));

    viewpoint.update_position(10.0, 12.0, 5000.0).unwrap();
    viewpoint.collect_garbage();

    let center = CellKey::new(10, 12);
    let cells = viewpoint.cache().cells();
    assert_eq!(cells.len(), 9);
    assert!(cells.iter().all(|c| c.in_window_of(&center)));
    assert!(!viewpoint.cache().contains_cell(&CellKey::new(10, 9)));
    assert!(!viewpoint.cache().contains_cell(&CellKey::new(10, 10)));
}

#[derive(Default)]
struct Recorder {
    runways: Vec<(RunwayId, [Coord; 4])>,
    airports: Vec<String>,
    navaids: Vec<String>,
    eliminated: BTreeSet<String>,
}

impl RenderSink for Recorder {
    fn render_runway(&mut self, runway: &RunwayView<'_>) {
        self.runways
            .push((runway.id.clone(), [runway.p11, runway.p12, runway.p21, runway.p22]));
    }

    fn render_airport(&mut self, label: &AirportLabel<'_>, _occupied: &[Rect]) -> Option<Rect> {
        let rect = Rect::new(
            Coord {
                x: label.point.x - 10.0,
                y: label.point.y - 10.0,
            },
            Coord {
                x: label.point.x + 10.0,
                y: label.point.y + 10.0,
            },
        );
        self.airports.push(label.id.to_string());
        Some(rect)
    }

    fn render_navaid(&mut self, _point: Coord, id: &str) {
        self.navaids.push(id.to_string());
    }

    fn eliminate_runway(&mut self, id: &RunwayId) {
        self.eliminated.insert(id.to_string());
    }

    fn eliminate_airport(&mut self, id: &str) {
        self.eliminated.insert(id.to_string());
    }

    fn eliminate_navaid(&mut self, id: &str) {
        self.eliminated.insert(id.to_string());
    }
}

#[test]
fn test_render_then_eliminate_when_turning_away() {
    let dir = tempdir().unwrap();
    let mut lines = single_airport_db();
    lines.push(navaid("VAA", "N10120000", "E010120000", "ALPHA VOR"));
    let (db_path, index_path) = build_files(dir.path(), &lines);

    let config = Config::default()
        .with_database_path(db_path)
        .with_index_path(index_path)
        .with_min_recompute_interval(Duration::ZERO);
    let mut viewpoint = ViewpointBuilder::new().config(config).build().unwrap();
    viewpoint.initialize(10.15, 10.15, 2000.0, 45.0).unwrap();

    let mut sink = Recorder::default();
    assert!(viewpoint.render(&mut sink).unwrap());
    assert_eq!(viewpoint.phase(), ViewPhase::Rendered);
    assert_eq!(sink.runways.len(), 1);
    assert_eq!(sink.runways[0].0.to_string(), "KAAA/RW03");
    assert_eq!(sink.airports, vec!["KAAA"]);
    assert_eq!(sink.navaids, vec!["VAA"]);
    assert!(sink.eliminated.is_empty());

    // Screen y grows upward: the far threshold sits higher than the near one.
    let [p11, _, p21, _] = sink.runways[0].1;
    assert!(p21.y > p11.y);

    assert!(viewpoint.update_heading(225.0).unwrap());
    let mut sink_after = Recorder::default();
    assert!(viewpoint.render(&mut sink_after).unwrap());
    assert!(sink_after.runways.is_empty());
    assert_eq!(
        sink_after.eliminated,
        BTreeSet::from(["KAAA/RW03".to_string(), "KAAA".to_string(), "VAA".to_string()])
    );
}

#[test]
fn test_point2d_tracks_heading() {
    let dir = tempdir().unwrap();
    let (db_path, index_path) = build_files(dir.path(), &single_airport_db());
    let config = Config::default()
        .with_database_path(db_path)
        .with_index_path(index_path)
        .with_min_recompute_interval(Duration::ZERO);
    let mut viewpoint = ViewpointBuilder::new().config(config).build().unwrap();

    assert!(viewpoint.point2d(10.2, 10.2).is_none());
    viewpoint.initialize(10.0, 10.0, 2000.0, 45.0).unwrap();
    assert!(viewpoint.point2d(10.2, 10.2).is_some());
    assert!(viewpoint.point2d(9.8, 9.8).is_none());

    let look = viewpoint.look_direction().unwrap();
    assert!(look.phi < 0.0);
}

#[test]
fn test_throttled_updates_catch_up_on_render() {
    let config = Config::default().with_min_recompute_interval(Duration::from_millis(50));
    let mut viewpoint = ViewpointBuilder::new()
        .config(config)
        .source(Box::new(Cells))
        .build()
        .unwrap();
    viewpoint.initialize(10.0, 10.0, 5000.0, 0.0).unwrap();

    let mut sink = Recorder::default();
    assert!(viewpoint.render(&mut sink).unwrap());

    assert!(!viewpoint.update_heading(90.0).unwrap());
    assert_eq!(viewpoint.phase(), ViewPhase::Stale);
    assert!(!viewpoint.render(&mut sink).unwrap());

    std::thread::sleep(Duration::from_millis(80));
    assert!(viewpoint.render(&mut sink).unwrap());
    assert_eq!(viewpoint.phase(), ViewPhase::Rendered);
    let view = viewpoint.view_screen().unwrap();
    assert!((view.forward.dot(&view.east) - 1.0).abs() < 1e-9);
}
