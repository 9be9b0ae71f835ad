//! Render and eliminate calls handed to the host renderer.

use super::cache::ObjectCache;
use super::view::{ViewScreen, geodetic_point};
use crate::config::Config;
use crate::navigation::{FEET_PER_NM, course, offset};
use crate::records::{Airport, Navaid, Runway, RunwayId};
use geo::{Coord, Intersects, Point, Rect};
use rustc_hash::FxHashSet;

/// Everything needed to draw one runway strip.
///
/// `p11`/`p12` are the corners at the primary threshold, `p21`/`p22` those at
/// the opposite end. `p11` and `p21` lie on the same side of the strip.
#[derive(Debug, Clone, PartialEq)]
pub struct RunwayView<'a> {
    /// Key of the primary end; eliminations use the same key.
    pub id: RunwayId,
    pub p11: Coord,
    pub p12: Coord,
    pub p21: Coord,
    pub p22: Coord,
    /// Distance from the viewer to the primary threshold.
    pub touchdown_distance_nm: f64,
    pub elevation_ft: f64,
    pub length_ft: f64,
    pub bearing_deg: f64,
    pub name: &'a str,
    pub airport_id: &'a str,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AirportLabel<'a> {
    pub point: Coord,
    pub id: &'a str,
    pub name: &'a str,
    pub zoom: f64,
}

/// Receiver of one render pass.
///
/// Screen coordinates have their origin at the display centre, x to the
/// right and y up, in pixels.
pub trait RenderSink {
    fn render_runway(&mut self, runway: &RunwayView<'_>);

    /// Draw an airport label avoiding `occupied`. Returns the box actually
    /// drawn, or `None` if the label was not drawn.
    ///
    /// The caller only drops labels whose anchor point lies inside an
    /// occupied box. Checking the label's own box against `occupied` is up
    /// to the implementation, which returns `None` on overlap.
    fn render_airport(&mut self, label: &AirportLabel<'_>, occupied: &[Rect]) -> Option<Rect>;

    fn render_navaid(&mut self, point: Coord, id: &str);

    fn eliminate_runway(&mut self, id: &RunwayId);

    fn eliminate_airport(&mut self, id: &str);

    fn eliminate_navaid(&mut self, id: &str);
}

/// Identity of something drawn in a pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum Drawn {
    Runway(RunwayId),
    Airport(String),
    Navaid(String),
}

pub(crate) type DrawnSet = FxHashSet<Drawn>;

enum Label<'a> {
    Airport(&'a Airport),
    Navaid(&'a Navaid),
}

/// One render pass over the cache with a fixed view screen.
pub(crate) struct Frame<'a> {
    pub view: &'a ViewScreen,
    pub config: &'a Config,
    /// Viewer position (x = longitude, y = latitude).
    pub viewer: Point,
    /// Height targets are projected at.
    pub ground_ft: f64,
}

impl Frame<'_> {
    pub fn project(&self, location: &Point) -> Option<Coord> {
        let target = geodetic_point(location.y(), location.x(), self.ground_ft);
        self.view.project(&target).ok().map(|(x, y)| Coord { x, y })
    }

    /// Display rectangle grown by the clip margin on every side.
    pub fn clip_rect(&self) -> Rect {
        let half_w = self.config.display_width * (0.5 + self.config.clip_margin);
        let half_h = self.config.display_height * (0.5 + self.config.clip_margin);
        Rect::new(
            Coord {
                x: -half_w,
                y: -half_h,
            },
            Coord {
                x: half_w,
                y: half_h,
            },
        )
    }

    /// Draw everything visible and eliminate whatever `previous` held that
    /// was not drawn this time. Returns the new drawn set.
    pub fn draw<S: RenderSink + ?Sized>(
        &self,
        cache: &ObjectCache,
        previous: &DrawnSet,
        sink: &mut S,
    ) -> DrawnSet {
        let clip = self.clip_rect();
        let mut drawn = DrawnSet::default();

        for (primary, opposite) in cache.runway_pairs() {
            if let Some(view) = self.runway_view(primary, opposite, &clip) {
                sink.render_runway(&view);
                drawn.insert(Drawn::Runway(view.id));
            }
        }

        self.draw_labels(cache, &clip, &mut drawn, sink);

        for gone in previous.difference(&drawn) {
            match gone {
                Drawn::Runway(id) => sink.eliminate_runway(id),
                Drawn::Airport(id) => sink.eliminate_airport(id),
                Drawn::Navaid(id) => sink.eliminate_navaid(id),
            }
        }

        log::debug!(
            "Render pass drew {} objects, eliminated {}",
            drawn.len(),
            previous.difference(&drawn).count()
        );
        drawn
    }

    fn runway_view<'r>(
        &self,
        primary: &'r Runway,
        opposite: &'r Runway,
        clip: &Rect,
    ) -> Option<RunwayView<'r>> {
        let near = self.project(&primary.location)?;
        let far = self.project(&opposite.location)?;
        if !clip.intersects(&near) && !clip.intersects(&far) {
            return None;
        }

        let strip = course(&primary.location, &opposite.location);
        let width_ft = primary
            .width_ft
            .unwrap_or(self.config.default_runway_width_ft);
        let half_width_nm = width_ft / FEET_PER_NM / 2.0;
        let left = strip.heading_deg - 90.0;
        let right = strip.heading_deg + 90.0;

        let p11 = self.project(&offset(&primary.location, left, half_width_nm))?;
        let p12 = self.project(&offset(&primary.location, right, half_width_nm))?;
        let p21 = self.project(&offset(&opposite.location, left, half_width_nm))?;
        let p22 = self.project(&offset(&opposite.location, right, half_width_nm))?;

        let ys = [p11.y, p12.y, p21.y, p22.y];
        let top = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let bottom = ys.iter().copied().fold(f64::INFINITY, f64::min);
        if top - bottom < self.config.min_runway_pixels {
            return None;
        }

        Some(RunwayView {
            id: primary.id(),
            p11,
            p12,
            p21,
            p22,
            touchdown_distance_nm: course(&self.viewer, &primary.location).distance_nm,
            elevation_ft: primary.elevation_ft,
            length_ft: primary.length_ft,
            bearing_deg: primary.bearing_deg,
            name: &primary.name,
            airport_id: &primary.airport_id,
            zoom: self.config.zoom,
        })
    }

    /// Airports and navaids, nearest first. A label whose anchor falls in a
    /// box placed by a nearer airport is skipped.
    fn draw_labels<S: RenderSink + ?Sized>(
        &self,
        cache: &ObjectCache,
        clip: &Rect,
        drawn: &mut DrawnSet,
        sink: &mut S,
    ) {
        let mut labels: Vec<(f64, Label<'_>)> = cache
            .airports()
            .map(|a| (self.distance_to(&a.location), Label::Airport(a)))
            .chain(
                cache
                    .navaids()
                    .map(|n| (self.distance_to(&n.location), Label::Navaid(n))),
            )
            .collect();
        labels.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut occupied: Vec<Rect> = Vec::new();
        for (_, label) in labels {
            let location = match label {
                Label::Airport(a) => a.location,
                Label::Navaid(n) => n.location,
            };
            let Some(point) = self.project(&location) else {
                continue;
            };
            if !clip.intersects(&point) || occupied.iter().any(|r| r.intersects(&point)) {
                continue;
            }

            match label {
                Label::Airport(airport) => {
                    let label = AirportLabel {
                        point,
                        id: &airport.id,
                        name: &airport.name,
                        zoom: self.config.zoom,
                    };
                    if let Some(placed) = sink.render_airport(&label, &occupied) {
                        occupied.push(placed);
                        drawn.insert(Drawn::Airport(airport.id.clone()));
                    }
                }
                Label::Navaid(navaid) => {
                    sink.render_navaid(point, &navaid.id);
                    drawn.insert(Drawn::Navaid(navaid.id.clone()));
                }
            }
        }
    }

    fn distance_to(&self, location: &Point) -> f64 {
        course(&self.viewer, location).distance_nm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ObjectSource;
    use crate::error::Result;
    use crate::records::GeoObject;
    use crate::viewpoint::CellKey;
    use approx::assert_abs_diff_eq;

    #[derive(Default)]
    struct Recorder {
        runways: Vec<RunwayId>,
        airports: Vec<String>,
        navaids: Vec<String>,
        eliminated: Vec<String>,
        box_size: f64,
        reject_overlap: bool,
    }

    impl RenderSink for Recorder {
        fn render_runway(&mut self, runway: &RunwayView<'_>) {
            self.runways.push(runway.id.clone());
        }

        fn render_airport(&mut self, label: &AirportLabel<'_>, occupied: &[Rect]) -> Option<Rect> {
            let half = self.box_size / 2.0;
            let rect = Rect::new(
                Coord {
                    x: label.point.x - half,
                    y: label.point.y - half,
                },
                Coord {
                    x: label.point.x + half,
                    y: label.point.y + half,
                },
            );
            if self.reject_overlap && occupied.iter().any(|r| r.intersects(&rect)) {
                return None;
            }
            self.airports.push(label.id.to_string());
            Some(rect)
        }

        fn render_navaid(&mut self, _point: Coord, id: &str) {
            self.navaids.push(id.to_string());
        }

        fn eliminate_runway(&mut self, id: &RunwayId) {
            self.eliminated.push(id.to_string());
        }

        fn eliminate_airport(&mut self, id: &str) {
            self.eliminated.push(id.to_string());
        }

        fn eliminate_navaid(&mut self, id: &str) {
            self.eliminated.push(id.to_string());
        }
    }

    fn frame_at<'a>(view: &'a ViewScreen, config: &'a Config, lat: f64, lng: f64) -> Frame<'a> {
        Frame {
            view,
            config,
            viewer: Point::new(lng, lat),
            ground_ft: 0.0,
        }
    }

    #[test]
    fn test_clip_rect_grows_by_margin() {
        let config = Config::default().with_display(200.0, 100.0).with_clip_margin(0.5);
        let view = ViewScreen::compute(0.0, 0.0, 1000.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 0.0, 0.0);
        let clip = frame.clip_rect();
        assert_abs_diff_eq!(clip.min().x, -200.0);
        assert_abs_diff_eq!(clip.max().y, 100.0);
    }

    #[test]
    fn test_runway_corners_and_span() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);

        let mut primary = runway("RW36", 47.05, -122.0);
        let mut opposite = runway("RW18", 47.07, -122.0);
        primary.opposing = Some(opposite.id());
        opposite.opposing = Some(primary.id());

        let strip = frame
            .runway_view(&primary, &opposite, &frame.clip_rect())
            .expect("runway straight ahead is visible");
        assert_eq!(strip.id, primary.id());
        // Heading north: the left side is west, so to the left on screen.
        assert!(strip.p11.x < strip.p12.x);
        assert!(strip.p21.x < strip.p22.x);
        // The far end is higher on the screen.
        assert!(strip.p21.y > strip.p11.y);
        assert_abs_diff_eq!(strip.touchdown_distance_nm, 3.0, epsilon = 0.01);

        let strict = Config::default().with_min_runway_pixels(10_000.0);
        let frame = frame_at(&view, &strict, 47.0, -122.0);
        assert!(frame.runway_view(&primary, &opposite, &frame.clip_rect()).is_none());
    }

    #[test]
    fn test_runway_behind_is_clipped() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);
        let primary = runway("RW36", 46.95, -122.0);
        let opposite = runway("RW18", 46.97, -122.0);
        assert!(frame.runway_view(&primary, &opposite, &frame.clip_rect()).is_none());
    }

    #[test]
    fn test_runway_off_to_the_side_is_clipped() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);
        let clip = frame.clip_rect();

        // Ahead of the viewer but far to the east: both ends project.
        let primary = runway("RW36", 47.05, -121.7);
        let opposite = runway("RW18", 47.07, -121.7);
        let near = frame.project(&primary.location).unwrap();
        let far = frame.project(&opposite.location).unwrap();
        assert!(!clip.intersects(&near));
        assert!(!clip.intersects(&far));

        assert!(frame.runway_view(&primary, &opposite, &clip).is_none());
    }

    #[test]
    fn test_runway_with_one_end_on_screen_is_kept() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);
        let clip = frame.clip_rect();

        let primary = runway("RW36", 47.05, -122.0);
        let opposite = runway("RW18", 47.10, -121.7);
        assert!(clip.intersects(&frame.project(&primary.location).unwrap()));
        assert!(!clip.intersects(&frame.project(&opposite.location).unwrap()));

        let strip = frame
            .runway_view(&primary, &opposite, &clip)
            .expect("one threshold on screen keeps the strip");
        assert_eq!(strip.id, primary.id());
    }

    #[test]
    fn test_eliminates_what_is_no_longer_drawn() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);

        let mut previous = DrawnSet::default();
        previous.insert(Drawn::Airport("KOLD".into()));
        previous.insert(Drawn::Navaid("OLD".into()));

        let mut sink = Recorder::default();
        let drawn = frame.draw(&ObjectCache::new(), &previous, &mut sink);
        assert!(drawn.is_empty());
        sink.eliminated.sort();
        assert_eq!(sink.eliminated, vec!["KOLD", "OLD"]);
    }

    #[test]
    fn test_nearest_label_wins_overlap() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);
        let clip = frame.clip_rect();

        let near = Airport {
            id: "KNEA".into(),
            icao_region: "K1".into(),
            name: "NEAR".into(),
            location: Point::new(-122.0, 47.1),
            magnetic_variation: 0.0,
            elevation_ft: 0.0,
        };
        // Same bearing, further out: its anchor lands inside the near box.
        let navaid = Navaid {
            id: "FAR".into(),
            name: "FAR".into(),
            location: Point::new(-122.0, 47.1005),
            magnetic_deviation: 0.0,
        };
        let mut cache = ObjectCache::new();
        let mut source = Fixed(vec![GeoObject::Navaid(navaid), GeoObject::Airport(near)]);
        cache.ensure_window(CellKey::new(47, -122), &mut source).unwrap();

        let mut sink = Recorder {
            box_size: 40.0,
            ..Default::default()
        };
        let mut drawn = DrawnSet::default();
        frame.draw_labels(&cache, &clip, &mut drawn, &mut sink);
        assert_eq!(sink.airports, vec!["KNEA"]);
        assert!(sink.navaids.is_empty());
        assert_eq!(drawn.len(), 1);
    }

    #[test]
    fn test_sink_can_refuse_overlapping_box() {
        let config = Config::default();
        let view = ViewScreen::compute(47.0, -122.0, 1500.0, 0.0, config.screen_distance()).unwrap();
        let frame = frame_at(&view, &config, 47.0, -122.0);
        let clip = frame.clip_rect();

        let airport = |id: &str, lng: f64| Airport {
            id: id.into(),
            icao_region: "K1".into(),
            name: id.into(),
            location: Point::new(lng, 47.1),
            magnetic_variation: 0.0,
            elevation_ft: 0.0,
        };
        let near = airport("KNEA", -122.0);
        let beside = airport("KBES", -121.999);
        let (Some(a), Some(b)) = (frame.project(&near.location), frame.project(&beside.location)) else {
            panic!("both airports are ahead");
        };
        let gap = (b.x - a.x).abs();
        assert!(gap > 0.0);

        let mut cache = ObjectCache::new();
        let mut source = Fixed(vec![GeoObject::Airport(beside), GeoObject::Airport(near)]);
        cache.ensure_window(CellKey::new(47, -122), &mut source).unwrap();

        // Boxes wider than the gap overlap while neither anchor is covered.
        let mut sink = Recorder {
            box_size: gap * 1.5,
            reject_overlap: true,
            ..Default::default()
        };
        let mut drawn = DrawnSet::default();
        frame.draw_labels(&cache, &clip, &mut drawn, &mut sink);
        assert_eq!(sink.airports, vec!["KNEA"]);
        assert_eq!(drawn.len(), 1);
        assert!(drawn.contains(&Drawn::Airport("KNEA".into())));
    }

    /// Hands out the same objects for the centre cell only.
    struct Fixed(Vec<GeoObject>);

    impl ObjectSource for Fixed {
        fn find_objects(&mut self, lat: f64, lng: f64) -> Result<Vec<GeoObject>> {
            if (lat, lng) == (47.0, -122.0) {
                Ok(self.0.clone())
            } else {
                Ok(Vec::new())
            }
        }
    }

    fn runway(name: &str, lat: f64, lng: f64) -> Runway {
        Runway {
            airport_id: "KTST".into(),
            name: name.into(),
            location: Point::new(lng, lat),
            length_ft: 7300.0,
            bearing_deg: if name == "RW36" { 0.0 } else { 180.0 },
            elevation_ft: 0.0,
            width_ft: Some(150.0),
            opposing: None,
        }
    }
}
