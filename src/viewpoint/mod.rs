//! The viewpoint engine.
//!
//! A [`Viewpoint`] owns the object cache around the aircraft and the view
//! screen the world is projected onto. The host feeds it position and
//! heading updates at whatever rate it likes; the screen is recomputed at
//! most once per configured interval, and [`Viewpoint::render`] turns the
//! latest screen into calls on a [`RenderSink`].
//!
//! ```text
//! Idle --initialize--> Fresh --render--> Rendered
//!                        ^                  |
//!                        |   update_*       v
//!                        +---(interval)-- Stale
//! ```

mod cache;
mod render;
mod view;

pub use cache::{CellKey, ObjectCache};
pub use render::{AirportLabel, RenderSink, RunwayView};
pub use view::{ViewScreen, geodetic_point};

use crate::config::Config;
use crate::database::ObjectSource;
use crate::error::{Result, SynvisError};
use crate::geometry::Polar;
use crate::navigation::course;
use geo::{Coord, Point};
use render::{DrawnSet, Frame};
use std::time::Instant;

/// Earth radius in feet.
pub const EARTH_RADIUS_FT: f64 = 20_902_231.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    /// No view screen yet.
    Idle,
    /// Position or heading changed inside the throttle window; the screen
    /// is out of date.
    Stale,
    /// The screen was recomputed and a render pass is due.
    Fresh,
    /// Screen valid, nothing pending.
    Rendered,
}

pub struct Viewpoint {
    config: Config,
    source: Box<dyn ObjectSource>,
    cache: ObjectCache,
    lat: f64,
    lng: f64,
    altitude_ft: f64,
    heading_deg: f64,
    phase: ViewPhase,
    /// Set on every recompute, cleared by a render pass.
    render_due: bool,
    last_recompute: Option<Instant>,
    view: Option<ViewScreen>,
    approx_elevation_ft: f64,
    drawn: DrawnSet,
}

impl Viewpoint {
    /// Engine over any record source. See [`crate::ViewpointBuilder`] for the
    /// usual file-backed setup.
    pub fn with_source(config: Config, source: Box<dyn ObjectSource>) -> Result<Self> {
        config.validate().map_err(SynvisError::InvalidConfig)?;
        Ok(Self {
            config,
            source,
            cache: ObjectCache::new(),
            lat: 0.0,
            lng: 0.0,
            altitude_ft: 0.0,
            heading_deg: 0.0,
            phase: ViewPhase::Idle,
            render_due: false,
            last_recompute: None,
            view: None,
            approx_elevation_ft: 0.0,
            drawn: DrawnSet::default(),
        })
    }

    /// Place the viewer and compute the first view screen, ignoring the
    /// throttle.
    pub fn initialize(&mut self, lat: f64, lng: f64, altitude_ft: f64, heading_deg: f64) -> Result<()> {
        self.lat = lat;
        self.lng = lng;
        self.altitude_ft = altitude_ft;
        self.heading_deg = heading_deg;
        self.refresh_cache()?;
        self.recompute()?;
        log::info!(
            "Viewpoint initialized at ({:.4}, {:.4}), {:.0} ft, heading {:.0}",
            lat,
            lng,
            altitude_ft,
            heading_deg
        );
        Ok(())
    }

    /// Move the viewer. Returns whether the view screen was recomputed.
    ///
    /// Before [`Self::initialize`] this only records the position.
    pub fn update_position(&mut self, lat: f64, lng: f64, altitude_ft: f64) -> Result<bool> {
        self.lat = lat;
        self.lng = lng;
        self.altitude_ft = altitude_ft;
        if self.phase == ViewPhase::Idle {
            return Ok(false);
        }
        self.refresh_cache()?;
        self.request_recompute()
    }

    /// Turn the viewer. Returns whether the view screen was recomputed.
    pub fn update_heading(&mut self, heading_deg: f64) -> Result<bool> {
        self.heading_deg = heading_deg;
        if self.phase == ViewPhase::Idle {
            return Ok(false);
        }
        self.request_recompute()
    }

    /// Drop cached cells outside the window around the viewer. Returns how
    /// many were dropped.
    pub fn collect_garbage(&mut self) -> usize {
        let dropped = self.cache.collect_garbage(self.center_cell());
        if dropped > 0 {
            self.approx_elevation_ft = self.estimate_elevation();
        }
        dropped
    }

    /// Screen position of a geodetic point, or `None` if it cannot be
    /// projected (no screen yet, or the point is behind the viewer).
    pub fn point2d(&self, lat: f64, lng: f64) -> Option<Coord> {
        let view = self.view.as_ref()?;
        self.frame(view).project(&Point::new(lng, lat))
    }

    /// Run a render pass if one is due. Returns whether anything was handed
    /// to the sink.
    ///
    /// A pass in the `Stale` phase first retries the deferred recompute. If
    /// the throttle still holds, a pass due from the last recompute is
    /// drawn with the screen at hand.
    pub fn render<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<bool> {
        if self.phase == ViewPhase::Stale && self.throttle_elapsed() {
            self.recompute()?;
        }
        if !self.render_due {
            return Ok(false);
        }
        let Some(view) = self.view.as_ref() else {
            return Ok(false);
        };

        let drawn = self.frame(view).draw(&self.cache, &self.drawn, sink);
        self.drawn = drawn;
        self.render_due = false;
        if self.phase == ViewPhase::Fresh {
            self.phase = ViewPhase::Rendered;
        }
        Ok(true)
    }

    /// Current look direction, see [`ViewScreen::look_direction`].
    pub fn look_direction(&self) -> Option<Polar> {
        self.view.as_ref().map(ViewScreen::look_direction)
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// `(lat, lng, altitude_ft)` of the viewer.
    pub fn position(&self) -> (f64, f64, f64) {
        (self.lat, self.lng, self.altitude_ft)
    }

    pub fn heading(&self) -> f64 {
        self.heading_deg
    }

    /// Ground elevation under the viewer, taken from the nearest cached
    /// runway.
    pub fn approx_elevation_ft(&self) -> f64 {
        self.approx_elevation_ft
    }

    pub fn view_screen(&self) -> Option<&ViewScreen> {
        self.view.as_ref()
    }

    pub fn cache(&self) -> &ObjectCache {
        &self.cache
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn frame<'a>(&'a self, view: &'a ViewScreen) -> Frame<'a> {
        Frame {
            view,
            config: &self.config,
            viewer: Point::new(self.lng, self.lat),
            ground_ft: self.approx_elevation_ft,
        }
    }

    fn center_cell(&self) -> CellKey {
        CellKey::nearest(self.lat, self.lng)
    }

    fn refresh_cache(&mut self) -> Result<()> {
        let center = self.center_cell();
        self.cache.ensure_window(center, self.source.as_mut())?;
        self.approx_elevation_ft = self.estimate_elevation();
        Ok(())
    }

    fn estimate_elevation(&self) -> f64 {
        let here = Point::new(self.lng, self.lat);
        self.cache
            .runways()
            .iter()
            .map(|r| (course(&here, &r.location).distance_nm, r.elevation_ft))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map_or(0.0, |(_, elevation)| elevation)
    }

    fn throttle_elapsed(&self) -> bool {
        self.last_recompute
            .is_none_or(|at| at.elapsed() >= self.config.min_recompute_interval())
    }

    fn request_recompute(&mut self) -> Result<bool> {
        if self.throttle_elapsed() {
            self.recompute()?;
            Ok(true)
        } else {
            self.phase = ViewPhase::Stale;
            Ok(false)
        }
    }

    fn recompute(&mut self) -> Result<()> {
        let computed = ViewScreen::compute(
            self.lat,
            self.lng,
            self.altitude_ft,
            self.heading_deg,
            self.config.screen_distance(),
        );
        match computed {
            Ok(view) => self.view = Some(view),
            Err(SynvisError::DegenerateGeometry(reason)) if self.view.is_some() => {
                log::debug!("Keeping previous view screen: {}", reason);
            }
            Err(e) => return Err(e),
        }
        self.last_recompute = Some(Instant::now());
        self.phase = ViewPhase::Fresh;
        self.render_due = true;
        Ok(())
    }
}

impl std::fmt::Debug for Viewpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Viewpoint")
            .field("lat", &self.lat)
            .field("lng", &self.lng)
            .field("altitude_ft", &self.altitude_ft)
            .field("heading_deg", &self.heading_deg)
            .field("phase", &self.phase)
            .field("cached_cells", &self.cache.cell_count())
            .finish_non_exhaustive()
    }
}
