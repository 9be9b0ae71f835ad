//! Synthetic-vision core: projects nearby airports, runways and navaids from
//! a fixed-column navigation database onto a virtual screen in front of the
//! aircraft.
//!
//! ```rust,no_run
//! use synvis::{ViewpointBuilder, index_db};
//!
//! index_db("navdata.dat", "navdata.idx")?;
//!
//! let mut viewpoint = ViewpointBuilder::new()
//!     .database_path("navdata.dat")
//!     .index_path("navdata.idx")
//!     .display(800.0, 600.0)
//!     .build()?;
//! viewpoint.initialize(47.45, -122.31, 3000.0, 160.0)?;
//!
//! if let Some(p) = viewpoint.point2d(47.43, -122.30) {
//!     println!("threshold at ({:.0}, {:.0}) px", p.x, p.y);
//! }
//! # Ok::<(), synvis::SynvisError>(())
//! ```

pub mod builder;
pub mod config;
pub mod database;
pub mod error;
pub mod geometry;
pub mod index;
pub mod navigation;
pub mod records;
pub mod viewpoint;

pub use builder::ViewpointBuilder;
pub use config::Config;
pub use database::{NavDatabase, ObjectSource};
pub use error::{Result, SynvisError};

pub use geo::{Coord, Point, Rect};

pub use index::{Index, IndexNode, IndexReader, IndexStats, index_db};

pub use navigation::{Course, course, offset};

pub use records::{
    Airport, GeoObject, Navaid, ObjectKind, RouteNode, Runway, RunwayId, pair_runways,
    parse_record,
};

pub use viewpoint::{
    AirportLabel, EARTH_RADIUS_FT, RenderSink, RunwayView, ViewPhase, Viewpoint,
};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{Config, Result, SynvisError, ViewpointBuilder};

    pub use geo::{Coord, Point, Rect};

    pub use crate::{AirportLabel, RenderSink, RunwayView, ViewPhase, Viewpoint};

    pub use crate::{GeoObject, RunwayId, index_db};

    pub use std::time::Duration;
}
