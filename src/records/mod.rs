//! Navigation records parsed from the fixed-column database.
//!
//! Every record the viewpoint engine can place is a [`GeoObject`]; its
//! [`ObjectKind`] drives filtering and render dispatch.

mod pairing;
mod parser;

pub use pairing::{pair_runways, runways_match};
pub use parser::{
    make_float, parse_latitude, parse_longitude, parse_reader, parse_record, record_kind,
};

#[cfg(test)]
pub(crate) use parser::tests as parser_fixtures;

use geo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Airport,
    Runway,
    Navaid,
    RouteNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    /// ICAO identifier, e.g. `KSEA`.
    pub id: String,
    pub icao_region: String,
    pub name: String,
    /// Airport reference point (x = longitude, y = latitude).
    pub location: Point,
    pub magnetic_variation: f64,
    pub elevation_ft: f64,
}

/// Key of a runway end: the weak reference used for `opposing`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunwayId {
    pub airport_id: String,
    pub name: String,
}

impl fmt::Display for RunwayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.airport_id, self.name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parallel {
    Left,
    Right,
    Center,
}

/// Runway number and parallel suffix, e.g. `03L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Designator {
    pub number: u8,
    pub parallel: Option<Parallel>,
}

impl Designator {
    /// Parse `RW03L`, `03L` or `3`. Numbers outside 1..=36 are rejected.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        let name = name.strip_prefix("RW").unwrap_or(name);
        let digits_end = name
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(name.len());
        let number: u8 = name[..digits_end].parse().ok()?;
        if !(1..=36).contains(&number) {
            return None;
        }
        let parallel = match name[digits_end..].trim() {
            "" => None,
            "L" => Some(Parallel::Left),
            "R" => Some(Parallel::Right),
            "C" => Some(Parallel::Center),
            _ => return None,
        };
        Some(Self { number, parallel })
    }

    /// The designator painted on the other end of the same strip.
    pub fn reciprocal(&self) -> Self {
        let number = (self.number + 18 - 1) % 36 + 1;
        let parallel = match self.parallel {
            Some(Parallel::Left) => Some(Parallel::Right),
            Some(Parallel::Right) => Some(Parallel::Left),
            other => other,
        };
        Self { number, parallel }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Runway {
    pub airport_id: String,
    /// Runway identifier as stored, e.g. `RW03L`.
    pub name: String,
    /// Threshold position.
    pub location: Point,
    pub length_ft: f64,
    pub bearing_deg: f64,
    pub elevation_ft: f64,
    pub width_ft: Option<f64>,
    /// The other end of the strip, once pairing has found it.
    pub opposing: Option<RunwayId>,
}

impl Runway {
    pub fn id(&self) -> RunwayId {
        RunwayId {
            airport_id: self.airport_id.clone(),
            name: self.name.clone(),
        }
    }

    pub fn designator(&self) -> Option<Designator> {
        Designator::parse(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Navaid {
    pub id: String,
    pub name: String,
    pub location: Point,
    pub magnetic_deviation: f64,
}

/// One leg of an enroute airway.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteNode {
    pub route_id: String,
    pub sequence: u16,
    /// Fix the leg starts from.
    pub navaid_id: String,
    pub outbound_course_deg: Option<f64>,
    pub inbound_course_deg: Option<f64>,
    pub distance_nm: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeoObject {
    Airport(Airport),
    Runway(Runway),
    Navaid(Navaid),
    RouteNode(RouteNode),
}

impl GeoObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            GeoObject::Airport(_) => ObjectKind::Airport,
            GeoObject::Runway(_) => ObjectKind::Runway,
            GeoObject::Navaid(_) => ObjectKind::Navaid,
            GeoObject::RouteNode(_) => ObjectKind::RouteNode,
        }
    }

    /// Position of the object. Route legs carry none of their own.
    pub fn location(&self) -> Option<Point> {
        match self {
            GeoObject::Airport(a) => Some(a.location),
            GeoObject::Runway(r) => Some(r.location),
            GeoObject::Navaid(n) => Some(n.location),
            GeoObject::RouteNode(_) => None,
        }
    }

    pub fn as_runway(&self) -> Option<&Runway> {
        match self {
            GeoObject::Runway(r) => Some(r),
            _ => None,
        }
    }
}
