//! Fixed-column record parsing.
//!
//! Column ranges are 0-based, end-exclusive byte offsets into a line.

use super::{Airport, GeoObject, Navaid, ObjectKind, RouteNode, Runway};
use crate::error::{Result, SynvisError};
use geo::Point;
use std::io::BufRead;
use std::ops::Range;

const SECTION: usize = 4;
const SUBSECTION: usize = 5;
const AIRPORT_SUBSECTION: usize = 12;
const CONTINUATION: usize = 21;

const AIRPORT_ID: Range<usize> = 6..10;
const ICAO_REGION: Range<usize> = 10..12;
const LATITUDE: Range<usize> = 32..41;
const LONGITUDE: Range<usize> = 41..51;
const NAME: Range<usize> = 93..123;

const APT_MAG_VAR: Range<usize> = 51..56;
const APT_ELEVATION: Range<usize> = 56..61;

const RWY_NAME: Range<usize> = 13..18;
const RWY_LENGTH: Range<usize> = 22..27;
const RWY_BEARING: Range<usize> = 27..31;
const RWY_ELEVATION: Range<usize> = 66..71;
const RWY_WIDTH: Range<usize> = 77..80;

const NAV_ID: Range<usize> = 13..17;
const NAV_DME_LATITUDE: Range<usize> = 55..64;
const NAV_DME_LONGITUDE: Range<usize> = 64..74;
const NAV_DECLINATION: Range<usize> = 74..79;

const ROUTE_ID: Range<usize> = 13..18;
const ROUTE_SEQUENCE: Range<usize> = 25..29;
const ROUTE_FIX: Range<usize> = 29..34;
const ROUTE_OUTBOUND: Range<usize> = 70..74;
const ROUTE_DISTANCE: Range<usize> = 74..78;
const ROUTE_INBOUND: Range<usize> = 78..82;

/// Insert a decimal point after `int_digits` leading digits and parse.
///
/// `make_float("201595", 2)` is `20.1595`. A leading `+`/`-` is kept and not
/// counted as a digit.
pub fn make_float(text: &str, int_digits: usize) -> Option<f64> {
    let text = text.trim();
    let (sign, digits) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let split = int_digits.min(digits.len());
    let value: f64 = format!("{}.{}", &digits[..split], &digits[split..])
        .trim_end_matches('.')
        .parse()
        .ok()?;
    Some(sign * value)
}

/// Parse `[NS]DDMMSSss` into signed decimal degrees.
pub fn parse_latitude(text: &str) -> Option<f64> {
    parse_coordinate(text, 2, b'N', b'S')
}

/// Parse `[EW]DDDMMSSss` into signed decimal degrees.
pub fn parse_longitude(text: &str) -> Option<f64> {
    parse_coordinate(text, 3, b'E', b'W')
}

fn parse_coordinate(text: &str, degree_digits: usize, positive: u8, negative: u8) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() != 1 + degree_digits + 6 {
        return None;
    }
    let sign = match bytes[0] {
        b if b == positive => 1.0,
        b if b == negative => -1.0,
        _ => return None,
    };
    let body = &text[1..];
    if !body.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let degrees: f64 = body[..degree_digits].parse().ok()?;
    let minutes: f64 = body[degree_digits..degree_digits + 2].parse().ok()?;
    let seconds = make_float(&body[degree_digits + 2..], 2)?;
    if minutes >= 60.0 || seconds >= 60.0 {
        return None;
    }
    Some(sign * (degrees + minutes / 60.0 + seconds / 3600.0))
}

/// `[EW]dddd` in tenths of a degree, west negative. Blank is zero.
fn parse_variation(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    let (sign, digits) = match text.as_bytes()[0] {
        b'E' => (1.0, &text[1..]),
        b'W' => (-1.0, &text[1..]),
        // True-north referenced stations carry no variation.
        b'T' => return Some(0.0),
        _ => return None,
    };
    make_float(digits, 3).map(|v| sign * v)
}

/// Kind of record on this line, or `None` if the line is something else.
pub fn record_kind(line: &str) -> Option<ObjectKind> {
    let bytes = line.as_bytes();
    let at = |i: usize| bytes.get(i).copied();
    match (at(SECTION), at(SUBSECTION), at(AIRPORT_SUBSECTION)) {
        (Some(b'P'), _, Some(b'A')) => Some(ObjectKind::Airport),
        (Some(b'P'), _, Some(b'G')) => Some(ObjectKind::Runway),
        (Some(b'D'), Some(b' ' | b'B'), _) => Some(ObjectKind::Navaid),
        (Some(b'E'), Some(b'R'), _) => Some(ObjectKind::RouteNode),
        _ => None,
    }
}

/// Parse one database line.
///
/// Returns `Ok(None)` for lines that are not one of the supported record
/// kinds (including continuation records) and a parse error for lines that
/// claim a kind but do not fit its columns.
pub fn parse_record(line: &str) -> Result<Option<GeoObject>> {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(kind) = record_kind(line) else {
        return Ok(None);
    };

    if kind != ObjectKind::RouteNode && !is_primary(line) {
        return Ok(None);
    }

    let object = match kind {
        ObjectKind::Airport => GeoObject::Airport(parse_airport(line)?),
        ObjectKind::Runway => GeoObject::Runway(parse_runway(line)?),
        ObjectKind::Navaid => GeoObject::Navaid(parse_navaid(line)?),
        ObjectKind::RouteNode => GeoObject::RouteNode(parse_route_node(line)?),
    };
    Ok(Some(object))
}

/// Parse every line of `reader`, logging and skipping malformed ones.
///
/// Lines are decoded lossily; bytes outside UTF-8 never end the scan.
pub fn parse_reader<R: BufRead>(mut reader: R) -> Result<Vec<GeoObject>> {
    let mut objects = Vec::new();
    let mut buf = Vec::new();
    let mut number = 0usize;
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        number += 1;
        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end_matches(['\r', '\n']);
        match parse_record(line) {
            Ok(Some(object)) => objects.push(object),
            Ok(None) => {}
            Err(e) => log::warn!("Skipping line {}: {}", number, e),
        }
    }
    Ok(objects)
}

fn is_primary(line: &str) -> bool {
    matches!(line.as_bytes().get(CONTINUATION), Some(b'0' | b'1'))
}

fn field<'a>(line: &'a str, range: Range<usize>) -> Result<&'a str> {
    line.get(range.clone())
        .ok_or_else(|| SynvisError::parse(line, format!("missing columns {:?}", range)))
}

/// Like [`field`] but tolerates lines that end early.
fn trailing_field(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    line.get(range.start.min(end)..end).unwrap_or("").trim()
}

fn required<T>(line: &str, value: Option<T>, what: &str) -> Result<T> {
    value.ok_or_else(|| SynvisError::parse(line, format!("invalid {}", what)))
}

fn location(line: &str, lat: Range<usize>, lng: Range<usize>) -> Result<Point> {
    let lat = required(line, parse_latitude(field(line, lat)?), "latitude")?;
    let lng = required(line, parse_longitude(field(line, lng)?), "longitude")?;
    Ok(Point::new(lng, lat))
}

fn integer(line: &str, range: Range<usize>, what: &str) -> Result<f64> {
    let text = field(line, range)?.trim();
    required(line, text.parse::<i32>().ok(), what).map(f64::from)
}

fn optional_integer(line: &str, range: Range<usize>, what: &str) -> Result<Option<f64>> {
    let text = trailing_field(line, range);
    if text.is_empty() {
        return Ok(None);
    }
    required(line, text.parse::<i32>().ok(), what).map(|v| Some(f64::from(v)))
}

/// Course in tenths of a degree; a `T` prefix marks a true course.
fn optional_course(line: &str, range: Range<usize>, what: &str) -> Result<Option<f64>> {
    let text = field(line, range)?.trim();
    if text.is_empty() {
        return Ok(None);
    }
    let digits = text.strip_prefix('T').unwrap_or(text);
    required(line, make_float(digits, 3), what).map(Some)
}

fn parse_airport(line: &str) -> Result<Airport> {
    Ok(Airport {
        id: field(line, AIRPORT_ID)?.trim().to_string(),
        icao_region: field(line, ICAO_REGION)?.trim().to_string(),
        location: location(line, LATITUDE, LONGITUDE)?,
        magnetic_variation: required(
            line,
            parse_variation(field(line, APT_MAG_VAR)?),
            "magnetic variation",
        )?,
        elevation_ft: integer(line, APT_ELEVATION, "elevation")?,
        name: trailing_field(line, NAME).to_string(),
    })
}

fn parse_runway(line: &str) -> Result<Runway> {
    let bearing = required(
        line,
        optional_course(line, RWY_BEARING, "runway bearing")?,
        "runway bearing",
    )?;
    Ok(Runway {
        airport_id: field(line, AIRPORT_ID)?.trim().to_string(),
        name: field(line, RWY_NAME)?.trim().to_string(),
        location: location(line, LATITUDE, LONGITUDE)?,
        length_ft: integer(line, RWY_LENGTH, "runway length")?,
        bearing_deg: bearing,
        elevation_ft: integer(line, RWY_ELEVATION, "threshold elevation")?,
        width_ft: optional_integer(line, RWY_WIDTH, "runway width")?,
        opposing: None,
    })
}

fn parse_navaid(line: &str) -> Result<Navaid> {
    let location = if field(line, LATITUDE)?.trim().is_empty() {
        location(line, NAV_DME_LATITUDE, NAV_DME_LONGITUDE)?
    } else {
        location(line, LATITUDE, LONGITUDE)?
    };
    Ok(Navaid {
        id: field(line, NAV_ID)?.trim().to_string(),
        name: trailing_field(line, NAME).to_string(),
        location,
        magnetic_deviation: required(
            line,
            parse_variation(field(line, NAV_DECLINATION)?),
            "station declination",
        )?,
    })
}

fn parse_route_node(line: &str) -> Result<RouteNode> {
    let sequence = field(line, ROUTE_SEQUENCE)?.trim();
    let distance = field(line, ROUTE_DISTANCE)?.trim();
    let distance_nm = if distance.is_empty() {
        None
    } else {
        Some(required(line, make_float(distance, 3), "leg distance")?)
    };
    Ok(RouteNode {
        route_id: field(line, ROUTE_ID)?.trim().to_string(),
        sequence: required(line, sequence.parse().ok(), "sequence number")?,
        navaid_id: field(line, ROUTE_FIX)?.trim().to_string(),
        outbound_course_deg: optional_course(line, ROUTE_OUTBOUND, "outbound course")?,
        distance_nm,
        inbound_course_deg: optional_course(line, ROUTE_INBOUND, "inbound course")?,
    })
}
