//! Locally-flat heading and distance between geodetic points.
//!
//! Longitude deltas are scaled by the cosine of latitude and the result is
//! treated as a flat grid where one degree of latitude is 60 NM. That only
//! holds over short hops, so anything longer than a third of a degree in
//! either axis is walked in sub-third-degree hops.

use geo::Point;

/// One degree of latitude in nautical miles.
pub const NM_PER_DEGREE: f64 = 60.0;

pub const FEET_PER_NM: f64 = 6076.12;

/// Largest raw delta, in degrees, the flat formula is applied to directly.
pub const MAX_HOP_DEGREES: f64 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Course {
    /// True heading in degrees, `[0, 360)`.
    pub heading_deg: f64,
    pub distance_nm: f64,
}

/// Heading and distance from `from` to `to` (x = longitude, y = latitude).
pub fn course(from: &Point, to: &Point) -> Course {
    let dlat = to.y() - from.y();
    let dlng = wrap_longitude(to.x() - from.x());

    if dlat.abs() <= MAX_HOP_DEGREES && dlng.abs() <= MAX_HOP_DEGREES {
        return flat_course(from.y(), dlat, dlng);
    }

    let hops = (dlat.abs().max(dlng.abs()) * 3.0).ceil() as usize;
    let mut heading_deg = 0.0;
    let mut distance_nm = 0.0;
    for hop in 0..hops {
        let start = hop as f64 / hops as f64;
        let lat = from.y() + dlat * start;
        let hop_course = flat_course(lat, dlat / hops as f64, dlng / hops as f64);
        if hop == 0 {
            heading_deg = hop_course.heading_deg;
        }
        distance_nm += hop_course.distance_nm;
    }

    Course {
        heading_deg,
        distance_nm,
    }
}

/// Point reached from `from` after `distance_nm` along `bearing_deg`.
///
/// Inverse of [`course`] for short distances.
pub fn offset(from: &Point, bearing_deg: f64, distance_nm: f64) -> Point {
    let (sin_b, cos_b) = bearing_deg.to_radians().sin_cos();
    let dlat = distance_nm * cos_b / NM_PER_DEGREE;
    let lat_mid = from.y() + dlat / 2.0;
    let cos_lat = lat_mid.to_radians().cos();
    let dlng = if cos_lat.abs() < f64::EPSILON {
        0.0
    } else {
        distance_nm * sin_b / (NM_PER_DEGREE * cos_lat)
    };
    Point::new(wrap_longitude(from.x() + dlng), from.y() + dlat)
}

fn flat_course(lat_start: f64, dlat: f64, dlng: f64) -> Course {
    let lat_mid = lat_start + dlat / 2.0;
    let scaled_dlng = dlng * lat_mid.to_radians().cos();
    Course {
        heading_deg: scaled_dlng.atan2(dlat).to_degrees().rem_euclid(360.0),
        distance_nm: NM_PER_DEGREE * (scaled_dlng * scaled_dlng + dlat * dlat).sqrt(),
    }
}

/// Wraps a longitude (or longitude delta) into `[-180, 180)`.
pub fn wrap_longitude(lng: f64) -> f64 {
    (lng + 180.0).rem_euclid(360.0) - 180.0
}
