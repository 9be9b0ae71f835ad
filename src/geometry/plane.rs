use super::Point3;
use crate::error::{Result, SynvisError};

/// Rays closer to parallel than this are treated as missing the plane.
const PARALLEL_TOLERANCE: f64 = 1e-12;

/// Half-line starting at `origin` along the unit vector `dir`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Point3,
    pub dir: Point3,
}

impl Ray {
    /// Build a ray from an origin and a direction; the direction is normalised.
    pub fn new(origin: Point3, dir: Point3) -> Result<Self> {
        let dir = dir
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("ray direction has zero length"))?;
        Ok(Self { origin, dir })
    }

    /// Ray from `origin` through `target`.
    pub fn through(origin: Point3, target: Point3) -> Result<Self> {
        Self::new(origin, target - origin)
    }

    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.dir * t
    }
}

/// Plane `normal · p = c` with a unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Point3,
    pub c: f64,
}

impl Plane {
    pub fn from_point_normal(point: Point3, normal: Point3) -> Result<Self> {
        let normal = normal
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("plane normal has zero length"))?;
        Ok(Self {
            normal,
            c: normal.dot(&point),
        })
    }

    /// Plane through three points. Collinear points do not define a plane.
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Result<Self> {
        let normal = (b - a)
            .cross(&(c - a))
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("plane points are collinear"))?;
        Ok(Self {
            normal,
            c: normal.dot(&a),
        })
    }

    /// Signed distance from the plane, positive on the side the normal faces.
    pub fn distance(&self, point: &Point3) -> f64 {
        self.normal.dot(point) - self.c
    }

    /// Solve `c = normal · (origin + t·dir)` for `t`.
    ///
    /// With `allow_behind` false, hits behind the ray origin (`t < 0`) are
    /// reported as [`SynvisError::NoIntersection`].
    pub fn intersect(&self, ray: &Ray, allow_behind: bool) -> Result<f64> {
        let denom = self.normal.dot(&ray.dir);
        if denom.abs() < PARALLEL_TOLERANCE {
            return Err(SynvisError::NoIntersection);
        }

        let t = (self.c - self.normal.dot(&ray.origin)) / denom;
        if !t.is_finite() || (!allow_behind && t < 0.0) {
            return Err(SynvisError::NoIntersection);
        }
        Ok(t)
    }

    /// Point where `ray` meets the plane.
    pub fn intersection_point(&self, ray: &Ray, allow_behind: bool) -> Result<Point3> {
        self.intersect(ray, allow_behind).map(|t| ray.at(t))
    }
}
