use super::{Plane, Point3, Ray};
use crate::error::{Result, SynvisError};

const BASIS_TOLERANCE: f64 = 1e-9;

/// A plane with an orthonormal in-plane basis, mapping 3D points to 2D.
///
/// Both basis rays start at the screen origin, which lies on the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Screen {
    pub plane: Plane,
    pub x_axis: Ray,
    pub y_axis: Ray,
}

impl Screen {
    pub fn new(plane: Plane, x_axis: Ray, y_axis: Ray) -> Result<Self> {
        if x_axis.origin != y_axis.origin {
            return Err(SynvisError::DegenerateGeometry(
                "screen axes must share an origin",
            ));
        }
        if plane.distance(&x_axis.origin).abs() > BASIS_TOLERANCE * plane.c.abs().max(1.0) {
            return Err(SynvisError::DegenerateGeometry(
                "screen origin is not on the plane",
            ));
        }
        if x_axis.dir.dot(&y_axis.dir).abs() > BASIS_TOLERANCE
            || x_axis.dir.dot(&plane.normal).abs() > BASIS_TOLERANCE
            || y_axis.dir.dot(&plane.normal).abs() > BASIS_TOLERANCE
        {
            return Err(SynvisError::DegenerateGeometry(
                "screen axes must be orthogonal and lie in the plane",
            ));
        }
        Ok(Self {
            plane,
            x_axis,
            y_axis,
        })
    }

    /// Screen centred on `center` facing along `normal`, with `x_dir` as the
    /// horizontal axis. The vertical axis is `x_dir × normal`.
    pub fn from_center(center: Point3, normal: Point3, x_dir: Point3) -> Result<Self> {
        let plane = Plane::from_point_normal(center, normal)?;
        let x_dir = x_dir
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("screen x axis has zero length"))?;
        let y_dir = x_dir
            .cross(&plane.normal)
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("screen x axis is parallel to its normal"))?;
        // Remove any out-of-plane component the caller's x axis carried.
        let x_dir = plane
            .normal
            .cross(&y_dir)
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("screen basis collapsed"))?;

        Self::new(
            plane,
            Ray { origin: center, dir: x_dir },
            Ray { origin: center, dir: y_dir },
        )
    }

    pub fn origin(&self) -> Point3 {
        self.x_axis.origin
    }

    /// 2D coordinates of a point lying on the screen plane.
    pub fn point2d(&self, point: &Point3) -> (f64, f64) {
        let offset = *point - self.origin();
        (offset.dot(&self.x_axis.dir), offset.dot(&self.y_axis.dir))
    }

    /// 3D point on the screen plane for 2D coordinates.
    pub fn point3d(&self, x: f64, y: f64) -> Point3 {
        self.origin() + self.x_axis.dir * x + self.y_axis.dir * y
    }

    /// Cast `ray` onto the screen. Hits behind the ray origin do not count.
    pub fn project(&self, ray: &Ray) -> Result<(f64, f64)> {
        let hit = self.plane.intersection_point(ray, false)?;
        Ok(self.point2d(&hit))
    }
}
