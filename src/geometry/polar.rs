use super::Point3;
use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Below this polar angle a direction is treated as pointing straight up and
/// its azimuth is pinned to zero.
const POLE_TOLERANCE: f64 = 1e-6;

/// How `theta` and `phi` of a [`Polar`] are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolarConvention {
    /// `theta` is the azimuth from +x in the xy-plane, `phi` the polar angle
    /// from +z. Geodetic positions use this with `theta = longitude` and
    /// `phi = 90° - latitude`.
    #[default]
    Absolute,
    /// Instrument convention: `theta` is the azimuth rotated by -90° (0 along
    /// +y), `phi` the elevation above the xy-plane. Azimuths are folded into
    /// `[-π/2, π/2]` by going over the top, which flips the elevation.
    Robot,
}

/// Spherical representation of a 3D point. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Polar {
    pub theta: f64,
    pub phi: f64,
    pub radius: f64,
}

impl Polar {
    pub const fn new(theta: f64, phi: f64, radius: f64) -> Self {
        Self { theta, phi, radius }
    }

    /// Absolute-convention coordinates of a geodetic position.
    pub fn from_geodetic(lat_deg: f64, lng_deg: f64, radius: f64) -> Self {
        Self {
            theta: lng_deg.to_radians(),
            phi: (90.0 - lat_deg).to_radians(),
            radius,
        }
    }

    /// Latitude and longitude in degrees of an absolute-convention value.
    pub fn to_geodetic(&self) -> (f64, f64) {
        (90.0 - self.phi.to_degrees(), self.theta.to_degrees())
    }

    pub fn from_cartesian(point: &Point3, convention: PolarConvention) -> Self {
        let radius = point.norm();
        if radius == 0.0 {
            return Self::default();
        }

        let polar_angle = (point.z / radius).clamp(-1.0, 1.0).acos();
        match convention {
            PolarConvention::Absolute => Self {
                theta: point.y.atan2(point.x),
                phi: polar_angle,
                radius,
            },
            PolarConvention::Robot => {
                let mut phi = FRAC_PI_2 - polar_angle;
                if polar_angle.abs() < POLE_TOLERANCE {
                    return Self {
                        theta: 0.0,
                        phi,
                        radius,
                    };
                }

                let mut theta = wrap_angle(point.y.atan2(point.x) - FRAC_PI_2);
                if theta.abs() > FRAC_PI_2 {
                    phi = wrap_angle(PI - phi);
                    theta -= PI.copysign(theta);
                }
                Self { theta, phi, radius }
            }
        }
    }

    pub fn to_cartesian(&self, convention: PolarConvention) -> Point3 {
        let (theta, phi) = match convention {
            PolarConvention::Absolute => (self.theta, self.phi),
            PolarConvention::Robot => (self.theta + FRAC_PI_2, FRAC_PI_2 - self.phi),
        };
        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        Point3::new(
            self.radius * sin_phi * cos_theta,
            self.radius * sin_phi * sin_theta,
            self.radius * cos_phi,
        )
    }
}

/// Wraps an angle into `(-π, π]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}
