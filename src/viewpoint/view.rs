//! The virtual screen the outside world is projected onto.
//!
//! Positions are Earth-centred Cartesian points in feet. The screen plane
//! sits `screen_distance` in front of the eye along the look direction, so a
//! point's offset on the plane comes out in display pixels.

use super::EARTH_RADIUS_FT;
use crate::error::{Result, SynvisError};
use crate::geometry::{Point3, Polar, PolarConvention, Ray, Screen};

/// Below this length the local east vector is considered to have vanished.
const POLE_TOLERANCE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewScreen {
    /// Eye position.
    pub position: Point3,
    pub up: Point3,
    pub east: Point3,
    pub north: Point3,
    /// Horizontal unit vector along the true heading.
    pub forward: Point3,
    /// `forward` tipped down by [`Self::declination`].
    pub look: Point3,
    /// Angle below the local horizontal to the visible horizon, radians.
    pub declination: f64,
    pub screen: Screen,
}

impl ViewScreen {
    /// Build the screen for an eye at `altitude_ft` above mean sea level.
    ///
    /// The look direction dips below the horizontal by the angle to the sea
    /// level horizon; terrain under the eye does not move it.
    ///
    /// Fails with [`SynvisError::DegenerateGeometry`] straight above a pole,
    /// where east and north are undefined.
    pub fn compute(
        lat: f64,
        lng: f64,
        altitude_ft: f64,
        heading_deg: f64,
        screen_distance: f64,
    ) -> Result<Self> {
        let position = geodetic_point(lat, lng, altitude_ft);
        let up = position
            .normalized()
            .ok_or(SynvisError::DegenerateGeometry("viewpoint at the Earth's centre"))?;

        let east = Point3::Z_AXIS.cross(&up);
        let east_len = east.norm();
        if east_len < POLE_TOLERANCE {
            return Err(SynvisError::DegenerateGeometry("viewpoint above a pole"));
        }
        let east = east * (1.0 / east_len);
        let north = up.cross(&east);

        let (sin_h, cos_h) = heading_deg.to_radians().sin_cos();
        let forward = north * cos_h + east * sin_h;

        let ratio = EARTH_RADIUS_FT / (EARTH_RADIUS_FT + altitude_ft);
        let declination = ratio.clamp(-1.0, 1.0).acos();
        let look = forward * declination.cos() - up * declination.sin();

        let right = forward.cross(&up);
        let screen = Screen::from_center(position + look * screen_distance, look, right)?;

        Ok(Self {
            position,
            up,
            east,
            north,
            forward,
            look,
            declination,
            screen,
        })
    }

    /// Screen coordinates of `target`. Fails for points behind the eye.
    pub fn project(&self, target: &Point3) -> Result<(f64, f64)> {
        let ray = Ray::through(self.position, *target)?;
        self.screen.project(&ray)
    }

    /// Look vector in the local east/north/up frame, in the robot
    /// convention: `theta` is 0 looking north, `phi` the elevation.
    pub fn look_direction(&self) -> Polar {
        let local = Point3::new(
            self.look.dot(&self.east),
            self.look.dot(&self.north),
            self.look.dot(&self.up),
        );
        Polar::from_cartesian(&local, PolarConvention::Robot)
    }
}

/// Earth-centred point of a geodetic position `height_ft` above sea level.
pub fn geodetic_point(lat: f64, lng: f64, height_ft: f64) -> Point3 {
    Polar::from_geodetic(lat, lng, EARTH_RADIUS_FT + height_ft).to_cartesian(PolarConvention::Absolute)
}
