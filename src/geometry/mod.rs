//! Vector, ray, plane and screen primitives.
//!
//! Pure math with no I/O. The viewpoint engine builds its projection out of
//! these: a [`Screen`] is a [`Plane`] with an orthonormal basis, and
//! projecting a world point means casting a [`Ray`] from the eye onto it.

mod plane;
mod point;
mod polar;
mod screen;

pub use plane::{Plane, Ray};
pub use point::Point3;
pub use polar::{Polar, PolarConvention};
pub use screen::Screen;
