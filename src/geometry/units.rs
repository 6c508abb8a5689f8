//! Path units: the primitive drawing segments of a parsed path.
//!
//! A unit keeps absolute (origin-relative, pre-relativization)
//! coordinates so that length estimation and position-at-distance
//! queries can evaluate it without re-walking the path string.

use enum_dispatch::enum_dispatch;
use glam::DVec2;

use crate::types::tangent_angle;

/// Parametric evaluation over drawable units.
#[enum_dispatch]
pub trait Parametric {
    /// Point at parameter `t` in `[0, 1]`.
    fn point_at(&self, t: f64) -> DVec2;

    /// First derivative at `t` (unnormalized).
    fn derivative_at(&self, t: f64) -> DVec2;

    fn start_point(&self) -> DVec2;

    fn end_point(&self) -> DVec2;

    /// Tangent angle at `t`, in the engine's rotation convention.
    fn angle_at(&self, t: f64) -> f64 {
        tangent_angle(self.derivative_at(t))
    }
}

/// A straight segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Linear {
    pub start: DVec2,
    pub end: DVec2,
}

impl Parametric for Linear {
    fn point_at(&self, t: f64) -> DVec2 {
        self.start + (self.end - self.start) * t
    }

    fn derivative_at(&self, _t: f64) -> DVec2 {
        self.end - self.start
    }

    fn start_point(&self) -> DVec2 {
        self.start
    }

    fn end_point(&self) -> DVec2 {
        self.end
    }
}

/// A quadratic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quadratic {
    pub start: DVec2,
    pub control: DVec2,
    pub end: DVec2,
}

impl Parametric for Quadratic {
    fn point_at(&self, t: f64) -> DVec2 {
        let u = 1.0 - t;
        self.start * (u * u) + self.control * (2.0 * u * t) + self.end * (t * t)
    }

    fn derivative_at(&self, t: f64) -> DVec2 {
        let u = 1.0 - t;
        (self.control - self.start) * (2.0 * u) + (self.end - self.control) * (2.0 * t)
    }

    fn start_point(&self) -> DVec2 {
        self.start
    }

    fn end_point(&self) -> DVec2 {
        self.end
    }
}

/// A cubic Bezier segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bezier {
    pub start: DVec2,
    pub control1: DVec2,
    pub control2: DVec2,
    pub end: DVec2,
}

impl Parametric for Bezier {
    fn point_at(&self, t: f64) -> DVec2 {
        let u = 1.0 - t;
        self.start * (u * u * u)
            + self.control1 * (3.0 * u * u * t)
            + self.control2 * (3.0 * u * t * t)
            + self.end * (t * t * t)
    }

    fn derivative_at(&self, t: f64) -> DVec2 {
        let u = 1.0 - t;
        (self.control1 - self.start) * (3.0 * u * u)
            + (self.control2 - self.control1) * (6.0 * u * t)
            + (self.end - self.control2) * (3.0 * t * t)
    }

    fn start_point(&self) -> DVec2 {
        self.start
    }

    fn end_point(&self) -> DVec2 {
        self.end
    }
}

/// A drawable segment species.
#[enum_dispatch(Parametric)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawUnit {
    Linear,
    Quadratic,
    Bezier,
}

/// One primitive unit of a parsed path.
///
/// Only `Draw` units contribute arc length; the others exist so the
/// unit list stays parallel with the command stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathUnit {
    /// Pen relocation, recorded at its target position.
    Move(DVec2),
    Draw(DrawUnit),
    /// Close marker, recorded at the cursor position.
    Close(DVec2),
    /// Unrecognized command, recorded at the cursor position.
    Unknown(DVec2),
}

impl PathUnit {
    pub fn as_draw(&self) -> Option<&DrawUnit> {
        match self {
            PathUnit::Draw(d) => Some(d),
            _ => None,
        }
    }

    pub fn is_drawable(&self) -> bool {
        matches!(self, PathUnit::Draw(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::dvec2;

    #[test]
    fn linear_midpoint() {
        let line = Linear {
            start: dvec2(0.0, 0.0),
            end: dvec2(10.0, 20.0),
        };
        assert_eq!(line.point_at(0.5), dvec2(5.0, 10.0));
    }

    #[test]
    fn quadratic_endpoints_and_midpoint() {
        // control collinear at the midpoint degenerates to a line
        let q = Quadratic {
            start: dvec2(0.0, 0.0),
            control: dvec2(50.0, 0.0),
            end: dvec2(100.0, 0.0),
        };
        assert_eq!(q.point_at(0.0), dvec2(0.0, 0.0));
        assert_eq!(q.point_at(1.0), dvec2(100.0, 0.0));
        assert_eq!(q.point_at(0.5), dvec2(50.0, 0.0));
        // horizontal travel reads as a quarter turn in the angle
        // convention (up is zero)
        assert!((q.angle_at(0.5) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn bezier_endpoints() {
        let b = Bezier {
            start: dvec2(0.0, 0.0),
            control1: dvec2(0.0, 10.0),
            control2: dvec2(10.0, 10.0),
            end: dvec2(10.0, 0.0),
        };
        assert_eq!(b.point_at(0.0), dvec2(0.0, 0.0));
        assert_eq!(b.point_at(1.0), dvec2(10.0, 0.0));
    }

    #[test]
    fn dispatch_through_draw_unit() {
        let unit: DrawUnit = Linear {
            start: dvec2(0.0, 0.0),
            end: dvec2(4.0, 0.0),
        }
        .into();
        assert_eq!(unit.point_at(0.25), dvec2(1.0, 0.0));
        assert_eq!(unit.end_point(), dvec2(4.0, 0.0));
    }
}
