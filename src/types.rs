//! Coordinate values and small geometry types.
//!
//! Declared positions are kept in their declared form (`CoordValue`) and
//! only turned into pixels during a clean pass, against whatever context
//! dimension applies at that moment. Keywords are folded into their
//! percentage equivalents at set time, so resolution only has two cases.

use std::fmt;

use glam::{DVec2, dvec2};

/// One axis of a declared coordinate pair.
///
/// Percentages resolve against a context dimension (container width or
/// height, or the artefact's own dimensions for handles). The keyword
/// forms `left`/`top` (0%), `center` (50%) and `right`/`bottom` (100%)
/// parse straight into `Percent`; anything unrecognized parses to
/// `Px(0.0)` rather than erroring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordValue {
    /// Absolute pixels.
    Px(f64),
    /// Percentage of a context dimension.
    Percent(f64),
}

impl CoordValue {
    pub const ZERO: CoordValue = CoordValue::Px(0.0);

    /// Resolve against a context dimension, producing pixels.
    #[inline]
    pub fn resolve(self, context: f64) -> f64 {
        match self {
            CoordValue::Px(v) => v,
            CoordValue::Percent(p) => (p / 100.0) * context,
        }
    }

    /// Add a delta of the same kind. Mixed-kind deltas are rejected and
    /// leave the value unchanged.
    pub fn delta_add(&mut self, delta: CoordValue) {
        match (self, delta) {
            (CoordValue::Px(v), CoordValue::Px(d)) => *v += d,
            (CoordValue::Percent(v), CoordValue::Percent(d)) => *v += d,
            _ => {}
        }
    }
}

impl Default for CoordValue {
    fn default() -> Self {
        CoordValue::ZERO
    }
}

impl From<f64> for CoordValue {
    fn from(v: f64) -> Self {
        CoordValue::Px(v)
    }
}

impl From<i32> for CoordValue {
    fn from(v: i32) -> Self {
        CoordValue::Px(v as f64)
    }
}

impl From<&str> for CoordValue {
    fn from(s: &str) -> Self {
        match s.trim() {
            "left" | "top" => CoordValue::Percent(0.0),
            "center" => CoordValue::Percent(50.0),
            "right" | "bottom" => CoordValue::Percent(100.0),
            // Dimensions may be declared "auto"; treat as zero
            "auto" => CoordValue::Px(0.0),
            t => {
                if let Some(num) = t.strip_suffix('%') {
                    match num.trim().parse::<f64>() {
                        Ok(p) => CoordValue::Percent(p),
                        Err(_) => CoordValue::Px(0.0),
                    }
                } else {
                    match t.parse::<f64>() {
                        Ok(v) => CoordValue::Px(v),
                        Err(_) => CoordValue::Px(0.0),
                    }
                }
            }
        }
    }
}

impl fmt::Display for CoordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordValue::Px(v) => write!(f, "{v}"),
            CoordValue::Percent(p) => write!(f, "{p}%"),
        }
    }
}

/// A declared two-axis quantity: start, handle, offset or dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub x: CoordValue,
    pub y: CoordValue,
}

impl Coordinate {
    pub const ZERO: Coordinate = Coordinate {
        x: CoordValue::ZERO,
        y: CoordValue::ZERO,
    };

    pub fn new(x: impl Into<CoordValue>, y: impl Into<CoordValue>) -> Self {
        Coordinate {
            x: x.into(),
            y: y.into(),
        }
    }

    /// Resolve both axes against a context size, producing pixels.
    #[inline]
    pub fn resolve(self, context: DVec2) -> DVec2 {
        dvec2(self.x.resolve(context.x), self.y.resolve(context.y))
    }

    /// Apply a per-axis delta (same-kind addition, see
    /// [`CoordValue::delta_add`]).
    pub fn delta_add(&mut self, delta: Coordinate) {
        self.x.delta_add(delta.x);
        self.y.delta_add(delta.y);
    }
}

impl<X: Into<CoordValue>, Y: Into<CoordValue>> From<(X, Y)> for Coordinate {
    fn from((x, y): (X, Y)) -> Self {
        Coordinate::new(x, y)
    }
}

/// Per-axis position lock.
///
/// `Pivot`, `Mimic` and `Path` read from the referenced artefact; a lock
/// whose reference is absent degrades to `Start` at resolution time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lock {
    #[default]
    Start,
    Pivot,
    Mimic,
    Path,
    Mouse,
}

impl From<&str> for Lock {
    fn from(s: &str) -> Self {
        match s {
            "pivot" => Lock::Pivot,
            "mimic" => Lock::Mimic,
            "path" => Lock::Path,
            "mouse" => Lock::Mouse,
            _ => Lock::Start,
        }
    }
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Lock::Start => "start",
            Lock::Pivot => "pivot",
            Lock::Mimic => "mimic",
            Lock::Path => "path",
            Lock::Mouse => "mouse",
        };
        f.write_str(s)
    }
}

/// Axis-aligned bounding box in local (origin-relative) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BoundingBox {
    pub const ZERO: BoundingBox = BoundingBox {
        x: 0.0,
        y: 0.0,
        w: 0.0,
        h: 0.0,
    };

    pub fn min(&self) -> DVec2 {
        dvec2(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        dvec2(self.w, self.h)
    }
}

/// Tangent angle from a first-derivative vector: degrees, shifted a
/// quarter turn so that "up" reads as 0.
#[inline]
pub(crate) fn tangent_angle(d: DVec2) -> f64 {
    d.y.atan2(d.x).to_degrees() + 90.0
}

/// Rotate a vector by an angle given in degrees.
#[inline]
pub(crate) fn rotate_deg(v: DVec2, degrees: f64) -> DVec2 {
    DVec2::from_angle(degrees.to_radians()).rotate(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_resolve_as_is() {
        assert_eq!(CoordValue::Px(12.5).resolve(200.0), 12.5);
    }

    #[test]
    fn percentages_resolve_against_context() {
        assert_eq!(CoordValue::from("50%").resolve(200.0), 100.0);
        assert_eq!(CoordValue::from("-10%").resolve(200.0), -20.0);
    }

    #[test]
    fn keywords_map_to_percentages() {
        assert_eq!(CoordValue::from("left"), CoordValue::Percent(0.0));
        assert_eq!(CoordValue::from("top"), CoordValue::Percent(0.0));
        assert_eq!(CoordValue::from("center"), CoordValue::Percent(50.0));
        assert_eq!(CoordValue::from("right"), CoordValue::Percent(100.0));
        assert_eq!(CoordValue::from("bottom"), CoordValue::Percent(100.0));
    }

    #[test]
    fn malformed_input_degrades_to_zero() {
        assert_eq!(CoordValue::from("wibble"), CoordValue::Px(0.0));
        assert_eq!(CoordValue::from("12px"), CoordValue::Px(0.0));
        assert_eq!(CoordValue::from("%"), CoordValue::Px(0.0));
    }

    #[test]
    fn numeric_strings_parse() {
        assert_eq!(CoordValue::from("42"), CoordValue::Px(42.0));
        assert_eq!(CoordValue::from("-3.5"), CoordValue::Px(-3.5));
    }

    #[test]
    fn delta_addition_is_kind_homogeneous() {
        let mut v = CoordValue::Px(10.0);
        v.delta_add(CoordValue::Px(5.0));
        assert_eq!(v, CoordValue::Px(15.0));

        let mut p = CoordValue::Percent(50.0);
        p.delta_add(CoordValue::Percent(10.0));
        assert_eq!(p, CoordValue::Percent(60.0));

        // mixed kinds are rejected, value unchanged
        let mut m = CoordValue::Px(10.0);
        m.delta_add(CoordValue::Percent(10.0));
        assert_eq!(m, CoordValue::Px(10.0));
    }

    #[test]
    fn keyword_delta_folds_through_percent() {
        let mut v = CoordValue::from("center");
        v.delta_add(CoordValue::from("10%"));
        assert_eq!(v, CoordValue::Percent(60.0));
    }

    #[test]
    fn tangent_angle_convention() {
        // travelling straight up (canvas y grows downward) reads as 0
        assert!((tangent_angle(dvec2(0.0, -1.0)) - 0.0).abs() < 1e-12);
        // travelling right reads as a quarter turn
        assert!((tangent_angle(dvec2(1.0, 0.0)) - 90.0).abs() < 1e-12);
    }
}
