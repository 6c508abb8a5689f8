//! Position-at-distance queries over computed path tables.
//!
//! These operate in the path's local frame; mapping into the owning
//! artefact's container frame (handle, flips, roll, stamp position)
//! happens at the artefact level.

use glam::DVec2;

use super::units::Parametric;
use super::PathGeometry;

/// A point on the path in local coordinates, with its tangent angle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalPathPoint {
    pub point: DVec2,
    pub angle: f64,
}

impl PathGeometry {
    /// Locate the point a fraction `pos` of the way along the path.
    ///
    /// `pos` wraps modulo into `[0, 1)`; exactly 1 is nudged just short
    /// of the seam. With `constant_speed`, `pos` is first remapped
    /// through the sampled length table so equal increments travel equal
    /// distances. Returns `None` when the path has no measurable length.
    pub fn local_position_at(&self, pos: f64, constant_speed: bool) -> Option<LocalPathPoint> {
        if !self.has_length() || self.unit_partials.is_empty() {
            return None;
        }

        let mut remainder = if pos == 1.0 { 0.9999 } else { pos.rem_euclid(1.0) };

        if constant_speed {
            remainder = self.constant_position(remainder);
        }

        // find the owning unit: the first drawable whose cumulative
        // bracket contains the remainder
        let mut previous = 0.0;
        for (i, unit) in self.units.iter().enumerate() {
            let Some(draw) = unit.as_draw() else { continue };
            let stopping = self.unit_partials[i];
            if remainder <= stopping {
                let span = stopping - previous;
                if span <= 0.0 {
                    // zero-length drawable; the next unit owns this spot
                    continue;
                }
                let u = (remainder - previous) / span;
                return Some(LocalPathPoint {
                    point: draw.point_at(u),
                    angle: draw.angle_at(u),
                });
            }
            previous = stopping;
        }
        None
    }

    /// Convert a distance fraction into a parameter fraction by linear
    /// interpolation through the sampled `(length, position)` table.
    fn constant_position(&self, pos: f64) -> f64 {
        if self.speed_samples.len() < 2 {
            return pos;
        }
        let required = pos * self.length;
        let mut prev = self.speed_samples[0];
        for &sample in &self.speed_samples[1..] {
            if required <= sample.len {
                let span = sample.len - prev.len;
                if span <= 0.0 {
                    return sample.pos;
                }
                return prev.pos + ((required - prev.len) / span) * (sample.pos - prev.pos);
            }
            prev = sample;
        }
        prev.pos
    }
}
