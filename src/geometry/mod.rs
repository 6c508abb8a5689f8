//! Path geometry: parsing, measurement, and position queries.
//!
//! This module is organized into submodules:
//! - `units`: tagged path units and their parametric math
//! - `builder`: token walk producing units and the relative path string
//! - `length`: adaptive-subdivision arc-length estimation
//! - `position`: position-at-distance queries over the computed tables

pub(crate) mod builder;
pub mod length;
pub mod position;
pub mod units;

pub use length::{UnitMeasure, estimate_length};
pub use position::LocalPathPoint;
pub use units::{Bezier, DrawUnit, Linear, Parametric, PathUnit, Quadratic};

use std::fmt::Write;

use glam::DVec2;

use crate::parse::tokenize;
use crate::types::BoundingBox;

/// One entry of the constant-speed remap table: cumulative length along
/// the whole path against the global path position it corresponds to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SpeedSample {
    pub len: f64,
    pub pos: f64,
}

/// The computed geometry of one path-defined artefact.
///
/// Buffers are owned here and cleared-and-refilled on recompute rather
/// than reallocated, so a shape redrawn every frame does not churn the
/// allocator.
#[derive(Debug, Clone, Default)]
pub struct PathGeometry {
    /// Minimal re-serialized relative path string, origin-relative.
    pub local_path: String,
    /// Parsed units, parallel with the command stream.
    pub units: Vec<PathUnit>,
    /// Estimated length of each unit; zero for non-drawing units.
    pub unit_lengths: Vec<f64>,
    /// Cumulative fraction of total length through each unit.
    /// Non-decreasing; final entry is 1 when the total length is
    /// positive. Left at zero when it is not.
    pub unit_partials: Vec<f64>,
    /// Total estimated path length.
    pub length: f64,
    /// Bounding box over all sampled points, in local coordinates.
    pub local_box: BoundingBox,
    pub(crate) speed_samples: Vec<SpeedSample>,
}

impl PathGeometry {
    /// Recompute everything from a path description.
    ///
    /// `origin` is the artefact's resolved start position; an opening
    /// absolute `M` is rebased against it. Length and speed tables are
    /// only built when the artefact is usable as a path.
    pub fn recompute(
        &mut self,
        d: &str,
        scale: f64,
        origin: DVec2,
        use_as_path: bool,
        precision: f64,
    ) {
        self.local_path.clear();
        self.units.clear();
        self.unit_lengths.clear();
        self.unit_partials.clear();
        self.speed_samples.clear();
        self.length = 0.0;
        self.local_box = BoundingBox::ZERO;

        let walked = builder::walk(&tokenize(d), scale, origin);

        for step in &walked.steps {
            self.local_path.push(step.cmd);
            for (i, arg) in step.args.iter().enumerate() {
                if i > 0 {
                    self.local_path.push(',');
                }
                // serialization keeps one decimal place
                let _ = write!(self.local_path, "{arg:.1}");
            }
            self.units.push(step.unit);
        }

        let mut bounds = BoundsAccumulator::default();

        if use_as_path {
            let mut measures: Vec<Option<UnitMeasure>> = Vec::with_capacity(self.units.len());
            for unit in &self.units {
                match unit.as_draw() {
                    Some(draw) => {
                        let m = estimate_length(draw, precision);
                        self.unit_lengths.push(m.length);
                        bounds.extend(&m.points);
                        measures.push(Some(m));
                    }
                    None => {
                        self.unit_lengths.push(0.0);
                        measures.push(None);
                    }
                }
            }

            self.length = self.unit_lengths.iter().sum();

            // partials stay at zero for a zero-length path: normalizing
            // would divide by zero
            let mut cum = 0.0;
            for &len in &self.unit_lengths {
                if self.length > 0.0 {
                    cum += len / self.length;
                }
                self.unit_partials.push(cum);
            }

            self.build_speed_table(&measures);
        } else {
            bounds.extend(&walked.trail);
        }

        self.local_box = bounds.finish();
    }

    /// Whether position queries can produce anything.
    pub fn has_length(&self) -> bool {
        self.length > 0.0
    }

    fn build_speed_table(&mut self, measures: &[Option<UnitMeasure>]) {
        if self.length <= 0.0 {
            return;
        }
        let mut len_before = 0.0;
        let mut partial_before = 0.0;
        for (i, measure) in measures.iter().enumerate() {
            let partial = self.unit_partials[i];
            if let Some(m) = measure {
                for &(t, cum) in &m.stations {
                    // skip duplicate zero-length boundary entries
                    if t == 0.0 && !self.speed_samples.is_empty() {
                        continue;
                    }
                    self.speed_samples.push(SpeedSample {
                        len: len_before + cum,
                        pos: partial_before + t * (partial - partial_before),
                    });
                }
                len_before += m.length;
            }
            partial_before = partial;
        }
    }
}

#[derive(Debug, Default)]
struct BoundsAccumulator {
    min: Option<DVec2>,
    max: Option<DVec2>,
}

impl BoundsAccumulator {
    fn extend(&mut self, points: &[DVec2]) {
        for &p in points {
            self.min = Some(match self.min {
                Some(m) => m.min(p),
                None => p,
            });
            self.max = Some(match self.max {
                Some(m) => m.max(p),
                None => p,
            });
        }
    }

    fn finish(self) -> BoundingBox {
        match (self.min, self.max) {
            (Some(min), Some(max)) => BoundingBox {
                x: min.x,
                y: min.y,
                w: max.x - min.x,
                h: max.y - min.y,
            },
            // no points at all: a degenerate box at the origin
            _ => BoundingBox::ZERO,
        }
    }
}
