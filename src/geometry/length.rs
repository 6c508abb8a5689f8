//! Arc-length estimation by adaptive subdivision.
//!
//! Kept free of engine state so the estimator can be tested in
//! isolation: one unit in, one measurement out.

use glam::DVec2;

use super::units::{DrawUnit, Parametric};

/// Coarsest subdivision: four chords over the parameter range.
const INITIAL_STEPS: usize = 4;

/// Smallest allowed step; caps a curve at 257 evaluations.
const MIN_STEP: f64 = 0.004;

/// Measurement of one drawable unit, retaining the sample data of the
/// final subdivision pass.
#[derive(Debug, Clone, Default)]
pub struct UnitMeasure {
    /// Estimated arc length.
    pub length: f64,
    /// Sampled points, used for bounding-box accumulation (a curve's
    /// extremum can lie strictly between its endpoints).
    pub points: Vec<DVec2>,
    /// `(parameter, cumulative length)` at each sampled point, used to
    /// build the constant-speed remap table.
    pub stations: Vec<(f64, f64)>,
}

/// Estimate the arc length of one drawable unit.
///
/// Lines are measured exactly. Curves are measured by chord summation:
/// start with a coarse step, halve it each pass, and stop once an extra
/// pass gains less than `precision` or the step reaches the cap.
pub fn estimate_length(unit: &DrawUnit, precision: f64) -> UnitMeasure {
    match unit {
        DrawUnit::Linear(line) => {
            let length = (line.end - line.start).length();
            UnitMeasure {
                length,
                points: vec![line.start, line.end],
                stations: vec![(0.0, 0.0), (1.0, length)],
            }
        }
        curve => estimate_curve(curve, precision),
    }
}

fn estimate_curve(unit: &DrawUnit, precision: f64) -> UnitMeasure {
    let mut measure = UnitMeasure::default();
    let mut length = 0.0;
    let mut steps = INITIAL_STEPS;

    loop {
        measure.points.clear();
        measure.stations.clear();

        let mut acc = 0.0;
        let mut prev = unit.point_at(0.0);
        measure.points.push(prev);
        measure.stations.push((0.0, 0.0));

        for i in 1..=steps {
            let t = i as f64 / steps as f64;
            let p = unit.point_at(t);
            acc += (p - prev).length();
            measure.points.push(p);
            measure.stations.push((t, acc));
            prev = p;
        }

        // converged once a finer pass stops gaining length
        let converged = acc < length + precision;
        length = acc;
        steps *= 2;

        if converged || 1.0 / (steps as f64) < MIN_STEP {
            break;
        }
    }

    measure.length = length;
    measure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::units::{Bezier, Linear, Quadratic};
    use glam::dvec2;

    #[test]
    fn lines_are_exact() {
        let unit = DrawUnit::from(Linear {
            start: dvec2(0.0, 0.0),
            end: dvec2(30.0, 40.0),
        });
        let m = estimate_length(&unit, 0.001);
        assert_eq!(m.length, 50.0);
        assert_eq!(m.points.len(), 2);
    }

    #[test]
    fn degenerate_quadratic_measures_like_a_line() {
        let unit = DrawUnit::from(Quadratic {
            start: dvec2(0.0, 0.0),
            control: dvec2(50.0, 0.0),
            end: dvec2(100.0, 0.0),
        });
        let m = estimate_length(&unit, 0.001);
        assert!((m.length - 100.0).abs() < 0.01);
    }

    #[test]
    fn stations_are_monotonic() {
        let unit = DrawUnit::from(Bezier {
            start: dvec2(0.0, 0.0),
            control1: dvec2(0.0, 60.0),
            control2: dvec2(100.0, 60.0),
            end: dvec2(100.0, 0.0),
        });
        let m = estimate_length(&unit, 0.001);
        for pair in m.stations.windows(2) {
            assert!(pair[1].0 > pair[0].0);
            assert!(pair[1].1 >= pair[0].1);
        }
        assert_eq!(m.stations.last().map(|s| s.0), Some(1.0));
    }

    #[test]
    fn subdivision_is_bounded() {
        // a pathological curve cannot run away: the step floor caps
        // the sample count
        let unit = DrawUnit::from(Bezier {
            start: dvec2(0.0, 0.0),
            control1: dvec2(1e6, -1e6),
            control2: dvec2(-1e6, 1e6),
            end: dvec2(10.0, 0.0),
        });
        let m = estimate_length(&unit, 0.0);
        assert!(m.points.len() <= 257);
        assert!(m.length.is_finite());
    }

    #[test]
    fn quarter_circle_approximation_is_close() {
        // cubic approximation of a quarter circle of radius 100
        let k = 55.228475;
        let unit = DrawUnit::from(Bezier {
            start: dvec2(100.0, 0.0),
            control1: dvec2(100.0, k),
            control2: dvec2(k, 100.0),
            end: dvec2(0.0, 100.0),
        });
        let m = estimate_length(&unit, 0.01);
        let expected = std::f64::consts::FRAC_PI_2 * 100.0;
        assert!((m.length - expected).abs() < 1.0, "got {}", m.length);
    }
}
