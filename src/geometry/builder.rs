//! Walks tokenized path commands into drawable units.
//!
//! The walker keeps a cursor in scaled coordinates, relativizes every
//! point against it, and emits two parallel outputs per command: the
//! minimal relative serialization payload (used to rebuild a renderable
//! path string) and a tagged unit carrying absolute coordinates for
//! later length math.
//!
//! When a path opens with an absolute `M`, the walker's frame is shifted
//! so that all emitted coordinates are relative to the artefact's
//! resolved start (its origin) rather than to the container.

use glam::{DVec2, dvec2};

use super::units::{Bezier, DrawUnit, Linear, PathUnit, Quadratic};
use crate::parse::PathToken;

/// One emitted drawing step.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Step {
    /// Output command letter, always lowercase (relative form).
    pub cmd: char,
    /// Relativized, scaled serialization payload.
    pub args: Vec<f64>,
    pub unit: PathUnit,
}

/// Everything the walker produces from one pass over the tokens.
#[derive(Debug, Default)]
pub(crate) struct Walk {
    pub steps: Vec<Step>,
    /// Cursor position after each step, in the local frame. Used for
    /// bounding boxes when no curve samples exist.
    pub trail: Vec<DVec2>,
}

pub(crate) fn walk(tokens: &[PathToken], scale: f64, origin: DVec2) -> Walk {
    let mut out = Walk::default();

    // An opening absolute M rebases the whole path against the origin:
    // starting the cursor there makes the first emitted move, and every
    // later relativization, origin-relative.
    let frame = match tokens.first() {
        Some(t) if t.cmd == 'M' => origin,
        _ => DVec2::ZERO,
    };

    let mut cur = frame;
    let mut old = frame;
    // control point available for T/S smoothing, absolute coordinates
    let mut reflect: Option<DVec2> = None;

    let emit = |cmd: char,
                args: Vec<f64>,
                unit: PathUnit,
                cur: DVec2,
                old: &mut DVec2,
                out: &mut Walk| {
        out.steps.push(Step { cmd, args, unit });
        out.trail.push(cur - frame);
        *old = cur;
    };

    for token in tokens {
        let absolute = token.cmd.is_ascii_uppercase();
        let cmd = token.cmd.to_ascii_lowercase();

        match cmd {
            'h' | 'v' => {
                for &a in &token.args {
                    let delta = match (cmd, absolute) {
                        ('h', true) => a * scale - cur.x,
                        ('h', false) => a * scale,
                        ('v', true) => a * scale - cur.y,
                        _ => a * scale,
                    };
                    if cmd == 'h' {
                        cur.x += delta;
                    } else {
                        cur.y += delta;
                    }
                    reflect = None;
                    let unit = PathUnit::Draw(DrawUnit::Linear(Linear {
                        start: old - frame,
                        end: cur - frame,
                    }));
                    emit(cmd, vec![delta], unit, cur, &mut old, &mut out);
                }
            }

            'm' => {
                for pair in token.args.chunks_exact(2) {
                    let target = dvec2(pair[0], pair[1]) * scale;
                    let delta = if absolute { target - cur } else { target };
                    cur += delta;
                    reflect = None;
                    let unit = PathUnit::Move(cur - frame);
                    emit('m', vec![delta.x, delta.y], unit, cur, &mut old, &mut out);
                }
            }

            'l' => {
                for pair in token.args.chunks_exact(2) {
                    let target = dvec2(pair[0], pair[1]) * scale;
                    let delta = if absolute { target - cur } else { target };
                    cur += delta;
                    reflect = None;
                    let unit = PathUnit::Draw(DrawUnit::Linear(Linear {
                        start: old - frame,
                        end: cur - frame,
                    }));
                    emit('l', vec![delta.x, delta.y], unit, cur, &mut old, &mut out);
                }
            }

            't' => {
                for pair in token.args.chunks_exact(2) {
                    let target = dvec2(pair[0], pair[1]) * scale;
                    let delta = if absolute { target - cur } else { target };
                    cur += delta;
                    // reflect the previous control point a half turn
                    // about the segment start; else coincide with it
                    let control = match reflect {
                        Some(rc) => old * 2.0 - rc,
                        None => old,
                    };
                    reflect = Some(control);
                    let unit = PathUnit::Draw(DrawUnit::Quadratic(Quadratic {
                        start: old - frame,
                        control: control - frame,
                        end: cur - frame,
                    }));
                    emit('t', vec![delta.x, delta.y], unit, cur, &mut old, &mut out);
                }
            }

            'q' => {
                for group in token.args.chunks_exact(4) {
                    let (control, target) = scale_pair2(group, scale, absolute, old);
                    cur = target;
                    reflect = Some(control);
                    let unit = PathUnit::Draw(DrawUnit::Quadratic(Quadratic {
                        start: old - frame,
                        control: control - frame,
                        end: cur - frame,
                    }));
                    let args = vec![
                        control.x - old.x,
                        control.y - old.y,
                        cur.x - old.x,
                        cur.y - old.y,
                    ];
                    emit('q', args, unit, cur, &mut old, &mut out);
                }
            }

            's' => {
                for group in token.args.chunks_exact(4) {
                    let (control2, target) = scale_pair2(group, scale, absolute, old);
                    cur = target;
                    let control1 = match reflect {
                        Some(rc) => old * 2.0 - rc,
                        None => old,
                    };
                    reflect = Some(control2);
                    let unit = PathUnit::Draw(DrawUnit::Bezier(Bezier {
                        start: old - frame,
                        control1: control1 - frame,
                        control2: control2 - frame,
                        end: cur - frame,
                    }));
                    let args = vec![
                        control2.x - old.x,
                        control2.y - old.y,
                        cur.x - old.x,
                        cur.y - old.y,
                    ];
                    emit('s', args, unit, cur, &mut old, &mut out);
                }
            }

            'c' => {
                for group in token.args.chunks_exact(6) {
                    let c1 = scale_point(&group[0..2], scale, absolute, old);
                    let c2 = scale_point(&group[2..4], scale, absolute, old);
                    let target = scale_point(&group[4..6], scale, absolute, old);
                    cur = target;
                    reflect = Some(c2);
                    let unit = PathUnit::Draw(DrawUnit::Bezier(Bezier {
                        start: old - frame,
                        control1: c1 - frame,
                        control2: c2 - frame,
                        end: cur - frame,
                    }));
                    let args = vec![
                        c1.x - old.x,
                        c1.y - old.y,
                        c2.x - old.x,
                        c2.y - old.y,
                        cur.x - old.x,
                        cur.y - old.y,
                    ];
                    emit('c', args, unit, cur, &mut old, &mut out);
                }
            }

            'a' => {
                // elliptical arcs are approximated as straight lines to
                // their endpoints; the serialization keeps the arc form
                for group in token.args.chunks_exact(7) {
                    let target = scale_point(&group[5..7], scale, absolute, old);
                    cur = target;
                    reflect = None;
                    let unit = PathUnit::Draw(DrawUnit::Linear(Linear {
                        start: old - frame,
                        end: cur - frame,
                    }));
                    let args = vec![
                        group[0] * scale,
                        group[1] * scale,
                        group[2],
                        group[3],
                        group[4],
                        cur.x - old.x,
                        cur.y - old.y,
                    ];
                    emit('a', args, unit, cur, &mut old, &mut out);
                }
            }

            'z' => {
                reflect = None;
                let unit = PathUnit::Close(cur - frame);
                emit('z', Vec::new(), unit, cur, &mut old, &mut out);
            }

            _ => {
                reflect = None;
                let unit = PathUnit::Unknown(cur - frame);
                emit(cmd, Vec::new(), unit, cur, &mut old, &mut out);
            }
        }
    }

    out
}

fn scale_point(pair: &[f64], scale: f64, absolute: bool, old: DVec2) -> DVec2 {
    let p = dvec2(pair[0], pair[1]) * scale;
    if absolute { p } else { old + p }
}

/// Scale a `(control, endpoint)` group, returning absolute coordinates.
fn scale_pair2(group: &[f64], scale: f64, absolute: bool, old: DVec2) -> (DVec2, DVec2) {
    (
        scale_point(&group[0..2], scale, absolute, old),
        scale_point(&group[2..4], scale, absolute, old),
    )
}
