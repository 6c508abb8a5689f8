//! Convenience builders for path-description strings.
//!
//! Each returns an ordinary absolute path string for the geometry
//! engine, so callers can make common shapes without hand-writing path
//! data. Curved corners use the classic 0.55-radius cubic
//! approximation of a circular arc.

const CURVE: f64 = 0.55;

/// A straight line between two points.
pub fn line(sx: f64, sy: f64, ex: f64, ey: f64) -> String {
    format!("M{sx},{sy}L{ex},{ey}")
}

/// A quadratic curve from a start point through one control point.
pub fn quadratic(sx: f64, sy: f64, cx: f64, cy: f64, ex: f64, ey: f64) -> String {
    format!("M{sx},{sy}Q{cx},{cy},{ex},{ey}")
}

/// A cubic curve from a start point through two control points.
#[allow(clippy::too_many_arguments)]
pub fn bezier(
    sx: f64,
    sy: f64,
    c1x: f64,
    c1y: f64,
    c2x: f64,
    c2y: f64,
    ex: f64,
    ey: f64,
) -> String {
    format!("M{sx},{sy}C{c1x},{c1y},{c2x},{c2y},{ex},{ey}")
}

/// An axis-aligned rectangle centered on `(cx, cy)`, with corners
/// rounded to `radius` (clamped to the half-dimensions; zero for sharp
/// corners).
pub fn rectangle(cx: f64, cy: f64, width: f64, height: f64, radius: f64) -> String {
    let hw = width.abs() / 2.0;
    let hh = height.abs() / 2.0;
    let r = radius.clamp(0.0, hw.min(hh));

    if r <= 0.0 {
        return format!(
            "M{},{}L{},{}L{},{}L{},{}Z",
            cx - hw,
            cy - hh,
            cx + hw,
            cy - hh,
            cx + hw,
            cy + hh,
            cx - hw,
            cy + hh,
        );
    }

    let k = r * CURVE;
    let mut d = format!("M{},{}", cx - hw + r, cy - hh);
    // top edge, then clockwise around each corner
    d.push_str(&format!("L{},{}", cx + hw - r, cy - hh));
    d.push_str(&format!(
        "C{},{},{},{},{},{}",
        cx + hw - r + k,
        cy - hh,
        cx + hw,
        cy - hh + r - k,
        cx + hw,
        cy - hh + r,
    ));
    d.push_str(&format!("L{},{}", cx + hw, cy + hh - r));
    d.push_str(&format!(
        "C{},{},{},{},{},{}",
        cx + hw,
        cy + hh - r + k,
        cx + hw - r + k,
        cy + hh,
        cx + hw - r,
        cy + hh,
    ));
    d.push_str(&format!("L{},{}", cx - hw + r, cy + hh));
    d.push_str(&format!(
        "C{},{},{},{},{},{}",
        cx - hw + r - k,
        cy + hh,
        cx - hw,
        cy + hh - r + k,
        cx - hw,
        cy + hh - r,
    ));
    d.push_str(&format!("L{},{}", cx - hw, cy - hh + r));
    d.push_str(&format!(
        "C{},{},{},{},{},{}",
        cx - hw,
        cy - hh + r - k,
        cx - hw + r - k,
        cy - hh,
        cx - hw + r,
        cy - hh,
    ));
    d.push('Z');
    d
}

/// An ellipse centered on `(cx, cy)`, drawn clockwise from its top
/// point as four cubic curves.
pub fn oval(cx: f64, cy: f64, rx: f64, ry: f64) -> String {
    let kx = rx * CURVE;
    let ky = ry * CURVE;
    format!(
        "M{},{}C{},{},{},{},{},{}C{},{},{},{},{},{}C{},{},{},{},{},{}C{},{},{},{},{},{}Z",
        cx,
        cy - ry,
        // to the east point
        cx + kx,
        cy - ry,
        cx + rx,
        cy - ky,
        cx + rx,
        cy,
        // to the south point
        cx + rx,
        cy + ky,
        cx + kx,
        cy + ry,
        cx,
        cy + ry,
        // to the west point
        cx - kx,
        cy + ry,
        cx - rx,
        cy + ky,
        cx - rx,
        cy,
        // back to the top
        cx - rx,
        cy - ky,
        cx - kx,
        cy - ry,
        cx,
        cy - ry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::tokenize;

    #[test]
    fn line_parses_to_a_single_segment() {
        let tokens = tokenize(&line(0.0, 0.0, 50.0, 20.0));
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].cmd, 'M');
        assert_eq!(tokens[1].cmd, 'L');
        assert_eq!(tokens[1].args, vec![50.0, 20.0]);
    }

    #[test]
    fn sharp_rectangle_is_four_lines() {
        let tokens = tokenize(&rectangle(50.0, 50.0, 100.0, 60.0, 0.0));
        let cmds: String = tokens.iter().map(|t| t.cmd).collect();
        assert_eq!(cmds, "MLLLZ");
    }

    #[test]
    fn rounded_rectangle_mixes_lines_and_curves() {
        let tokens = tokenize(&rectangle(50.0, 50.0, 100.0, 60.0, 10.0));
        let cmds: String = tokens.iter().map(|t| t.cmd).collect();
        assert_eq!(cmds, "MLCLCLCLCZ");
    }

    #[test]
    fn oval_is_four_curves() {
        let tokens = tokenize(&oval(100.0, 100.0, 60.0, 40.0));
        let cmds: String = tokens.iter().map(|t| t.cmd).collect();
        assert_eq!(cmds, "MCCCCZ");
        // every cubic carries six numbers
        for t in tokens.iter().filter(|t| t.cmd == 'C') {
            assert_eq!(t.args.len(), 6);
        }
    }

    #[test]
    fn corner_radius_clamps_to_the_half_dimension() {
        // an oversized radius degrades to the largest that fits
        let d = rectangle(0.0, 0.0, 20.0, 20.0, 50.0);
        let tokens = tokenize(&d);
        assert_eq!(tokens.first().map(|t| t.cmd), Some('M'));
    }
}
